//! First-paragraph summaries for note previews.

use super::frontmatter::strip_frontmatter;
use super::heading::parse_heading;
use super::line_spans;
use once_cell::sync::Lazy;
use regex::Regex;

const SUMMARY_MAX_CHARS: usize = 100;

static INLINE_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!?\[([^\]]*)\]\([^)]+\)").expect("valid inline link regex"));
static WIKILINK_ALIAS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[\[(?:[^\[\]|]+\|)?([^\[\]|]+)\]\]").expect("valid wikilink alias regex")
});
static EMPHASIS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[*_`~]+").expect("valid emphasis regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Returns the first prose paragraph of a note body.
///
/// Frontmatter, headings, fenced code, tables, quotes, list items and rules
/// are skipped. Link syntax is reduced to its visible text and the result
/// is capped at 100 characters with a trailing `...`.
pub fn extract_summary(content: &str) -> Option<String> {
    let body = strip_frontmatter(content);
    let mut in_fence = false;
    let mut paragraph: Vec<&str> = Vec::new();

    for line in line_spans(body) {
        let trimmed = line.text.trim();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            if !paragraph.is_empty() {
                break;
            }
            continue;
        }
        if in_fence {
            continue;
        }
        if trimmed.is_empty() || is_structural(trimmed) {
            if !paragraph.is_empty() {
                break;
            }
            continue;
        }
        paragraph.push(trimmed);
    }

    if paragraph.is_empty() {
        return None;
    }
    let joined = paragraph.join(" ");
    let text = INLINE_LINK_RE.replace_all(&joined, "$1");
    let text = WIKILINK_ALIAS_RE.replace_all(&text, "$1");
    let text = EMPHASIS_RE.replace_all(&text, "");
    let text = WHITESPACE_RE.replace_all(&text, " ");
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    Some(truncate_chars(text, SUMMARY_MAX_CHARS))
}

fn is_structural(line: &str) -> bool {
    parse_heading(line).is_some()
        || line.starts_with('>')
        || line.starts_with('|')
        || line.starts_with("- ")
        || line.starts_with("* ")
        || line.starts_with("+ ")
        || line.starts_with("---")
        || line.starts_with("<!--")
        || is_ordered_item(line)
}

fn is_ordered_item(line: &str) -> bool {
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    digits > 0 && line[digits..].starts_with(". ")
}

fn truncate_chars(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    let mut truncated: String = value.chars().take(max_chars).collect();
    truncated.push_str("...");
    truncated
}

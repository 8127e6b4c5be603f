//! ATX heading lines (`#` .. `######`).

use super::line_spans;

const MAX_HEADING_LEVEL: usize = 6;

/// Parses one heading line into `(level, text)`.
///
/// A heading is 1-6 `#` characters, at least one space or tab, then
/// non-blank text. The returned text is trimmed.
pub fn parse_heading(line: &str) -> Option<(usize, &str)> {
    let level = line.bytes().take_while(|byte| *byte == b'#').count();
    if level == 0 || level > MAX_HEADING_LEVEL {
        return None;
    }
    let rest = &line[level..];
    if !rest.starts_with([' ', '\t']) {
        return None;
    }
    let text = rest.trim();
    if text.is_empty() {
        return None;
    }
    Some((level, text))
}

/// Parses a level-2 section heading (`## text`).
pub fn parse_section_heading(line: &str) -> Option<&str> {
    match parse_heading(line) {
        Some((2, text)) => Some(text),
        _ => None,
    }
}

/// Collects heading texts of `body` in document order, all levels.
pub fn extract_headings(body: &str) -> Vec<String> {
    line_spans(body)
        .filter_map(|line| parse_heading(line.text))
        .map(|(_, text)| text.to_string())
        .collect()
}

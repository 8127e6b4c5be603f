//! Markdown `[text](url)` links and `[[wikilinks]]`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static MARKDOWN_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]*)\]\(([^)]+)\)").expect("valid link regex"));
static WIKILINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[([^\[\]]+)\]\]").expect("valid wikilink regex"));

/// One `[[target|alias]]` occurrence with its byte span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WikilinkMatch {
    /// Whole matched text including brackets.
    pub full_match: String,
    /// Target part before `|`.
    pub link_text: String,
    /// Alias after `|`, or the target when no alias is given.
    pub display_text: String,
    /// Byte offset of the opening `[[`.
    pub start: usize,
    /// Byte offset just past the closing `]]`.
    pub end: usize,
}

/// Returns the URL part of every `[text](url)` in document order.
pub fn markdown_link_targets(body: &str) -> Vec<String> {
    MARKDOWN_LINK_RE
        .captures_iter(body)
        .filter_map(|caps| caps.get(2).map(|m| m.as_str().to_string()))
        .collect()
}

/// Finds every wikilink in `text`.
pub fn find_wikilinks(text: &str) -> Vec<WikilinkMatch> {
    WIKILINK_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let inner = caps.get(1)?.as_str();
            let (link_text, display_text) = match inner.split_once('|') {
                Some((target, alias)) => (target, alias),
                None => (inner, inner),
            };
            Some(WikilinkMatch {
                full_match: whole.as_str().to_string(),
                link_text: link_text.to_string(),
                display_text: display_text.to_string(),
                start: whole.start(),
                end: whole.end(),
            })
        })
        .collect()
}

/// Returns wikilink targets (alias stripped) in document order.
pub fn wikilink_targets(body: &str) -> Vec<String> {
    find_wikilinks(body)
        .into_iter()
        .map(|found| found.link_text)
        .collect()
}

/// Collects markdown link URLs first, then wikilink targets.
pub fn extract_links(body: &str) -> Vec<String> {
    let mut links = markdown_link_targets(body);
    links.extend(wikilink_targets(body));
    links
}

#[cfg(test)]
mod tests {
    use super::{extract_links, find_wikilinks, markdown_link_targets};

    #[test]
    fn markdown_links_keep_url_part() {
        assert_eq!(
            markdown_link_targets("See [link](other.md) and [ref](http://example.com)"),
            vec!["other.md", "http://example.com"]
        );
    }

    #[test]
    fn wikilinks_strip_alias() {
        assert_eq!(
            extract_links("See [[other-page]] and [[aliased|display]]"),
            vec!["other-page", "aliased"]
        );
    }

    #[test]
    fn find_wikilinks_reports_alias_and_span() {
        let text = "[[a]] mid [[b|bee]] end [[c/d]]";
        let found = find_wikilinks(text);
        assert_eq!(found.len(), 3);
        assert_eq!(found[1].link_text, "b");
        assert_eq!(found[1].display_text, "bee");
        assert_eq!(&text[found[1].start..found[1].end], "[[b|bee]]");
        assert_eq!(found[2].display_text, "c/d");
    }

    #[test]
    fn empty_wikilink_does_not_match() {
        assert!(find_wikilinks("empty [[]] brackets").is_empty());
    }

    #[test]
    fn markdown_links_come_before_wikilinks() {
        assert_eq!(
            extract_links("[[first]] then [x](second.md)"),
            vec!["second.md", "first"]
        );
    }
}

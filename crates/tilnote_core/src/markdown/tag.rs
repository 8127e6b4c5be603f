//! Inline `#tag` occurrences.

use once_cell::sync::Lazy;
use regex::Regex;

// A tag starts at line start or after whitespace; `#` inside words is ignored.
static INLINE_TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)(?:^|\s)#([A-Za-z][A-Za-z0-9_/\-]*)").expect("valid inline tag regex")
});

/// Returns every inline tag of `body` as `#word`, in document order.
pub fn extract_inline_tags(body: &str) -> Vec<String> {
    INLINE_TAG_RE
        .captures_iter(body)
        .filter_map(|caps| caps.get(1).map(|m| format!("#{}", m.as_str())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::extract_inline_tags;

    #[test]
    fn collects_tags_with_prefix() {
        assert_eq!(
            extract_inline_tags("# Title\n\nSome text #inline-tag and #another"),
            vec!["#inline-tag", "#another"]
        );
    }

    #[test]
    fn tag_word_allows_digits_underscore_and_slash() {
        assert_eq!(
            extract_inline_tags("#lang/rust_2021 #v2"),
            vec!["#lang/rust_2021", "#v2"]
        );
    }

    #[test]
    fn ignores_headings_numbers_and_mid_word_hashes() {
        assert!(extract_inline_tags("## Heading\nissue #42\ncolor#fff").is_empty());
    }

    #[test]
    fn duplicates_are_kept() {
        assert_eq!(extract_inline_tags("#a #a"), vec!["#a", "#a"]);
    }
}

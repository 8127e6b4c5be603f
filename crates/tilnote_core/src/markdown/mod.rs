//! Small per-construct markdown parsers.
//!
//! # Responsibility
//! - Recognize exactly one construct each: frontmatter block, heading line,
//!   link forms, inline tags, checklist lines.
//! - Stay pure: no I/O, no logging beyond debug diagnostics.
//!
//! # Invariants
//! - Heading/link/tag scanners are fed the body only, never the frontmatter.

pub mod checklist;
pub mod frontmatter;
pub mod heading;
pub mod link;
pub mod summary;
pub mod tag;

use crate::model::note::NoteMetadata;

const FRONTMATTER_TAGS_KEY: &str = "tags";

/// Extracts headings, links, tags and frontmatter from one note.
///
/// Frontmatter tags come first in declared order, then inline `#tags` in
/// body order. Malformed frontmatter degrades to an empty mapping.
pub fn extract_metadata(content: &str) -> NoteMetadata {
    let (block, body) = frontmatter::split_frontmatter(content);
    let frontmatter = block.map(frontmatter::parse_block).unwrap_or_default();

    let mut tags = frontmatter::string_list(&frontmatter, FRONTMATTER_TAGS_KEY);
    tags.extend(tag::extract_inline_tags(body));

    NoteMetadata {
        headings: heading::extract_headings(body),
        outgoing_links: link::extract_links(body),
        tags,
        frontmatter,
    }
}

/// One line of a document with its byte span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LineSpan<'a> {
    /// Line text without the trailing `\n` / `\r\n`.
    pub text: &'a str,
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset just past the line terminator.
    pub end: usize,
}

/// Iterates lines of `content` keeping byte offsets.
pub(crate) fn line_spans(content: &str) -> impl Iterator<Item = LineSpan<'_>> {
    let mut offset = 0;
    content.split_inclusive('\n').map(move |raw| {
        let start = offset;
        offset += raw.len();
        let text = raw
            .strip_suffix('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .unwrap_or(raw);
        LineSpan {
            text,
            start,
            end: offset,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::{extract_metadata, line_spans};
    use serde_json::json;

    #[test]
    fn frontmatter_tags_precede_inline_tags() {
        let meta = extract_metadata(
            "---\ntags:\n  - frontmatter\n---\n# Title\n\nSome text #inline-tag and #another",
        );
        assert_eq!(meta.tags, vec!["frontmatter", "#inline-tag", "#another"]);
        assert_eq!(meta.headings, vec!["Title"]);
    }

    #[test]
    fn frontmatter_lines_never_become_headings_or_tags() {
        let meta = extract_metadata("---\n# not a heading: true\ntitle: Test\n---\n# Real Heading\n");
        assert_eq!(meta.headings, vec!["Real Heading"]);
        assert_eq!(meta.frontmatter.get("title"), Some(&json!("Test")));
        assert!(meta.tags.is_empty());
    }

    #[test]
    fn note_without_frontmatter_has_empty_mapping() {
        let meta = extract_metadata("# No frontmatter\n\nJust content [x](a.md) [[b|B]]");
        assert!(meta.frontmatter.is_empty());
        assert_eq!(meta.outgoing_links, vec!["a.md", "b"]);
        assert!(meta.tags.is_empty());
    }

    #[test]
    fn malformed_frontmatter_is_still_stripped_from_body() {
        let meta = extract_metadata("---\ntags: [broken\n---\n## Body #tag");
        assert!(meta.frontmatter.is_empty());
        assert_eq!(meta.headings, vec!["Body #tag"]);
        assert_eq!(meta.tags, vec!["#tag"]);
    }

    #[test]
    fn line_spans_track_offsets_and_strip_terminators() {
        let spans: Vec<_> = line_spans("a\r\nbc\nd").collect();
        assert_eq!(spans.len(), 3);
        assert_eq!(spans[0].text, "a");
        assert_eq!((spans[0].start, spans[0].end), (0, 3));
        assert_eq!(spans[1].text, "bc");
        assert_eq!(spans[2].text, "d");
        assert_eq!(spans[2].end, 8);
    }
}

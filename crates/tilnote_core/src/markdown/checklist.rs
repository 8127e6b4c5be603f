//! Checklist lines: `- [ ] [name](path)` and bare checkbox markers.

use crate::model::backlog::BacklogProgress;
use once_cell::sync::Lazy;
use regex::Regex;

static CHECKLIST_LINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^-\s+\[([ xX])\]\s+\[([^\[\]]*)\]\(([^()]+)\)").expect("valid checklist regex")
});

const OPEN_MARKER: &str = "- [ ]";
const DONE_MARKER_LOWER: &str = "- [x]";
const DONE_MARKER_UPPER: &str = "- [X]";

/// One checklist line that links to a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChecklistLink<'a> {
    /// Checkbox ticked (`x` or `X`).
    pub done: bool,
    /// Link text, trimmed; may be empty.
    pub display_name: &'a str,
    /// Link target, trimmed.
    pub target: &'a str,
}

/// Parses `- [state] [name](target)` at the start of `line`.
///
/// Trailing text after the link is ignored.
pub fn parse_checklist_link(line: &str) -> Option<ChecklistLink<'_>> {
    let caps = CHECKLIST_LINK_RE.captures(line)?;
    let state = caps.get(1)?.as_str();
    Some(ChecklistLink {
        done: state != " ",
        display_name: caps.get(2).map(|m| m.as_str().trim()).unwrap_or(""),
        target: caps.get(3)?.as_str().trim(),
    })
}

/// Counts done (`- [x]`, `- [X]`) and open (`- [ ]`) markers anywhere.
pub fn count_markers(content: &str) -> BacklogProgress {
    BacklogProgress {
        done: content.matches(DONE_MARKER_LOWER).count()
            + content.matches(DONE_MARKER_UPPER).count(),
        todo: content.matches(OPEN_MARKER).count(),
    }
}

#[cfg(test)]
mod tests {
    use super::{count_markers, parse_checklist_link, ChecklistLink};

    #[test]
    fn parses_open_and_done_items() {
        assert_eq!(
            parse_checklist_link("- [ ] [Generics](til/ts/generics.md)"),
            Some(ChecklistLink {
                done: false,
                display_name: "Generics",
                target: "til/ts/generics.md",
            })
        );
        assert!(parse_checklist_link("- [X] [Done](a.md)").unwrap().done);
        assert!(parse_checklist_link("- [x] [Done](a.md)").unwrap().done);
    }

    #[test]
    fn ignores_trailing_description_and_allows_empty_name() {
        let item = parse_checklist_link("- [ ] [](til/go/chan.md) - channel basics").unwrap();
        assert_eq!(item.display_name, "");
        assert_eq!(item.target, "til/go/chan.md");
    }

    #[test]
    fn rejects_non_item_lines() {
        assert_eq!(parse_checklist_link("- [ ] plain todo"), None);
        assert_eq!(parse_checklist_link("  - [ ] [x](a.md)"), None);
        assert_eq!(parse_checklist_link("- [-] [x](a.md)"), None);
    }

    #[test]
    fn counts_markers_case_insensitively() {
        let progress = count_markers("# Backlog\n- [x] a\n- [ ] b\n- [X] c\n- [ ] d\n");
        assert_eq!(progress.done, 2);
        assert_eq!(progress.todo, 2);
    }

    #[test]
    fn content_without_checklists_counts_zero() {
        let progress = count_markers("# Empty backlog\nNo items here.");
        assert_eq!((progress.done, progress.todo), (0, 0));
    }
}

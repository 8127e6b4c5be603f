//! Backlog checklist records.
//!
//! # Invariants
//! - `BacklogItem.done` mirrors the checkbox marker (`x`/`X` done, space open).
//! - `BacklogSection.items` is never empty in parser output.

use serde::{Deserialize, Serialize};

/// One checklist entry that links to a planned note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BacklogItem {
    /// Linked note path.
    pub path: String,
    /// Link text, or the path without `.md` when the text is blank.
    pub display_name: String,
    /// Whether the checkbox is ticked.
    pub done: bool,
    /// Source URLs mapped from the backlog frontmatter `sources` table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_urls: Option<Vec<String>>,
}

/// Items grouped under one `## heading`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BacklogSection {
    pub heading: String,
    pub items: Vec<BacklogItem>,
}

/// Checkbox counts for one backlog file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BacklogProgress {
    pub done: usize,
    pub todo: usize,
}

impl BacklogProgress {
    /// Total number of checklist markers.
    pub fn total(self) -> usize {
        self.done + self.todo
    }
}

/// Progress of one category's `backlog.md`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BacklogCategoryStatus {
    /// Category folder name.
    pub category: String,
    /// Path of the backlog file.
    pub file_path: String,
    pub done: usize,
    pub total: usize,
}

impl BacklogCategoryStatus {
    /// Completion fraction in `[0, 1]`; zero when `total == 0`.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.done as f64 / self.total as f64
        }
    }

    /// Completion rounded to a whole percentage.
    pub fn percent(&self) -> u32 {
        percent(self.done, self.total)
    }
}

/// Rounds `done / total` to a whole percentage; zero when `total == 0`.
pub fn percent(done: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (done as f64 / total as f64 * 100.0).round() as u32
}

//! Note snapshot records.
//!
//! # Responsibility
//! - Describe one listed file (`FileEntry`) and one parsed note (`NoteMetadata`).
//!
//! # Invariants
//! - `FileEntry.mtime`/`ctime` are Unix epoch milliseconds.
//! - `NoteMetadata.frontmatter` is empty when the block is absent or malformed.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Parsed frontmatter key/value mapping.
pub type Frontmatter = Map<String, Value>;

/// One file returned by a storage listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Slash-separated path relative to the vault base.
    pub path: String,
    /// Extension without the leading dot (`md`), empty when absent.
    pub extension: String,
    /// File name including extension (`generics.md`).
    pub name: String,
    /// Last modification time in epoch milliseconds.
    pub mtime: i64,
    /// Creation (or status change) time in epoch milliseconds.
    pub ctime: i64,
}

impl FileEntry {
    /// Builds an entry from a relative path, deriving `name` and `extension`.
    pub fn from_path(path: impl Into<String>, mtime: i64, ctime: i64) -> Self {
        let path = path.into();
        let name = path.rsplit('/').next().unwrap_or(path.as_str()).to_string();
        let extension = extension_of(&name).to_string();
        Self {
            path,
            extension,
            name,
            mtime,
            ctime,
        }
    }

    /// Returns whether this entry is a markdown note.
    pub fn is_markdown(&self) -> bool {
        self.extension == "md"
    }

    /// Returns whether this entry is a `backlog.md` checklist file.
    pub fn is_backlog(&self) -> bool {
        self.name == BACKLOG_FILE_NAME
    }
}

/// Reserved file name for per-category backlog checklists.
pub const BACKLOG_FILE_NAME: &str = "backlog.md";

/// Structured metadata extracted from one note.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoteMetadata {
    /// Heading texts in document order, body only.
    pub headings: Vec<String>,
    /// Raw link targets, alias text stripped.
    pub outgoing_links: Vec<String>,
    /// Frontmatter tags (no `#`) followed by inline `#tags`.
    pub tags: Vec<String>,
    /// Parsed frontmatter mapping.
    pub frontmatter: Frontmatter,
}

fn extension_of(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) => &name[idx + 1..],
        None => "",
    }
}

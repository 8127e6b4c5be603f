//! Storage port and link-graph capability contracts.
//!
//! # Responsibility
//! - Define the uniform read/list/exists/write/remove surface over a rooted
//!   note tree (`FileStorage`).
//! - Define per-note metadata and link-graph accessors that a backend
//!   either computes (filesystem) or supplies pre-built (host cache).
//!
//! # Invariants
//! - Read-type operations never fail: not-found, unreadable and
//!   out-of-root paths all read as absent.
//! - Write-type operations reject out-of-root paths with
//!   `StoreError::PathTraversal` before touching anything.
//! - Link-graph accessors on backends without an index return empty maps;
//!   callers cannot tell "unsupported" from "no links".

use crate::model::link_graph::LinkMap;
use crate::model::note::{FileEntry, NoteMetadata};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod backend;
pub mod fs_store;
pub mod host_store;
pub mod link_index;

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage-layer error for write-type operations.
#[derive(Debug)]
pub enum StoreError {
    /// Requested path resolves outside the configured root.
    PathTraversal(String),
    /// Underlying I/O failure.
    Io {
        path: String,
        source: std::io::Error,
    },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PathTraversal(path) => write!(f, "path traversal denied: {path}"),
            Self::Io { path, source } => write!(f, "i/o failure at `{path}`: {source}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::PathTraversal(_) => None,
            Self::Io { source, .. } => Some(source),
        }
    }
}

/// Uniform file access over a rooted note tree.
pub trait FileStorage: Send + Sync {
    /// Reads one file; `None` when absent, unreadable or outside the root.
    fn read_file(&self, path: &str) -> Option<String>;
    /// Lists every visible file; hidden (`.`-prefixed) directories are skipped.
    fn list_files(&self) -> Vec<FileEntry>;
    /// Returns whether a file or directory exists inside the root.
    fn exists(&self, path: &str) -> bool;
    /// Writes one file, creating parent directories as needed.
    fn write_file(&self, path: &str, content: &str) -> StoreResult<()>;
    /// Creates a directory and its parents.
    fn mkdir(&self, path: &str) -> StoreResult<()>;
    /// Removes one file; removing a missing file succeeds.
    fn remove_file(&self, path: &str) -> StoreResult<()>;
}

/// Per-note structured metadata.
pub trait MetadataProvider: Send + Sync {
    /// Returns metadata for one note; `None` when the note is absent.
    fn file_metadata(&self, path: &str) -> Option<NoteMetadata>;
}

/// Cross-note link relationships and editor focus.
pub trait LinkGraphAccessor: Send + Sync {
    /// `source -> (target path -> count)` for links that resolve to notes.
    fn resolved_links(&self) -> LinkMap;
    /// `source -> (link name -> count)` for links without a target note.
    fn unresolved_links(&self) -> LinkMap;
    /// Currently focused note, when the backend has an editor context.
    fn active_note_path(&self) -> Option<String>;
}

//! Host-maintained backend.
//!
//! # Responsibility
//! - Hold the live snapshot a host application pushes in: file contents,
//!   timestamps, its metadata cache, its link tables and editor focus.
//! - Serve that snapshot through the same capability traits as the
//!   filesystem backend.
//!
//! # Invariants
//! - Paths are vault-relative; `..`, `.` and absolute forms are rejected on
//!   write and read as absent.
//! - Writes through the storage port drop the cached metadata of the
//!   written note so it is re-derived from content.
//! - The link graph is whatever the host last supplied; it is never
//!   recomputed here.

use super::{FileStorage, LinkGraphAccessor, MetadataProvider, StoreError, StoreResult};
use crate::markdown::extract_metadata;
use crate::model::link_graph::{LinkGraph, LinkMap};
use crate::model::note::{FileEntry, NoteMetadata};
use chrono::Utc;
use log::warn;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Clone)]
struct HostFile {
    content: String,
    mtime: i64,
    ctime: i64,
    cached: Option<NoteMetadata>,
}

#[derive(Debug, Default)]
struct HostState {
    files: BTreeMap<String, HostFile>,
    dirs: BTreeSet<String>,
    links: LinkGraph,
    active_note: Option<String>,
}

/// In-memory snapshot of a host application's vault.
#[derive(Debug, Default)]
pub struct HostVault {
    state: RwLock<HostState>,
}

impl HostVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces one file with explicit timestamps (epoch ms).
    pub fn upsert_file(&self, path: &str, content: impl Into<String>, mtime: i64, ctime: i64) {
        let Some(path) = normalize_path(path) else {
            warn!("event=host_upsert module=store status=denied backend=host");
            return;
        };
        self.write().files.insert(
            path,
            HostFile {
                content: content.into(),
                mtime,
                ctime,
                cached: None,
            },
        );
    }

    /// Stores the host's precomputed metadata for one existing note.
    ///
    /// Returns `false` when the note is unknown.
    pub fn set_cached_metadata(&self, path: &str, metadata: NoteMetadata) -> bool {
        let Some(path) = normalize_path(path) else {
            return false;
        };
        match self.write().files.get_mut(&path) {
            Some(file) => {
                file.cached = Some(metadata);
                true
            }
            None => false,
        }
    }

    /// Replaces the host-maintained link tables.
    pub fn set_link_graph(&self, links: LinkGraph) {
        self.write().links = links;
    }

    /// Sets or clears the focused note.
    pub fn set_active_note(&self, path: Option<&str>) {
        self.write().active_note = path.and_then(normalize_path);
    }

    fn read(&self) -> RwLockReadGuard<'_, HostState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HostState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl FileStorage for HostVault {
    fn read_file(&self, path: &str) -> Option<String> {
        let path = normalize_path(path)?;
        self.read().files.get(&path).map(|file| file.content.clone())
    }

    fn list_files(&self) -> Vec<FileEntry> {
        self.read()
            .files
            .iter()
            .filter(|(path, _)| !has_hidden_dir(path))
            .map(|(path, file)| FileEntry::from_path(path.clone(), file.mtime, file.ctime))
            .collect()
    }

    fn exists(&self, path: &str) -> bool {
        let Some(path) = normalize_path(path) else {
            return false;
        };
        let state = self.read();
        if state.files.contains_key(&path) || state.dirs.contains(&path) {
            return true;
        }
        let prefix = format!("{path}/");
        state.files.keys().any(|file| file.starts_with(&prefix))
            || state.dirs.iter().any(|dir| dir.starts_with(&prefix))
    }

    fn write_file(&self, path: &str, content: &str) -> StoreResult<()> {
        let path = require_path(path)?;
        let now = Utc::now().timestamp_millis();
        let mut state = self.write();
        let file = state.files.entry(path).or_insert_with(|| HostFile {
            content: String::new(),
            mtime: now,
            ctime: now,
            cached: None,
        });
        file.content = content.to_string();
        file.mtime = now;
        file.cached = None;
        Ok(())
    }

    fn mkdir(&self, path: &str) -> StoreResult<()> {
        let path = require_path(path)?;
        self.write().dirs.insert(path);
        Ok(())
    }

    fn remove_file(&self, path: &str) -> StoreResult<()> {
        let path = require_path(path)?;
        self.write().files.remove(&path);
        Ok(())
    }
}

impl MetadataProvider for HostVault {
    fn file_metadata(&self, path: &str) -> Option<NoteMetadata> {
        let path = normalize_path(path)?;
        let state = self.read();
        let file = state.files.get(&path)?;
        Some(
            file.cached
                .clone()
                .unwrap_or_else(|| extract_metadata(&file.content)),
        )
    }
}

impl LinkGraphAccessor for HostVault {
    fn resolved_links(&self) -> LinkMap {
        self.read().links.resolved.clone()
    }

    fn unresolved_links(&self) -> LinkMap {
        self.read().links.unresolved.clone()
    }

    fn active_note_path(&self) -> Option<String> {
        let state = self.read();
        state
            .active_note
            .clone()
            .filter(|path| state.files.contains_key(path))
    }
}

fn normalize_path(path: &str) -> Option<String> {
    let trimmed = path.trim();
    if trimmed.is_empty() || trimmed.starts_with('/') || trimmed.contains('\\') {
        return None;
    }
    let mut parts = Vec::new();
    for part in trimmed.split('/') {
        match part {
            "" | "." => continue,
            ".." => return None,
            other => parts.push(other),
        }
    }
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("/"))
}

fn require_path(path: &str) -> StoreResult<String> {
    normalize_path(path).ok_or_else(|| {
        warn!("event=path_traversal module=store status=denied backend=host");
        StoreError::PathTraversal(path.to_string())
    })
}

fn has_hidden_dir(path: &str) -> bool {
    let mut segments: Vec<&str> = path.split('/').collect();
    segments.pop();
    segments.iter().any(|segment| segment.starts_with('.'))
}

#[cfg(test)]
mod tests {
    use super::{has_hidden_dir, normalize_path};

    #[test]
    fn normalize_path_rejects_escapes() {
        assert_eq!(normalize_path("../x"), None);
        assert_eq!(normalize_path("/etc/passwd"), None);
        assert_eq!(normalize_path("a/../../b"), None);
        assert_eq!(normalize_path("./til//go/a.md"), Some("til/go/a.md".to_string()));
    }

    #[test]
    fn hidden_directories_are_detected() {
        assert!(has_hidden_dir(".obsidian/app.json"));
        assert!(has_hidden_dir("til/.drafts/a.md"));
        assert!(!has_hidden_dir("til/go/a.md"));
    }
}

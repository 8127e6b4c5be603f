//! Filesystem backend rooted at a base directory.
//!
//! # Responsibility
//! - Implement `FileStorage` over `std::fs` with path confinement.
//! - Compute note metadata from raw bytes (`FsMetadata`).
//!
//! # Invariants
//! - Every path is resolved against the base and rejected when the result
//!   leaves it; absolute inputs are always rejected.
//! - The deepest existing ancestor of a resolved path must canonicalize
//!   under the base, so symlinks pointing outside the root are denied for
//!   reads and writes alike; dangling symlinks are denied too.
//! - Listing never follows symlinks.
//! - No link graph is computed here; see `link_index` for the scanning
//!   variant.

use super::{FileStorage, LinkGraphAccessor, MetadataProvider, StoreError, StoreResult};
use crate::markdown::extract_metadata;
use crate::model::link_graph::LinkMap;
use crate::model::note::{FileEntry, NoteMetadata};
use log::{debug, warn};
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use walkdir::WalkDir;

/// `std::fs` storage confined to one base directory.
#[derive(Debug, Clone)]
pub struct FsStorage {
    base_path: PathBuf,
    resolved_base: PathBuf,
}

impl FsStorage {
    /// Creates storage rooted at `base_path`.
    ///
    /// The directory does not need to exist yet; it is created lazily by
    /// write operations.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        let base_path = base_path.into();
        let resolved_base = resolve_base(&base_path);
        Self {
            base_path,
            resolved_base,
        }
    }

    /// Returns the base directory as given at construction.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Resolves `path` inside the root, or `None` when it escapes.
    fn resolve_safe(&self, path: &str) -> Option<PathBuf> {
        let resolved = self.resolve_lexical(path)?;
        if self.is_physically_inside(&resolved) {
            Some(resolved)
        } else {
            debug!("event=path_resolve module=store status=denied backend=fs reason=symlink_escape");
            None
        }
    }

    fn resolve_lexical(&self, path: &str) -> Option<PathBuf> {
        let mut resolved = self.resolved_base.clone();
        for component in Path::new(path).components() {
            match component {
                Component::CurDir => {}
                Component::Normal(part) => resolved.push(part),
                Component::ParentDir => {
                    if !resolved.pop() {
                        return None;
                    }
                }
                Component::RootDir | Component::Prefix(_) => return None,
            }
        }

        if resolved.starts_with(&self.resolved_base) {
            Some(resolved)
        } else {
            None
        }
    }

    /// Follows symlinks on the deepest existing ancestor of `resolved`.
    ///
    /// Ancestors above the base mean nothing below it exists yet, so there is
    /// no link to follow.
    fn is_physically_inside(&self, resolved: &Path) -> bool {
        let base = fs::canonicalize(&self.resolved_base)
            .unwrap_or_else(|_| self.resolved_base.clone());
        let mut current = Some(resolved);
        while let Some(candidate) = current {
            if !candidate.starts_with(&self.resolved_base) {
                return true;
            }
            match fs::canonicalize(candidate) {
                Ok(real) => return real.starts_with(&base),
                // Present but unresolvable: a dangling or looping symlink.
                Err(_) if fs::symlink_metadata(candidate).is_ok() => return false,
                Err(_) => current = candidate.parent(),
            }
        }
        false
    }

    fn require_safe(&self, path: &str) -> StoreResult<PathBuf> {
        self.resolve_safe(path).ok_or_else(|| {
            warn!("event=path_traversal module=store status=denied backend=fs");
            StoreError::PathTraversal(path.to_string())
        })
    }

    fn entry_for(&self, absolute: &Path) -> Option<FileEntry> {
        let relative = absolute.strip_prefix(&self.resolved_base).ok()?;
        let relative = relative
            .components()
            .map(|part| part.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        let metadata = fs::metadata(absolute).ok()?;
        let mtime = metadata.modified().ok().map(epoch_millis).unwrap_or(0);
        let ctime = metadata.created().ok().map(epoch_millis).unwrap_or(mtime);
        Some(FileEntry::from_path(relative, mtime, ctime))
    }
}

impl FileStorage for FsStorage {
    fn read_file(&self, path: &str) -> Option<String> {
        let resolved = self.resolve_safe(path)?;
        match fs::read_to_string(&resolved) {
            Ok(content) => Some(content),
            Err(err) if err.kind() == ErrorKind::NotFound => None,
            Err(err) => {
                debug!(
                    "event=read_file module=store status=absent backend=fs kind={:?}",
                    err.kind()
                );
                None
            }
        }
    }

    fn list_files(&self) -> Vec<FileEntry> {
        let walker = WalkDir::new(&self.resolved_base)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !(entry.file_type().is_dir() && is_hidden(entry.file_name())));

        let mut entries = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    debug!(
                        "event=list_files module=store status=skipped backend=fs depth={}",
                        err.depth()
                    );
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(file) = self.entry_for(entry.path()) {
                entries.push(file);
            }
        }
        entries
    }

    fn exists(&self, path: &str) -> bool {
        self.resolve_safe(path)
            .map(|resolved| resolved.exists())
            .unwrap_or(false)
    }

    fn write_file(&self, path: &str, content: &str) -> StoreResult<()> {
        let resolved = self.require_safe(path)?;
        if let Some(parent) = resolved.parent() {
            fs::create_dir_all(parent).map_err(|source| io_error(path, source))?;
        }
        fs::write(&resolved, content).map_err(|source| io_error(path, source))
    }

    fn mkdir(&self, path: &str) -> StoreResult<()> {
        let resolved = self.require_safe(path)?;
        fs::create_dir_all(&resolved).map_err(|source| io_error(path, source))
    }

    fn remove_file(&self, path: &str) -> StoreResult<()> {
        let resolved = self.require_safe(path)?;
        match fs::remove_file(&resolved) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(io_error(path, source)),
        }
    }
}

/// Metadata computed from raw file content; no link graph.
#[derive(Debug, Clone)]
pub struct FsMetadata {
    storage: FsStorage,
}

impl FsMetadata {
    pub fn new(storage: FsStorage) -> Self {
        Self { storage }
    }
}

impl MetadataProvider for FsMetadata {
    fn file_metadata(&self, path: &str) -> Option<NoteMetadata> {
        self.storage
            .read_file(path)
            .map(|content| extract_metadata(&content))
    }
}

impl LinkGraphAccessor for FsMetadata {
    // Without a persistent index the filesystem backend reports no links.
    fn resolved_links(&self) -> LinkMap {
        LinkMap::new()
    }

    fn unresolved_links(&self) -> LinkMap {
        LinkMap::new()
    }

    fn active_note_path(&self) -> Option<String> {
        None
    }
}

fn resolve_base(base: &Path) -> PathBuf {
    if let Ok(canonical) = fs::canonicalize(base) {
        return canonical;
    }
    if base.is_absolute() {
        return base.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(base))
        .unwrap_or_else(|_| base.to_path_buf())
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

fn epoch_millis(time: SystemTime) -> i64 {
    time.duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}

fn io_error(path: &str, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.to_string(),
        source,
    }
}

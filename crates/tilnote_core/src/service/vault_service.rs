//! Plain vault queries used by tool handlers.
//!
//! # Invariants
//! - Every query degrades to an empty result; nothing here fails.
//! - Result order follows storage listing order unless stated.

use crate::config::TilRoot;
use crate::model::note::FileEntry;
use crate::model::topic::extract_category;
use crate::store::backend::VaultBackend;
use log::debug;
use serde::Serialize;

const SNIPPET_MAX_CHARS: usize = 120;

/// One note containing a search query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub path: String,
    /// First matching line, trimmed and shortened.
    pub snippet: String,
}

/// Notes of one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryListing {
    pub category: String,
    pub paths: Vec<String>,
}

/// The host's focused note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveNote {
    pub path: String,
    pub content: String,
}

pub struct VaultService {
    backend: VaultBackend,
    root: TilRoot,
}

impl VaultService {
    pub fn new(backend: VaultBackend, root: TilRoot) -> Self {
        Self { backend, root }
    }

    pub fn read_note(&self, path: &str) -> Option<String> {
        self.backend.storage().read_file(path)
    }

    /// Lists files, optionally restricted to a folder and an extension.
    ///
    /// The extension may be given with or without its leading dot.
    pub fn list_files(&self, folder: Option<&str>, extension: Option<&str>) -> Vec<FileEntry> {
        let folder = folder
            .map(|value| value.trim().trim_matches('/'))
            .filter(|value| !value.is_empty())
            .map(|value| format!("{value}/"));
        let extension = extension
            .map(|value| value.trim().trim_start_matches('.'))
            .filter(|value| !value.is_empty());

        self.backend
            .storage()
            .list_files()
            .into_iter()
            .filter(|file| folder.as_deref().map_or(true, |prefix| file.path.starts_with(prefix)))
            .filter(|file| extension.map_or(true, |ext| file.extension.eq_ignore_ascii_case(ext)))
            .collect()
    }

    /// Case-insensitive substring search over markdown content.
    pub fn search_notes(&self, query: &str, limit: usize) -> Vec<SearchHit> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() || limit == 0 {
            return Vec::new();
        }

        let mut hits = Vec::new();
        for file in self.backend.storage().list_files() {
            if !file.is_markdown() {
                continue;
            }
            let Some(content) = self.backend.storage().read_file(&file.path) else {
                continue;
            };
            let Some(line) = content
                .lines()
                .find(|line| line.to_lowercase().contains(&needle))
            else {
                continue;
            };
            hits.push(SearchHit {
                path: file.path,
                snippet: shorten(line.trim()),
            });
            if hits.len() >= limit {
                break;
            }
        }
        debug!(
            "event=search_notes module=vault status=ok hits={} limit={}",
            hits.len(),
            limit
        );
        hits
    }

    /// Notes under the root grouped by category, in first-seen order.
    pub fn list_notes_by_category(&self, category: Option<&str>) -> Vec<CategoryListing> {
        let filter = category.map(str::trim).filter(|value| !value.is_empty());
        let mut listings: Vec<CategoryListing> = Vec::new();

        for file in self.backend.storage().list_files() {
            if !file.is_markdown() || file.is_backlog() || !self.root.contains(&file.path) {
                continue;
            }
            let name = extract_category(&file.path, self.root.as_str());
            if filter.is_some_and(|wanted| wanted != name) {
                continue;
            }
            match listings.iter_mut().find(|listing| listing.category == name) {
                Some(listing) => listing.paths.push(file.path),
                None => listings.push(CategoryListing {
                    category: name,
                    paths: vec![file.path],
                }),
            }
        }
        listings
    }

    /// Path and content of the focused note, when the backend tracks one.
    pub fn active_note(&self) -> Option<ActiveNote> {
        let path = self.backend.links().active_note_path()?;
        let content = self.backend.storage().read_file(&path)?;
        Some(ActiveNote { path, content })
    }
}

fn shorten(line: &str) -> String {
    if line.chars().count() <= SNIPPET_MAX_CHARS {
        return line.to_string();
    }
    let cut: String = line.chars().take(SNIPPET_MAX_CHARS).collect();
    format!("{cut}...")
}

#[cfg(test)]
mod tests {
    use super::shorten;

    #[test]
    fn shorten_keeps_short_lines() {
        assert_eq!(shorten("hello"), "hello");
        let long = "é".repeat(130);
        let short = shorten(&long);
        assert_eq!(short.chars().count(), 123);
        assert!(short.ends_with("..."));
    }
}

//! Link graph computed by scanning every note.
//!
//! # Responsibility
//! - Extract links from all markdown notes and match each target against
//!   the current listing, producing resolved/unresolved tables on demand.
//!
//! # Invariants
//! - Nothing is cached: every accessor call rescans the tree.
//! - External URLs (`scheme://`, `mailto:`) and pure `#anchor` links are
//!   neither resolved nor unresolved.
//! - Target matching order: vault path, path relative to the source
//!   folder (markdown links only), then first note with the same file stem.

use super::{FileStorage, LinkGraphAccessor};
use crate::markdown::frontmatter::strip_frontmatter;
use crate::markdown::link::{markdown_link_targets, wikilink_targets};
use crate::model::link_graph::{LinkGraph, LinkMap};
use crate::model::note::FileEntry;
use log::debug;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// Scans `storage` and builds both link tables.
pub fn scan_link_graph(storage: &dyn FileStorage) -> LinkGraph {
    let notes: Vec<FileEntry> = storage
        .list_files()
        .into_iter()
        .filter(FileEntry::is_markdown)
        .collect();
    let index = NoteIndex::new(&notes);

    let mut graph = LinkGraph::default();
    for note in &notes {
        let Some(content) = storage.read_file(&note.path) else {
            continue;
        };
        let body = strip_frontmatter(&content);
        let source_dir = parent_dir(&note.path);

        for target in markdown_link_targets(body) {
            record(&mut graph, &index, &note.path, &target, Some(source_dir));
        }
        for target in wikilink_targets(body) {
            record(&mut graph, &index, &note.path, &target, None);
        }
    }

    debug!(
        "event=link_scan module=store status=ok notes={} resolved_sources={} unresolved_sources={}",
        notes.len(),
        graph.resolved.len(),
        graph.unresolved.len()
    );
    graph
}

/// Link-graph accessor that rescans a storage backend on every call.
pub struct ScannedLinkGraph {
    storage: Arc<dyn FileStorage>,
}

impl ScannedLinkGraph {
    pub fn new(storage: Arc<dyn FileStorage>) -> Self {
        Self { storage }
    }
}

impl LinkGraphAccessor for ScannedLinkGraph {
    fn resolved_links(&self) -> LinkMap {
        scan_link_graph(self.storage.as_ref()).resolved
    }

    fn unresolved_links(&self) -> LinkMap {
        scan_link_graph(self.storage.as_ref()).unresolved
    }

    fn active_note_path(&self) -> Option<String> {
        None
    }
}

struct NoteIndex<'a> {
    paths: BTreeSet<&'a str>,
    by_stem: HashMap<&'a str, &'a str>,
}

impl<'a> NoteIndex<'a> {
    fn new(notes: &'a [FileEntry]) -> Self {
        let mut paths = BTreeSet::new();
        let mut by_stem = HashMap::new();
        for note in notes {
            paths.insert(note.path.as_str());
            let stem = note.name.strip_suffix(".md").unwrap_or(note.name.as_str());
            by_stem.entry(stem).or_insert(note.path.as_str());
        }
        Self { paths, by_stem }
    }

    fn resolve(&self, target: &str, source_dir: Option<&str>) -> Option<String> {
        let direct = normalize_target(target)?;
        if let Some(found) = self.lookup_path(&direct) {
            return Some(found);
        }
        if let Some(dir) = source_dir.filter(|dir| !dir.is_empty()) {
            if let Some(relative) = normalize_target(&format!("{dir}/{target}")) {
                if let Some(found) = self.lookup_path(&relative) {
                    return Some(found);
                }
            }
        }
        let stem = direct.rsplit('/').next().unwrap_or(direct.as_str());
        let stem = stem.strip_suffix(".md").unwrap_or(stem);
        self.by_stem.get(stem).map(|path| path.to_string())
    }

    fn lookup_path(&self, candidate: &str) -> Option<String> {
        if self.paths.contains(candidate) {
            return Some(candidate.to_string());
        }
        let with_ext = format!("{candidate}.md");
        self.paths
            .contains(with_ext.as_str())
            .then_some(with_ext)
    }
}

fn record(
    graph: &mut LinkGraph,
    index: &NoteIndex<'_>,
    source: &str,
    raw_target: &str,
    source_dir: Option<&str>,
) {
    let target = raw_target.split('#').next().unwrap_or("").trim();
    if target.is_empty() || is_external(target) {
        return;
    }
    match index.resolve(target, source_dir) {
        Some(path) => graph.add_resolved(source, &path),
        None => graph.add_unresolved(source, target),
    }
}

fn is_external(target: &str) -> bool {
    target.contains("://") || target.starts_with("mailto:")
}

fn parent_dir(path: &str) -> &str {
    path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

/// Collapses `.`/`..` segments; `None` when the target climbs above the vault.
fn normalize_target(target: &str) -> Option<String> {
    let mut parts: Vec<&str> = Vec::new();
    for part in target.trim_start_matches('/').split('/') {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            other => parts.push(other),
        }
    }
    (!parts.is_empty()).then(|| parts.join("/"))
}

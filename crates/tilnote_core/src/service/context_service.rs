//! Topic context queries.
//!
//! # Responsibility
//! - Find notes related to a free-text topic by path, then by content.
//! - Enrich each match with headings, links, tags and backlinks.
//! - Collect unresolved link names that mention the topic.
//!
//! # Invariants
//! - Path matches precede content matches; each list keeps listing order.
//! - A note appears at most once.
//! - `backlog.md` files and notes outside the root never match.
//! - Notes that disappear between listing and reading are skipped.
//! - A blank topic matches nothing.

use crate::config::TilRoot;
use crate::model::link_graph::backlinks_to;
use crate::model::note::FileEntry;
use crate::store::backend::VaultBackend;
use log::{debug, info};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt::Write;

/// How a note was matched to the topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Path,
    Content,
}

impl MatchKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Path => "path match",
            Self::Content => "content match",
        }
    }
}

/// One matched note with its structural metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchedNote {
    pub path: String,
    pub match_kind: MatchKind,
    pub headings: Vec<String>,
    pub outgoing_links: Vec<String>,
    pub tags: Vec<String>,
    /// Notes whose resolved links target this note.
    pub backlinks: Vec<String>,
}

/// An unresolved link whose name contains the topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedMention {
    pub source_path: String,
    pub link_name: String,
}

/// Result of one topic query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicContext {
    pub topic: String,
    pub matched_notes: Vec<MatchedNote>,
    pub unresolved_mentions: Vec<UnresolvedMention>,
}

impl TopicContext {
    /// No existing note relates to the topic.
    pub fn is_new_topic(&self) -> bool {
        self.matched_notes.is_empty()
    }
}

/// Returns notes whose root-relative path contains `topic` (case-insensitive).
pub fn match_by_path<'a>(files: &'a [FileEntry], topic: &str, root: &TilRoot) -> Vec<&'a FileEntry> {
    let needle = topic.to_lowercase();
    files
        .iter()
        .filter(|file| file.is_markdown() && !file.is_backlog())
        .filter(|file| {
            root.relative(&file.path)
                .is_some_and(|relative| relative.to_lowercase().contains(&needle))
        })
        .collect()
}

/// Context queries over the vault.
pub struct ContextService {
    backend: VaultBackend,
    root: TilRoot,
}

impl ContextService {
    pub fn new(backend: VaultBackend, root: TilRoot) -> Self {
        Self { backend, root }
    }

    /// Builds the related-notes context for `topic`.
    pub fn build_context(&self, topic: &str) -> TopicContext {
        let topic = topic.trim();
        if topic.is_empty() {
            debug!("event=context_build module=context status=skipped reason=empty_topic");
            return TopicContext {
                topic: String::new(),
                matched_notes: Vec::new(),
                unresolved_mentions: Vec::new(),
            };
        }
        let needle = topic.to_lowercase();
        let files = self.backend.storage().list_files();

        let mut candidates: Vec<(&FileEntry, MatchKind)> = Vec::new();
        let mut seen: BTreeSet<&str> = BTreeSet::new();
        for file in match_by_path(&files, topic, &self.root) {
            seen.insert(file.path.as_str());
            candidates.push((file, MatchKind::Path));
        }

        let mut content_matches = 0usize;
        for file in files.iter().filter(|file| {
            file.is_markdown()
                && !file.is_backlog()
                && self.root.contains(&file.path)
                && !seen.contains(file.path.as_str())
        }) {
            let Some(content) = self.backend.storage().read_file(&file.path) else {
                continue;
            };
            if content.to_lowercase().contains(&needle) {
                content_matches += 1;
                candidates.push((file, MatchKind::Content));
            }
        }

        let resolved = self.backend.links().resolved_links();
        let matched_notes: Vec<MatchedNote> = candidates
            .into_iter()
            .filter_map(|(file, match_kind)| {
                let metadata = self.backend.metadata().file_metadata(&file.path)?;
                Some(MatchedNote {
                    backlinks: backlinks_to(&resolved, &file.path),
                    path: file.path.clone(),
                    match_kind,
                    headings: metadata.headings,
                    outgoing_links: metadata.outgoing_links,
                    tags: metadata.tags,
                })
            })
            .collect();

        let unresolved_mentions = self.unresolved_mentions(&needle);
        info!(
            "event=context_build module=context status=ok matched={} content_matches={} unresolved={}",
            matched_notes.len(),
            content_matches,
            unresolved_mentions.len()
        );

        TopicContext {
            topic: topic.to_string(),
            matched_notes,
            unresolved_mentions,
        }
    }

    /// Builds and renders the context report for `topic`.
    pub fn context_report(&self, topic: &str) -> String {
        render_context(&self.build_context(topic))
    }

    fn unresolved_mentions(&self, needle: &str) -> Vec<UnresolvedMention> {
        self.backend
            .links()
            .unresolved_links()
            .into_iter()
            .filter(|(source, _)| self.root.contains(source))
            .flat_map(|(source, names)| {
                names
                    .into_keys()
                    .filter(|name| name.to_lowercase().contains(needle))
                    .map(move |link_name| UnresolvedMention {
                        source_path: source.clone(),
                        link_name,
                    })
                    .collect::<Vec<_>>()
            })
            .collect()
    }
}

/// Renders a context result as markdown.
pub fn render_context(context: &TopicContext) -> String {
    if context.is_new_topic() {
        return format!(
            "\"{}\" is a new topic: no existing notes found.",
            context.topic
        );
    }

    let mut out = format!("## Context for \"{}\"\n", context.topic);
    let _ = write!(out, "\n### Related notes ({})\n", context.matched_notes.len());
    for note in &context.matched_notes {
        let _ = write!(out, "\n#### {} ({})\n", note.path, note.match_kind.as_str());
        write_list(&mut out, "Headings", &note.headings);
        write_list(&mut out, "Links", &note.outgoing_links);
        write_list(&mut out, "Backlinks", &note.backlinks);
        write_list(&mut out, "Tags", &note.tags);
    }

    if !context.unresolved_mentions.is_empty() {
        out.push_str("\n### Unresolved mentions\n");
        for mention in &context.unresolved_mentions {
            let _ = writeln!(out, "- {} → [[{}]]", mention.source_path, mention.link_name);
        }
    }
    out
}

fn write_list(out: &mut String, label: &str, values: &[String]) {
    if !values.is_empty() {
        let _ = writeln!(out, "- {label}: {}", values.join(", "));
    }
}

#[cfg(test)]
mod tests {
    use super::{match_by_path, render_context, MatchKind, MatchedNote, TopicContext};
    use crate::config::TilRoot;
    use crate::model::note::FileEntry;

    #[test]
    fn path_match_is_case_insensitive_and_skips_backlogs() {
        let files = vec![
            FileEntry::from_path("til/react/Hooks.md", 0, 0),
            FileEntry::from_path("til/react/backlog.md", 0, 0),
            FileEntry::from_path("notes/react.md", 0, 0),
            FileEntry::from_path("til/go/intro.md", 0, 0),
        ];
        let matched = match_by_path(&files, "REACT", &TilRoot::default());
        let paths: Vec<&str> = matched.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["til/react/Hooks.md"]);
    }

    #[test]
    fn empty_context_renders_new_topic() {
        let context = TopicContext {
            topic: "golang".to_string(),
            matched_notes: Vec::new(),
            unresolved_mentions: Vec::new(),
        };
        assert!(context.is_new_topic());
        assert!(render_context(&context).contains("new topic"));
    }

    #[test]
    fn report_lists_sections_present() {
        let context = TopicContext {
            topic: "hooks".to_string(),
            matched_notes: vec![MatchedNote {
                path: "til/react/hooks.md".to_string(),
                match_kind: MatchKind::Path,
                headings: vec!["useState".to_string()],
                outgoing_links: Vec::new(),
                tags: vec!["frontend".to_string(), "#react".to_string()],
                backlinks: vec!["til/react/index.md".to_string()],
            }],
            unresolved_mentions: Vec::new(),
        };
        let report = render_context(&context);
        assert!(report.contains("#### til/react/hooks.md (path match)"));
        assert!(report.contains("- Headings: useState"));
        assert!(report.contains("- Tags: frontend, #react"));
        assert!(report.contains("- Backlinks: til/react/index.md"));
        assert!(!report.contains("- Links:"));
        assert!(!report.contains("Unresolved"));
    }
}

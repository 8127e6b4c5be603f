//! Cross-note link relationships.
//!
//! # Invariants
//! - Keys of `resolved`/`unresolved` are paths of notes that exist.
//! - Counts are occurrence totals, never negative.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `source-path -> (target -> count)` mapping.
pub type LinkMap = BTreeMap<String, BTreeMap<String, u32>>;

/// Resolved and unresolved link tables for the whole vault.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkGraph {
    /// Links whose target note exists.
    pub resolved: LinkMap,
    /// Links whose target could not be matched to a note, keyed by link name.
    pub unresolved: LinkMap,
}

impl LinkGraph {
    /// Returns whether neither table has any entry.
    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty() && self.unresolved.is_empty()
    }

    /// Records one resolved occurrence.
    pub fn add_resolved(&mut self, source: &str, target: &str) {
        bump(&mut self.resolved, source, target);
    }

    /// Records one unresolved occurrence.
    pub fn add_unresolved(&mut self, source: &str, link_name: &str) {
        bump(&mut self.unresolved, source, link_name);
    }
}

/// Returns every source path whose resolved table targets `target`.
pub fn backlinks_to(resolved: &LinkMap, target: &str) -> Vec<String> {
    resolved
        .iter()
        .filter(|(_, targets)| targets.contains_key(target))
        .map(|(source, _)| source.clone())
        .collect()
}

fn bump(map: &mut LinkMap, source: &str, target: &str) {
    *map.entry(source.to_string())
        .or_default()
        .entry(target.to_string())
        .or_insert(0) += 1;
}

#[cfg(test)]
mod tests {
    use super::{backlinks_to, LinkGraph};

    #[test]
    fn add_resolved_counts_repeated_links() {
        let mut graph = LinkGraph::default();
        graph.add_resolved("a.md", "b.md");
        graph.add_resolved("a.md", "b.md");
        assert_eq!(graph.resolved["a.md"]["b.md"], 2);
        assert!(graph.unresolved.is_empty());
    }

    #[test]
    fn backlinks_lists_every_source_targeting_note() {
        let mut graph = LinkGraph::default();
        graph.add_resolved("a.md", "c.md");
        graph.add_resolved("b.md", "c.md");
        graph.add_resolved("b.md", "d.md");
        assert_eq!(
            backlinks_to(&graph.resolved, "c.md"),
            vec!["a.md".to_string(), "b.md".to_string()]
        );
        assert!(backlinks_to(&graph.resolved, "a.md").is_empty());
    }
}

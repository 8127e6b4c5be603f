//! Path-derived topic and category classification.
//!
//! `{root}/{category}/{...slug}.md` maps to `Topic { topic: slug, category }`.
//! Root-level files and `backlog` slugs deliberately yield no topic.

use serde::{Deserialize, Serialize};

/// Bucket name for notes stored directly under the root.
pub const UNCATEGORIZED: &str = "(uncategorized)";

const RESERVED_BACKLOG_SLUG: &str = "backlog";

/// Topic/category pair derived from a note path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    /// Slug below the category folder, nested segments joined with `/`.
    pub topic: String,
    /// First folder below the root.
    pub category: String,
}

/// Derives topic and category from `path` under `root`.
///
/// Returns `None` for paths outside the root, files directly under the root
/// and `backlog` slugs. The `.md` suffix is optional.
pub fn extract_topic(path: &str, root: &str) -> Option<Topic> {
    let relative = strip_root(path, root)?;
    let without_ext = relative.strip_suffix(".md").unwrap_or(relative);
    let parts: Vec<&str> = without_ext.split('/').collect();
    if parts.len() < 2 {
        return None;
    }
    if parts.last() == Some(&RESERVED_BACKLOG_SLUG) {
        return None;
    }

    Some(Topic {
        topic: parts[1..].join("/"),
        category: parts[0].to_string(),
    })
}

/// Returns the first folder below `root`, or `(uncategorized)`.
pub fn extract_category(path: &str, root: &str) -> String {
    let relative = strip_root(path, root).unwrap_or(path);
    match relative.split_once('/') {
        Some((category, _)) if !category.is_empty() => category.to_string(),
        _ => UNCATEGORIZED.to_string(),
    }
}

/// Returns `path` with the `root/` prefix removed, or `None` when outside.
pub fn strip_root<'a>(path: &'a str, root: &str) -> Option<&'a str> {
    let root = root.trim_end_matches('/');
    if root.is_empty() {
        return Some(path);
    }
    path.strip_prefix(root)?.strip_prefix('/')
}

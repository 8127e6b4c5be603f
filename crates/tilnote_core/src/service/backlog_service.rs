//! Backlog checklist parsing, progress and rendering.
//!
//! # Responsibility
//! - Count checklist progress per `backlog.md`.
//! - Parse linked items flat (open only) or grouped by `## section`.
//! - Render progress bars and the per-category status table.
//!
//! # Invariants
//! - Items before the first `## heading` are dropped in section mode.
//! - Sections without items never appear in output.
//! - Category rows sort by completion fraction, descending, stable on ties.

use crate::config::TilRoot;
use crate::markdown::checklist::{count_markers, parse_checklist_link, ChecklistLink};
use crate::markdown::frontmatter::{parse_block, split_frontmatter};
use crate::markdown::heading::parse_section_heading;
use crate::markdown::line_spans;
use crate::model::backlog::{
    percent, BacklogCategoryStatus, BacklogItem, BacklogProgress, BacklogSection,
};
use crate::model::note::FileEntry;
use crate::model::topic::extract_category;
use crate::store::backend::VaultBackend;
use log::debug;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Default progress bar width in cells.
pub const DEFAULT_BAR_WIDTH: usize = 10;

const BAR_FILLED: char = '█';
const BAR_EMPTY: char = '░';
const SOURCES_KEY: &str = "sources";
const EMPTY_TABLE_MESSAGE: &str = "No backlog items";

/// Counts done and open checklist markers anywhere in `content`.
pub fn compute_backlog_progress(content: &str) -> BacklogProgress {
    count_markers(content)
}

/// Parses open `- [ ] [name](path)` items, ignoring sections.
///
/// Paths are returned without `.md`; a blank name falls back to the path.
pub fn parse_backlog_items(content: &str) -> Vec<BacklogItem> {
    line_spans(content)
        .filter_map(|line| parse_checklist_link(line.text))
        .filter(|link| !link.done)
        .map(|link| {
            let path = link.target.strip_suffix(".md").unwrap_or(link.target);
            BacklogItem {
                path: path.to_string(),
                display_name: non_blank_or(link.display_name, path),
                done: false,
                source_urls: None,
            }
        })
        .collect()
}

/// Parses the frontmatter `sources` table: slug → URL list.
///
/// A single URL string is normalized to a one-element list; non-string list
/// entries are skipped; anything else is ignored.
pub fn parse_frontmatter_sources(content: &str) -> BTreeMap<String, Vec<String>> {
    let Some(block) = split_frontmatter(content).0 else {
        return BTreeMap::new();
    };
    let frontmatter = parse_block(block);
    let Some(Value::Object(sources)) = frontmatter.get(SOURCES_KEY) else {
        return BTreeMap::new();
    };

    sources
        .iter()
        .filter_map(|(slug, value)| {
            let urls = match value {
                Value::String(url) => vec![url.clone()],
                Value::Array(values) => values
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect(),
                _ => return None,
            };
            Some((slug.clone(), urls))
        })
        .collect()
}

/// Parses items grouped by `## section` headings.
pub fn parse_backlog_sections(content: &str) -> Vec<BacklogSection> {
    let sources = parse_frontmatter_sources(content);
    let body = split_frontmatter(content).1;
    let mut sections: Vec<BacklogSection> = Vec::new();

    for line in line_spans(body) {
        if let Some(heading) = parse_section_heading(line.text) {
            sections.push(BacklogSection {
                heading: heading.to_string(),
                items: Vec::new(),
            });
            continue;
        }
        let Some(section) = sections.last_mut() else {
            continue;
        };
        if let Some(link) = parse_checklist_link(line.text) {
            section.items.push(section_item(link, &sources));
        }
    }

    sections.retain(|section| !section.items.is_empty());
    sections
}

fn section_item(link: ChecklistLink<'_>, sources: &BTreeMap<String, Vec<String>>) -> BacklogItem {
    let path = if link.target.ends_with(".md") {
        link.target.to_string()
    } else {
        format!("{}.md", link.target)
    };
    let stem = path.strip_suffix(".md").unwrap_or(path.as_str());
    let slug = stem.rsplit('/').next().unwrap_or(stem);
    let source_urls = sources.get(slug).filter(|urls| !urls.is_empty()).cloned();

    BacklogItem {
        display_name: non_blank_or(link.display_name, stem),
        done: link.done,
        source_urls,
        path,
    }
}

/// Renders `round(done / total * width)` filled cells, then empty cells.
///
/// `total == 0` renders an all-empty bar. The result is always `width`
/// characters long.
pub fn format_progress_bar(done: usize, total: usize, width: usize) -> String {
    let filled = if total == 0 {
        0
    } else {
        ((done as f64 / total as f64) * width as f64).round() as usize
    }
    .min(width);

    let mut bar = String::with_capacity(width * BAR_FILLED.len_utf8());
    bar.extend(std::iter::repeat(BAR_FILLED).take(filled));
    bar.extend(std::iter::repeat(BAR_EMPTY).take(width - filled));
    bar
}

/// Renders the per-category progress table with a totals line.
pub fn format_backlog_table(categories: &[BacklogCategoryStatus]) -> String {
    if categories.is_empty() {
        return EMPTY_TABLE_MESSAGE.to_string();
    }

    let mut sorted: Vec<&BacklogCategoryStatus> = categories.iter().collect();
    sorted.sort_by(|a, b| {
        b.fraction()
            .partial_cmp(&a.fraction())
            .unwrap_or(Ordering::Equal)
    });

    let total_done: usize = sorted.iter().map(|c| c.done).sum();
    let total_all: usize = sorted.iter().map(|c| c.total).sum();

    let mut out = String::new();
    out.push_str("Learning backlog status\n\n");
    out.push_str("| Category | Progress | Done | Bar |\n");
    out.push_str("|----------|----------|------|-----|\n");
    for category in sorted {
        let _ = writeln!(
            out,
            "| [{}]({}) | {}% | {}/{} | {} |",
            category.category,
            category.file_path,
            category.percent(),
            category.done,
            category.total,
            format_progress_bar(category.done, category.total, DEFAULT_BAR_WIDTH)
        );
    }
    let _ = write!(
        out,
        "\nTotal: {total_all} items, {total_done} done ({}%)",
        percent(total_done, total_all)
    );
    out
}

/// Renders one category's sections as a checklist.
pub fn format_backlog_sections(category: &str, sections: &[BacklogSection]) -> String {
    if sections.is_empty() {
        return format!("No backlog items in `{category}`");
    }

    let mut out = format!("# {category} backlog\n");
    for section in sections {
        let done = section.items.iter().filter(|item| item.done).count();
        let _ = write!(
            out,
            "\n## {} ({done}/{})\n",
            section.heading,
            section.items.len()
        );
        for item in &section.items {
            let mark = if item.done { 'x' } else { ' ' };
            let _ = writeln!(out, "- [{mark}] {} ({})", item.display_name, item.path);
            for url in item.source_urls.iter().flatten() {
                let _ = writeln!(out, "  - source: {url}");
            }
        }
    }
    out
}

/// An open backlog item tagged with its category.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CategorizedBacklogItem {
    pub category: String,
    pub item: BacklogItem,
}

/// Backlog queries over the vault.
pub struct BacklogService {
    backend: VaultBackend,
    root: TilRoot,
}

impl BacklogService {
    pub fn new(backend: VaultBackend, root: TilRoot) -> Self {
        Self { backend, root }
    }

    /// Lists every `backlog.md` under the root.
    pub fn backlog_files(&self) -> Vec<FileEntry> {
        self.backend
            .storage()
            .list_files()
            .into_iter()
            .filter(|file| file.is_backlog() && self.root.contains(&file.path))
            .collect()
    }

    /// Progress per category; backlogs without any checklist marker are omitted.
    pub fn category_statuses(&self) -> Vec<BacklogCategoryStatus> {
        let statuses: Vec<BacklogCategoryStatus> = self
            .backlog_files()
            .into_iter()
            .filter_map(|file| {
                let content = self.backend.storage().read_file(&file.path)?;
                let progress = compute_backlog_progress(&content);
                (progress.total() > 0).then(|| BacklogCategoryStatus {
                    category: extract_category(&file.path, self.root.as_str()),
                    file_path: file.path,
                    done: progress.done,
                    total: progress.total(),
                })
            })
            .collect();
        debug!(
            "event=backlog_status module=backlog status=ok categories={}",
            statuses.len()
        );
        statuses
    }

    /// Open items across every backlog, in listing order.
    pub fn open_items(&self) -> Vec<CategorizedBacklogItem> {
        self.backlog_files()
            .into_iter()
            .filter_map(|file| {
                let content = self.backend.storage().read_file(&file.path)?;
                let category = extract_category(&file.path, self.root.as_str());
                Some(
                    parse_backlog_items(&content)
                        .into_iter()
                        .map(move |item| CategorizedBacklogItem {
                            category: category.clone(),
                            item,
                        })
                        .collect::<Vec<_>>(),
                )
            })
            .flatten()
            .collect()
    }

    /// Section-grouped items of one category; `None` when it has no backlog.
    pub fn category_sections(&self, category: &str) -> Option<Vec<BacklogSection>> {
        let path = format!("{}{category}/backlog.md", self.root.prefix());
        let content = self.backend.storage().read_file(&path)?;
        Some(parse_backlog_sections(&content))
    }

    /// Status table for all categories, or the checklist of one category.
    pub fn status_report(&self, category: Option<&str>) -> String {
        match category.map(str::trim).filter(|value| !value.is_empty()) {
            Some(category) => match self.category_sections(category) {
                Some(sections) => format_backlog_sections(category, &sections),
                None => format!("No backlog found for `{category}`"),
            },
            None => format_backlog_table(&self.category_statuses()),
        }
    }
}

fn non_blank_or(value: &str, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{
        format_backlog_table, format_progress_bar, parse_backlog_items, parse_backlog_sections,
        parse_frontmatter_sources,
    };
    use crate::model::backlog::BacklogCategoryStatus;

    fn status(category: &str, done: usize, total: usize) -> BacklogCategoryStatus {
        BacklogCategoryStatus {
            category: category.to_string(),
            file_path: format!("til/{category}/backlog.md"),
            done,
            total,
        }
    }

    #[test]
    fn progress_bar_rounds_and_keeps_width() {
        assert_eq!(format_progress_bar(1, 3, 10), "███░░░░░░░");
        assert_eq!(format_progress_bar(2, 3, 10), "███████░░░");
        assert_eq!(format_progress_bar(0, 0, 5), "░░░░░");
        assert_eq!(format_progress_bar(5, 5, 4), "████");
        assert_eq!(format_progress_bar(9, 3, 6).chars().count(), 6);
    }

    #[test]
    fn table_sorts_by_completion_and_totals() {
        let table = format_backlog_table(&[status("go", 1, 4), status("rust", 3, 4), status("zig", 1, 4)]);
        let rows: Vec<&str> = table.lines().filter(|line| line.starts_with("| [")).collect();
        assert_eq!(rows.len(), 3);
        assert!(rows[0].starts_with("| [rust]"));
        assert!(rows[1].starts_with("| [go]"));
        assert!(rows[2].starts_with("| [zig]"));
        assert!(table.ends_with("Total: 12 items, 5 done (42%)"));
    }

    #[test]
    fn empty_table_has_message() {
        assert_eq!(format_backlog_table(&[]), "No backlog items");
    }

    #[test]
    fn flat_items_are_open_only() {
        let items = parse_backlog_items(
            "- [x] [Done](til/go/a.md)\n- [ ] [Open](til/go/b.md)\n- [ ] [](til/go/c)",
        );
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].path, "til/go/b");
        assert_eq!(items[0].display_name, "Open");
        assert_eq!(items[1].display_name, "til/go/c");
    }

    #[test]
    fn sources_accept_single_and_list_values() {
        let content = "---\nsources:\n  one: https://a.example\n  two:\n    - https://b.example\n    - 7\n    - https://c.example\n  bad: 3\n---\n";
        let sources = parse_frontmatter_sources(content);
        assert_eq!(sources["one"], vec!["https://a.example"]);
        assert_eq!(sources["two"], vec!["https://b.example", "https://c.example"]);
        assert!(!sources.contains_key("bad"));
    }

    #[test]
    fn sections_group_items_and_attach_sources() {
        let content = "---\nsources:\n  compound-learning: https://blog.example/compound\n  empty: []\n---\n\
- [ ] [Orphan](til/x/orphan.md)\n\
## Prerequisites\n\
- [x] [Compound learning](til/agile/compound-learning)\n\
- [ ] [](til/agile/empty.md)\n\
## Empty section\n\
text only\n\
## Later\n\
- [X] [Retro](til/agile/retro.md)\n";
        let sections = parse_backlog_sections(content);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].heading, "Prerequisites");
        let first = &sections[0].items[0];
        assert!(first.done);
        assert_eq!(first.path, "til/agile/compound-learning.md");
        assert_eq!(
            first.source_urls.as_deref(),
            Some(&["https://blog.example/compound".to_string()][..])
        );
        let second = &sections[0].items[1];
        assert_eq!(second.display_name, "til/agile/empty");
        assert_eq!(second.source_urls, None);
        assert_eq!(sections[1].heading, "Later");
        assert!(sections[1].items[0].done);
    }
}

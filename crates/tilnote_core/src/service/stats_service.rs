//! Category statistics and dashboard aggregates.
//!
//! # Responsibility
//! - Count notes per category.
//! - Build dashboard data: summary cards, activity heatmap, per-category
//!   file lists, backlog progress, recent notes and review picks.
//!
//! # Invariants
//! - Only `.md` notes under the root count; `backlog.md` files never do.
//! - Categories sort by count descending; ties keep listing order.
//! - Heatmap cells are contiguous days from a Sunday through `today`.
//! - The streak counts backward from `today`; no note today means zero.

use crate::config::TilRoot;
use crate::markdown::summary::extract_summary;
use crate::model::backlog::BacklogCategoryStatus;
use crate::model::note::FileEntry;
use crate::model::topic::extract_category;
use crate::service::backlog_service::{BacklogService, CategorizedBacklogItem};
use crate::store::backend::VaultBackend;
use chrono::{DateTime, Datelike, Days, Local, NaiveDate, TimeZone};
use log::info;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Write;

const HEATMAP_WEEKS: u64 = 52;
const HEATMAP_LEVELS: f64 = 4.0;
const WEEK_DAYS: u64 = 7;
const DATE_KEY: &str = "date";

/// Note count of one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub name: String,
    pub count: usize,
}

/// Note totals grouped by category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryStats {
    pub total_notes: usize,
    pub categories: Vec<CategoryCount>,
}

/// A note paired with the day it counts toward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityNote {
    pub file: FileEntry,
    /// Frontmatter `date` when valid, else the creation day.
    pub activity_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SummaryCards {
    pub total_notes: usize,
    pub category_count: usize,
    /// Notes whose activity date is within the last 7 days, today included.
    pub this_week_count: usize,
    pub streak: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HeatmapCell {
    pub date: NaiveDate,
    pub count: usize,
    /// Intensity bucket `0..=4`.
    pub level: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HeatmapData {
    pub cells: Vec<HeatmapCell>,
    pub max_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryFile {
    pub path: String,
    pub filename: String,
    pub mtime: i64,
}

/// One category with its files, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnhancedCategory {
    pub name: String,
    pub count: usize,
    pub files: Vec<CategoryFile>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardBacklogProgress {
    pub total_done: usize,
    pub total_items: usize,
    pub categories: Vec<BacklogCategoryStatus>,
}

/// Everything the dashboard renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnhancedStats {
    pub summary: SummaryCards,
    pub heatmap: HeatmapData,
    pub categories: Vec<EnhancedCategory>,
    pub backlog: DashboardBacklogProgress,
}

/// A recent note with its prose summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentSummary {
    pub path: String,
    pub filename: String,
    pub category: String,
    pub mtime: i64,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewNote {
    pub path: String,
    pub filename: String,
    pub category: String,
}

/// One note and one open backlog item suggested for review.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReviewPick {
    pub note: Option<ReviewNote>,
    pub backlog: Option<CategorizedBacklogItem>,
}

fn is_counted_note(file: &FileEntry, root: &TilRoot) -> bool {
    file.is_markdown() && !file.is_backlog() && root.contains(&file.path)
}

/// Counts notes per category.
pub fn compute_category_stats(files: &[FileEntry], root: &TilRoot) -> CategoryStats {
    let notes: Vec<&FileEntry> = files.iter().filter(|file| is_counted_note(file, root)).collect();
    let categories = group_by_category(&notes, root)
        .into_iter()
        .map(|(name, members)| CategoryCount {
            name,
            count: members.len(),
        })
        .collect();
    CategoryStats {
        total_notes: notes.len(),
        categories,
    }
}

fn group_by_category<'a>(notes: &[&'a FileEntry], root: &TilRoot) -> Vec<(String, Vec<&'a FileEntry>)> {
    let mut groups: Vec<(String, Vec<&FileEntry>)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for &note in notes {
        let category = extract_category(&note.path, root.as_str());
        match index.get(&category) {
            Some(&slot) => groups[slot].1.push(note),
            None => {
                index.insert(category.clone(), groups.len());
                groups.push((category, vec![note]));
            }
        }
    }
    groups.sort_by(|a, b| b.1.len().cmp(&a.1.len()));
    groups
}

/// Renders category counts as a markdown table.
pub fn render_category_stats(stats: &CategoryStats) -> String {
    if stats.total_notes == 0 {
        return "No notes yet.".to_string();
    }
    let mut out = format!(
        "## Notes: {} in {} categories\n\n| Category | Notes |\n|----------|-------|\n",
        stats.total_notes,
        stats.categories.len()
    );
    for category in &stats.categories {
        let _ = writeln!(out, "| {} | {} |", category.name, category.count);
    }
    out
}

/// Builds dashboard aggregates as of `today`.
pub fn compute_enhanced_stats(
    notes: &[ActivityNote],
    root: &TilRoot,
    backlog: &[BacklogCategoryStatus],
    today: NaiveDate,
) -> EnhancedStats {
    let mut per_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for note in notes {
        *per_day.entry(note.activity_date).or_insert(0) += 1;
    }

    let week_start = today.checked_sub_days(Days::new(WEEK_DAYS - 1)).unwrap_or(today);
    let this_week_count: usize = per_day.range(week_start..=today).map(|(_, count)| count).sum();

    let files: Vec<&FileEntry> = notes.iter().map(|note| &note.file).collect();
    let categories: Vec<EnhancedCategory> = group_by_category(&files, root)
        .into_iter()
        .map(|(name, mut members)| {
            members.sort_by(|a, b| b.mtime.cmp(&a.mtime));
            EnhancedCategory {
                count: members.len(),
                files: members
                    .into_iter()
                    .map(|file| CategoryFile {
                        path: file.path.clone(),
                        filename: file.name.clone(),
                        mtime: file.mtime,
                    })
                    .collect(),
                name,
            }
        })
        .collect();

    EnhancedStats {
        summary: SummaryCards {
            total_notes: notes.len(),
            category_count: categories.len(),
            this_week_count,
            streak: compute_streak(&per_day, today),
        },
        heatmap: build_heatmap(&per_day, today),
        categories,
        backlog: DashboardBacklogProgress {
            total_done: backlog.iter().map(|status| status.done).sum(),
            total_items: backlog.iter().map(|status| status.total).sum(),
            categories: backlog.to_vec(),
        },
    }
}

/// Consecutive days with activity, counting back from `today`.
pub fn compute_streak(per_day: &BTreeMap<NaiveDate, usize>, today: NaiveDate) -> usize {
    let mut streak = 0;
    let mut day = today;
    while per_day.get(&day).copied().unwrap_or(0) > 0 {
        streak += 1;
        match day.pred_opt() {
            Some(previous) => day = previous,
            None => break,
        }
    }
    streak
}

/// Day cells for 52 full weeks plus the current one.
pub fn build_heatmap(per_day: &BTreeMap<NaiveDate, usize>, today: NaiveDate) -> HeatmapData {
    let year_ago = today
        .checked_sub_days(Days::new(HEATMAP_WEEKS * WEEK_DAYS))
        .unwrap_or(today);
    let offset = u64::from(year_ago.weekday().num_days_from_sunday());
    let start = year_ago.checked_sub_days(Days::new(offset)).unwrap_or(year_ago);

    let counts: Vec<(NaiveDate, usize)> = start
        .iter_days()
        .take_while(|day| *day <= today)
        .map(|day| (day, per_day.get(&day).copied().unwrap_or(0)))
        .collect();
    let max_count = counts.iter().map(|(_, count)| *count).max().unwrap_or(0);

    HeatmapData {
        cells: counts
            .into_iter()
            .map(|(date, count)| HeatmapCell {
                date,
                count,
                level: heat_level(count, max_count),
            })
            .collect(),
        max_count,
    }
}

fn heat_level(count: usize, max_count: usize) -> u8 {
    if count == 0 || max_count == 0 {
        return 0;
    }
    (count as f64 / max_count as f64 * HEATMAP_LEVELS).ceil() as u8
}

/// Newest `limit` notes by mtime.
pub fn select_recent_notes(files: &[FileEntry], root: &TilRoot, limit: usize) -> Vec<FileEntry> {
    let mut notes: Vec<FileEntry> = files
        .iter()
        .filter(|file| is_counted_note(file, root))
        .cloned()
        .collect();
    notes.sort_by(|a, b| b.mtime.cmp(&a.mtime));
    notes.truncate(limit);
    notes
}

/// Picks one note and one open backlog item using `choose(len) -> index`.
///
/// Out-of-range indices wrap around.
pub fn pick_review_items(
    files: &[FileEntry],
    root: &TilRoot,
    open_items: &[CategorizedBacklogItem],
    mut choose: impl FnMut(usize) -> usize,
) -> ReviewPick {
    let notes: Vec<&FileEntry> = files.iter().filter(|file| is_counted_note(file, root)).collect();
    let note = (!notes.is_empty()).then(|| {
        let file = notes[choose(notes.len()) % notes.len()];
        ReviewNote {
            path: file.path.clone(),
            filename: file.name.clone(),
            category: extract_category(&file.path, root.as_str()),
        }
    });
    let backlog = (!open_items.is_empty())
        .then(|| open_items[choose(open_items.len()) % open_items.len()].clone());
    ReviewPick { note, backlog }
}

/// Stats queries over the vault.
pub struct StatsService {
    backend: VaultBackend,
    root: TilRoot,
}

impl StatsService {
    pub fn new(backend: VaultBackend, root: TilRoot) -> Self {
        Self { backend, root }
    }

    pub fn category_stats(&self) -> CategoryStats {
        let stats = compute_category_stats(&self.backend.storage().list_files(), &self.root);
        info!(
            "event=category_stats module=stats status=ok notes={} categories={}",
            stats.total_notes,
            stats.categories.len()
        );
        stats
    }

    /// Dashboard aggregates; creation days are taken in `now`'s time zone.
    pub fn dashboard<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> EnhancedStats {
        let zone = now.timezone();
        let notes: Vec<ActivityNote> = self
            .backend
            .storage()
            .list_files()
            .into_iter()
            .filter(|file| is_counted_note(file, &self.root))
            .filter_map(|file| {
                let activity_date = self
                    .frontmatter_date(&file.path)
                    .or_else(|| {
                        zone.timestamp_millis_opt(file.ctime)
                            .earliest()
                            .map(|at| at.date_naive())
                    })?;
                Some(ActivityNote {
                    file,
                    activity_date,
                })
            })
            .collect();

        let backlog = BacklogService::new(self.backend.clone(), self.root.clone()).category_statuses();
        let stats = compute_enhanced_stats(&notes, &self.root, &backlog, now.date_naive());
        info!(
            "event=dashboard module=stats status=ok notes={} streak={} max_count={}",
            stats.summary.total_notes, stats.summary.streak, stats.heatmap.max_count
        );
        stats
    }

    /// Same as [`Self::dashboard`] using the local clock.
    pub fn dashboard_now(&self) -> EnhancedStats {
        self.dashboard(&Local::now())
    }

    /// Newest `limit` notes with their first prose paragraph.
    pub fn recent_summaries(&self, limit: usize) -> Vec<RecentSummary> {
        select_recent_notes(&self.backend.storage().list_files(), &self.root, limit)
            .into_iter()
            .map(|file| RecentSummary {
                summary: self
                    .backend
                    .storage()
                    .read_file(&file.path)
                    .and_then(|content| extract_summary(&content)),
                category: extract_category(&file.path, self.root.as_str()),
                path: file.path,
                filename: file.name,
                mtime: file.mtime,
            })
            .collect()
    }

    /// Suggests one note and one open backlog item for review.
    pub fn review_pick(&self, choose: impl FnMut(usize) -> usize) -> ReviewPick {
        let open_items = BacklogService::new(self.backend.clone(), self.root.clone()).open_items();
        pick_review_items(
            &self.backend.storage().list_files(),
            &self.root,
            &open_items,
            choose,
        )
    }

    fn frontmatter_date(&self, path: &str) -> Option<NaiveDate> {
        let metadata = self.backend.metadata().file_metadata(path)?;
        let raw = metadata.frontmatter.get(DATE_KEY)?.as_str()?;
        NaiveDate::parse_from_str(raw.get(..10)?, "%Y-%m-%d").ok()
    }
}

//! Recently modified notes.
//!
//! # Responsibility
//! - Select notes modified inside a trailing window of days.
//! - Group them by calendar day with a few heading previews each.
//!
//! # Invariants
//! - The window is `[now - days, now]`, bounds inclusive, in epoch ms.
//! - Every in-window note appears exactly once; days are newest first and
//!   notes inside a day are newest first.

use crate::config::TilRoot;
use crate::model::note::FileEntry;
use crate::model::topic::extract_category;
use crate::store::backend::VaultBackend;
use chrono::{DateTime, Local, NaiveDate, TimeZone};
use log::info;
use serde::Serialize;
use std::fmt::Write;

/// Heading previews attached per note.
pub const MAX_HEADING_PREVIEWS: usize = 3;

const DAY_MS: i64 = 86_400_000;

/// One recently modified note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentNote {
    pub path: String,
    pub category: String,
    pub mtime: i64,
    /// First headings of the note, at most [`MAX_HEADING_PREVIEWS`].
    pub headings: Vec<String>,
}

/// Notes modified on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentDay {
    pub date: NaiveDate,
    pub notes: Vec<RecentNote>,
}

/// Result of one recency query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentActivity {
    pub window_days: u32,
    pub days: Vec<RecentDay>,
}

impl RecentActivity {
    /// Number of notes across all days.
    pub fn note_count(&self) -> usize {
        self.days.iter().map(|day| day.notes.len()).sum()
    }
}

/// Notes under the root, backlogs excluded, with mtime in the window.
pub fn filter_recent<'a, Tz: TimeZone>(
    files: &'a [FileEntry],
    root: &TilRoot,
    window_days: u32,
    now: &DateTime<Tz>,
) -> Vec<&'a FileEntry> {
    let end = now.timestamp_millis();
    let start = end - i64::from(window_days) * DAY_MS;
    files
        .iter()
        .filter(|file| file.is_markdown() && !file.is_backlog() && root.contains(&file.path))
        .filter(|file| file.mtime >= start && file.mtime <= end)
        .collect()
}

/// Groups files by the calendar day of their mtime in `now`'s time zone.
pub fn group_by_day<Tz: TimeZone>(files: &[&FileEntry], now: &DateTime<Tz>) -> Vec<(NaiveDate, Vec<FileEntry>)> {
    let zone = now.timezone();
    let mut sorted: Vec<&FileEntry> = files.to_vec();
    sorted.sort_by(|a, b| b.mtime.cmp(&a.mtime).then_with(|| a.path.cmp(&b.path)));

    let mut groups: Vec<(NaiveDate, Vec<FileEntry>)> = Vec::new();
    for file in sorted {
        let Some(date) = zone
            .timestamp_millis_opt(file.mtime)
            .earliest()
            .map(|at| at.date_naive())
        else {
            continue;
        };
        match groups.last_mut() {
            Some((day, entries)) if *day == date => entries.push(file.clone()),
            _ => groups.push((date, vec![file.clone()])),
        }
    }
    groups
}

/// Recency queries over the vault.
pub struct RecencyService {
    backend: VaultBackend,
    root: TilRoot,
}

impl RecencyService {
    pub fn new(backend: VaultBackend, root: TilRoot) -> Self {
        Self { backend, root }
    }

    /// Notes modified in the last `window_days` days, relative to `now`.
    pub fn recent_activity<Tz: TimeZone>(&self, window_days: u32, now: &DateTime<Tz>) -> RecentActivity {
        let files = self.backend.storage().list_files();
        let recent = filter_recent(&files, &self.root, window_days, now);
        let days: Vec<RecentDay> = group_by_day(&recent, now)
            .into_iter()
            .map(|(date, entries)| RecentDay {
                date,
                notes: entries.into_iter().map(|file| self.recent_note(file)).collect(),
            })
            .collect();

        let activity = RecentActivity { window_days, days };
        info!(
            "event=recent_activity module=recency status=ok window_days={} notes={}",
            window_days,
            activity.note_count()
        );
        activity
    }

    /// Same as [`Self::recent_activity`] using the local clock.
    pub fn recent_activity_now(&self, window_days: u32) -> RecentActivity {
        self.recent_activity(window_days, &Local::now())
    }

    fn recent_note(&self, file: FileEntry) -> RecentNote {
        let mut headings = self
            .backend
            .metadata()
            .file_metadata(&file.path)
            .map(|metadata| metadata.headings)
            .unwrap_or_default();
        headings.truncate(MAX_HEADING_PREVIEWS);
        RecentNote {
            category: extract_category(&file.path, self.root.as_str()),
            path: file.path,
            mtime: file.mtime,
            headings,
        }
    }
}

/// Renders a recency result as markdown.
pub fn render_recent_activity(activity: &RecentActivity) -> String {
    if activity.days.is_empty() {
        return format!("No activity in the last {} days.", activity.window_days);
    }

    let mut out = format!(
        "## Recent activity: last {} days ({} notes)\n",
        activity.window_days,
        activity.note_count()
    );
    for day in &activity.days {
        let _ = write!(out, "\n### {}\n", day.date.format("%Y-%m-%d"));
        for note in &day.notes {
            let _ = writeln!(out, "- {} [{}]", note.path, note.category);
            if !note.headings.is_empty() {
                let _ = writeln!(out, "  - {}", note.headings.join(" / "));
            }
        }
    }
    out
}

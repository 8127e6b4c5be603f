//! CLI probe over the vault in the current directory.
//!
//! # Responsibility
//! - Verify `tilnote_core` linkage against a real vault.
//! - Print category counts, backlog progress and the last week of activity
//!   for a quick sanity check.
//! - Write rolling logs when `TILNOTE_LOG_DIR` names an absolute directory.

use std::path::PathBuf;
use tilnote_core::service::backlog_service::format_backlog_table;
use tilnote_core::service::recency_service::render_recent_activity;
use tilnote_core::service::stats_service::render_category_stats;
use tilnote_core::{
    default_log_level, init_logging, load_config, BacklogService, RecencyService, StatsService,
    VaultBackend,
};

const LOG_DIR_ENV: &str = "TILNOTE_LOG_DIR";
const RECENT_WINDOW_DAYS: u32 = 7;

fn main() {
    if let Ok(log_dir) = std::env::var(LOG_DIR_ENV) {
        if let Err(err) = init_logging(default_log_level(), &log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    let base = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let config = load_config(&base);
    let root = config.til_root();
    let backend = VaultBackend::filesystem(&base);

    println!("tilnote_core version={}", tilnote_core::core_version());
    println!("root={root}");
    log::debug!("event=cli_probe module=cli status=start");

    let stats = StatsService::new(backend.clone(), root.clone()).category_stats();
    println!("{}", render_category_stats(&stats));

    let statuses = BacklogService::new(backend.clone(), root.clone()).category_statuses();
    println!("{}", format_backlog_table(&statuses));

    let activity = RecencyService::new(backend, root).recent_activity_now(RECENT_WINDOW_DAYS);
    println!("{}", render_recent_activity(&activity));
}

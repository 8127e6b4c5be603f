use std::sync::Arc;
use tilnote_core::service::backlog_service::{format_backlog_table, format_progress_bar};
use tilnote_core::{BacklogService, HostVault, TilRoot, VaultBackend};

fn vault() -> Arc<HostVault> {
    let vault = Arc::new(HostVault::new());
    vault.upsert_file(
        "til/rust/backlog.md",
        "---\nsources:\n  traits: https://doc.rust-lang.org/book/ch10-02-traits.html\n---\n\
## Basics\n\
- [x] [Ownership](til/rust/ownership.md)\n\
- [ ] [Traits](til/rust/traits.md)\n\
## Async\n\
- [ ] [Tokio](til/rust/tokio.md)\n",
        1,
        1,
    );
    vault.upsert_file(
        "til/go/backlog.md",
        "- [x] [Goroutines](til/go/goroutines.md)\n- [X] [Channels](til/go/channels.md)\n",
        1,
        1,
    );
    vault.upsert_file("til/empty/backlog.md", "# nothing planned\n", 1, 1);
    vault.upsert_file("til/rust/ownership.md", "- [ ] not a backlog\n", 1, 1);
    vault
}

fn service() -> BacklogService {
    BacklogService::new(VaultBackend::host(vault()), TilRoot::default())
}

#[test]
fn statuses_skip_backlogs_without_markers() {
    let mut statuses = service().category_statuses();
    statuses.sort_by(|a, b| a.category.cmp(&b.category));
    assert_eq!(statuses.len(), 2);
    assert_eq!((statuses[0].category.as_str(), statuses[0].done, statuses[0].total), ("go", 2, 2));
    assert_eq!((statuses[1].category.as_str(), statuses[1].done, statuses[1].total), ("rust", 1, 3));
}

#[test]
fn table_rows_round_trip_percentages() {
    let statuses = service().category_statuses();
    let table = format_backlog_table(&statuses);
    for status in &statuses {
        let row = table
            .lines()
            .find(|line| line.starts_with(&format!("| [{}]", status.category)))
            .unwrap();
        let cells: Vec<&str> = row.split('|').map(str::trim).collect();
        let (done, total) = cells[3].split_once('/').unwrap();
        let done: usize = done.parse().unwrap();
        let total: usize = total.parse().unwrap();
        let pct: u32 = cells[2].trim_end_matches('%').parse().unwrap();
        assert_eq!((done, total), (status.done, status.total));
        assert_eq!(pct, status.percent());
        assert_eq!(cells[4], format_progress_bar(done, total, 10));
    }
    assert!(table.lines().position(|l| l.starts_with("| [go]")) < table.lines().position(|l| l.starts_with("| [rust]")));
    assert!(table.ends_with("Total: 5 items, 3 done (60%)"));
}

#[test]
fn category_report_lists_sections_and_sources() {
    let report = service().status_report(Some("rust"));
    assert!(report.contains("## Basics (1/2)"));
    assert!(report.contains("- [x] Ownership (til/rust/ownership.md)"));
    assert!(report.contains("  - source: https://doc.rust-lang.org/book/ch10-02-traits.html"));
    assert!(report.contains("## Async (0/1)"));

    assert_eq!(service().status_report(Some("zig")), "No backlog found for `zig`");
}

#[test]
fn open_items_carry_category() {
    let items = service().open_items();
    let paths: Vec<(&str, &str)> = items
        .iter()
        .map(|entry| (entry.category.as_str(), entry.item.path.as_str()))
        .collect();
    assert!(paths.contains(&("rust", "til/rust/traits")));
    assert!(paths.contains(&("rust", "til/rust/tokio")));
    assert_eq!(paths.len(), 2);
}

use tilnote_core::extract_metadata;
use tilnote_core::markdown::link::find_wikilinks;
use tilnote_core::markdown::summary::extract_summary;

#[test]
fn frontmatter_tags_precede_inline_tags() {
    let content = "---\ntags:\n  - rust\n  - async\ndate: 2026-02-01\n---\n# Tokio\nUses #runtime and #rust/tasks.\n";
    let meta = extract_metadata(content);
    assert_eq!(meta.tags, vec!["rust", "async", "#runtime", "#rust/tasks"]);
    assert_eq!(meta.headings, vec!["Tokio"]);
    assert_eq!(meta.frontmatter["date"], "2026-02-01");
}

#[test]
fn frontmatter_lines_never_become_headings() {
    let content = "---\ntitle: x\n# not a heading\n---\n## Real\n";
    let meta = extract_metadata(content);
    assert_eq!(meta.headings, vec!["Real"]);
}

#[test]
fn links_list_markdown_then_wikilinks() {
    let content = "See [[Borrowing|borrow rules]] and [docs](https://doc.rust-lang.org) then [[Lifetimes]].";
    let meta = extract_metadata(content);
    assert_eq!(
        meta.outgoing_links,
        vec!["https://doc.rust-lang.org", "Borrowing", "Lifetimes"]
    );
}

#[test]
fn malformed_frontmatter_degrades_to_empty_mapping() {
    let content = "---\ntags: [unclosed\n---\n# Title\n#inline\n";
    let meta = extract_metadata(content);
    assert!(meta.frontmatter.is_empty());
    assert_eq!(meta.tags, vec!["#inline"]);
    assert_eq!(meta.headings, vec!["Title"]);
}

#[test]
fn wikilinks_report_text_and_spans() {
    let text = "a [[Target|Shown]] b [[]] c [[Plain]]";
    let found = find_wikilinks(text);
    assert_eq!(found.len(), 2);
    assert_eq!(found[0].link_text, "Target");
    assert_eq!(found[0].display_text, "Shown");
    assert_eq!(&text[found[0].start..found[0].end], "[[Target|Shown]]");
    assert_eq!(found[1].display_text, "Plain");
}

#[test]
fn summary_uses_first_prose_paragraph() {
    let content = "---\ntitle: t\n---\n# Heading\n\nRust has [ownership](x.md) rules.\nSecond line.\n\nLater paragraph.\n";
    assert_eq!(
        extract_summary(content).as_deref(),
        Some("Rust has ownership rules. Second line.")
    );
    assert_eq!(extract_summary("# Only heading\n"), None);
}

#[test]
fn tagged_frontmatter_values_do_not_drop_tags() {
    let meta = extract_metadata("---\nmeta: !custom x\ntags: [c]\n---\nbody #d\n");
    assert_eq!(meta.frontmatter["meta"], "x");
    assert_eq!(meta.tags, vec!["c", "#d"]);
}

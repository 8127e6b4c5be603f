use std::fs;
use tempfile::TempDir;
use tilnote_core::config::CONFIG_FILE_NAME;
use tilnote_core::load_config;

#[test]
fn missing_file_yields_defaults() {
    let dir = TempDir::new().unwrap();
    let config = load_config(dir.path());
    assert_eq!(config.til_root().as_str(), "til");
    assert!(config.mode.is_none());
}

#[test]
fn reads_the_oh_my_til_file_by_name() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("oh-my-til.json"),
        r#"{"deploy":{"til-path":"notes"}}"#,
    )
    .unwrap();
    assert_eq!(load_config(dir.path()).til_root().as_str(), "notes");
}

#[test]
fn other_file_names_are_ignored() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("til.json"), r#"{"til-path":"notes"}"#).unwrap();
    assert_eq!(load_config(dir.path()).til_root().as_str(), "til");
}

#[test]
fn reads_root_from_deploy_section() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        r#"{"mode":"mcp","deploy":{"til-path":"learning/til/","title":"My TIL"}}"#,
    )
    .unwrap();
    let config = load_config(dir.path());
    assert_eq!(config.til_root().as_str(), "learning/til");
    assert_eq!(config.mode.as_deref(), Some("mcp"));
    assert_eq!(
        config.deploy.and_then(|deploy| deploy.title).as_deref(),
        Some("My TIL")
    );
}

#[test]
fn broken_or_array_json_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);

    fs::write(&path, "{ not json").unwrap();
    assert_eq!(load_config(dir.path()).til_root().as_str(), "til");

    fs::write(&path, "[1, 2]").unwrap();
    assert_eq!(load_config(dir.path()).til_root().as_str(), "til");
}

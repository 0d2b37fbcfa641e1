use std::fs;

use pagemanager_settings::{ConfigError, PageManagerConfig};
use tempfile::tempdir;

#[test]
fn load_missing_file_returns_defaults() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("pages.json");

    let config = PageManagerConfig::load(&path).expect("load defaults");
    assert!(config.blocks.is_empty());
    assert_eq!(config.p_style_prefix, "gjs-");
    assert!(config.append_to.is_none());
}

#[test]
fn load_reads_seed_pages() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("pages.json");
    fs::write(
        &path,
        r#"{
            "pStylePrefix": " ed- ",
            "blocks": [
                { "id": "home", "label": "Home", "content": "<h1>Home</h1>", "css": "h1{color:red}" },
                { "id": "", "label": "Broken" }
            ]
        }"#,
    )
    .expect("write config");

    let config = PageManagerConfig::load(&path).expect("load config");
    assert_eq!(config.p_style_prefix, "ed-");
    assert_eq!(config.blocks.len(), 1);
    assert_eq!(config.blocks[0].content, "<h1>Home</h1>");
    assert_eq!(config.blocks[0].css, "h1{color:red}");
}

#[test]
fn malformed_file_reports_path() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("pages.json");
    fs::write(&path, "{ not json").expect("write config");

    let err = PageManagerConfig::load(&path).unwrap_err();
    match err {
        ConfigError::Parse { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("unexpected error: {other}"),
    }
}

use std::error::Error;
use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::{tempdir, TempDir};

const SAMPLE_CONFIG: &str = r#"{
    "pStylePrefix": "pm-",
    "blocks": [
        { "id": "home", "label": "Home", "category": "basic", "content": "<h1>Home</h1>" },
        { "id": "about", "label": "About", "content": "<p>About</p>" },
        { "id": "legal", "label": "Legal", "category": { "id": "basic", "label": "Basic" }, "disable": true }
    ]
}"#;

fn write_config(contents: &str) -> Result<(TempDir, PathBuf), Box<dyn Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("pages.json");
    fs::write(&path, contents)?;
    Ok((dir, path))
}

#[test]
fn list_prints_tab_separated_pages() -> Result<(), Box<dyn Error>> {
    let (_dir, config) = write_config(SAMPLE_CONFIG)?;
    Command::cargo_bin("pagemanager-cli")?
        .args(["list", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout("home\tHome\tbasic\nabout\tAbout\t\nlegal\tLegal\tbasic\n");
    Ok(())
}

#[test]
fn list_json_reports_flags() -> Result<(), Box<dyn Error>> {
    let (_dir, config) = write_config(SAMPLE_CONFIG)?;
    let output = Command::cargo_bin("pagemanager-cli")?
        .args(["list", "--json", "--config"])
        .arg(&config)
        .output()?;
    assert!(output.status.success());
    let entries: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(entries[2]["id"], "legal");
    assert_eq!(entries[2]["disabled"], true);
    assert_eq!(entries[1]["category"], serde_json::Value::Null);
    Ok(())
}

#[test]
fn render_groups_by_category_with_prefix() -> Result<(), Box<dyn Error>> {
    let (_dir, config) = write_config(SAMPLE_CONFIG)?;
    Command::cargo_bin("pagemanager-cli")?
        .args(["render", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(
            predicate::str::contains("class=\"pm-pages-cs pm-one-bg pm-two-color\"")
                .and(predicate::str::contains("data-category-id=\"basic\""))
                .and(predicate::str::contains("pm-page--disable"))
                .and(predicate::str::contains("Add Page...")),
        );
    Ok(())
}

#[test]
fn render_marks_activated_page_current() -> Result<(), Box<dyn Error>> {
    let (_dir, config) = write_config(SAMPLE_CONFIG)?;
    Command::cargo_bin("pagemanager-cli")?
        .args(["render", "--activate", "home", "--activate", "about", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "class=\"pm-page pm-one-bg pm-four-color-h pm-page--current\" data-page-id=\"about\"",
        ));
    Ok(())
}

#[test]
fn render_subset_without_categories() -> Result<(), Box<dyn Error>> {
    let (_dir, config) = write_config(SAMPLE_CONFIG)?;
    Command::cargo_bin("pagemanager-cli")?
        .args([
            "render",
            "--external",
            "--ignore-categories",
            "--page",
            "about",
            "--config",
        ])
        .arg(&config)
        .assert()
        .success()
        .stdout(
            predicate::str::contains("data-page-id=\"about\"")
                .and(predicate::str::contains("data-page-id=\"home\"").not())
                .and(predicate::str::contains("pm-page-category").not()),
        );
    Ok(())
}

#[test]
fn activating_disabled_page_fails() -> Result<(), Box<dyn Error>> {
    let (_dir, config) = write_config(SAMPLE_CONFIG)?;
    Command::cargo_bin("pagemanager-cli")?
        .args(["render", "--activate", "legal", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("page `legal` is disabled"));
    Ok(())
}

#[test]
fn malformed_config_is_reported() -> Result<(), Box<dyn Error>> {
    let (_dir, config) = write_config("{ not json")?;
    Command::cargo_bin("pagemanager-cli")?
        .args(["list", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load configuration"));
    Ok(())
}

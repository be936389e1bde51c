//! Tests for the one-shot subcommands, run through the real binary.

use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("docsearch-core")
        .join("tests")
        .join("fixtures")
        .join("search_index.js")
}

fn docsearch(args: &[&str], file: &Path) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_docsearch"));
    command.arg(args[0]).arg(file).args(&args[1..]);
    command.output().expect("docsearch runs")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_check_fixture() {
    let output = docsearch(&["check"], &fixture_path());
    assert!(output.status.success());
    assert!(stdout(&output).contains("52 entries, 0 errors, 1 warning\n"));
}

#[test]
fn test_check_strict_fails_on_warning() {
    let output = docsearch(&["check", "--strict"], &fixture_path());
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("api-text-missing-symbol"));
}

#[test]
fn test_check_json_output() {
    let output = docsearch(&["check", "--json"], &fixture_path());
    assert!(output.status.success());

    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["passed"], true);
    assert_eq!(json["roundtrip"]["identical"], true);
    assert_eq!(json["roundtrip"]["canonical"], true);
    assert_eq!(json["report"]["entriesChecked"], 52);
}

#[test]
fn test_check_reports_errors() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("search_index.js");
    std::fs::write(
        &file,
        r#"var documenterSearchIndex = {"docs":
[{"location":"","page":"Home","title":"Home","text":"","category":"page"}]
}"#,
    )
    .unwrap();

    let output = docsearch(&["check"], &file);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("empty-location"));
}

#[test]
fn test_check_malformed_file() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("search_index.js");
    std::fs::write(&file, "var documenterSearchIndex = {\"pages\": []}").unwrap();

    let output = docsearch(&["check"], &file);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_repeated_docs_key_is_rejected_without_rewrite() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("search_index.js");
    let contents = r#"{"docs":[{"location":"a.html","page":"A","title":"A","text":"","category":"page"}],"docs":[]}"#;
    std::fs::write(&file, contents).unwrap();

    assert_eq!(docsearch(&["stats"], &file).status.code(), Some(2));
    assert_eq!(docsearch(&["fmt"], &file).status.code(), Some(2));
    assert_eq!(std::fs::read_to_string(&file).unwrap(), contents);
}

#[test]
fn test_stats_json() {
    let output = docsearch(&["stats", "--json"], &fixture_path());
    assert!(output.status.success());

    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["totalEntries"], 52);
    assert_eq!(json["byCategory"]["constant"], 8);
}

#[test]
fn test_fmt_check_on_canonical_file() {
    let output = docsearch(&["fmt", "--check"], &fixture_path());
    assert!(output.status.success());
}

#[test]
fn test_fmt_rewrites_bare_json() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("search_index.js");
    std::fs::write(
        &file,
        r#"{"docs":[{"location":"index.html","page":"Home","title":"Home","text":"","category":"page"}]}"#,
    )
    .unwrap();

    let output = docsearch(&["fmt", "--check"], &file);
    assert_eq!(output.status.code(), Some(1));

    let output = docsearch(&["fmt", "--backup"], &file);
    assert!(output.status.success());

    let rewritten = std::fs::read_to_string(&file).unwrap();
    assert_eq!(
        rewritten,
        "var documenterSearchIndex = {\"docs\":\n[{\"location\":\"index.html\",\"page\":\"Home\",\"title\":\"Home\",\"text\":\"\",\"category\":\"page\"}]\n}"
    );
    assert!(temp_dir.path().join("search_index.js.bak").exists());

    let output = docsearch(&["fmt", "--check"], &file);
    assert!(output.status.success());
}

#[test]
fn test_fmt_to_output_leaves_input() {
    let temp_dir = TempDir::new().unwrap();
    let out = temp_dir.path().join("copy.js");

    let output = docsearch(&["fmt", "--output", out.to_str().unwrap()], &fixture_path());
    assert!(output.status.success());
    assert_eq!(
        std::fs::read(&out).unwrap(),
        std::fs::read(fixture_path()).unwrap()
    );
}

#[test]
fn test_search_prints_location_and_title() {
    let output = docsearch(&["search", "rad2sec", "--limit", "3"], &fixture_path());
    assert!(output.status.success());

    let text = stdout(&output);
    let first = text.lines().next().unwrap();
    assert!(first.starts_with("modules/util.html#AstroBase.Util.rad2sec"));
    assert!(text.lines().count() <= 3);
}

#[test]
fn test_search_json_with_category() {
    let output = docsearch(
        &["search", "iau2006", "--category", "constant", "--json"],
        &fixture_path(),
    );
    assert!(output.status.success());

    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    let hits = json["hits"].as_array().unwrap();
    assert!(!hits.is_empty());
    assert!(hits.iter().all(|hit| hit["category"] == "constant"));
}

#[test]
fn test_build_database() {
    let temp_dir = TempDir::new().unwrap();
    let db = temp_dir.path().join("index").join("docs.db");

    let output = docsearch(&["build", "--db", db.to_str().unwrap()], &fixture_path());
    assert!(output.status.success());
    assert!(db.exists());
}

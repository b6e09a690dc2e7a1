//! Integration tests for picking sections out of compacted output.

use std::fs;
use std::path::PathBuf;

use codebase_compact::cli::{run_pick, PickArgs, EXIT_FAILED, EXIT_SUCCESS};
use codebase_compact::compact::{compact_project, CompactOptions};
use codebase_compact::pick::{self, SectionFilter};
use tempfile::TempDir;

fn testdata_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

fn setup() {
    codebase_compact::init();
}

#[test]
fn test_sections_of_compacted_testdata() {
    setup();
    let compaction = compact_project(&testdata_path(), &CompactOptions::default()).unwrap();

    let sections = pick::parse_sections(&compaction.output);
    let paths: Vec<_> = sections.iter().map(|s| s.path.as_str()).collect();
    assert_eq!(paths, vec!["sample.js", "sample.py"]);
    assert!(sections.iter().all(|s| s.dir == "/"));

    let all: Vec<usize> = (0..sections.len()).collect();
    assert_eq!(
        pick::render_picked(&sections, &all),
        compaction.output,
        "picking everything should reproduce the file"
    );
}

#[test]
fn test_run_pick_with_filters() {
    setup();
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("compacted_demo_2024-01-01_00-00-00.md");
    fs::write(
        &source,
        "## api/users.py\nfn: list_users():3\n## api/users_test.py\nfn: test_list():1\n## web/app.tsx\ncomponents: App:4",
    )
    .unwrap();

    let args = PickArgs {
        file: None,
        include: vec!["api/**".to_string()],
        exclude: vec!["**/*_test.py".to_string()],
        dir: temp.path().to_path_buf(),
    };
    assert_eq!(run_pick(&args).unwrap(), EXIT_SUCCESS);

    let picked: Vec<_> = fs::read_dir(temp.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.contains("_picked_"))
        .collect();
    assert_eq!(picked.len(), 1, "picked files: {:?}", picked);
    assert!(picked[0].starts_with("compacted_demo_2024-01-01_00-00-00_picked_"));

    let content = fs::read_to_string(temp.path().join(&picked[0])).unwrap();
    assert_eq!(content, "## api/users.py\nfn: list_users():3\n");

    // The picked file is not offered as a compacted source again.
    assert_eq!(
        pick::find_compacted_files(temp.path()).unwrap(),
        vec!["compacted_demo_2024-01-01_00-00-00.md"]
    );
}

#[test]
fn test_run_pick_nothing_to_pick() {
    setup();
    let temp = TempDir::new().unwrap();

    let args = PickArgs {
        file: None,
        include: vec!["**".to_string()],
        exclude: vec![],
        dir: temp.path().to_path_buf(),
    };
    assert_eq!(run_pick(&args).unwrap(), EXIT_FAILED);

    let empty = temp.path().join("compacted_empty.md");
    fs::write(&empty, "\n\n").unwrap();
    let args = PickArgs {
        file: Some(empty),
        ..args
    };
    assert_eq!(run_pick(&args).unwrap(), EXIT_FAILED);
}

#[test]
fn test_run_pick_invalid_pattern() {
    let temp = TempDir::new().unwrap();
    let args = PickArgs {
        file: None,
        include: vec!["[".to_string()],
        exclude: vec![],
        dir: temp.path().to_path_buf(),
    };
    assert!(run_pick(&args).is_err());
    assert!(SectionFilter::new(&[], &["{a".to_string()]).is_err());
}

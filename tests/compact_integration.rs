//! Integration tests for the compaction pipeline.

use std::fs;
use std::path::PathBuf;

use codebase_compact::compact::{compact_project, CompactOptions};
use codebase_compact::config::Config;
use codebase_compact::walker::{collect_files, WalkOptions};
use tempfile::TempDir;

fn testdata_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

fn setup() {
    codebase_compact::init();
}

#[test]
fn test_compact_testdata() {
    setup();

    let compaction =
        compact_project(&testdata_path(), &CompactOptions::default()).expect("should compact");

    assert!(compaction.output.contains("## sample.js"), "output:\n{}", compaction.output);
    assert!(compaction.output.contains("## sample.py"), "output:\n{}", compaction.output);
    assert!(
        compaction.output.find("## sample.js") < compaction.output.find("## sample.py"),
        "sections should be sorted by path"
    );

    let stats = compaction.stats;
    assert!(stats.files >= 2, "files: {}", stats.files);
    assert!(
        stats.compacted_tokens < stats.raw_tokens,
        "compacted {} should be below raw {}",
        stats.compacted_tokens,
        stats.raw_tokens
    );
    assert!(stats.compaction_rate() > 0.0);
}

#[test]
fn test_walker_finds_fixtures() {
    let files = collect_files(&testdata_path(), &WalkOptions::default()).expect("should walk");
    assert!(files.iter().any(|f| f.relative_path.ends_with(".js")));
    assert!(files.iter().any(|f| f.relative_path.ends_with(".py")));
}

#[test]
fn test_compact_project_tree() {
    setup();
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    fs::create_dir_all(root.join("src/components")).unwrap();
    fs::create_dir_all(root.join("node_modules/react")).unwrap();
    fs::create_dir_all(root.join("legacy")).unwrap();

    fs::write(
        root.join("src/components/Button.tsx"),
        r#"import React, { memo } from 'react';
import { theme } from '../theme';

interface ButtonProps {
  label: string;
}

export const Button = memo(({ label }: ButtonProps) => <button>{label}</button>);
"#,
    )
    .unwrap();
    fs::write(
        root.join("src/theme.ts"),
        "export const theme = { primary: 'blue' };\nexport type Theme = typeof theme;\n",
    )
    .unwrap();
    fs::write(root.join("node_modules/react/index.js"), "module.exports = {};\n").unwrap();
    fs::write(root.join("legacy/old.py"), "def old():\n    pass\n").unwrap();
    fs::write(root.join("notes.md"), "# Notes\n").unwrap();

    let options = CompactOptions {
        walk: WalkOptions {
            skip_directories: vec!["legacy".to_string()],
            ..Default::default()
        },
        ..Default::default()
    };
    let compaction = compact_project(root, &options).unwrap();

    assert_eq!(
        compaction.output,
        "## src/components/Button.tsx\n\
         imports: 1 ext, ../theme\n\
         exports: Button\n\
         components: Button(memo):8\n\
         types: ButtonProps:4\n\
         ## src/theme.ts\n\
         exports: theme\n\
         types: Theme:2"
    );
    assert_eq!(compaction.stats.files, 2);
}

#[test]
fn test_compact_with_config_file() {
    setup();
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    fs::write(
        root.join("codebase-compact.yaml"),
        "excluded_paths:\n  - \"**/*_test.py\"\nmax_listed_constants: 1\n",
    )
    .unwrap();
    fs::write(root.join("settings.py"), "A = 1\nB = 2\nC = 3\n").unwrap();
    fs::write(root.join("settings_test.py"), "def test_a():\n    pass\n").unwrap();

    let config = Config::load(None, root).unwrap();
    let options = CompactOptions {
        walk: WalkOptions {
            skip_directories: config.skip_directories.clone(),
            excluded_paths: config.excluded_paths.clone(),
        },
        render: codebase_compact::format::RenderOptions {
            max_listed_constants: config.max_listed_constants(),
        },
        ..Default::default()
    };

    let compaction = compact_project(root, &options).unwrap();
    assert_eq!(compaction.output, "## settings.py\nconst: A +2 more");
}

//! Project file collection.

use globset::{Glob, GlobSet, GlobSetBuilder};
use phf::phf_set;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::analysis::{extension_of, is_supported_extension};

/// Directories never descended into.
pub static SKIP_DIRECTORIES: phf::Set<&'static str> = phf_set! {
    "node_modules",
    "dist",
    ".git",
    "target",
    "build",
    ".next",
    ".turbo",
    "out",
    "coverage",
    ".cache",
    "__pycache__",
    ".venv",
    "venv",
    ".idea",
    ".vscode",
};

/// A file selected for analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Path relative to the walk root, `/`-separated.
    pub relative_path: String,
}

/// Extra walk filters, usually taken from the config file.
#[derive(Debug, Clone, Default)]
pub struct WalkOptions {
    pub skip_directories: Vec<String>,
    pub excluded_paths: Vec<String>,
}

/// Whether some analyzer handles this file's extension.
pub fn is_parseable(path: &Path) -> bool {
    is_supported_extension(&extension_of(path))
}

/// Collect every parseable file under `root`, sorted by relative path.
pub fn collect_files(root: &Path, options: &WalkOptions) -> anyhow::Result<Vec<SourceFile>> {
    let extra_skips: HashSet<&str> = options.skip_directories.iter().map(String::as_str).collect();
    let excluded = build_globset(&options.excluded_paths)?;

    let mut files = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_skipped_dir(e, &extra_skips));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::debug!(error = %err, "skipping unreadable entry");
                continue;
            }
        };

        if !entry.file_type().is_file() || !is_parseable(entry.path()) {
            continue;
        }

        let relative_path = relative_path(root, entry.path());
        if excluded.as_ref().is_some_and(|set| set.is_match(&relative_path)) {
            tracing::debug!(path = %relative_path, "excluded by pattern");
            continue;
        }

        files.push(SourceFile {
            path: entry.into_path(),
            relative_path,
        });
    }

    files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    Ok(files)
}

fn is_skipped_dir(entry: &DirEntry, extra: &HashSet<&str>) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    let skipped =
        name.starts_with('.') || SKIP_DIRECTORIES.contains(&*name) || extra.contains(&*name);
    if skipped {
        tracing::debug!(dir = %entry.path().display(), "skipping directory");
    }
    skipped
}

fn build_globset(patterns: &[String]) -> anyhow::Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern)
            .map_err(|e| anyhow::anyhow!("invalid excluded_paths pattern {:?}: {}", pattern, e))?;
        builder.add(glob);
    }
    Ok(Some(builder.build()?))
}

fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x = 1\n").unwrap();
    }

    fn relative_paths(files: &[SourceFile]) -> Vec<&str> {
        files.iter().map(|f| f.relative_path.as_str()).collect()
    }

    #[test]
    fn test_collect_files_filters_and_sorts() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        touch(root, "src/b.ts");
        touch(root, "src/a.py");
        touch(root, "app.jsx");
        touch(root, ".eslintrc.js");
        touch(root, "README.md");
        touch(root, "node_modules/lib/index.js");
        touch(root, ".hidden/secret.py");
        touch(root, "pkg/__pycache__/mod.py");

        let files = collect_files(root, &WalkOptions::default()).unwrap();
        assert_eq!(
            relative_paths(&files),
            vec![".eslintrc.js", "app.jsx", "src/a.py", "src/b.ts"]
        );
        assert!(files.iter().all(|f| f.path.starts_with(root)));
    }

    #[test]
    fn test_collect_files_with_options() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        touch(root, "src/app.js");
        touch(root, "src/app.test.js");
        touch(root, "generated/api.ts");

        let options = WalkOptions {
            skip_directories: vec!["generated".to_string()],
            excluded_paths: vec!["**/*.test.js".to_string()],
        };
        let files = collect_files(root, &options).unwrap();
        assert_eq!(relative_paths(&files), vec!["src/app.js"]);
    }

    #[test]
    fn test_root_is_never_skipped() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join(".project");
        touch(&root, "main.py");

        let files = collect_files(&root, &WalkOptions::default()).unwrap();
        assert_eq!(relative_paths(&files), vec!["main.py"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_are_not_followed() {
        use std::os::unix::fs::symlink;

        let temp = TempDir::new().unwrap();
        let root = temp.path().join("project");
        let outside = temp.path().join("outside");
        touch(&root, "main.py");
        touch(&outside, "shared/lib.py");
        touch(&outside, "single.js");

        symlink(outside.join("shared"), root.join("shared")).unwrap();
        symlink(outside.join("single.js"), root.join("single.js")).unwrap();
        symlink(root.join("main.py"), root.join("alias.py")).unwrap();

        let files = collect_files(&root, &WalkOptions::default()).unwrap();
        assert_eq!(relative_paths(&files), vec!["main.py"]);
    }

    #[test]
    fn test_extension_match_is_case_sensitive() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        touch(root, "Setup.PY");
        touch(root, "lib/Util.JS");
        touch(root, "lib/index.js");
        touch(root, "B.py");
        touch(root, "a.py");

        let files = collect_files(root, &WalkOptions::default()).unwrap();
        assert_eq!(relative_paths(&files), vec!["B.py", "a.py", "lib/index.js"]);
    }

    #[test]
    fn test_invalid_exclude_pattern() {
        let temp = TempDir::new().unwrap();
        let options = WalkOptions {
            excluded_paths: vec!["[".to_string()],
            ..Default::default()
        };
        assert!(collect_files(temp.path(), &options).is_err());
    }

    #[test]
    fn test_is_parseable() {
        assert!(is_parseable(Path::new("a/b.py")));
        assert!(is_parseable(Path::new("x.mts")));
        assert!(!is_parseable(Path::new("a/b.PY")));
        assert!(!is_parseable(Path::new("App.TSX")));
        assert!(!is_parseable(Path::new("x.rs")));
        assert!(!is_parseable(Path::new("Makefile")));
    }
}

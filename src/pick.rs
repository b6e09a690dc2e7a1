//! Picking sections out of a compacted file.
//!
//! A compacted file is a sequence of `## <path>` sections. Picking writes a
//! new file holding only the chosen sections, in their original order.

use dialoguer::theme::ColorfulTheme;
use dialoguer::{MultiSelect, Select};
use globset::{Glob, GlobSet, GlobSetBuilder};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::format::{date_stamp, estimate_tokens, format_token_count};

lazy_static! {
    static ref SECTION_HEADER: Regex = Regex::new(r"(?m)^## ").unwrap();
}

/// Rows shown at once in the section prompt.
const PROMPT_PAGE_SIZE: usize = 30;

#[derive(Debug, Error)]
pub enum PickError {
    #[error("no compacted_*.md files found in {}", .0.display())]
    NoCompactedFiles(PathBuf),

    #[error("{} contains no sections", .0.display())]
    NoSections(PathBuf),

    #[error("invalid section pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}

/// One `## path` block of a compacted file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub path: String,
    /// Parent directory of `path`, `/` at the top level.
    pub dir: String,
    /// The full block, header line included.
    pub content: String,
    pub tokens: usize,
}

/// Split compacted text into sections.
pub fn parse_sections(text: &str) -> Vec<Section> {
    SECTION_HEADER
        .split(text)
        .filter(|part| !part.trim().is_empty())
        .map(|part| {
            let (path, body) = match part.find('\n') {
                Some(idx) => (part[..idx].trim(), &part[idx + 1..]),
                None => (part.trim(), ""),
            };
            let content = format!("## {}\n{}", path, body);
            Section {
                path: path.to_string(),
                dir: parent_dir(path),
                tokens: estimate_tokens(&content),
                content,
            }
        })
        .collect()
}

fn parent_dir(path: &str) -> String {
    match Path::new(path).parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_string_lossy().into_owned(),
        _ => "/".to_string(),
    }
}

/// Compacted files in `dir`, newest first.
pub fn find_compacted_files(dir: &Path) -> anyhow::Result<Vec<String>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with("compacted_") && name.ends_with(".md") && !name.contains("_picked_") {
            files.push(name);
        }
    }
    // Names embed a sortable timestamp.
    files.sort_by(|a, b| b.cmp(a));
    Ok(files)
}

/// Path-based section selection for non-interactive runs.
#[derive(Debug, Default)]
pub struct SectionFilter {
    include: Option<GlobSet>,
    exclude: Option<GlobSet>,
}

impl SectionFilter {
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self, PickError> {
        Ok(Self {
            include: build_globset(include)?,
            exclude: build_globset(exclude)?,
        })
    }

    /// True when neither include nor exclude patterns were given.
    pub fn is_empty(&self) -> bool {
        self.include.is_none() && self.exclude.is_none()
    }

    pub fn matches(&self, path: &str) -> bool {
        let included = self.include.as_ref().map_or(true, |set| set.is_match(path));
        let excluded = self.exclude.as_ref().is_some_and(|set| set.is_match(path));
        included && !excluded
    }
}

fn build_globset(patterns: &[String]) -> Result<Option<GlobSet>, PickError> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|source| PickError::InvalidPattern {
            pattern: pattern.clone(),
            source,
        })?;
        builder.add(glob);
    }
    builder.build().map(Some).map_err(|source| PickError::InvalidPattern {
        pattern: patterns.join(", "),
        source,
    })
}

/// Indices of the sections the filter keeps.
pub fn select_by_filter(sections: &[Section], filter: &SectionFilter) -> Vec<usize> {
    sections
        .iter()
        .enumerate()
        .filter(|(_, s)| filter.matches(&s.path))
        .map(|(i, _)| i)
        .collect()
}

/// Concatenate the selected sections in their original order.
pub fn render_picked(sections: &[Section], selected: &[usize]) -> String {
    let mut indices = selected.to_vec();
    indices.sort_unstable();
    indices.dedup();
    indices
        .into_iter()
        .filter_map(|i| sections.get(i))
        .map(|s| s.content.as_str())
        .collect()
}

/// `<base>_picked_<stamp>.md` for a source file name.
pub fn picked_file_name(source_name: &str, stamp: &str) -> String {
    let base = source_name.strip_suffix(".md").unwrap_or(source_name);
    format!("{}_picked_{}.md", base, stamp)
}

/// Outcome of writing a picked file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickSummary {
    pub path: PathBuf,
    pub selected: usize,
    pub total: usize,
    pub tokens: usize,
}

/// Write the selected sections next to `source`.
pub fn write_picked(
    source: &Path,
    sections: &[Section],
    selected: &[usize],
) -> anyhow::Result<PickSummary> {
    let output = render_picked(sections, selected);
    let source_name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| anyhow::anyhow!("not a file: {}", source.display()))?;
    let dir = source.parent().unwrap_or_else(|| Path::new("."));
    let path = dir.join(picked_file_name(&source_name, &date_stamp()));

    fs::write(&path, &output)
        .map_err(|e| anyhow::anyhow!("writing {}: {}", path.display(), e))?;
    tracing::info!(path = %path.display(), "wrote picked sections");

    let tokens = selected
        .iter()
        .filter_map(|&i| sections.get(i))
        .map(|s| s.tokens)
        .sum();
    Ok(PickSummary {
        path,
        selected: selected.len(),
        total: sections.len(),
        tokens,
    })
}

/// Ask which of several compacted files to open.
pub fn prompt_for_file(files: &[String]) -> anyhow::Result<usize> {
    let choice = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Select a compacted file")
        .items(files)
        .default(0)
        .interact()?;
    Ok(choice)
}

/// Checklist labels: `path  ~tokens`, with the first section of each
/// directory group headed by `── dir/ ──`.
pub fn section_labels(sections: &[Section]) -> Vec<String> {
    let mut seen_dirs = HashSet::new();
    sections
        .iter()
        .map(|s| {
            let item = format!("{}  ~{}", s.path, format_token_count(s.tokens));
            if seen_dirs.insert(s.dir.as_str()) {
                let header = if s.dir == "/" {
                    "/".to_string()
                } else {
                    format!("{}/", s.dir)
                };
                format!("── {} ── {}", header, item)
            } else {
                item
            }
        })
        .collect()
}

/// Ask which sections to keep. Everything starts selected.
pub fn prompt_for_sections(file_name: &str, sections: &[Section]) -> anyhow::Result<Vec<usize>> {
    let total: usize = sections.iter().map(|s| s.tokens).sum();
    let labels = section_labels(sections);
    let defaults = vec![true; sections.len()];

    let selected = MultiSelect::with_theme(&ColorfulTheme::default())
        .with_prompt(format!(
            "{}: {} sections ~{} tokens. Space to toggle, Enter to confirm",
            file_name,
            sections.len(),
            format_token_count(total)
        ))
        .items(&labels)
        .defaults(&defaults)
        .max_length(PROMPT_PAGE_SIZE)
        .interact()?;
    Ok(selected)
}

//! The compaction pipeline: walk, analyze in parallel, render.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::io::IsTerminal;
use std::path::Path;

use crate::analysis::{
    extension_of, extract_signatures, get_analyzer, get_script_analyzer, Signature, Skeleton,
};
use crate::format::{estimate_tokens, format_output, render_skeleton, FileResult, RenderOptions};
use crate::walker::{collect_files, SourceFile, WalkOptions};

/// Options for a project compaction.
#[derive(Debug, Clone, Default)]
pub struct CompactOptions {
    pub walk: WalkOptions,
    pub render: RenderOptions,
    /// Append JS/TS signatures below each skeleton.
    pub signatures: bool,
    /// Show a progress bar on stderr when it is a terminal.
    pub progress: bool,
}

/// A single analyzed file.
#[derive(Debug, Clone)]
pub struct CompactedFile {
    pub skeleton: Option<Skeleton>,
    pub signatures: Vec<Signature>,
    /// Rendered skeleton lines, empty when nothing was extracted.
    pub formatted: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompactStats {
    pub files: usize,
    pub raw_tokens: usize,
    pub compacted_tokens: usize,
}

impl CompactStats {
    /// Percentage of tokens saved, or 0 for an empty project.
    pub fn compaction_rate(&self) -> f64 {
        if self.raw_tokens == 0 {
            return 0.0;
        }
        (1.0 - self.compacted_tokens as f64 / self.raw_tokens as f64) * 100.0
    }
}

/// Result of compacting a project.
#[derive(Debug, Clone, Serialize)]
pub struct Compaction {
    pub output: String,
    pub stats: CompactStats,
}

/// Analyze one file's content. Unknown extensions yield no skeleton.
pub fn compact_file(
    path: &Path,
    content: &str,
    render: &RenderOptions,
    with_signatures: bool,
) -> anyhow::Result<CompactedFile> {
    let (skeleton, signatures) = analyze(path, content, with_signatures)?;
    let formatted = skeleton
        .as_ref()
        .map(|s| render_skeleton(s, render))
        .unwrap_or_default();

    Ok(CompactedFile {
        skeleton,
        signatures,
        formatted,
    })
}

/// Parse once and extract the skeleton, plus signatures for scripts.
fn analyze(
    path: &Path,
    content: &str,
    with_signatures: bool,
) -> anyhow::Result<(Option<Skeleton>, Vec<Signature>)> {
    let ext = extension_of(path);
    let Some(analyzer) = get_analyzer(&ext) else {
        return Ok((None, Vec::new()));
    };

    let parsed = analyzer.parse(path, content.as_bytes())?;
    let skeleton = analyzer.extract_skeleton(&parsed)?;
    let signatures = if with_signatures && get_script_analyzer(&ext).is_some() {
        extract_signatures(&parsed)
    } else {
        Vec::new()
    };

    Ok((Some(skeleton), signatures))
}

/// Compact every parseable file under `root`.
pub fn compact_project(root: &Path, options: &CompactOptions) -> anyhow::Result<Compaction> {
    let files = collect_files(root, &options.walk)?;
    tracing::info!(files = files.len(), root = %root.display(), "collected files");

    Ok(compact_sources(&files, options))
}

/// Compact an already collected file list. Unreadable files are left out
/// of both the output and the stats.
pub fn compact_sources(files: &[SourceFile], options: &CompactOptions) -> Compaction {
    let progress = progress_bar(files.len(), options.progress);

    let analyzed: Vec<(FileResult, usize)> = files
        .par_iter()
        .filter_map(|file| {
            let result = analyze_one(file, options);
            progress.inc(1);
            result
        })
        .collect();

    progress.finish_and_clear();

    let raw_tokens = analyzed.iter().map(|(_, tokens)| tokens).sum();
    let mut results: Vec<FileResult> = analyzed.into_iter().map(|(result, _)| result).collect();
    let output = format_output(&mut results, &options.render);

    let stats = CompactStats {
        files: results.len(),
        raw_tokens,
        compacted_tokens: estimate_tokens(&output),
    };
    tracing::info!(?stats, "compaction finished");

    Compaction { output, stats }
}

/// Read and analyze a file. `None` when it cannot be read.
fn analyze_one(file: &SourceFile, options: &CompactOptions) -> Option<(FileResult, usize)> {
    let bytes = match fs::read(&file.path) {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::warn!(path = %file.path.display(), error = %err, "skipping unreadable file");
            return None;
        }
    };
    let content = String::from_utf8_lossy(&bytes);
    let raw_tokens = estimate_tokens(&content);

    let (skeleton, signatures) = match analyze(&file.path, &content, options.signatures) {
        Ok(analyzed) => analyzed,
        Err(err) => {
            tracing::warn!(path = %file.relative_path, error = %err, "analysis failed");
            (None, Vec::new())
        }
    };

    Some((
        FileResult {
            relative_path: file.relative_path.clone(),
            skeleton,
            signatures,
        },
        raw_tokens,
    ))
}

fn progress_bar(len: usize, enabled: bool) -> ProgressBar {
    if !enabled || len < 2 || !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::with_draw_target(Some(len as u64), ProgressDrawTarget::stderr());
    if let Ok(style) = ProgressStyle::with_template("{spinner} Analyzing [{bar:30}] {pos}/{len}") {
        bar.set_style(style.progress_chars("=> "));
    }
    bar
}

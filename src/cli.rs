//! Command-line interface for codebase-compact.

use clap::{ArgAction, Parser, Subcommand};
use colored::*;
use std::fs;
use std::path::{Path, PathBuf};

use crate::compact::{compact_project, CompactOptions};
use crate::config::Config;
use crate::format::{date_stamp, RenderOptions};
use crate::pick::{self, PickError, SectionFilter};
use crate::report;
use crate::walker::WalkOptions;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Environment variable holding a tracing filter directive.
pub const LOG_ENV: &str = "CODEBASE_COMPACT_LOG";

/// Compact a codebase into a token-cheap structural skeleton.
///
/// `compact` walks a project and writes one `## path` section per source
/// file listing its imports, declarations and hooks. `pick` trims a
/// compacted file down to the sections you need.
#[derive(Parser)]
#[command(name = "codebase-compact")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compact a project directory into a skeleton file
    Compact(CompactArgs),
    /// Pick sections from a compacted file into a new file
    Pick(PickArgs),
}

/// Arguments for the compact command.
#[derive(Parser)]
pub struct CompactArgs {
    /// Project directory to compact
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Write `{output, stats}` JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Append JS/TS function signatures to each file's skeleton
    #[arg(long)]
    pub signatures: bool,

    /// Output file (default: <path>/compacted_<name>_<date>.md)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Do not show a progress bar
    #[arg(long)]
    pub no_progress: bool,
}

/// Arguments for the pick command.
#[derive(Parser)]
pub struct PickArgs {
    /// Compacted file to pick from (default: newest in --dir)
    pub file: Option<PathBuf>,

    /// Keep only sections whose path matches (repeatable)
    #[arg(long)]
    pub include: Vec<String>,

    /// Drop sections whose path matches (repeatable)
    #[arg(long)]
    pub exclude: Vec<String>,

    /// Directory searched for compacted files
    #[arg(long, default_value = ".")]
    pub dir: PathBuf,
}

/// Install the stderr tracing subscriber.
///
/// `CODEBASE_COMPACT_LOG` or `RUST_LOG` win over the `-v` count.
pub fn init_logging(verbosity: u8) {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_log_level(verbosity)));

    // A second install (tests, embedding) is harmless.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}

fn default_log_level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Run the compact command.
pub fn run_compact(args: &CompactArgs) -> anyhow::Result<i32> {
    let root = args
        .path
        .canonicalize()
        .map_err(|e| anyhow::anyhow!("resolving {}: {}", args.path.display(), e))?;
    if !root.is_dir() {
        anyhow::bail!("{} is not a directory", root.display());
    }

    let config = Config::load(args.config.as_deref(), &root)?;

    let options = CompactOptions {
        walk: WalkOptions {
            skip_directories: config.skip_directories.clone(),
            excluded_paths: config.excluded_paths.clone(),
        },
        render: RenderOptions {
            max_listed_constants: config.max_listed_constants(),
        },
        signatures: args.signatures || config.signatures_enabled(),
        progress: !args.no_progress,
    };

    let compaction = compact_project(&root, &options)?;

    let output_path = match &args.output {
        Some(path) => path.clone(),
        None => default_output_path(&root, &date_stamp()),
    };

    let content = if args.json {
        serde_json::to_string_pretty(&compaction)?
    } else {
        compaction.output.clone()
    };
    fs::write(&output_path, content)
        .map_err(|e| anyhow::anyhow!("writing {}: {}", output_path.display(), e))?;

    report::write_compact_summary(&output_path, &compaction.stats);

    Ok(EXIT_SUCCESS)
}

/// `<root>/compacted_<root name>_<stamp>.md`.
pub fn default_output_path(root: &Path, stamp: &str) -> PathBuf {
    let name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "root".to_string());
    root.join(format!("compacted_{}_{}.md", name, stamp))
}

/// Run the pick command.
pub fn run_pick(args: &PickArgs) -> anyhow::Result<i32> {
    let filter = SectionFilter::new(&args.include, &args.exclude)?;
    let interactive = filter.is_empty();

    let source = match &args.file {
        Some(file) => file.clone(),
        None => {
            let files = pick::find_compacted_files(&args.dir)
                .map_err(|e| anyhow::anyhow!("reading {}: {}", args.dir.display(), e))?;
            let chosen = match files.len() {
                0 => {
                    let err = PickError::NoCompactedFiles(args.dir.clone());
                    println!("{}", err.to_string().yellow());
                    return Ok(EXIT_FAILED);
                }
                1 => 0,
                // Filters mean no prompts; take the newest.
                _ if !interactive => 0,
                _ => pick::prompt_for_file(&files)?,
            };
            args.dir.join(&files[chosen])
        }
    };

    let text = fs::read_to_string(&source)
        .map_err(|e| anyhow::anyhow!("reading {}: {}", source.display(), e))?;
    let sections = pick::parse_sections(&text);
    if sections.is_empty() {
        let err = PickError::NoSections(source.clone());
        println!("{}", err.to_string().yellow());
        return Ok(EXIT_FAILED);
    }

    let selected = if interactive {
        let file_name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        pick::prompt_for_sections(&file_name, &sections)?
    } else {
        pick::select_by_filter(&sections, &filter)
    };
    tracing::info!(selected = selected.len(), total = sections.len(), "sections selected");

    let summary = pick::write_picked(&source, &sections, &selected)?;
    report::write_pick_summary(&summary);

    Ok(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_compact_args() {
        let cli = Cli::parse_from([
            "codebase-compact",
            "-vv",
            "compact",
            "src",
            "--json",
            "--signatures",
            "-o",
            "out.md",
            "--no-progress",
        ]);
        assert_eq!(cli.verbose, 2);
        let Commands::Compact(args) = cli.command else {
            panic!("expected compact");
        };
        assert_eq!(args.path, PathBuf::from("src"));
        assert!(args.json);
        assert!(args.signatures);
        assert_eq!(args.output, Some(PathBuf::from("out.md")));
        assert!(args.no_progress);
        assert!(args.config.is_none());
    }

    #[test]
    fn test_parse_pick_args() {
        let cli = Cli::parse_from([
            "codebase-compact",
            "pick",
            "--include",
            "src/**",
            "--include",
            "lib/**",
            "--exclude",
            "**/*.test.ts",
        ]);
        let Commands::Pick(args) = cli.command else {
            panic!("expected pick");
        };
        assert!(args.file.is_none());
        assert_eq!(args.include, vec!["src/**", "lib/**"]);
        assert_eq!(args.exclude, vec!["**/*.test.ts"]);
        assert_eq!(args.dir, PathBuf::from("."));
    }

    #[test]
    fn test_default_output_path() {
        let path = default_output_path(Path::new("/work/my-app"), "2024-05-06_07-08-09");
        assert_eq!(
            path,
            PathBuf::from("/work/my-app/compacted_my-app_2024-05-06_07-08-09.md")
        );
    }

    #[test]
    fn test_default_log_level() {
        assert_eq!(default_log_level(0), "warn");
        assert_eq!(default_log_level(1), "info");
        assert_eq!(default_log_level(2), "debug");
        assert_eq!(default_log_level(9), "trace");
    }
}

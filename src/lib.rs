//! Codebase-compact - token-cheap structural skeletons of a codebase.
//!
//! Large projects do not fit in an LLM prompt. This crate reduces each
//! Python, JavaScript and TypeScript file to a few lines describing its
//! imports, declarations and React hooks, and lets you pick the sections
//! worth sending.
//!
//! # Architecture
//!
//! The codebase uses tree-sitter for AST-based analysis:
//!
//! - `walker`: Project file collection
//! - `analysis`: Language analyzers producing skeletons and signatures
//! - `format`: Skeleton rendering and token estimates
//! - `compact`: The parallel compaction pipeline
//! - `pick`: Section picking from compacted files
//! - `config`: YAML configuration
//! - `report`: Terminal summaries
//!
//! # Adding a New Language
//!
//! See `src/analysis/languages/` for examples. Implement `LanguageAnalyzer`
//! trait and register in `languages/mod.rs`.

pub mod analysis;
pub mod cli;
pub mod compact;
pub mod config;
pub mod format;
pub mod pick;
pub mod report;
pub mod walker;

pub use analysis::{
    register_analyzers, LanguageAnalyzer, PythonAnalyzer, PythonSkeleton, ScriptAnalyzer,
    ScriptSkeleton, Skeleton,
};
pub use compact::{compact_file, compact_project, CompactOptions, CompactStats, Compaction};
pub use config::Config;
pub use format::{estimate_tokens, format_output, format_token_count};
pub use pick::{parse_sections, Section};
pub use walker::{collect_files, SourceFile};

/// Initialize all subsystems.
///
/// Call this once at startup.
pub fn init() {
    register_analyzers();
}

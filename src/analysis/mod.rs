//! AST-backed skeleton extraction.
//!
//! Each supported language has an analyzer that parses a file with
//! tree-sitter and reduces it to a [`Skeleton`]: imports, declarations and
//! the line each one starts on.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────┐     ┌───────────────┐
//! │ Source bytes    │────▶│ Analyzers    │────▶│ Skeleton      │
//! └─────────────────┘     │ (Py, JS, TS) │     │ (Python or    │
//!                         └──────────────┘     │  Script)      │
//!                                │             └───────────────┘
//!                                ▼
//!                         ┌──────────────┐
//!                         │ Signatures   │  (JS/TS only)
//!                         └──────────────┘
//! ```
//!
//! # Adding a New Language
//!
//! 1. Create a module in `src/analysis/languages/`
//! 2. Implement `LanguageAnalyzer`, returning a new `Skeleton` variant
//! 3. Register the analyzer and its extensions in `languages/mod.rs`
//! 4. Teach `format` how to render the new variant

mod languages;
mod signatures;
mod skeleton;
mod traits;

pub use languages::{
    get_analyzer, get_script_analyzer, is_supported_extension, register_analyzers,
    PythonAnalyzer, ScriptAnalyzer, SUPPORTED_EXTENSIONS,
};
pub use signatures::{extract_signatures, format_signatures, Signature};
pub use skeleton::{
    Component, EffectDeps, EffectHook, Export, ExportKind, HocKind, HookUsage, Located,
    PythonClass, PythonFunction, PythonImport, PythonSkeleton, ScriptImport, ScriptSkeleton,
    Skeleton,
};
pub use traits::{line_of, LanguageAnalyzer, ParsedFile};

use std::path::Path;

/// Extension of `path` without the dot, or "". Case is kept, so `.PY`
/// matches no analyzer.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_string()
}

/// Parse `source` and extract its skeleton with the analyzer for `path`.
///
/// Returns `Ok(None)` when no analyzer handles the extension.
pub fn analyze_source(path: &Path, source: &[u8]) -> anyhow::Result<Option<Skeleton>> {
    let Some(analyzer) = get_analyzer(&extension_of(path)) else {
        return Ok(None);
    };
    let parsed = analyzer.parse(path, source)?;
    analyzer.extract_skeleton(&parsed).map(Some)
}

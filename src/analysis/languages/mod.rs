//! Language-specific analyzer implementations.

mod python;
mod script;

pub use python::PythonAnalyzer;
pub use script::ScriptAnalyzer;

pub(crate) use script::{hoc_call, is_create_context, is_function_value, walk_document_order};

use super::LanguageAnalyzer;
use once_cell::sync::OnceCell;
use std::sync::atomic::{AtomicBool, Ordering};

/// Static storage for Python analyzer.
static PYTHON_ANALYZER: OnceCell<PythonAnalyzer> = OnceCell::new();

/// Static storage for JavaScript analyzer.
static JAVASCRIPT_ANALYZER: OnceCell<ScriptAnalyzer> = OnceCell::new();

/// Static storage for TypeScript analyzer.
static TYPESCRIPT_ANALYZER: OnceCell<ScriptAnalyzer> = OnceCell::new();

/// Static storage for TSX analyzer.
static TSX_ANALYZER: OnceCell<ScriptAnalyzer> = OnceCell::new();

/// Whether analyzers have been registered.
static REGISTERED: AtomicBool = AtomicBool::new(false);

/// Every extension some analyzer handles (without dot).
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    "py", "js", "jsx", "mjs", "cjs", "ts", "mts", "cts", "tsx",
];

/// Register all available language analyzers.
///
/// Idempotent; lookups call it on demand.
pub fn register_analyzers() {
    if REGISTERED.swap(true, Ordering::SeqCst) {
        return;
    }

    PYTHON_ANALYZER.get_or_init(PythonAnalyzer::new);
    JAVASCRIPT_ANALYZER.get_or_init(ScriptAnalyzer::javascript);
    TYPESCRIPT_ANALYZER.get_or_init(ScriptAnalyzer::typescript);
    TSX_ANALYZER.get_or_init(ScriptAnalyzer::tsx);
}

/// Get the JavaScript/TypeScript analyzer for the given file extension.
pub fn get_script_analyzer(ext: &str) -> Option<&'static ScriptAnalyzer> {
    match ext {
        "js" | "jsx" | "mjs" | "cjs" => {
            Some(JAVASCRIPT_ANALYZER.get_or_init(ScriptAnalyzer::javascript))
        }
        "ts" | "mts" | "cts" => Some(TYPESCRIPT_ANALYZER.get_or_init(ScriptAnalyzer::typescript)),
        "tsx" => Some(TSX_ANALYZER.get_or_init(ScriptAnalyzer::tsx)),
        _ => None,
    }
}

/// Get an analyzer for the given file extension.
///
/// Returns None if no analyzer is registered for the extension.
pub fn get_analyzer(ext: &str) -> Option<&'static dyn LanguageAnalyzer> {
    register_analyzers();

    match ext {
        "py" => PYTHON_ANALYZER.get().map(|a| a as &'static dyn LanguageAnalyzer),
        _ => get_script_analyzer(ext).map(|a| a as &'static dyn LanguageAnalyzer),
    }
}

/// Whether some analyzer handles files with this extension.
pub fn is_supported_extension(ext: &str) -> bool {
    SUPPORTED_EXTENSIONS.contains(&ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_supported_extension_has_an_analyzer() {
        for ext in SUPPORTED_EXTENSIONS {
            let analyzer = get_analyzer(ext)
                .unwrap_or_else(|| panic!("no analyzer for .{}", ext));
            assert!(analyzer.handles_extension(ext), "{} should handle .{}", analyzer.language_id(), ext);
        }
    }

    #[test]
    fn test_unsupported_extension() {
        assert!(get_analyzer("rs").is_none());
        assert!(get_script_analyzer("py").is_none());
        assert!(!is_supported_extension("md"));
    }
}

//! Core traits for skeleton extraction.

use std::path::Path;

use super::Skeleton;

/// Holds a parsed tree-sitter tree and associated metadata.
///
/// Kept separate from the skeleton so one parse can feed several passes
/// (skeleton extraction, signature extraction).
pub struct ParsedFile {
    /// The tree-sitter parse tree.
    pub tree: tree_sitter::Tree,
    /// Source bytes the tree was parsed from.
    pub source: Vec<u8>,
    /// Path of the parsed file, used in error messages.
    pub path: String,
}

impl ParsedFile {
    /// Get text for a tree-sitter node.
    pub fn node_text(&self, node: tree_sitter::Node) -> &str {
        node.utf8_text(&self.source).unwrap_or("")
    }

    /// Text of the named field `field` on `node`, if present.
    pub fn field_text(&self, node: tree_sitter::Node, field: &str) -> Option<&str> {
        node.child_by_field_name(field).map(|n| self.node_text(n))
    }
}

/// 1-indexed start line of a node.
pub fn line_of(node: tree_sitter::Node) -> usize {
    node.start_position().row + 1
}

/// Language-specific analyzer trait.
///
/// # Thread Safety
///
/// tree_sitter::Parser is not Sync, so implementations create a parser
/// per call instead of holding one.
pub trait LanguageAnalyzer: Send + Sync {
    /// Returns the language identifier (e.g., "python", "typescript").
    fn language_id(&self) -> &'static str;

    /// Returns file extensions this analyzer handles (without dot).
    fn file_extensions(&self) -> &'static [&'static str];

    /// Parse a source file into a tree-sitter tree.
    ///
    /// Partial parse errors still produce a tree with ERROR nodes.
    fn parse(&self, path: &Path, source: &[u8]) -> anyhow::Result<ParsedFile>;

    /// Extract the structural skeleton from a parsed file.
    fn extract_skeleton(&self, parsed: &ParsedFile) -> anyhow::Result<Skeleton>;

    /// Check if this analyzer handles the given file extension.
    fn handles_extension(&self, ext: &str) -> bool {
        self.file_extensions().contains(&ext)
    }
}

//! Python language analyzer using tree-sitter.
//!
//! Only module-level statements are inspected; anything nested inside a
//! function or class body is not part of the skeleton.

use std::path::Path;

use tree_sitter::{Language, Node, Parser};

use crate::analysis::traits::line_of;
use crate::analysis::{
    LanguageAnalyzer, ParsedFile, PythonClass, PythonFunction, PythonImport, PythonSkeleton,
    Skeleton,
};

pub struct PythonAnalyzer {
    language: Language,
}

impl PythonAnalyzer {
    pub fn new() -> Self {
        Self {
            language: tree_sitter_python::LANGUAGE.into(),
        }
    }

    fn create_parser(&self) -> anyhow::Result<Parser> {
        let mut parser = Parser::new();
        parser.set_language(&self.language)?;
        Ok(parser)
    }

    fn visit_statement(&self, parsed: &ParsedFile, node: Node, skeleton: &mut PythonSkeleton) {
        match node.kind() {
            "import_statement" => {
                skeleton.imports.extend(self.plain_imports(parsed, node));
            }
            "import_from_statement" | "future_import_statement" => {
                if let Some(import) = self.from_import(parsed, node) {
                    skeleton.imports.push(import);
                }
            }
            "function_definition" => {
                if let Some(func) = self.function(parsed, node, Vec::new()) {
                    skeleton.functions.push(func);
                }
            }
            "class_definition" => {
                if let Some(class) = self.class(parsed, node, Vec::new()) {
                    skeleton.classes.push(class);
                }
            }
            "decorated_definition" => self.decorated(parsed, node, skeleton),
            "expression_statement" => {
                if let Some(name) = self.assigned_name(parsed, node) {
                    skeleton.constants.push(name);
                }
            }
            _ => {}
        }
    }

    /// `import a, b.c as d` yields one entry per module.
    fn plain_imports(&self, parsed: &ParsedFile, node: Node) -> Vec<PythonImport> {
        let mut cursor = node.walk();
        node.children_by_field_name("name", &mut cursor)
            .filter_map(|n| imported_name(parsed, n))
            .map(|module| PythonImport {
                module,
                names: Vec::new(),
            })
            .collect()
    }

    /// `from m import x, y as z` yields a single entry naming `x` and `y`.
    fn from_import(&self, parsed: &ParsedFile, node: Node) -> Option<PythonImport> {
        let module = if node.kind() == "future_import_statement" {
            "__future__".to_string()
        } else {
            parsed.field_text(node, "module_name")?.to_string()
        };

        let mut names: Vec<String> = {
            let mut cursor = node.walk();
            node.children_by_field_name("name", &mut cursor)
                .filter_map(|n| imported_name(parsed, n))
                .collect()
        };

        let mut cursor = node.walk();
        if node
            .named_children(&mut cursor)
            .any(|n| n.kind() == "wildcard_import")
        {
            names.push("*".to_string());
        }

        Some(PythonImport { module, names })
    }

    fn decorated(&self, parsed: &ParsedFile, node: Node, skeleton: &mut PythonSkeleton) {
        let decorators: Vec<String> = {
            let mut cursor = node.walk();
            node.named_children(&mut cursor)
                .filter(|n| n.kind() == "decorator")
                .filter_map(|n| decorator_name(parsed, n))
                .collect()
        };

        let Some(definition) = node.child_by_field_name("definition") else {
            return;
        };

        match definition.kind() {
            "function_definition" => {
                if let Some(func) = self.function(parsed, definition, decorators) {
                    skeleton.functions.push(func);
                }
            }
            "class_definition" => {
                if let Some(class) = self.class(parsed, definition, decorators) {
                    skeleton.classes.push(class);
                }
            }
            _ => {}
        }
    }

    fn function(
        &self,
        parsed: &ParsedFile,
        node: Node,
        decorators: Vec<String>,
    ) -> Option<PythonFunction> {
        let name = parsed.field_text(node, "name")?.to_string();
        let params = parsed
            .field_text(node, "parameters")
            .map(strip_parens)
            .map(collapse_whitespace)
            .unwrap_or_default();

        Some(PythonFunction {
            name,
            line: line_of(node),
            decorators,
            params,
        })
    }

    fn class(&self, parsed: &ParsedFile, node: Node, decorators: Vec<String>) -> Option<PythonClass> {
        let name = parsed.field_text(node, "name")?.to_string();

        let bases = match node.child_by_field_name("superclasses") {
            Some(list) => {
                let mut cursor = list.walk();
                list.named_children(&mut cursor)
                    .filter(|n| n.kind() != "comment")
                    .map(|n| collapse_whitespace(parsed.node_text(n)))
                    .filter(|s| !s.is_empty())
                    .collect()
            }
            None => Vec::new(),
        };

        Some(PythonClass {
            name,
            line: line_of(node),
            decorators,
            bases,
        })
    }

    /// Name bound by a module-level `X = ...`, `X: T = ...` or `X: T`.
    fn assigned_name(&self, parsed: &ParsedFile, node: Node) -> Option<String> {
        let assignment = node.named_child(0)?;
        if assignment.kind() != "assignment" {
            return None;
        }

        let left = assignment.child_by_field_name("left")?;
        if left.kind() != "identifier" {
            return None;
        }

        Some(parsed.node_text(left).to_string())
    }
}

impl Default for PythonAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageAnalyzer for PythonAnalyzer {
    fn language_id(&self) -> &'static str {
        "python"
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["py"]
    }

    fn parse(&self, path: &Path, source: &[u8]) -> anyhow::Result<ParsedFile> {
        let mut parser = self.create_parser()?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| anyhow::anyhow!("failed to parse Python source: {}", path.display()))?;

        Ok(ParsedFile {
            tree,
            source: source.to_vec(),
            path: path.to_string_lossy().to_string(),
        })
    }

    fn extract_skeleton(&self, parsed: &ParsedFile) -> anyhow::Result<Skeleton> {
        let root = parsed.tree.root_node();
        let mut skeleton = PythonSkeleton::default();

        let mut cursor = root.walk();
        for statement in root.named_children(&mut cursor) {
            self.visit_statement(parsed, statement, &mut skeleton);
        }

        Ok(Skeleton::Python(skeleton))
    }
}

/// Module name of an import target, dropping any `as` alias.
fn imported_name(parsed: &ParsedFile, node: Node) -> Option<String> {
    let target = if node.kind() == "aliased_import" {
        node.child_by_field_name("name")?
    } else {
        node
    };
    let text = parsed.node_text(target).trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Dotted callee of a decorator: `@app.route('/api')` -> `app.route`.
fn decorator_name(parsed: &ParsedFile, node: Node) -> Option<String> {
    let mut expr = node.named_child(0)?;
    if expr.kind() == "call" {
        expr = expr.child_by_field_name("function")?;
    }

    let name: String = parsed
        .node_text(expr)
        .chars()
        .skip_while(|c| c.is_whitespace())
        .take_while(|c| c.is_alphanumeric() || *c == '_' || *c == '.')
        .collect();

    (!name.is_empty()).then_some(name)
}

fn strip_parens(text: &str) -> &str {
    let text = text.trim();
    let text = text.strip_prefix('(').unwrap_or(text);
    text.strip_suffix(')').unwrap_or(text)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skeleton_of(source: &str) -> PythonSkeleton {
        let analyzer = PythonAnalyzer::new();
        let parsed = analyzer
            .parse(Path::new("test.py"), source.as_bytes())
            .unwrap();
        match analyzer.extract_skeleton(&parsed).unwrap() {
            Skeleton::Python(s) => s,
            other => panic!("expected python skeleton, got {:?}", other),
        }
    }

    #[test]
    fn test_extract_imports() {
        let source = r#"
import os, sys as system
from collections import OrderedDict
from typing import (
    List,
    Optional as Opt,
)
from . import local_module
from ..pkg.sub import *
"#;
        let skeleton = skeleton_of(source);
        let modules: Vec<_> = skeleton.imports.iter().map(|i| i.module.as_str()).collect();
        assert_eq!(
            modules,
            vec!["os", "sys", "collections", "typing", ".", "..pkg.sub"]
        );

        let typing = &skeleton.imports[3];
        assert_eq!(typing.names, vec!["List".to_string(), "Optional".to_string()]);

        let wildcard = &skeleton.imports[5];
        assert_eq!(wildcard.names, vec!["*".to_string()]);
        assert!(wildcard.is_local());
    }

    #[test]
    fn test_top_level_only() {
        let source = r#"
def outer():
    def inner():
        pass
    CONST = 1

class Holder:
    def method(self):
        pass
"#;
        let skeleton = skeleton_of(source);
        assert_eq!(skeleton.functions.len(), 1);
        assert_eq!(skeleton.functions[0].name, "outer");
        assert_eq!(skeleton.classes.len(), 1);
        assert!(skeleton.constants.is_empty());
    }

    #[test]
    fn test_function_params_and_lines() {
        let source = "import os\n\n@retry(times=3)\n@log\nasync def fetch(url,\n          timeout: int = 30,\n          **kwargs):\n    pass\n";
        let skeleton = skeleton_of(source);
        let fetch = skeleton.find_function("fetch").unwrap();

        assert_eq!(fetch.line, 5, "line should point at def, not decorator");
        assert_eq!(fetch.params, "url, timeout: int = 30, **kwargs");
        assert_eq!(fetch.decorators, vec!["retry".to_string(), "log".to_string()]);
    }

    #[test]
    fn test_class_bases() {
        let source = r#"
class Plain:
    pass

class Child(Base, mixins.Mixin, metaclass=Meta):
    pass
"#;
        let skeleton = skeleton_of(source);
        assert!(skeleton.find_class("Plain").unwrap().bases.is_empty());
        assert_eq!(
            skeleton.find_class("Child").unwrap().bases,
            vec![
                "Base".to_string(),
                "mixins.Mixin".to_string(),
                "metaclass=Meta".to_string()
            ]
        );
    }

    #[test]
    fn test_constants() {
        let source = r#"
MAX = 3
TIMEOUT: int = 30
annotated_only: str
a, b = 1, 2
obj.attr = 5
counter += 1
first = second = 0
if MAX:
    pass
else:
    pass
"#;
        let skeleton = skeleton_of(source);
        assert_eq!(
            skeleton.constants,
            vec![
                "MAX".to_string(),
                "TIMEOUT".to_string(),
                "annotated_only".to_string(),
                "first".to_string()
            ]
        );
    }

    #[test]
    fn test_syntax_errors_keep_parsed_items() {
        let source = "def ok():\n    pass\n\ndef broken(:\n\nclass Fine:\n    pass\n";
        let skeleton = skeleton_of(source);
        assert!(skeleton.find_function("ok").is_some());
    }
}

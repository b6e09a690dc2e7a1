//! JavaScript / TypeScript analyzer using tree-sitter.
//!
//! One analyzer type serves three grammars: JavaScript (with JSX), TypeScript
//! and TSX. Node kinds shared by the grammars are handled identically.
//! Unlike the Python analyzer this one walks the whole tree, so hooks called
//! inside components and helpers declared inside functions are reported.

use std::path::Path;

use streaming_iterator::StreamingIterator;
use tree_sitter::{Language, Node, Parser, Query, QueryCursor};

use crate::analysis::traits::line_of;
use crate::analysis::{
    Component, EffectDeps, Export, ExportKind, HocKind, LanguageAnalyzer, Located, ParsedFile,
    ScriptImport, ScriptSkeleton, Skeleton,
};

/// Tree-sitter query for extracting import statements.
const IMPORT_QUERY: &str = r#"
(import_statement
  source: (string) @import_source
) @import
"#;

pub struct ScriptAnalyzer {
    language: Language,
    language_id: &'static str,
    extensions: &'static [&'static str],
}

impl ScriptAnalyzer {
    /// JavaScript grammar (JSX included) for `.js .jsx .mjs .cjs`.
    pub fn javascript() -> Self {
        Self {
            language: tree_sitter_javascript::LANGUAGE.into(),
            language_id: "javascript",
            extensions: &["js", "jsx", "mjs", "cjs"],
        }
    }

    /// TypeScript grammar for `.ts .mts .cts`.
    pub fn typescript() -> Self {
        Self {
            language: tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            language_id: "typescript",
            extensions: &["ts", "mts", "cts"],
        }
    }

    /// TSX grammar for `.tsx`.
    pub fn tsx() -> Self {
        Self {
            language: tree_sitter_typescript::LANGUAGE_TSX.into(),
            language_id: "tsx",
            extensions: &["tsx"],
        }
    }

    fn create_parser(&self) -> anyhow::Result<Parser> {
        let mut parser = Parser::new();
        parser.set_language(&self.language)?;
        Ok(parser)
    }

    fn extract_imports(&self, parsed: &ParsedFile) -> anyhow::Result<Vec<ScriptImport>> {
        let query = Query::new(&self.language, IMPORT_QUERY)
            .map_err(|e| anyhow::anyhow!("import query for {}: {}", parsed.path, e))?;
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&query, parsed.tree.root_node(), &parsed.source[..]);

        let mut imports = Vec::new();

        while let Some(m) = matches.next() {
            let mut source = None;
            let mut statement = None;

            for capture in m.captures {
                match query.capture_names()[capture.index as usize] {
                    "import_source" => source = Some(unquote(parsed.node_text(capture.node))),
                    "import" => statement = Some(capture.node),
                    _ => {}
                }
            }

            if let (Some(source), Some(node)) = (source, statement) {
                imports.push(ScriptImport {
                    source,
                    specifiers: import_specifiers(parsed, node),
                });
            }
        }

        Ok(imports)
    }

    fn visit(&self, parsed: &ParsedFile, node: Node, skeleton: &mut ScriptSkeleton) {
        match node.kind() {
            "export_statement" => collect_exports(parsed, node, &mut skeleton.exports),
            "function_declaration" | "generator_function_declaration" => {
                if let Some(name) = parsed.field_text(node, "name") {
                    classify_callable(skeleton, name, line_of(node));
                }
            }
            // `export default function Name() {}` may parse as an expression.
            "function_expression" | "function"
                if node.parent().is_some_and(|p| p.kind() == "export_statement") =>
            {
                if let Some(name) = parsed.field_text(node, "name") {
                    classify_callable(skeleton, name, line_of(node));
                }
            }
            "variable_declarator" => self.visit_declarator(parsed, node, skeleton),
            "call_expression" => visit_hook_call(parsed, node, skeleton),
            "class_declaration" | "abstract_class_declaration" => {
                if let Some(name) = parsed.field_text(node, "name") {
                    skeleton.classes.push(Located::new(name, line_of(node)));
                }
            }
            "interface_declaration" => {
                if let Some(name) = parsed.field_text(node, "name") {
                    skeleton.interfaces.push(Located::new(name, line_of(node)));
                }
            }
            "type_alias_declaration" => {
                if let Some(name) = parsed.field_text(node, "name") {
                    skeleton.types.push(Located::new(name, line_of(node)));
                }
            }
            _ => {}
        }
    }

    fn visit_declarator(&self, parsed: &ParsedFile, node: Node, skeleton: &mut ScriptSkeleton) {
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };
        // Destructuring patterns bind no single name.
        if name_node.kind() != "identifier" {
            return;
        }
        let Some(value) = node.child_by_field_name("value") else {
            return;
        };

        let name = parsed.node_text(name_node);
        let line = line_of(node);

        if is_function_value(value) {
            classify_callable(skeleton, name, line);
            return;
        }

        if let Some((hoc, _)) = hoc_call(parsed, value) {
            skeleton.components.push(Component {
                name: name.to_string(),
                line,
                hoc: Some(hoc),
            });
            return;
        }

        if is_create_context(parsed, value) {
            skeleton.contexts.push(Located::new(name, line));
            return;
        }

        skeleton.constants += 1;
    }
}

impl LanguageAnalyzer for ScriptAnalyzer {
    fn language_id(&self) -> &'static str {
        self.language_id
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        self.extensions
    }

    fn parse(&self, path: &Path, source: &[u8]) -> anyhow::Result<ParsedFile> {
        let mut parser = self.create_parser()?;
        let tree = parser.parse(source, None).ok_or_else(|| {
            anyhow::anyhow!(
                "failed to parse {} source: {}",
                self.language_id,
                path.display()
            )
        })?;

        Ok(ParsedFile {
            tree,
            source: source.to_vec(),
            path: path.to_string_lossy().to_string(),
        })
    }

    fn extract_skeleton(&self, parsed: &ParsedFile) -> anyhow::Result<Skeleton> {
        let mut skeleton = ScriptSkeleton {
            imports: self.extract_imports(parsed)?,
            ..Default::default()
        };

        walk_document_order(parsed.tree.root_node(), |node| {
            self.visit(parsed, node, &mut skeleton)
        });

        Ok(Skeleton::Script(skeleton))
    }
}

/// Visit every node in document (pre-)order without recursion.
pub(crate) fn walk_document_order<'t>(root: Node<'t>, mut visit: impl FnMut(Node<'t>)) {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        visit(node);
        let mut cursor = node.walk();
        let children: Vec<_> = node.named_children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }
}

/// PascalCase names are treated as React components.
fn is_pascal_case(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_uppercase() => chars.all(|c| c.is_ascii_alphanumeric()),
        _ => false,
    }
}

pub(crate) fn is_function_value(node: Node) -> bool {
    matches!(
        node.kind(),
        "arrow_function" | "function_expression" | "function" | "generator_function"
    )
}

/// Name of a bare `name(...)` or `React.name(...)` callee.
fn react_callee<'a>(parsed: &'a ParsedFile, call: Node) -> Option<&'a str> {
    if call.kind() != "call_expression" {
        return None;
    }
    let callee = call.child_by_field_name("function")?;
    match callee.kind() {
        "identifier" => Some(parsed.node_text(callee)),
        "member_expression" => {
            let object = callee.child_by_field_name("object")?;
            if object.kind() != "identifier" || parsed.node_text(object) != "React" {
                return None;
            }
            parsed.field_text(callee, "property")
        }
        _ => None,
    }
}

/// Positional arguments of a call, comments skipped.
fn call_arguments(call: Node) -> Vec<Node> {
    match call.child_by_field_name("arguments") {
        Some(args) if args.kind() == "arguments" => {
            let mut cursor = args.walk();
            args.named_children(&mut cursor)
                .filter(|n| n.kind() != "comment")
                .collect()
        }
        _ => Vec::new(),
    }
}

/// A `forwardRef`/`memo`/`lazy` wrapper call and its inline function, if any.
pub(crate) fn hoc_call<'t>(parsed: &ParsedFile, node: Node<'t>) -> Option<(HocKind, Option<Node<'t>>)> {
    let hoc = HocKind::from_name(react_callee(parsed, node)?)?;
    let inner = call_arguments(node)
        .first()
        .copied()
        .filter(|arg| matches!(arg.kind(), "arrow_function" | "function_expression" | "function"));
    Some((hoc, inner))
}

pub(crate) fn is_create_context(parsed: &ParsedFile, node: Node) -> bool {
    react_callee(parsed, node) == Some("createContext")
}

fn classify_callable(skeleton: &mut ScriptSkeleton, name: &str, line: usize) {
    if is_pascal_case(name) {
        skeleton.components.push(Component {
            name: name.to_string(),
            line,
            hoc: None,
        });
    } else {
        skeleton.functions.push(Located::new(name, line));
    }
}

fn visit_hook_call(parsed: &ParsedFile, node: Node, skeleton: &mut ScriptSkeleton) {
    let Some(callee) = node.child_by_field_name("function") else {
        return;
    };
    if callee.kind() != "identifier" {
        return;
    }
    let name = parsed.node_text(callee);
    if !name.starts_with("use") {
        return;
    }

    skeleton.hooks.record(name, line_of(node), || {
        effect_deps(parsed, call_arguments(node).get(1).copied())
    });
}

fn effect_deps(parsed: &ParsedFile, arg: Option<Node>) -> EffectDeps {
    let Some(arg) = arg else {
        return EffectDeps::Missing;
    };
    if arg.kind() != "array" {
        return EffectDeps::Unknown;
    }

    let mut cursor = arg.walk();
    let deps = arg
        .named_children(&mut cursor)
        .filter(|n| n.kind() != "comment")
        .map(|el| match el.kind() {
            "identifier" => parsed.node_text(el).to_string(),
            "member_expression" => member_path(parsed, el).unwrap_or_else(|| "?".to_string()),
            _ => "?".to_string(),
        })
        .collect();
    EffectDeps::List(deps)
}

/// Dotted path of a member expression (`props.user.id`). Non-identifier
/// roots such as `this` are dropped from the path.
fn member_path(parsed: &ParsedFile, node: Node) -> Option<String> {
    let mut parts = Vec::new();
    let mut current = node;
    while current.kind() == "member_expression" {
        if let Some(property) = current.child_by_field_name("property") {
            parts.push(parsed.node_text(property));
        }
        current = current.child_by_field_name("object")?;
    }
    if current.kind() == "identifier" {
        parts.push(parsed.node_text(current));
    }
    parts.reverse();

    let path = parts.join(".");
    (!path.is_empty()).then_some(path)
}

fn import_specifiers(parsed: &ParsedFile, statement: Node) -> Vec<String> {
    let mut specifiers = Vec::new();

    let mut cursor = statement.walk();
    let Some(clause) = statement
        .named_children(&mut cursor)
        .find(|n| n.kind() == "import_clause")
    else {
        return specifiers;
    };

    let mut cursor = clause.walk();
    for part in clause.named_children(&mut cursor) {
        match part.kind() {
            "identifier" => specifiers.push(parsed.node_text(part).to_string()),
            "namespace_import" => {
                let mut inner = part.walk();
                if let Some(local) = part
                    .named_children(&mut inner)
                    .find(|n| n.kind() == "identifier")
                {
                    specifiers.push(format!("* as {}", parsed.node_text(local)));
                };
            }
            "named_imports" => {
                let mut inner = part.walk();
                for spec in part
                    .named_children(&mut inner)
                    .filter(|n| n.kind() == "import_specifier")
                {
                    if let Some(name) = parsed.field_text(spec, "name") {
                        specifiers.push(unquote(name));
                    }
                }
            }
            _ => {}
        }
    }

    specifiers
}

fn collect_exports(parsed: &ParsedFile, node: Node, exports: &mut Vec<Export>) {
    let mut cursor = node.walk();
    let is_default = node.children(&mut cursor).any(|c| c.kind() == "default");

    if is_default {
        let name = match (
            node.child_by_field_name("declaration"),
            node.child_by_field_name("value"),
        ) {
            (Some(decl), _) if decl.kind() == "function_declaration" => {
                parsed.field_text(decl, "name")
            }
            (_, Some(value)) if value.kind() == "identifier" => Some(parsed.node_text(value)),
            (_, Some(value)) if matches!(value.kind(), "function_expression" | "function") => {
                parsed.field_text(value, "name")
            }
            _ => None,
        };
        if let Some(name) = name {
            exports.push(Export {
                name: name.to_string(),
                kind: ExportKind::Default,
            });
        }
        return;
    }

    if let Some(decl) = node.child_by_field_name("declaration") {
        match decl.kind() {
            "function_declaration" | "generator_function_declaration" => {
                if let Some(name) = parsed.field_text(decl, "name") {
                    exports.push(Export {
                        name: name.to_string(),
                        kind: ExportKind::Named,
                    });
                }
            }
            "lexical_declaration" | "variable_declaration" => {
                let mut inner = decl.walk();
                for declarator in decl
                    .named_children(&mut inner)
                    .filter(|n| n.kind() == "variable_declarator")
                {
                    if let Some(name_node) = declarator.child_by_field_name("name") {
                        if name_node.kind() == "identifier" {
                            exports.push(Export {
                                name: parsed.node_text(name_node).to_string(),
                                kind: ExportKind::Named,
                            });
                        }
                    }
                }
            }
            _ => {}
        }
    }

    let mut cursor = node.walk();
    if let Some(clause) = node
        .named_children(&mut cursor)
        .find(|n| n.kind() == "export_clause")
    {
        let mut inner = clause.walk();
        for spec in clause
            .named_children(&mut inner)
            .filter(|n| n.kind() == "export_specifier")
        {
            let exported = parsed
                .field_text(spec, "alias")
                .or_else(|| parsed.field_text(spec, "name"));
            if let Some(name) = exported {
                exports.push(Export {
                    name: unquote(name),
                    kind: ExportKind::Named,
                });
            }
        }
    };
}

fn unquote(text: &str) -> String {
    text.trim_matches(|c| c == '"' || c == '\'' || c == '`')
        .to_string()
}

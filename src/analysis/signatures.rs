//! One-line call signatures for JavaScript/TypeScript declarations.
//!
//! Signatures complement the skeleton: where the skeleton only says that
//! `fetchUser` exists at line 12, the signature says
//! `async function fetchUser(id: string): User`.

use std::collections::HashSet;

use tree_sitter::Node;

use super::languages::{hoc_call, is_create_context, is_function_value, walk_document_order};
use super::traits::line_of;
use super::ParsedFile;

/// A rendered declaration signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub name: String,
    pub signature: String,
    pub line: usize,
}

/// Extract signatures from a parsed JavaScript/TypeScript file.
///
/// Each name is reported once (first occurrence wins); results are ordered
/// by line.
pub fn extract_signatures(parsed: &ParsedFile) -> Vec<Signature> {
    let mut signatures = Vec::new();
    let mut seen = HashSet::new();

    walk_document_order(parsed.tree.root_node(), |node| match node.kind() {
        "function_declaration" | "generator_function_declaration" => {
            let Some(name) = parsed.field_text(node, "name") else {
                return;
            };
            if !seen.insert(name.to_string()) {
                return;
            }
            signatures.push(Signature {
                name: name.to_string(),
                signature: format!(
                    "{}function {}({}){}",
                    async_prefix(node),
                    name,
                    params_string(parsed, node),
                    return_type(parsed, node)
                ),
                line: line_of(node),
            });
        }
        "variable_declarator" => {
            if let Some(signature) = declarator_signature(parsed, node, &seen) {
                seen.insert(signature.name.clone());
                signatures.push(signature);
            }
        }
        _ => {}
    });

    signatures.sort_by_key(|s| s.line);
    signatures
}

fn declarator_signature(
    parsed: &ParsedFile,
    node: Node,
    seen: &HashSet<String>,
) -> Option<Signature> {
    let name_node = node.child_by_field_name("name")?;
    if name_node.kind() != "identifier" {
        return None;
    }
    let name = parsed.node_text(name_node);
    if seen.contains(name) {
        return None;
    }
    let value = node.child_by_field_name("value")?;
    let line = line_of(node);

    let signature = if is_function_value(value) {
        format!(
            "{}const {} = ({}){} => ...",
            async_prefix(value),
            name,
            params_string(parsed, value),
            return_type(parsed, value)
        )
    } else if let Some((hoc, inner)) = hoc_call(parsed, value) {
        let params = inner
            .map(|f| params_string(parsed, f))
            .unwrap_or_else(|| "?".to_string());
        format!("const {} = {}(({}) => ...)", name, hoc, params)
    } else if is_create_context(parsed, value) {
        format!("const {} = createContext(...)", name)
    } else {
        return None;
    };

    Some(Signature {
        name: name.to_string(),
        signature,
        line,
    })
}

fn async_prefix(node: Node) -> &'static str {
    let mut cursor = node.walk();
    let is_async = node.children(&mut cursor).any(|c| c.kind() == "async");
    if is_async {
        "async "
    } else {
        ""
    }
}

/// Comma-separated parameter summary of a function-like node.
fn params_string(parsed: &ParsedFile, func: Node) -> String {
    // `x => ...` carries a single bare parameter.
    if let Some(single) = func.child_by_field_name("parameter") {
        return param_string(parsed, single);
    }
    let Some(params) = func.child_by_field_name("parameters") else {
        return String::new();
    };

    let mut cursor = params.walk();
    params
        .named_children(&mut cursor)
        .filter(|n| n.kind() != "comment")
        .map(|p| param_string(parsed, p))
        .collect::<Vec<_>>()
        .join(", ")
}

fn param_string(parsed: &ParsedFile, param: Node) -> String {
    match param.kind() {
        "identifier" | "this" => parsed.node_text(param).to_string(),
        "assignment_pattern" => match param.child_by_field_name("left") {
            Some(left) if left.kind() == "identifier" => {
                format!("{} = ...", parsed.node_text(left))
            }
            _ => "?".to_string(),
        },
        "rest_pattern" => rest_string(parsed, param),
        "object_pattern" => "{ ... }".to_string(),
        "array_pattern" => "[ ... ]".to_string(),
        "required_parameter" | "optional_parameter" => typed_param_string(parsed, param),
        _ => "?".to_string(),
    }
}

/// TypeScript parameter: `pattern[: type][= value]`.
fn typed_param_string(parsed: &ParsedFile, param: Node) -> String {
    let Some(pattern) = param.child_by_field_name("pattern") else {
        return "?".to_string();
    };

    if param.child_by_field_name("value").is_some() {
        return match pattern.kind() {
            "identifier" => format!("{} = ...", parsed.node_text(pattern)),
            _ => "?".to_string(),
        };
    }

    match pattern.kind() {
        "identifier" | "this" => {
            let type_suffix = param
                .child_by_field_name("type")
                .map(|t| format!(": {}", annotation_type_name(parsed, t)))
                .unwrap_or_default();
            format!("{}{}", parsed.node_text(pattern), type_suffix)
        }
        "rest_pattern" => rest_string(parsed, pattern),
        "object_pattern" => "{ ... }".to_string(),
        "array_pattern" => "[ ... ]".to_string(),
        _ => "?".to_string(),
    }
}

fn rest_string(parsed: &ParsedFile, rest: Node) -> String {
    let mut cursor = rest.walk();
    let name = rest
        .named_children(&mut cursor)
        .find(|n| n.kind() == "identifier")
        .map(|n| parsed.node_text(n))
        .unwrap_or("args");
    format!("...{}", name)
}

fn return_type(parsed: &ParsedFile, func: Node) -> String {
    func.child_by_field_name("return_type")
        .map(|t| format!(": {}", annotation_type_name(parsed, t)))
        .unwrap_or_default()
}

/// Type name of a `: T` annotation node.
fn annotation_type_name(parsed: &ParsedFile, annotation: Node) -> String {
    match annotation.named_child(0) {
        Some(inner) if annotation.kind() == "type_annotation" => type_name(parsed, inner),
        _ => type_name(parsed, annotation),
    }
}

/// Short rendering of a TypeScript type. Anything not listed is `unknown`.
fn type_name(parsed: &ParsedFile, node: Node) -> String {
    match node.kind() {
        "predefined_type" | "literal_type" => {
            let text = parsed.node_text(node).trim();
            match text {
                "string" | "number" | "boolean" | "void" | "any" | "null" | "undefined" => {
                    text.to_string()
                }
                _ => "unknown".to_string(),
            }
        }
        "array_type" => match node.named_child(0) {
            Some(element) => format!("{}[]", type_name(parsed, element)),
            None => "unknown".to_string(),
        },
        "type_identifier" => parsed.node_text(node).to_string(),
        "generic_type" => match node.child_by_field_name("name") {
            Some(name) if name.kind() == "type_identifier" => parsed.node_text(name).to_string(),
            _ => "unknown".to_string(),
        },
        "union_type" => {
            let mut members = Vec::new();
            flatten_union(node, &mut members);
            members
                .into_iter()
                .map(|m| type_name(parsed, m))
                .collect::<Vec<_>>()
                .join(" | ")
        }
        "function_type" => "(...) => ...".to_string(),
        "parenthesized_type" => match node.named_child(0) {
            Some(inner) => type_name(parsed, inner),
            None => "unknown".to_string(),
        },
        _ => "unknown".to_string(),
    }
}

/// The grammar nests unions left-deep; collect the leaves in order.
fn flatten_union<'t>(node: Node<'t>, out: &mut Vec<Node<'t>>) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() == "union_type" {
            flatten_union(child, out);
        } else {
            out.push(child);
        }
    }
}

/// Render signatures as indented prompt lines.
pub fn format_signatures(signatures: &[Signature]) -> String {
    signatures
        .iter()
        .map(|s| format!("    {}  // line {}", s.signature, s.line))
        .collect::<Vec<_>>()
        .join("\n")
}

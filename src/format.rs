//! Rendering skeletons into compact prompt text.
//!
//! The output is deliberately terse: one line per category, items as
//! `name:line`, external imports collapsed into a count.

use crate::analysis::{
    format_signatures, EffectDeps, ExportKind, Located, PythonSkeleton, ScriptSkeleton, Signature,
    Skeleton,
};

/// Default number of Python constants listed before `+N more`.
pub const DEFAULT_MAX_LISTED_CONSTANTS: usize = 5;

/// Knobs for skeleton rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub max_listed_constants: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            max_listed_constants: DEFAULT_MAX_LISTED_CONSTANTS,
        }
    }
}

/// One file's contribution to the compacted output.
#[derive(Debug, Clone)]
pub struct FileResult {
    /// Path relative to the project root, `/`-separated.
    pub relative_path: String,
    pub skeleton: Option<Skeleton>,
    pub signatures: Vec<Signature>,
}

/// Rough token estimate: one token per four characters.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}

/// Human-readable token count: `1.2M`, `3.4K` or the plain number.
pub fn format_token_count(count: usize) -> String {
    if count >= 1_000_000 {
        format!("{}M", one_decimal(count as f64 / 1_000_000.0))
    } else if count >= 1_000 {
        format!("{}K", one_decimal(count as f64 / 1_000.0))
    } else {
        count.to_string()
    }
}

/// One decimal place with ties rounded away from zero (`1.25` -> `1.3`).
pub fn one_decimal(value: f64) -> String {
    format!("{:.1}", (value * 10.0).round() / 10.0)
}

/// Local timestamp used in generated file names.
pub fn date_stamp() -> String {
    chrono::Local::now().format("%Y-%m-%d_%H-%M-%S").to_string()
}

/// Render a skeleton of either language.
pub fn render_skeleton(skeleton: &Skeleton, options: &RenderOptions) -> String {
    match skeleton {
        Skeleton::Python(s) => render_python(s, options),
        Skeleton::Script(s) => render_script(s),
    }
}

/// `imports: 3 ext, ./a, ./b` from a list of module specifiers.
fn imports_line<'a>(modules: impl Iterator<Item = &'a str>) -> Option<String> {
    let modules: Vec<&str> = modules.collect();
    if modules.is_empty() {
        return None;
    }

    let local: Vec<&str> = modules.iter().copied().filter(|m| m.starts_with('.')).collect();
    let external = modules.len() - local.len();

    let mut parts = Vec::with_capacity(local.len() + 1);
    if external > 0 {
        parts.push(format!("{} ext", external));
    }
    parts.extend(local.into_iter().map(str::to_string));

    Some(format!("imports: {}", parts.join(", ")))
}

fn located_list(items: &[Located]) -> String {
    items
        .iter()
        .map(Located::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn render_python(skeleton: &PythonSkeleton, options: &RenderOptions) -> String {
    let mut lines = Vec::new();

    if let Some(line) = imports_line(skeleton.imports.iter().map(|i| i.module.as_str())) {
        lines.push(line);
    }

    if !skeleton.classes.is_empty() {
        let classes = skeleton
            .classes
            .iter()
            .map(|c| {
                let mut parts = vec![c.name.clone()];
                if let Some(deco) = c.decorators.first() {
                    parts.push(format!("@{}", deco));
                }
                if !c.bases.is_empty() {
                    parts.push(format!("({})", c.bases.join(",")));
                }
                format!("{}:{}", parts.join(" "), c.line)
            })
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!("classes: {}", classes));
    }

    if !skeleton.functions.is_empty() {
        let functions = skeleton
            .functions
            .iter()
            .map(|f| {
                let deco = f
                    .decorators
                    .first()
                    .map(|d| format!("@{} ", d))
                    .unwrap_or_default();
                format!("{}{}({}):{}", deco, f.name, f.params, f.line)
            })
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!("fn: {}", functions));
    }

    if !skeleton.constants.is_empty() {
        let names = &skeleton.constants;
        let limit = options.max_listed_constants;
        if names.len() > limit {
            let shown = names[..limit].join(", ");
            let more = format!("+{} more", names.len() - limit);
            if shown.is_empty() {
                lines.push(format!("const: {}", more));
            } else {
                lines.push(format!("const: {} {}", shown, more));
            }
        } else {
            lines.push(format!("const: {}", names.join(", ")));
        }
    }

    lines.join("\n")
}

pub fn render_script(skeleton: &ScriptSkeleton) -> String {
    let mut lines = Vec::new();

    if let Some(line) = imports_line(skeleton.imports.iter().map(|i| i.source.as_str())) {
        lines.push(line);
    }

    if !skeleton.exports.is_empty() {
        let exports = skeleton
            .exports
            .iter()
            .map(|e| match e.kind {
                ExportKind::Default => format!("{}*", e.name),
                ExportKind::Named => e.name.clone(),
            })
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!("exports: {}", exports));
    }

    if !skeleton.components.is_empty() {
        let components = skeleton
            .components
            .iter()
            .map(|c| match c.hoc {
                Some(hoc) => format!("{}({}):{}", c.name, hoc, c.line),
                None => format!("{}:{}", c.name, c.line),
            })
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!("components: {}", components));
    }

    if !skeleton.contexts.is_empty() {
        lines.push(format!("contexts: {}", located_list(&skeleton.contexts)));
    }

    if !skeleton.functions.is_empty() {
        lines.push(format!("fn: {}", located_list(&skeleton.functions)));
    }

    let hooks = &skeleton.hooks;
    let mut hook_parts = Vec::new();
    for (name, count) in [
        ("useState", hooks.use_state),
        ("useCallback", hooks.use_callback),
        ("useMemo", hooks.use_memo),
        ("useRef", hooks.use_ref),
    ] {
        if count > 0 {
            hook_parts.push(format!("{}({})", name, count));
        }
    }
    hook_parts.extend(hooks.custom.iter().cloned());
    hook_parts.extend(hooks.use_effect.iter().map(|effect| {
        let deps = match &effect.deps {
            EffectDeps::Missing => "∞".to_string(),
            EffectDeps::Unknown => "?".to_string(),
            EffectDeps::List(deps) => format!("[{}]", deps.join(",")),
        };
        format!("useEffect({}):{}", deps, effect.line)
    }));
    if !hook_parts.is_empty() {
        lines.push(format!("hooks: {}", hook_parts.join(", ")));
    }

    if !skeleton.classes.is_empty() {
        lines.push(format!("classes: {}", located_list(&skeleton.classes)));
    }

    if !skeleton.interfaces.is_empty() || !skeleton.types.is_empty() {
        let types = skeleton
            .interfaces
            .iter()
            .chain(skeleton.types.iter())
            .map(Located::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!("types: {}", types));
    }

    lines.join("\n")
}

/// Render every file as a `## path` section, ordered by path.
pub fn format_output(results: &mut [FileResult], options: &RenderOptions) -> String {
    results.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

    let mut lines = Vec::new();
    for result in results.iter() {
        lines.push(format!("## {}", result.relative_path));

        if let Some(skeleton) = &result.skeleton {
            let rendered = render_skeleton(skeleton, options);
            if !rendered.is_empty() {
                lines.push(rendered);
            }
        }

        if !result.signatures.is_empty() {
            lines.push(format_signatures(&result.signatures));
        }
    }

    lines.join("\n")
}

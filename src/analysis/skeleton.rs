//! Skeleton structures extracted from source files.
//!
//! A skeleton is the token-cheap outline of a file: what it imports, what it
//! declares and where. Python and script (JavaScript/TypeScript) files have
//! different shapes, so each gets its own struct.

use std::fmt;

/// The outline of one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Skeleton {
    Python(PythonSkeleton),
    Script(ScriptSkeleton),
}

impl Skeleton {
    pub fn as_python(&self) -> Option<&PythonSkeleton> {
        match self {
            Skeleton::Python(s) => Some(s),
            Skeleton::Script(_) => None,
        }
    }

    pub fn as_script(&self) -> Option<&ScriptSkeleton> {
        match self {
            Skeleton::Script(s) => Some(s),
            Skeleton::Python(_) => None,
        }
    }
}

// =============================================================================
// Python
// =============================================================================

/// A top-level `import` or `from ... import` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PythonImport {
    /// Module path, with leading dots kept for relative imports.
    pub module: String,
    /// Imported names for `from` imports; empty for plain `import`.
    pub names: Vec<String>,
}

impl PythonImport {
    pub fn is_local(&self) -> bool {
        self.module.starts_with('.')
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PythonFunction {
    pub name: String,
    /// Line of the `def` keyword (1-indexed).
    pub line: usize,
    pub decorators: Vec<String>,
    /// Parameter list text without the parentheses, whitespace collapsed.
    pub params: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PythonClass {
    pub name: String,
    pub line: usize,
    pub decorators: Vec<String>,
    pub bases: Vec<String>,
}

/// Top-level outline of a Python module.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PythonSkeleton {
    pub imports: Vec<PythonImport>,
    pub functions: Vec<PythonFunction>,
    pub classes: Vec<PythonClass>,
    pub constants: Vec<String>,
}

impl PythonSkeleton {
    pub fn find_class(&self, name: &str) -> Option<&PythonClass> {
        self.classes.iter().find(|c| c.name == name)
    }

    pub fn find_function(&self, name: &str) -> Option<&PythonFunction> {
        self.functions.iter().find(|f| f.name == name)
    }
}

// =============================================================================
// JavaScript / TypeScript
// =============================================================================

/// A named item at a source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Located {
    pub name: String,
    pub line: usize,
}

impl Located {
    pub fn new(name: impl Into<String>, line: usize) -> Self {
        Self {
            name: name.into(),
            line,
        }
    }
}

impl fmt::Display for Located {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.line)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptImport {
    /// Module specifier with quotes removed.
    pub source: String,
    pub specifiers: Vec<String>,
}

impl ScriptImport {
    pub fn is_local(&self) -> bool {
        self.source.starts_with('.')
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Default,
    Named,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    pub name: String,
    pub kind: ExportKind,
}

/// React higher-order component wrappers recognized on declarators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HocKind {
    ForwardRef,
    Memo,
    Lazy,
}

impl HocKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "forwardRef" => Some(HocKind::ForwardRef),
            "memo" => Some(HocKind::Memo),
            "lazy" => Some(HocKind::Lazy),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HocKind::ForwardRef => "forwardRef",
            HocKind::Memo => "memo",
            HocKind::Lazy => "lazy",
        }
    }
}

impl fmt::Display for HocKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub name: String,
    pub line: usize,
    pub hoc: Option<HocKind>,
}

/// Dependency array of a `useEffect` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EffectDeps {
    /// No dependency argument: runs after every render.
    Missing,
    /// Dependency argument is not an array literal.
    Unknown,
    /// Array literal; non-path elements render as `?`.
    List(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectHook {
    pub line: usize,
    pub deps: EffectDeps,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HookUsage {
    pub use_state: usize,
    pub use_effect: Vec<EffectHook>,
    pub use_callback: usize,
    pub use_memo: usize,
    pub use_ref: usize,
    /// Other `use*` hooks, unique, in first-seen order.
    pub custom: Vec<String>,
}

impl HookUsage {
    /// Record one call of the hook named `name`.
    pub fn record(&mut self, name: &str, line: usize, deps: impl FnOnce() -> EffectDeps) {
        match name {
            "useEffect" => self.use_effect.push(EffectHook { line, deps: deps() }),
            "useState" => self.use_state += 1,
            "useCallback" => self.use_callback += 1,
            "useMemo" => self.use_memo += 1,
            "useRef" => self.use_ref += 1,
            _ => {
                if !self.custom.iter().any(|h| h == name) {
                    self.custom.push(name.to_string());
                }
            }
        }
    }
}

/// Whole-tree outline of a JavaScript or TypeScript module.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptSkeleton {
    pub imports: Vec<ScriptImport>,
    pub exports: Vec<Export>,
    pub components: Vec<Component>,
    pub contexts: Vec<Located>,
    pub functions: Vec<Located>,
    pub hooks: HookUsage,
    pub constants: usize,
    pub classes: Vec<Located>,
    pub interfaces: Vec<Located>,
    pub types: Vec<Located>,
}

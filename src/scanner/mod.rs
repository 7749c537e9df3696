mod imports;
mod resolve;

use std::path::{Component, Path, PathBuf};
use tracing::{debug, trace};
use tree_sitter::{Language, Node, Parser};

use crate::error::{IoError, ScanError};
pub use imports::{resolve_relative, ImportMap};
pub use resolve::{ProjectIndex, TestDeclaration};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Statements that can hold module-level class definitions in their blocks.
const MODULE_LEVEL_CONTAINERS: &[&str] = &[
    "if_statement",
    "elif_clause",
    "else_clause",
    "try_statement",
    "except_clause",
    "except_group_clause",
    "finally_clause",
    "with_statement",
    "block",
    "ERROR",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodOutline {
    pub name: String,
    /// 1-based line of the `def` keyword.
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassOutline {
    pub name: String,
    /// Base expressions as written, e.g. `unittest.TestCase` or `Base`.
    pub bases: Vec<String>,
    pub line: usize,
    pub methods: Vec<MethodOutline>,
}

impl ClassOutline {
    pub fn method(&self, name: &str) -> Option<&MethodOutline> {
        self.methods.iter().find(|m| m.name == name)
    }
}

/// Structural facts extracted from one source file.
#[derive(Debug, Clone)]
pub struct ModuleOutline {
    pub path: PathBuf,
    /// Dotted module path relative to the project home.
    pub module: String,
    pub imports: ImportMap,
    pub classes: Vec<ClassOutline>,
    /// The file did not parse cleanly; `classes` holds what was recognized.
    pub has_syntax_errors: bool,
    /// Byte offset of the first invalid UTF-8 sequence when the file was decoded with
    /// replacement characters.
    pub invalid_utf8_at: Option<usize>,
}

impl ModuleOutline {
    pub fn class(&self, name: &str) -> Option<&ClassOutline> {
        self.classes.iter().find(|c| c.name == name)
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }
}

/// Parses Python sources into [`ModuleOutline`]s.
///
/// The scanner holds only the grammar; a fresh parser is created per file so one scanner can
/// be shared across worker threads.
#[derive(Clone)]
pub struct SourceScanner {
    language: Language,
}

impl SourceScanner {
    pub fn new() -> Self {
        Self {
            language: tree_sitter_python::LANGUAGE.into(),
        }
    }

    pub fn scan_file(&self, path: &Path, module: &str) -> Result<ModuleOutline, ScanError> {
        let bytes = std::fs::read(path)
            .map_err(|e| ScanError::read(path, IoError::read_error(path, e)))?;
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes);
        match std::str::from_utf8(bytes) {
            Ok(source) => self.scan_source(path, module, source),
            Err(e) => {
                // Replacement characters keep every line where it was.
                let source = String::from_utf8_lossy(bytes);
                let mut outline = self.scan_source(path, module, &source)?;
                outline.invalid_utf8_at = Some(e.valid_up_to());
                Ok(outline)
            }
        }
    }

    pub fn scan_source(
        &self,
        path: &Path,
        module: &str,
        source: &str,
    ) -> Result<ModuleOutline, ScanError> {
        trace!(path = %path.display(), module, "scanning source");

        let mut parser = Parser::new();
        parser
            .set_language(&self.language)
            .map_err(|_| ScanError::language_setup_failed("python"))?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| ScanError::parse_failed(path))?;
        let root = tree.root_node();
        let bytes = source.as_bytes();

        let imports = imports::extract(root, bytes, &package_of(path, module));

        let mut classes = Vec::new();
        collect_classes(root, bytes, &mut classes);

        let outline = ModuleOutline {
            path: path.to_path_buf(),
            module: module.to_string(),
            imports,
            classes,
            has_syntax_errors: root.has_error(),
            invalid_utf8_at: None,
        };

        debug!(
            path = %path.display(),
            classes = outline.class_count(),
            imports = outline.imports.len(),
            syntax_errors = outline.has_syntax_errors,
            "scan complete"
        );
        Ok(outline)
    }
}

impl Default for SourceScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Dotted module path of `file` relative to `home`: `tests/unit/test_a.py` is
/// `tests.unit.test_a`, and a package's `__init__.py` names the package itself.
pub fn module_name(home: &Path, file: &Path) -> String {
    let relative = file.strip_prefix(home).unwrap_or(file).with_extension("");
    let mut parts: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    if parts.len() > 1 && parts.last().is_some_and(|last| last == "__init__") {
        parts.pop();
    }
    parts.join(".")
}

/// Package that relative imports inside `module` resolve against.
fn package_of(path: &Path, module: &str) -> String {
    if path.file_stem().is_some_and(|stem| stem == "__init__") {
        return module.to_string();
    }
    match module.rsplit_once('.') {
        Some((package, _)) => package.to_string(),
        None => String::new(),
    }
}

fn collect_classes(node: Node, source: &[u8], classes: &mut Vec<ClassOutline>) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "class_definition" => {
                if let Some(class) = class_outline(child, source) {
                    classes.push(class);
                }
            }
            "decorated_definition" => match child.child_by_field_name("definition") {
                Some(def) if def.kind() == "class_definition" => {
                    if let Some(class) = class_outline(def, source) {
                        classes.push(class);
                    }
                }
                Some(def) => skip_nested_classes(def, source),
                None => {}
            },
            "function_definition" => skip_nested_classes(child, source),
            kind if MODULE_LEVEL_CONTAINERS.contains(&kind) => {
                collect_classes(child, source, classes)
            }
            _ => {}
        }
    }
}

fn class_outline(node: Node, source: &[u8]) -> Option<ClassOutline> {
    let name = text(node.child_by_field_name("name")?, source);
    let body = node.child_by_field_name("body")?;

    let bases = node
        .child_by_field_name("superclasses")
        .map(|list| base_expressions(list, source))
        .unwrap_or_default();

    let mut methods: Vec<MethodOutline> = Vec::new();
    let mut cursor = body.walk();
    for child in body.children(&mut cursor) {
        let def = match child.kind() {
            "function_definition" => child,
            "decorated_definition" => match child.child_by_field_name("definition") {
                Some(def) => def,
                None => continue,
            },
            "class_definition" => {
                log_skipped_class(child, source);
                continue;
            }
            _ => continue,
        };

        match def.kind() {
            "function_definition" => {
                if let Some(name_node) = def.child_by_field_name("name") {
                    let name = text(name_node, source);
                    let line = def.start_position().row + 1;
                    // A later `def` rebinds the name but keeps its place in the body.
                    match methods.iter_mut().find(|m| m.name == name) {
                        Some(earlier) => {
                            trace!(method = %name, from = earlier.line, to = line, "method redefined");
                            earlier.line = line;
                        }
                        None => methods.push(MethodOutline { name, line }),
                    }
                }
                skip_nested_classes(def, source);
            }
            "class_definition" => log_skipped_class(def, source),
            _ => {}
        }
    }

    Some(ClassOutline {
        name,
        bases,
        line: node.start_position().row + 1,
        methods,
    })
}

fn base_expressions(list: Node, source: &[u8]) -> Vec<String> {
    let mut bases = Vec::new();
    let mut cursor = list.walk();
    for arg in list.named_children(&mut cursor) {
        let expression = match arg.kind() {
            "identifier" | "attribute" => arg,
            // Generic[T] style bases resolve through their value
            "subscript" => match arg.child_by_field_name("value") {
                Some(value) => value,
                None => continue,
            },
            _ => continue,
        };
        bases.push(text(expression, source));
    }
    bases
}

fn skip_nested_classes(node: Node, source: &[u8]) {
    if node.kind() == "class_definition" {
        log_skipped_class(node, source);
        return;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        skip_nested_classes(child, source);
    }
}

fn log_skipped_class(node: Node, source: &[u8]) {
    if let Some(name) = node.child_by_field_name("name") {
        debug!(
            class = %text(name, source),
            line = node.start_position().row + 1,
            "skipping nested class"
        );
    }
}

fn text(node: Node, source: &[u8]) -> String {
    node.utf8_text(source)
        .unwrap_or("")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

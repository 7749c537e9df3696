//! Python import extraction
//!
//! Handles Python import statements at module scope (including inside `if`/`try` blocks):
//! - Simple: `import unittest` binds `unittest`
//! - Dotted: `import unittest.mock` binds `unittest`
//! - Aliased: `import unittest as ut` binds `ut`
//! - From: `from unittest import TestCase`
//! - From aliased: `from unittest import TestCase as TC`
//! - Relative: `from .base import BaseTest`
//! - Wildcard: `from helpers import *`

use super::{resolve_relative, ImportMap};
use tree_sitter::Node;

/// Collects module-scope bindings below `root`. `package` is the dotted package that
/// relative imports are resolved against.
pub fn extract(root: Node, source: &[u8], package: &str) -> ImportMap {
    let mut imports = ImportMap::new();
    extract_recursive(root, source, package, &mut imports);
    imports
}

fn extract_recursive(node: Node, source: &[u8], package: &str, imports: &mut ImportMap) {
    match node.kind() {
        "import_statement" => process_import_statement(node, source, imports),
        "import_from_statement" => process_from_import(node, source, package, imports),
        // Function and class bodies have their own scopes.
        "function_definition" | "class_definition" | "decorated_definition" => {}
        _ => {
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                extract_recursive(child, source, package, imports);
            }
        }
    }
}

fn process_import_statement(node: Node, source: &[u8], imports: &mut ImportMap) {
    let mut cursor = node.walk();
    for name in node.children_by_field_name("name", &mut cursor) {
        match name.kind() {
            "dotted_name" => {
                let module = get_node_text(&name, source);
                let head = module.split('.').next().unwrap_or(&module).to_string();
                imports.insert(head.clone(), head);
            }
            "aliased_import" => {
                let Some(module) = name.child_by_field_name("name") else {
                    continue;
                };
                let Some(alias) = name.child_by_field_name("alias") else {
                    continue;
                };
                imports.insert(get_node_text(&alias, source), get_node_text(&module, source));
            }
            _ => {}
        }
    }
}

fn process_from_import(node: Node, source: &[u8], package: &str, imports: &mut ImportMap) {
    let Some(module_node) = node.child_by_field_name("module_name") else {
        return;
    };
    let reference = get_node_text(&module_node, source);
    let Some(base) = resolve_relative(&reference, package) else {
        return;
    };

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() == "wildcard_import" {
            imports.insert_wildcard(base.clone());
        }
    }

    let mut cursor = node.walk();
    for name in node.children_by_field_name("name", &mut cursor) {
        match name.kind() {
            "dotted_name" | "identifier" => {
                let imported = get_node_text(&name, source);
                imports.insert(imported.clone(), format!("{base}.{imported}"));
            }
            "aliased_import" => {
                let Some(imported) = name.child_by_field_name("name") else {
                    continue;
                };
                let Some(alias) = name.child_by_field_name("alias") else {
                    continue;
                };
                let imported = get_node_text(&imported, source);
                imports.insert(get_node_text(&alias, source), format!("{base}.{imported}"));
            }
            _ => {}
        }
    }
}

/// Node text with all whitespace removed, so `from . base import X` reads as `.base`.
fn get_node_text(node: &Node, source: &[u8]) -> String {
    node.utf8_text(source)
        .unwrap_or("")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tree_sitter::Tree;

    fn parse(source: &str) -> Tree {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .unwrap();
        parser.parse(source, None).unwrap()
    }

    fn extract_from(source: &str, package: &str) -> ImportMap {
        let tree = parse(source);
        extract(tree.root_node(), source.as_bytes(), package)
    }

    #[test]
    fn test_simple_import() {
        let imports = extract_from("import unittest", "");
        assert_eq!(imports.len(), 1);
        assert_eq!(imports.get("unittest"), Some(&"unittest".to_string()));
    }

    #[test]
    fn test_dotted_import_binds_head() {
        let imports = extract_from("import unittest.mock", "");
        assert_eq!(imports.len(), 1);
        assert_eq!(imports.get("unittest"), Some(&"unittest".to_string()));
        assert_eq!(imports.get("mock"), None);
    }

    #[test]
    fn test_aliased_import() {
        let imports = extract_from("import unittest as ut", "");
        assert_eq!(imports.len(), 1);
        assert_eq!(imports.get("ut"), Some(&"unittest".to_string()));
    }

    #[test]
    fn test_from_import_multiple() {
        let imports = extract_from("from unittest import TestCase, main", "");
        assert_eq!(imports.len(), 2);
        assert_eq!(
            imports.get("TestCase"),
            Some(&"unittest.TestCase".to_string())
        );
        assert_eq!(imports.get("main"), Some(&"unittest.main".to_string()));
    }

    #[test]
    fn test_from_import_parenthesized_and_aliased() {
        let imports = extract_from(
            "from unittest import (\n    TestCase as TC,\n    skip,\n)\n",
            "",
        );
        assert_eq!(imports.get("TC"), Some(&"unittest.TestCase".to_string()));
        assert_eq!(imports.get("skip"), Some(&"unittest.skip".to_string()));
    }

    #[test]
    fn test_relative_import() {
        let imports = extract_from("from .base import BaseTest", "tests.unit");
        assert_eq!(
            imports.get("BaseTest"),
            Some(&"tests.unit.base.BaseTest".to_string())
        );
    }

    #[test]
    fn test_parent_relative_import() {
        let imports = extract_from("from .. import helpers", "tests.unit");
        assert_eq!(imports.get("helpers"), Some(&"tests.helpers".to_string()));
    }

    #[test]
    fn test_wildcard_import() {
        let imports = extract_from("from helpers import *", "");
        assert_eq!(imports.wildcards(), ["helpers".to_string()]);
    }

    #[test]
    fn test_try_except_fallback_keeps_last_binding() {
        let source = "try:\n    import unittest2 as unittest\nexcept ImportError:\n    import unittest\n";
        let imports = extract_from(source, "");
        assert_eq!(imports.get("unittest"), Some(&"unittest".to_string()));
    }

    #[test]
    fn test_function_scope_imports_ignored() {
        let source = "def helper():\n    import unittest as ut\n";
        let imports = extract_from(source, "");
        assert!(imports.is_empty());
    }
}

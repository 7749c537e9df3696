//! Import bindings of one module.
//!
//! Maps each name an import statement binds at module scope to the dotted path it refers
//! to, so base-class expressions such as `ut.TestCase` or `Base` can be qualified.

mod python;

pub use python::extract;

use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportMap {
    imports: HashMap<String, String>,
    /// Modules pulled in with `from m import *`, in import order.
    wildcards: Vec<String>,
}

impl ImportMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, bound_name: String, full_path: String) {
        self.imports.insert(bound_name, full_path);
    }

    pub fn insert_wildcard(&mut self, module: String) {
        if !self.wildcards.contains(&module) {
            self.wildcards.push(module);
        }
    }

    pub fn get(&self, bound_name: &str) -> Option<&String> {
        self.imports.get(bound_name)
    }

    /// Qualifies a dotted expression through the binding of its first segment:
    /// with `import unittest as ut`, `ut.TestCase` becomes `unittest.TestCase`.
    pub fn resolve(&self, expression: &str) -> Option<String> {
        let (head, rest) = match expression.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (expression, None),
        };
        let target = self.imports.get(head)?;
        Some(match rest {
            Some(rest) => format!("{target}.{rest}"),
            None => target.clone(),
        })
    }

    pub fn wildcards(&self) -> &[String] {
        &self.wildcards
    }

    pub fn len(&self) -> usize {
        self.imports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.imports.is_empty() && self.wildcards.is_empty()
    }
}

/// Resolves a relative module reference (`.base`, `..`, `..pkg.mod`) against the package
/// containing the importing module. Returns `None` when it climbs above the top package.
pub fn resolve_relative(reference: &str, package: &str) -> Option<String> {
    let dots = reference.chars().take_while(|c| *c == '.').count();
    if dots == 0 {
        return Some(reference.to_string());
    }
    let remainder = &reference[dots..];

    let mut parts: Vec<&str> = if package.is_empty() {
        Vec::new()
    } else {
        package.split('.').collect()
    };
    for _ in 1..dots {
        parts.pop()?;
    }
    if !remainder.is_empty() {
        parts.push(remainder);
    }
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_map_basic() {
        let mut imports = ImportMap::new();
        imports.insert("ut".to_string(), "unittest".to_string());

        assert_eq!(imports.len(), 1);
        assert_eq!(imports.get("ut"), Some(&"unittest".to_string()));
        assert_eq!(
            imports.resolve("ut.TestCase"),
            Some("unittest.TestCase".to_string())
        );
    }

    #[test]
    fn test_import_map_not_found() {
        let imports = ImportMap::new();
        assert_eq!(imports.get("nonexistent"), None);
        assert_eq!(imports.resolve("nonexistent.Thing"), None);
        assert!(imports.is_empty());
    }

    #[test]
    fn test_wildcards_deduplicated() {
        let mut imports = ImportMap::new();
        imports.insert_wildcard("helpers".to_string());
        imports.insert_wildcard("helpers".to_string());
        assert_eq!(imports.wildcards(), ["helpers".to_string()]);
        assert!(!imports.is_empty());
    }

    #[test]
    fn test_resolve_relative() {
        assert_eq!(resolve_relative(".base", "pkg.sub"), Some("pkg.sub.base".to_string()));
        assert_eq!(resolve_relative("..base", "pkg.sub"), Some("pkg.base".to_string()));
        assert_eq!(resolve_relative(".", "pkg"), Some("pkg".to_string()));
        assert_eq!(resolve_relative("...x", "pkg"), None);
        assert_eq!(resolve_relative("absolute.mod", "pkg"), Some("absolute.mod".to_string()));
    }
}

//! Fully-qualified test names.
//!
//! A name is `<class file key>::<class>::<method>`, where the key is the path resolver's
//! canonical form of the file declaring the class. Two spellings of one file therefore give
//! one name, and the execution side can recover the file, class and method with
//! [`parse_fully_qualified_name`].

use std::path::{Path, PathBuf};

use crate::paths::PathResolver;

pub const SEPARATOR: &str = "::";

pub fn make_fully_qualified_name(
    resolver: &PathResolver,
    class_file: &Path,
    class_name: &str,
    method_name: &str,
) -> String {
    format!(
        "{}{SEPARATOR}{class_name}{SEPARATOR}{method_name}",
        resolver.key(class_file)
    )
}

/// Splits a name back into (class file, class, method). Class and method names never contain
/// `::`, so the split is taken from the right.
pub fn parse_fully_qualified_name(name: &str) -> Option<(PathBuf, String, String)> {
    let mut parts = name.rsplitn(3, SEPARATOR);
    let method = parts.next()?;
    let class = parts.next()?;
    let path = parts.next()?;
    if path.is_empty() || class.is_empty() || method.is_empty() {
        return None;
    }
    Some((PathBuf::from(path), class.to_string(), method.to_string()))
}

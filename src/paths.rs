//! Path normalization and file identity.
//!
//! Every path comparison in the crate goes through [`PathResolver`]; two spellings of one
//! file (relative vs absolute, `.`/`..` segments, symlinks, and letter case on
//! case-insensitive resolvers) produce the same [`PathResolver::key`].

use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

use crate::config::CaseSensitivity;

#[derive(Debug, Clone)]
pub struct PathResolver {
    case_sensitivity: CaseSensitivity,
    base: PathBuf,
}

impl PathResolver {
    /// Resolver that anchors relative paths at the current working directory.
    pub fn new(case_sensitivity: CaseSensitivity) -> Self {
        let base = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/"));
        Self::with_base(case_sensitivity, base)
    }

    pub fn with_base(case_sensitivity: CaseSensitivity, base: impl Into<PathBuf>) -> Self {
        Self {
            case_sensitivity,
            base: base.into(),
        }
    }

    pub fn case_sensitivity(&self) -> CaseSensitivity {
        self.case_sensitivity
    }

    /// Absolute, dot-free path with symlinks resolved for the part that exists on disk.
    pub fn normalize(&self, path: &Path) -> PathBuf {
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base.join(path)
        };
        canonicalize_existing_prefix(&normalize_lexically(&absolute))
    }

    /// Resolves `relative` against `dir` (unless it is already absolute) and normalizes it.
    pub fn resolve_in(&self, dir: &Path, relative: &Path) -> PathBuf {
        if relative.is_absolute() {
            self.normalize(relative)
        } else {
            self.normalize(&dir.join(relative))
        }
    }

    /// Canonical comparison string for hashing and identity.
    pub fn key(&self, path: &Path) -> String {
        let normalized = self.normalize(path).to_string_lossy().into_owned();
        if self.case_sensitivity.is_insensitive() {
            normalized.to_lowercase()
        } else {
            normalized
        }
    }

    pub fn same_file(&self, a: &Path, b: &Path) -> bool {
        self.key(a) == self.key(b)
    }
}

impl Default for PathResolver {
    fn default() -> Self {
        Self::new(CaseSensitivity::Host)
    }
}

/// Removes `.` segments and folds `..` into the preceding segment without touching the disk.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut prefix: Option<OsString> = None;
    let mut has_root = false;
    let mut stack: Vec<OsString> = Vec::new();

    for component in path.components() {
        match component {
            Component::Prefix(prefix_component) => {
                prefix = Some(prefix_component.as_os_str().to_owned());
            }
            Component::RootDir => has_root = true,
            Component::CurDir => {}
            Component::ParentDir => {
                if let Some(last) = stack.last() {
                    if last != ".." {
                        stack.pop();
                        continue;
                    }
                }
                // `..` above the root stays at the root
                if !has_root {
                    stack.push(OsString::from(".."));
                }
            }
            Component::Normal(segment) => stack.push(segment.to_owned()),
        }
    }

    let mut out = PathBuf::new();
    if let Some(prefix) = prefix {
        out.push(prefix);
    }
    if has_root {
        out.push(std::path::MAIN_SEPARATOR.to_string());
    }
    out.extend(stack);
    out
}

/// Canonicalizes the longest existing ancestor of `path` and re-appends the missing tail,
/// so files that do not exist (yet) still compare consistently with files that do.
fn canonicalize_existing_prefix(path: &Path) -> PathBuf {
    if let Ok(canonical) = dunce::canonicalize(path) {
        return canonical;
    }

    let mut tail: Vec<OsString> = Vec::new();
    let mut current = path;
    while let Some(parent) = current.parent() {
        if let Some(name) = current.file_name() {
            tail.push(name.to_owned());
        }
        if let Ok(canonical) = dunce::canonicalize(parent) {
            let mut out = canonical;
            out.extend(tail.iter().rev());
            return out;
        }
        current = parent;
    }

    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_normalize_lexically_removes_dot_segments() {
        let path = Path::new("/work/./proj/../proj/tests/./test_a.py");
        assert_eq!(
            normalize_lexically(path),
            PathBuf::from("/work/proj/tests/test_a.py")
        );
    }

    #[test]
    fn test_normalize_lexically_clamps_at_root() {
        assert_eq!(normalize_lexically(Path::new("/../../a")), PathBuf::from("/a"));
    }

    #[test]
    fn test_normalize_lexically_keeps_leading_parent_for_relative() {
        assert_eq!(
            normalize_lexically(Path::new("../a/./b")),
            PathBuf::from("../a/b")
        );
    }

    #[test]
    fn test_relative_and_absolute_spellings_match() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("pkg")).unwrap();
        fs::write(root.join("pkg/test_a.py"), "").unwrap();

        let resolver = PathResolver::with_base(CaseSensitivity::Sensitive, root);
        assert!(resolver.same_file(Path::new("pkg/test_a.py"), &root.join("pkg/test_a.py")));
        assert!(resolver.same_file(
            Path::new("./pkg/../pkg/test_a.py"),
            Path::new("pkg/test_a.py")
        ));
    }

    #[test]
    fn test_case_insensitive_resolver_folds_case() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("Foo.py"), "").unwrap();

        let resolver = PathResolver::with_base(CaseSensitivity::Insensitive, root);
        assert!(resolver.same_file(Path::new("Foo.py"), Path::new("FOO.PY")));
        assert_eq!(resolver.key(Path::new("foo.py")), resolver.key(Path::new("Foo.py")));
    }

    #[test]
    fn test_case_sensitive_resolver_distinguishes_case() {
        let resolver = PathResolver::with_base(CaseSensitivity::Sensitive, "/work");
        assert!(!resolver.same_file(Path::new("/work/Foo.py"), Path::new("/work/foo.py")));
    }

    #[test]
    fn test_missing_files_still_compare() {
        let temp_dir = TempDir::new().unwrap();
        let resolver = PathResolver::with_base(CaseSensitivity::Sensitive, temp_dir.path());
        let a = resolver.normalize(Path::new("not/yet/here.py"));
        let b = resolver.normalize(&temp_dir.path().join("not/./yet/here.py"));
        assert_eq!(a, b);
        assert!(a.ends_with("not/yet/here.py"));
    }

    #[test]
    fn test_resolve_in_keeps_absolute_path() {
        let resolver = PathResolver::with_base(CaseSensitivity::Sensitive, "/elsewhere");
        let resolved = resolver.resolve_in(Path::new("/nonexistent/home"), Path::new("/abs/x.py"));
        assert_eq!(resolved, PathBuf::from("/abs/x.py"));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_spelling_matches_target() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("real")).unwrap();
        fs::write(root.join("real/test_a.py"), "").unwrap();
        std::os::unix::fs::symlink(root.join("real"), root.join("link")).unwrap();

        let resolver = PathResolver::with_base(CaseSensitivity::Sensitive, root);
        assert!(resolver.same_file(Path::new("link/test_a.py"), Path::new("real/test_a.py")));
    }
}

use globset::GlobMatcher;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

use crate::error::IoError;

/// Walks `root` and returns the files whose `/`-separated path relative to `root` matches
/// `matcher`, sorted by path. Directories named in `excluded_dirs` are not entered.
/// A missing `root` yields no files.
pub fn walk_matching(
    root: &Path,
    matcher: &GlobMatcher,
    excluded_dirs: &[String],
) -> Result<Vec<PathBuf>, IoError> {
    if !root.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            if e.depth() == 0 || !e.file_type().is_dir() {
                return true;
            }
            let name = e.file_name().to_string_lossy();
            !excluded_dirs.iter().any(|excluded| excluded == name.as_ref())
        })
    {
        let entry = entry.map_err(|e| IoError::walk_error(root, e))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let Some(relative) = relative_slash_path(root, entry.path()) else {
            continue;
        };
        if matcher.is_match(&relative) {
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}

/// `path` relative to `root` with `/` separators, as glob patterns are written.
pub fn relative_slash_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    Some(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use globset::GlobBuilder;
    use std::fs;
    use tempfile::TempDir;

    fn matcher(pattern: &str) -> GlobMatcher {
        GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .unwrap()
            .compile_matcher()
    }

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn test_walk_matching_recursive_glob() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(root, "test_a.py");
        touch(root, "pkg/test_b.py");
        touch(root, "pkg/readme.txt");

        let files = walk_matching(root, &matcher("**/*.py"), &[]).unwrap();
        let names = files
            .iter()
            .map(|f| relative_slash_path(root, f).unwrap())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["pkg/test_b.py", "test_a.py"]);
    }

    #[test]
    fn test_walk_matching_single_star_stays_in_directory() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(root, "test_a.py");
        touch(root, "pkg/test_b.py");

        let files = walk_matching(root, &matcher("*.py"), &[]).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("test_a.py"));
    }

    #[test]
    fn test_walk_matching_skips_excluded_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(root, "main.py");
        touch(root, "__pycache__/main.py");
        touch(root, ".venv/lib/site.py");

        let excluded = vec!["__pycache__".to_string(), ".venv".to_string()];
        let files = walk_matching(root, &matcher("**/*.py"), &excluded).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("main.py"));
    }

    #[test]
    fn test_walk_matching_missing_root_is_empty() {
        let files = walk_matching(
            Path::new("/nonexistent/project/home"),
            &matcher("**/*.py"),
            &[],
        )
        .unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_relative_slash_path_outside_root() {
        assert_eq!(
            relative_slash_path(Path::new("/a/b"), Path::new("/c/d.py")),
            None
        );
        assert_eq!(
            relative_slash_path(Path::new("/a"), Path::new("/a/b/c.py")),
            Some("b/c.py".to_string())
        );
    }
}

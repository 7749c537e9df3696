use std::path::PathBuf;
use thiserror::Error;

use super::IoError;

#[derive(Error, Debug)]
pub enum ProjectError {
    #[error("failed to load project '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: IoError,
    },

    #[error("failed to parse project '{path}': {source}")]
    Xml {
        path: PathBuf,
        source: roxmltree::Error,
    },

    #[error("project '{path}' has no <Project> root element")]
    MissingRoot { path: PathBuf },

    #[error("invalid item pattern '{pattern}' in project '{path}': {source}")]
    InvalidPattern {
        path: PathBuf,
        pattern: String,
        source: globset::Error,
    },

    #[error("unsupported project file: {path}")]
    Unsupported { path: PathBuf },
}

impl ProjectError {
    pub fn read(path: impl Into<PathBuf>, source: IoError) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    pub fn missing_root(path: impl Into<PathBuf>) -> Self {
        Self::MissingRoot { path: path.into() }
    }

    pub fn unsupported(path: impl Into<PathBuf>) -> Self {
        Self::Unsupported { path: path.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_root_display() {
        let err = ProjectError::missing_root("/work/A.pyproj");
        assert_eq!(
            err.to_string(),
            "project '/work/A.pyproj' has no <Project> root element"
        );
    }

    #[test]
    fn test_read_error_includes_path_and_reason() {
        let err = ProjectError::read(
            "/work/A.pyproj",
            IoError::file_not_found("/work/A.pyproj"),
        );
        let message = err.to_string();
        assert!(message.contains("failed to load project '/work/A.pyproj'"));
        assert!(message.contains("file not found"));
    }
}

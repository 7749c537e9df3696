use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("no project files were supplied")]
    NoProjects,

    #[error("project path at position {index} is empty")]
    EmptyPath { index: usize },

    #[error("failed to read config file '{path}': {message}")]
    FileReadError { path: PathBuf, message: String },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("unsupported config format: {format} (expected json or yaml)")]
    UnsupportedFormat { format: String },

    #[error("invalid test filter '{pattern}': {message}")]
    InvalidFilter { pattern: String, message: String },
}

impl ConfigError {
    pub fn file_read_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::FileReadError {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn unsupported_format(format: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
        }
    }

    pub fn invalid_filter(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidFilter {
            pattern: pattern.into(),
            message: message.into(),
        }
    }
}

use std::path::PathBuf;
use thiserror::Error;

use super::IoError;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("failed to read source '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: IoError,
    },

    #[error("failed to set parser language: {language}")]
    LanguageSetupFailed { language: String },

    #[error("failed to parse source code in {path}")]
    ParseFailed { path: PathBuf },

    #[error("source '{path}' is not valid UTF-8 (byte offset {offset})")]
    InvalidEncoding { path: PathBuf, offset: usize },
}

impl ScanError {
    pub fn read(path: impl Into<PathBuf>, source: IoError) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    pub fn language_setup_failed(language: impl Into<String>) -> Self {
        Self::LanguageSetupFailed {
            language: language.into(),
        }
    }

    pub fn parse_failed(path: impl Into<PathBuf>) -> Self {
        Self::ParseFailed { path: path.into() }
    }

    pub fn invalid_encoding(path: impl Into<PathBuf>, offset: usize) -> Self {
        Self::InvalidEncoding {
            path: path.into(),
            offset,
        }
    }
}

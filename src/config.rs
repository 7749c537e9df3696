use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

pub const DEFAULT_EXECUTOR_URI: &str = "executor://PythonTestExecutor/v1";

pub const DEFAULT_TEST_BASES: &[&str] = &[
    "unittest.TestCase",
    "unittest.case.TestCase",
    "unittest.IsolatedAsyncioTestCase",
    "unittest.async_case.IsolatedAsyncioTestCase",
];

pub const DEFAULT_METHOD_PREFIX: &str = "test";

pub const DEFAULT_SOURCE_EXTENSIONS: &[&str] = &["py", "pyw"];

pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
    ".git",
    "__pycache__",
    ".venv",
    "venv",
    "node_modules",
    "bin",
    "obj",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseSensitivity {
    Sensitive,
    Insensitive,
    /// Insensitive on Windows and macOS, sensitive elsewhere.
    #[default]
    Host,
}

impl CaseSensitivity {
    pub fn is_insensitive(self) -> bool {
        match self {
            Self::Sensitive => false,
            Self::Insensitive => true,
            Self::Host => cfg!(any(windows, target_os = "macos")),
        }
    }
}

/// Settings shared by the project loader, the scanner and the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct DiscoveryConfig {
    /// Fully-qualified base classes that mark a class as a test class.
    pub test_bases: Vec<String>,
    pub method_prefix: String,
    pub source_extensions: Vec<String>,
    /// Directory names skipped while expanding wildcard items.
    pub excluded_dirs: Vec<String>,
    pub case_sensitivity: CaseSensitivity,
    /// Scan projects on a worker pool.
    pub parallel: bool,
    pub executor_uri: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            test_bases: DEFAULT_TEST_BASES.iter().map(|s| s.to_string()).collect(),
            method_prefix: DEFAULT_METHOD_PREFIX.to_string(),
            source_extensions: DEFAULT_SOURCE_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            excluded_dirs: DEFAULT_EXCLUDED_DIRS.iter().map(|s| s.to_string()).collect(),
            case_sensitivity: CaseSensitivity::default(),
            parallel: true,
            executor_uri: DEFAULT_EXECUTOR_URI.to_string(),
        }
    }
}

impl DiscoveryConfig {
    /// Loads a config file, choosing the format from the extension (`json`, `yaml`, `yml`).
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let format = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();

        if !matches!(format.as_str(), "json" | "yaml" | "yml") {
            return Err(ConfigError::unsupported_format(format));
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::file_read_error(path, e.to_string()))?;

        Self::from_str_with_format(&content, &format)
            .map_err(|message| ConfigError::parse_error(path, message))
    }

    fn from_str_with_format(content: &str, format: &str) -> Result<Self, String> {
        match format {
            "json" => serde_json::from_str(content).map_err(|e| e.to_string()),
            _ => serde_yaml::from_str(content).map_err(|e| e.to_string()),
        }
    }

    pub fn is_source_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.source_extensions
                    .iter()
                    .any(|allowed| allowed.eq_ignore_ascii_case(ext))
            })
    }

    pub fn is_test_method_name(&self, name: &str) -> bool {
        name.starts_with(&self.method_prefix)
    }
}

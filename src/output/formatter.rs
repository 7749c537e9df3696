use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;

use crate::cli::OutputFormat;
use crate::discovery::{DiscoveredTest, DiscoverySummary};
use crate::error::IoError;

use super::TestCaseRecord;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonOutput {
    pub summary: DiscoverySummary,
    pub tests: Vec<TestCaseRecord>,
}

pub struct OutputFormatter;

impl OutputFormatter {
    pub fn format(
        tests: &[DiscoveredTest],
        summary: &DiscoverySummary,
        format: OutputFormat,
    ) -> serde_json::Result<String> {
        match format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(&Self::build_output(tests, summary))
            }
            OutputFormat::Text => Ok(Self::format_text(tests, summary)),
        }
    }

    pub fn build_output(tests: &[DiscoveredTest], summary: &DiscoverySummary) -> JsonOutput {
        JsonOutput {
            summary: summary.clone(),
            tests: tests.iter().map(TestCaseRecord::from_discovered).collect(),
        }
    }

    /// One `file:line  name` line per test, then a summary line.
    fn format_text(tests: &[DiscoveredTest], summary: &DiscoverySummary) -> String {
        let mut out = String::new();
        for test in tests {
            let _ = writeln!(
                out,
                "{}:{}  {}",
                test.code_file_path.display(),
                test.line_number,
                test.fully_qualified_name
            );
        }
        let _ = writeln!(
            out,
            "{} tests in {} projects ({} files scanned, {} failed)",
            summary.tests_emitted, summary.projects, summary.files_scanned, summary.files_failed
        );
        out
    }
}

/// Writes `content` to `path`, or to stdout when no path is given.
pub fn write_output(path: Option<&Path>, content: &str) -> Result<(), IoError> {
    match path {
        Some(path) => std::fs::write(path, content).map_err(|e| IoError::write_error(path, e)),
        None => {
            println!("{content}");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn tests() -> Vec<DiscoveredTest> {
        vec![DiscoveredTest {
            fully_qualified_name: "/proj/Bar.py::Bar::test_three".to_string(),
            display_name: "test_three".to_string(),
            project_file_path: PathBuf::from("/proj/B.pyproj"),
            code_file_path: PathBuf::from("/proj/Bar.py"),
            class_file_path: PathBuf::from("/proj/Bar.py"),
            line_number: 4,
            executor_uri: "executor://PythonTestExecutor/v1".to_string(),
        }]
    }

    fn summary() -> DiscoverySummary {
        DiscoverySummary {
            projects: 1,
            files_scanned: 1,
            tests_emitted: 1,
            ..DiscoverySummary::default()
        }
    }

    #[test]
    fn test_json_output() {
        let output = OutputFormatter::format(&tests(), &summary(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["summary"]["testsEmitted"], 1);
        assert_eq!(value["tests"][0]["displayName"], "test_three");
        assert_eq!(value["tests"][0]["traits"][0]["value"], "/proj/Bar.py");
    }

    #[test]
    fn test_text_output() {
        let output = OutputFormatter::format(&tests(), &summary(), OutputFormat::Text).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "/proj/Bar.py:4  /proj/Bar.py::Bar::test_three");
        assert_eq!(lines[1], "1 tests in 1 projects (1 files scanned, 0 failed)");
    }

    #[test]
    fn test_write_output_to_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.json");
        write_output(Some(&path), "{}").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
    }

    #[test]
    fn test_write_output_to_missing_dir_fails() {
        let err = write_output(Some(Path::new("/nonexistent/dir/out.json")), "{}").unwrap_err();
        assert!(matches!(err, IoError::WriteError { .. }));
    }
}

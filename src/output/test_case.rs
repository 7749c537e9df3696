use serde::Serialize;

use crate::discovery::DiscoveredTest;

pub const FILE_TRAIT: &str = "File";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestTrait {
    pub name: String,
    pub value: String,
}

/// Host-shaped view of a [`DiscoveredTest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseRecord {
    pub fully_qualified_name: String,
    pub display_name: String,
    pub executor_uri: String,
    /// The owning project file.
    pub source: String,
    pub code_file_path: String,
    pub line_number: usize,
    pub traits: Vec<TestTrait>,
}

impl TestCaseRecord {
    pub fn from_discovered(test: &DiscoveredTest) -> Self {
        Self {
            fully_qualified_name: test.fully_qualified_name.clone(),
            display_name: test.display_name.clone(),
            executor_uri: test.executor_uri.clone(),
            source: test.project_file_path.display().to_string(),
            code_file_path: test.code_file_path.display().to_string(),
            line_number: test.line_number,
            traits: vec![TestTrait {
                name: FILE_TRAIT.to_string(),
                value: test.class_file_path.display().to_string(),
            }],
        }
    }

    pub fn trait_value(&self, name: &str) -> Option<&str> {
        self.traits
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn inherited_test() -> DiscoveredTest {
        DiscoveredTest {
            fully_qualified_name: "/proj/Foo.py::Foo::test_two".to_string(),
            display_name: "test_two".to_string(),
            project_file_path: PathBuf::from("/proj/A.pyproj"),
            code_file_path: PathBuf::from("/proj/mixins.py"),
            class_file_path: PathBuf::from("/proj/Foo.py"),
            line_number: 2,
            executor_uri: "executor://PythonTestExecutor/v1".to_string(),
        }
    }

    #[test]
    fn test_file_trait_is_class_file() {
        let record = TestCaseRecord::from_discovered(&inherited_test());
        assert_eq!(record.trait_value(FILE_TRAIT), Some("/proj/Foo.py"));
        assert_eq!(record.code_file_path, "/proj/mixins.py");
        assert_eq!(record.source, "/proj/A.pyproj");
    }

    #[test]
    fn test_serialized_shape() {
        let record = TestCaseRecord::from_discovered(&inherited_test());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "fullyQualifiedName": "/proj/Foo.py::Foo::test_two",
                "displayName": "test_two",
                "executorUri": "executor://PythonTestExecutor/v1",
                "source": "/proj/A.pyproj",
                "codeFilePath": "/proj/mixins.py",
                "lineNumber": 2,
                "traits": [{ "name": "File", "value": "/proj/Foo.py" }]
            })
        );
    }
}

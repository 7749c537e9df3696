use std::path::PathBuf;

/// One discovered test method, addressable by its fully-qualified name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredTest {
    pub fully_qualified_name: String,
    /// The bare method name.
    pub display_name: String,
    /// Project file that owns the test.
    pub project_file_path: PathBuf,
    /// File containing the method text.
    pub code_file_path: PathBuf,
    /// File declaring the test class; reported to hosts as the `File` trait.
    pub class_file_path: PathBuf,
    /// 1-based line of the method declaration in `code_file_path`.
    pub line_number: usize,
    pub executor_uri: String,
}

/// Append-only destination for discovered tests.
pub trait DiscoverySink {
    fn send_test_case(&mut self, test: DiscoveredTest);
}

impl DiscoverySink for Vec<DiscoveredTest> {
    fn send_test_case(&mut self, test: DiscoveredTest) {
        self.push(test);
    }
}

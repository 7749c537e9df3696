#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

pub fn get_test_fixture_path(suite: &str, fixture_name: Option<&str>) -> PathBuf {
    let suite_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(suite);
    match fixture_name {
        Some(fixture_name) => suite_dir.join(fixture_name),
        None => suite_dir,
    }
}

/// `tests/fixtures/TestAdapter/<name>/<name>.pyproj`
pub fn test_adapter_project(name: &str) -> PathBuf {
    get_test_fixture_path("TestAdapter", Some(name)).join(format!("{name}.pyproj"))
}

pub fn test_adapter_file(project: &str, file: &str) -> PathBuf {
    get_test_fixture_path("TestAdapter", Some(project)).join(file)
}

pub fn test_adapter_projects() -> Vec<PathBuf> {
    ["TestAdapterLib", "TestAdapterA", "TestAdapterB"]
        .iter()
        .map(|name| test_adapter_project(name))
        .collect()
}

/// Writes `contents` to `root/relative`, creating parent directories.
pub fn write_file(root: &Path, relative: &str, contents: &str) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, contents).unwrap();
    path
}

/// Writes a minimal `.pyproj` whose `Compile` items are `includes`.
pub fn write_project(root: &Path, name: &str, includes: &[&str]) -> PathBuf {
    let items: String = includes
        .iter()
        .map(|include| format!("    <Compile Include=\"{include}\" />\n"))
        .collect();
    let contents = format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
         <Project xmlns=\"http://schemas.microsoft.com/developer/msbuild/2003\">\n\
         \x20 <PropertyGroup>\n\
         \x20   <ProjectHome>.</ProjectHome>\n\
         \x20 </PropertyGroup>\n\
         \x20 <ItemGroup>\n\
         {items}\
         \x20 </ItemGroup>\n\
         </Project>\n"
    );
    write_file(root, name, &contents)
}

pub const SIMPLE_TEST_MODULE: &str = "import unittest\n\n\nclass Simple(unittest.TestCase):\n    def test_a(self):\n        pass\n\n    def test_b(self):\n        pass\n";

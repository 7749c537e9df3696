/// pyproj Test Discovery
///
/// Statically discovers Python `unittest` tests in MSBuild-style project files (`.pyproj`).
/// Projects are enumerated into member source files, the files are parsed with Tree-sitter,
/// test classes are resolved across each project and every test method is reported as a
/// [`DiscoveredTest`] with a stable fully-qualified name and its source location.
pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod identity;
pub mod logging;
pub mod output;
pub mod paths;
pub mod project;
pub mod scanner;

pub use config::{CaseSensitivity, DiscoveryConfig};
pub use discovery::{
    discover_tests, DiscoveredTest, Discoverer, DiscoveryContext, DiscoverySink,
    DiscoverySummary, MessageLevel, MessageLogger,
};
pub use error::{Error, Result};
pub use identity::{make_fully_qualified_name, parse_fully_qualified_name};
pub use paths::PathResolver;

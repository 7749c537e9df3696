//! Project descriptors and the loaders that enumerate their member source files.

pub mod loader;
pub mod msbuild;
pub mod walk;

pub use loader::ProjectLoader;
pub use msbuild::MsBuildProjectLoader;

use std::path::{Path, PathBuf};

/// One loaded project: where it lives and which source files it owns, in a stable order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDescriptor {
    pub project_file: PathBuf,
    /// Directory that item values and module names are relative to.
    pub home: PathBuf,
    pub members: Vec<PathBuf>,
}

impl ProjectDescriptor {
    pub fn new(project_file: PathBuf, home: PathBuf, members: Vec<PathBuf>) -> Self {
        Self {
            project_file,
            home,
            members,
        }
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn members(&self) -> impl Iterator<Item = &Path> {
        self.members.iter().map(PathBuf::as_path)
    }
}

use std::path::Path;

use crate::error::ProjectError;
use crate::project::ProjectDescriptor;

/// Reads one project file and enumerates its members.
///
/// Implementations must return members in the same order for unchanged project content.
pub trait ProjectLoader: Send + Sync {
    fn load(&self, project_file: &Path) -> Result<ProjectDescriptor, ProjectError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_project_loader_trait_compiles() {
        struct FixedLoader;

        impl ProjectLoader for FixedLoader {
            fn load(&self, project_file: &Path) -> Result<ProjectDescriptor, ProjectError> {
                Ok(ProjectDescriptor::new(
                    project_file.to_path_buf(),
                    PathBuf::from("/tmp"),
                    vec![PathBuf::from("/tmp/test_a.py")],
                ))
            }
        }

        let loader: Box<dyn ProjectLoader> = Box::new(FixedLoader);
        let project = loader.load(Path::new("/tmp/A.pyproj")).unwrap();
        assert_eq!(project.member_count(), 1);
        assert_eq!(project.project_file, PathBuf::from("/tmp/A.pyproj"));
    }

    #[test]
    fn test_project_loader_error_propagates() {
        struct BrokenLoader;

        impl ProjectLoader for BrokenLoader {
            fn load(&self, project_file: &Path) -> Result<ProjectDescriptor, ProjectError> {
                Err(ProjectError::unsupported(project_file))
            }
        }

        let err = BrokenLoader.load(Path::new("/tmp/x.csproj")).unwrap_err();
        assert!(err.to_string().contains("unsupported project file"));
    }
}

mod config;
mod io;
mod project;
mod scan;

pub use config::ConfigError;
pub use io::IoError;
pub use project::ProjectError;
pub use scan::ScanError;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] IoError),

    #[error(transparent)]
    Project(#[from] ProjectError),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Error {
    /// Whether the error aborts a whole discovery call rather than one project or file.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Config(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

//! Diagnostics for the `pyproj-discover` binary. Host messages about skipped projects and
//! files travel through [`crate::discovery::MessageLogger`]; this subscriber only decides
//! what reaches stderr.

use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

/// Full `EnvFilter` directive that replaces the `-v`/`-q` flags when set.
pub const LOG_ENV: &str = "PYPROJ_DISCOVER_LOG";

const CRATE_TARGET: &str = "pyproj_test_discovery";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    Debug,
    Trace,
}

impl Verbosity {
    const BY_COUNT: [Verbosity; 4] = [Self::Normal, Self::Verbose, Self::Debug, Self::Trace];

    pub fn from_flags(verbose: u8, quiet: bool) -> Self {
        if quiet {
            Self::Quiet
        } else {
            Self::BY_COUNT[usize::from(verbose).min(Self::BY_COUNT.len() - 1)]
        }
    }

    pub fn level(self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::WARN,
            Self::Verbose => Level::INFO,
            Self::Debug => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }

    fn shows_source_locations(self) -> bool {
        self >= Self::Debug
    }

    fn directive(self) -> String {
        format!("{CRATE_TARGET}={}", self.level())
    }
}

fn env_filter(verbosity: Verbosity) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(verbosity.directive()))
}

/// Installs the stderr subscriber. A subscriber that is already installed is kept.
pub fn init(verbosity: Verbosity) {
    let locations = verbosity.shows_source_locations();
    let builder = fmt()
        .with_env_filter(env_filter(verbosity))
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(locations)
        .with_line_number(locations)
        .compact();

    let installed = if verbosity > Verbosity::Normal {
        builder.try_init()
    } else {
        builder.without_time().try_init()
    };
    if installed.is_err() {
        tracing::debug!("global subscriber already set");
    }
}

use anyhow::{Context as AnyhowContext, Result};
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};

use crate::config::{CaseSensitivity, DiscoveryConfig};
use crate::discovery::TestFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CaseMode {
    Sensitive,
    Insensitive,
    Host,
}

impl From<CaseMode> for CaseSensitivity {
    fn from(mode: CaseMode) -> Self {
        match mode {
            CaseMode::Sensitive => CaseSensitivity::Sensitive,
            CaseMode::Insensitive => CaseSensitivity::Insensitive,
            CaseMode::Host => CaseSensitivity::Host,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "pyproj-discover")]
#[command(about = "Discover unittest tests in MSBuild-style Python projects", long_about = None)]
pub struct Args {
    /// Project files (.pyproj) to discover tests in
    #[arg(value_name = "PROJECT", required = true)]
    pub projects: Vec<PathBuf>,

    /// Discovery settings file (JSON or YAML)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Only report tests whose `Class.method` matches this glob. Can be repeated.
    #[arg(long, value_name = "GLOB")]
    pub filter: Vec<String>,

    /// Output file path (prints to stdout if not specified)
    #[arg(short = 'O', long, value_name = "FILE")]
    pub output_file: Option<PathBuf>,

    /// Output format (json, text)
    #[arg(short = 'f', long, default_value = "json")]
    pub format: OutputFormat,

    /// Scan projects one after another instead of in parallel
    #[arg(long)]
    pub sequential: bool,

    /// How file paths are compared
    #[arg(long, value_name = "MODE")]
    pub case_sensitivity: Option<CaseMode>,

    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    pub fn validate(&self) -> Result<()> {
        if let Some(ref config_path) = self.config {
            validate_path(config_path)?;
        }
        if let Some(index) = self.projects.iter().position(|p| p.as_os_str().is_empty()) {
            anyhow::bail!("Project path at position {index} is empty");
        }
        Ok(())
    }

    /// Settings from `--config` (or defaults) with command-line overrides applied.
    pub fn discovery_config(&self) -> Result<DiscoveryConfig> {
        let mut config = match &self.config {
            Some(path) => DiscoveryConfig::from_file(path)
                .with_context(|| format!("Cannot load config: {}", path.display()))?,
            None => DiscoveryConfig::default(),
        };
        if self.sequential {
            config.parallel = false;
        }
        if let Some(mode) = self.case_sensitivity {
            config.case_sensitivity = mode.into();
        }
        Ok(config)
    }

    pub fn test_filter(&self) -> Result<Option<TestFilter>> {
        if self.filter.is_empty() {
            return Ok(None);
        }
        let filter = TestFilter::new(&self.filter).context("Invalid --filter")?;
        Ok(Some(filter))
    }
}

pub fn validate_path(path: &Path) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("Path does not exist: {}", path.display());
    }
    if !path.is_file() {
        anyhow::bail!("Path is not a file: {}", path.display());
    }
    std::fs::metadata(path).with_context(|| format!("Cannot read file: {}", path.display()))?;
    Ok(())
}

//! Discovery orchestration.
//!
//! [`Discoverer::discover`] loads each project, scans its member files, resolves test
//! classes across the project and sends one [`DiscoveredTest`] per test method to the sink.
//! Failures below the configuration level are reported through the [`MessageLogger`] and
//! never stop the remaining projects.

pub mod context;
pub mod logger;
pub mod record;

pub use context::{CancellationToken, DiscoveryContext, TestFilter};
pub use logger::{MemoryLogger, MessageLevel, MessageLogger, TracingLogger};
pub use record::{DiscoveredTest, DiscoverySink};

use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace};

use crate::config::DiscoveryConfig;
use crate::error::{ConfigError, Result, ScanError};
use crate::identity::make_fully_qualified_name;
use crate::paths::PathResolver;
use crate::project::{MsBuildProjectLoader, ProjectLoader};
use crate::scanner::{module_name, ProjectIndex, SourceScanner, TestDeclaration};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoverySummary {
    pub projects: usize,
    pub projects_failed: usize,
    pub files_scanned: usize,
    pub files_failed: usize,
    pub tests_emitted: usize,
    pub collisions: usize,
    pub cancelled: bool,
}

/// Declarations gathered for one project, waiting to be emitted.
#[derive(Debug, Default)]
struct ProjectScan {
    project_file: PathBuf,
    declarations: Vec<TestDeclaration>,
    files_scanned: usize,
    files_failed: usize,
    load_failed: bool,
    cancelled: bool,
}

pub struct Discoverer {
    config: DiscoveryConfig,
    resolver: PathResolver,
    loader: Box<dyn ProjectLoader>,
    scanner: SourceScanner,
}

impl Discoverer {
    pub fn new(config: DiscoveryConfig) -> Self {
        let resolver = PathResolver::new(config.case_sensitivity);
        Self::with_resolver(config, resolver)
    }

    /// Discoverer whose paths are normalized by `resolver`, e.g. one anchored at a
    /// directory other than the working directory.
    pub fn with_resolver(config: DiscoveryConfig, resolver: PathResolver) -> Self {
        let loader = MsBuildProjectLoader::new(resolver.clone(), &config);
        Self {
            config,
            resolver,
            loader: Box::new(loader),
            scanner: SourceScanner::new(),
        }
    }

    pub fn with_loader<L: ProjectLoader + 'static>(mut self, loader: L) -> Self {
        self.loader = Box::new(loader);
        self
    }

    /// Discovers the tests of every project in `project_paths`, in caller order.
    ///
    /// Returns a configuration error before touching the filesystem when the list is empty
    /// or holds an empty path. Everything else degrades to logger messages.
    pub fn discover<P: AsRef<Path> + Sync>(
        &self,
        project_paths: &[P],
        context: &DiscoveryContext,
        logger: &dyn MessageLogger,
        sink: &mut dyn DiscoverySink,
    ) -> Result<DiscoverySummary> {
        validate_paths(project_paths)?;

        let mut summary = DiscoverySummary {
            projects: project_paths.len(),
            ..DiscoverySummary::default()
        };
        let mut emitted: HashMap<String, DiscoveredTest> = HashMap::new();

        if self.config.parallel && project_paths.len() > 1 {
            let scans: Vec<ProjectScan> = project_paths
                .par_iter()
                .map(|path| self.scan_project(path.as_ref(), context, logger))
                .collect();
            for scan in scans {
                self.emit_project(scan, context, logger, sink, &mut emitted, &mut summary);
            }
        } else {
            for path in project_paths {
                let scan = self.scan_project(path.as_ref(), context, logger);
                self.emit_project(scan, context, logger, sink, &mut emitted, &mut summary);
            }
        }

        info!(
            projects = summary.projects,
            files = summary.files_scanned,
            tests = summary.tests_emitted,
            cancelled = summary.cancelled,
            "discovery complete"
        );
        Ok(summary)
    }

    fn scan_project(
        &self,
        project_path: &Path,
        context: &DiscoveryContext,
        logger: &dyn MessageLogger,
    ) -> ProjectScan {
        let mut scan = ProjectScan {
            project_file: project_path.to_path_buf(),
            ..ProjectScan::default()
        };

        if context.is_cancelled() {
            scan.cancelled = true;
            return scan;
        }

        let project = match self.loader.load(project_path) {
            Ok(project) => project,
            Err(e) => {
                logger.send_message(
                    MessageLevel::Error,
                    &format!(
                        "Skipping project '{}': {e}",
                        project_path.display()
                    ),
                );
                scan.load_failed = true;
                return scan;
            }
        };
        scan.project_file = project.project_file.clone();

        let mut outlines = Vec::with_capacity(project.member_count());
        for member in project.members() {
            if context.is_cancelled() {
                scan.cancelled = true;
                return scan;
            }

            let module = module_name(&project.home, member);
            match self.scanner.scan_file(member, &module) {
                Ok(outline) => {
                    scan.files_scanned += 1;
                    if let Some(offset) = outline.invalid_utf8_at {
                        logger.send_message(
                            MessageLevel::Warning,
                            &format!(
                                "{}; invalid bytes were replaced",
                                ScanError::invalid_encoding(member, offset)
                            ),
                        );
                    }
                    if outline.has_syntax_errors {
                        logger.send_message(
                            MessageLevel::Warning,
                            &format!(
                                "'{}' contains syntax errors; only recognized tests are reported",
                                member.display()
                            ),
                        );
                    }
                    outlines.push(outline);
                }
                Err(e) => {
                    scan.files_failed += 1;
                    logger.send_message(
                        MessageLevel::Warning,
                        &format!("Skipping '{}': {e}", member.display()),
                    );
                }
            }
        }

        let index = ProjectIndex::new(&outlines, &self.config);
        for (resolved, shadowed) in index.duplicate_modules() {
            logger.send_message(
                MessageLevel::Warning,
                &format!(
                    "'{}' has the same module name as '{}'; imports resolve to the latter",
                    shadowed.display(),
                    resolved.display()
                ),
            );
        }
        scan.declarations = index.test_declarations().collect();

        debug!(
            project = %scan.project_file.display(),
            files = scan.files_scanned,
            failed = scan.files_failed,
            tests = scan.declarations.len(),
            "project scanned"
        );
        scan
    }

    fn emit_project(
        &self,
        scan: ProjectScan,
        context: &DiscoveryContext,
        logger: &dyn MessageLogger,
        sink: &mut dyn DiscoverySink,
        emitted: &mut HashMap<String, DiscoveredTest>,
        summary: &mut DiscoverySummary,
    ) {
        summary.files_scanned += scan.files_scanned;
        summary.files_failed += scan.files_failed;
        if scan.load_failed {
            summary.projects_failed += 1;
            return;
        }
        if scan.cancelled || context.is_cancelled() {
            summary.cancelled = true;
            return;
        }

        let mut count = 0;
        for declaration in scan.declarations {
            if context.is_cancelled() {
                summary.cancelled = true;
                break;
            }
            if !context.accepts(&declaration.class_name, &declaration.method_name) {
                trace!(
                    class = %declaration.class_name,
                    method = %declaration.method_name,
                    "filtered out"
                );
                continue;
            }

            let test = self.build_test(&scan.project_file, declaration);
            match emitted.get(&test.fully_qualified_name) {
                Some(existing) if *existing == test => {
                    debug!(name = %test.fully_qualified_name, "dropping identical duplicate");
                }
                Some(existing) => {
                    summary.collisions += 1;
                    logger.send_message(
                        MessageLevel::Error,
                        &format!(
                            "Test '{}' from project '{}' collides with the test already reported by '{}'; skipping",
                            test.fully_qualified_name,
                            test.project_file_path.display(),
                            existing.project_file_path.display()
                        ),
                    );
                }
                None => {
                    emitted.insert(test.fully_qualified_name.clone(), test.clone());
                    sink.send_test_case(test);
                    count += 1;
                }
            }
        }

        summary.tests_emitted += count;
        logger.send_message(
            MessageLevel::Informational,
            &format!(
                "Discovered {count} tests in '{}'",
                scan.project_file.display()
            ),
        );
    }

    fn build_test(&self, project_file: &Path, declaration: TestDeclaration) -> DiscoveredTest {
        DiscoveredTest {
            fully_qualified_name: make_fully_qualified_name(
                &self.resolver,
                &declaration.class_file,
                &declaration.class_name,
                &declaration.method_name,
            ),
            display_name: declaration.method_name,
            project_file_path: project_file.to_path_buf(),
            code_file_path: declaration.code_file,
            class_file_path: declaration.class_file,
            line_number: declaration.line,
            executor_uri: self.config.executor_uri.clone(),
        }
    }
}

fn validate_paths<P: AsRef<Path>>(project_paths: &[P]) -> std::result::Result<(), ConfigError> {
    if project_paths.is_empty() {
        return Err(ConfigError::NoProjects);
    }
    if let Some(index) = project_paths
        .iter()
        .position(|p| p.as_ref().as_os_str().is_empty())
    {
        return Err(ConfigError::EmptyPath { index });
    }
    Ok(())
}

/// Runs discovery with a default context and `tracing` as the logger, collecting the tests.
pub fn discover_tests<P: AsRef<Path> + Sync>(
    project_paths: &[P],
    config: &DiscoveryConfig,
) -> Result<Vec<DiscoveredTest>> {
    let mut tests = Vec::new();
    Discoverer::new(config.clone()).discover(
        project_paths,
        &DiscoveryContext::default(),
        &TracingLogger,
        &mut tests,
    )?;
    Ok(tests)
}

//! Loader for MSBuild-style Python project files (`.pyproj`).
//!
//! Members are the `Compile` items of the project. An item's `Include` is a `;`-separated
//! list of literal paths or wildcards (`*`, `?`, `[...]`, `**`) relative to the project home;
//! `Exclude` trims that item's expansion and a later `Remove` drops files already included.

use globset::{GlobBuilder, GlobMatcher};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

use crate::config::DiscoveryConfig;
use crate::error::{IoError, ProjectError};
use crate::paths::PathResolver;
use crate::project::walk::{relative_slash_path, walk_matching};
use crate::project::{ProjectDescriptor, ProjectLoader};

const COMPILE_ITEM: &str = "Compile";

#[derive(Debug, Clone, PartialEq, Eq)]
enum ItemOp {
    Include {
        include: String,
        exclude: Option<String>,
    },
    Remove(String),
}

#[derive(Debug, Default)]
struct RawProject {
    project_home: Option<String>,
    items: Vec<ItemOp>,
}

pub struct MsBuildProjectLoader {
    resolver: PathResolver,
    config: DiscoveryConfig,
}

impl MsBuildProjectLoader {
    pub fn new(resolver: PathResolver, config: &DiscoveryConfig) -> Self {
        Self {
            resolver,
            config: config.clone(),
        }
    }

    /// Expands one `;`-separated item value into files, in value order.
    fn expand(
        &self,
        project_file: &Path,
        home: &Path,
        value: &str,
    ) -> Result<Vec<PathBuf>, ProjectError> {
        let mut files = Vec::new();
        for entry in split_items(value) {
            if is_wildcard(&entry) {
                files.extend(self.expand_wildcard(project_file, home, &entry)?);
            } else {
                files.push(self.resolver.resolve_in(home, Path::new(&entry)));
            }
        }
        Ok(files)
    }

    fn expand_wildcard(
        &self,
        project_file: &Path,
        home: &Path,
        entry: &str,
    ) -> Result<Vec<PathBuf>, ProjectError> {
        let (base, pattern) = split_wildcard(entry);
        let root = self.resolver.resolve_in(home, Path::new(&base));
        let matcher = self.compile(project_file, &pattern)?;

        trace!(root = %root.display(), pattern = %pattern, "expanding wildcard item");
        let files = walk_matching(&root, &matcher, &self.config.excluded_dirs)
            .map_err(|e| ProjectError::read(project_file, e))?;

        Ok(files
            .into_iter()
            .map(|path| self.resolver.normalize(&path))
            .collect())
    }

    fn compile(&self, project_file: &Path, pattern: &str) -> Result<GlobMatcher, ProjectError> {
        GlobBuilder::new(&to_glob(pattern))
            .literal_separator(true)
            .case_insensitive(self.resolver.case_sensitivity().is_insensitive())
            .build()
            .map(|glob| glob.compile_matcher())
            .map_err(|source| ProjectError::InvalidPattern {
                path: project_file.to_path_buf(),
                pattern: pattern.to_string(),
                source,
            })
    }

    /// Builds a predicate for `Exclude`/`Remove` values: wildcard entries match by glob,
    /// literal entries by file identity.
    fn exclusion(
        &self,
        project_file: &Path,
        home: &Path,
        value: &str,
    ) -> Result<Exclusion, ProjectError> {
        let mut exclusion = Exclusion::default();
        for entry in split_items(value) {
            if is_wildcard(&entry) {
                let (base, pattern) = split_wildcard(&entry);
                let root = self.resolver.resolve_in(home, Path::new(&base));
                exclusion
                    .globs
                    .push((root, self.compile(project_file, &pattern)?));
            } else {
                let path = self.resolver.resolve_in(home, Path::new(&entry));
                exclusion.keys.insert(self.resolver.key(&path));
            }
        }
        Ok(exclusion)
    }
}

#[derive(Default)]
struct Exclusion {
    globs: Vec<(PathBuf, GlobMatcher)>,
    keys: HashSet<String>,
}

impl Exclusion {
    fn matches(&self, resolver: &PathResolver, path: &Path) -> bool {
        if self.keys.contains(&resolver.key(path)) {
            return true;
        }
        self.globs.iter().any(|(root, matcher)| {
            relative_slash_path(root, path).is_some_and(|relative| matcher.is_match(relative))
        })
    }
}

impl ProjectLoader for MsBuildProjectLoader {
    fn load(&self, project_file: &Path) -> Result<ProjectDescriptor, ProjectError> {
        let project_file = self.resolver.normalize(project_file);
        if !is_msbuild_project(&project_file) {
            return Err(ProjectError::unsupported(&project_file));
        }
        let contents = std::fs::read_to_string(&project_file)
            .map_err(|e| ProjectError::read(&project_file, IoError::read_error(&project_file, e)))?;

        let raw = parse_project(&project_file, &contents)?;
        let project_dir = project_file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("/"));

        let home = match raw.project_home.as_deref() {
            Some(home) => {
                let home = expand_properties(home, &project_dir, &project_dir);
                self.resolver
                    .resolve_in(&project_dir, Path::new(&to_native_separators(&home)))
            }
            None => project_dir.clone(),
        };

        let mut members: Vec<PathBuf> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for item in &raw.items {
            match item {
                ItemOp::Include { include, exclude } => {
                    let include = expand_properties(include, &project_dir, &home);
                    let exclusion = match exclude {
                        Some(exclude) => Some(self.exclusion(
                            &project_file,
                            &home,
                            &expand_properties(exclude, &project_dir, &home),
                        )?),
                        None => None,
                    };

                    for path in self.expand(&project_file, &home, &include)? {
                        if !self.config.is_source_file(&path) {
                            debug!(path = %path.display(), "skipping non-source item");
                            continue;
                        }
                        if exclusion
                            .as_ref()
                            .is_some_and(|ex| ex.matches(&self.resolver, &path))
                        {
                            continue;
                        }
                        if seen.insert(self.resolver.key(&path)) {
                            members.push(path);
                        }
                    }
                }
                ItemOp::Remove(remove) => {
                    let remove = expand_properties(remove, &project_dir, &home);
                    let exclusion = self.exclusion(&project_file, &home, &remove)?;
                    members.retain(|path| {
                        let drop = exclusion.matches(&self.resolver, path);
                        if drop {
                            seen.remove(&self.resolver.key(path));
                        }
                        !drop
                    });
                }
            }
        }

        debug!(
            project = %project_file.display(),
            home = %home.display(),
            members = members.len(),
            "loaded project"
        );

        Ok(ProjectDescriptor::new(project_file, home, members))
    }
}

/// MSBuild project files end in `proj`: `.pyproj`, `.proj`, `.msbuildproj`.
fn is_msbuild_project(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.to_ascii_lowercase().ends_with("proj"))
}

fn parse_project(path: &Path, contents: &str) -> Result<RawProject, ProjectError> {
    let doc = roxmltree::Document::parse(contents).map_err(|source| ProjectError::Xml {
        path: path.to_path_buf(),
        source,
    })?;

    let project = doc.root_element();
    if project.tag_name().name() != "Project" {
        return Err(ProjectError::missing_root(path));
    }

    let mut raw = RawProject::default();

    for group in project.children().filter(|n| n.is_element()) {
        match group.tag_name().name() {
            "PropertyGroup" => {
                // Last definition wins, as in MSBuild evaluation.
                if let Some(home) = child_text(&group, "ProjectHome") {
                    raw.project_home = Some(home);
                }
            }
            "ItemGroup" => {
                for item in group
                    .children()
                    .filter(|n| n.is_element() && n.tag_name().name() == COMPILE_ITEM)
                {
                    if let Some(include) = non_empty_attribute(&item, "Include") {
                        raw.items.push(ItemOp::Include {
                            include,
                            exclude: non_empty_attribute(&item, "Exclude"),
                        });
                    } else if let Some(remove) = non_empty_attribute(&item, "Remove") {
                        raw.items.push(ItemOp::Remove(remove));
                    }
                }
            }
            _ => {}
        }
    }

    Ok(raw)
}

fn child_text(node: &roxmltree::Node<'_, '_>, name: &str) -> Option<String> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == name)
        .and_then(|n| n.text())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

fn non_empty_attribute(node: &roxmltree::Node<'_, '_>, name: &str) -> Option<String> {
    node.attribute(name)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

fn expand_properties(value: &str, project_dir: &Path, home: &Path) -> String {
    let project_dir = with_trailing_separator(project_dir);
    let home = with_trailing_separator(home);
    value.replace("$(MSBuildProjectDirectory)", project_dir.trim_end_matches(['/', '\\']))
        .replace("$(MSBuildThisFileDirectory)", &project_dir)
        .replace("$(ProjectDir)", &project_dir)
        .replace("$(ProjectHome)", &home)
}

fn with_trailing_separator(dir: &Path) -> String {
    let mut text = dir.to_string_lossy().into_owned();
    if !text.ends_with(std::path::MAIN_SEPARATOR) {
        text.push(std::path::MAIN_SEPARATOR);
    }
    text
}

fn split_items(value: &str) -> Vec<String> {
    value.split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(to_native_separators)
        .collect()
}

fn to_native_separators(entry: &str) -> String {
    if std::path::MAIN_SEPARATOR == '\\' {
        entry.replace('/', "\\")
    } else {
        entry.replace('\\', "/")
    }
}

/// MSBuild item wildcards are `*`, `?` and `**`; brackets and braces are literal.
fn is_wildcard(entry: &str) -> bool {
    entry.contains(['*', '?'])
}

/// Rewrites an MSBuild wildcard as a glob by bracketing the characters globset would
/// otherwise read as classes or alternations.
fn to_glob(pattern: &str) -> String {
    let mut glob = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        match c {
            '[' | ']' | '{' | '}' => {
                glob.push('[');
                glob.push(c);
                glob.push(']');
            }
            _ => glob.push(c),
        }
    }
    glob
}

/// Splits a wildcard entry into its literal leading directories and the glob remainder,
/// e.g. `../shared/**/*.py` → (`../shared`, `**/*.py`).
fn split_wildcard(entry: &str) -> (String, String) {
    let parts: Vec<&str> = entry.split(['/', '\\']).collect();
    let literal_len = parts
        .iter()
        .position(|part| is_wildcard(part))
        .unwrap_or(parts.len());
    let base = parts[..literal_len].join("/");
    let pattern = parts[literal_len..].join("/");
    let base = if base.is_empty() { ".".to_string() } else { base };
    (base, pattern)
}

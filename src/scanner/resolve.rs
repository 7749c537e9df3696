//! Project-wide class resolution.
//!
//! Indexes the classes of every module in one project by dotted name, resolves base
//! expressions through imports, and decides which classes are test classes.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

use super::{ClassOutline, ModuleOutline};
use crate::config::DiscoveryConfig;

/// Re-export chains longer than this are treated as unresolved.
const MAX_REEXPORT_DEPTH: usize = 8;

/// One test method of one test class, before identity is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestDeclaration {
    /// File declaring the test class.
    pub class_file: PathBuf,
    pub class_name: String,
    pub method_name: String,
    /// File containing the method text; differs from `class_file` for inherited methods.
    pub code_file: PathBuf,
    pub line: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct ClassId {
    module: usize,
    class: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BaseTarget {
    TestBase,
    Class(ClassId),
    Unknown,
}

pub struct ProjectIndex<'a> {
    modules: &'a [ModuleOutline],
    by_module: HashMap<&'a str, usize>,
    by_qualified: HashMap<String, ClassId>,
    /// `(owner, other)` module indexes of members sharing one dotted name.
    duplicate_modules: Vec<(usize, usize)>,
    test_bases: HashSet<String>,
    config: DiscoveryConfig,
    bases: HashMap<ClassId, Vec<BaseTarget>>,
    test_classes: HashSet<ClassId>,
}

impl<'a> ProjectIndex<'a> {
    pub fn new(modules: &'a [ModuleOutline], config: &DiscoveryConfig) -> Self {
        let mut by_module = HashMap::new();
        let mut by_qualified = HashMap::new();
        let mut duplicate_modules = Vec::new();

        for (module_idx, module) in modules.iter().enumerate() {
            let owner = *by_module.entry(module.module.as_str()).or_insert(module_idx);
            if owner != module_idx {
                // Imports of this name resolve to the first member only.
                duplicate_modules.push((owner, module_idx));
                continue;
            }
            for (class_idx, class) in module.classes.iter().enumerate() {
                // A later class statement rebinds the name.
                by_qualified.insert(
                    qualify(&module.module, &class.name),
                    ClassId {
                        module: module_idx,
                        class: class_idx,
                    },
                );
            }
        }

        let mut index = Self {
            modules,
            by_module,
            by_qualified,
            duplicate_modules,
            test_bases: config.test_bases.iter().cloned().collect(),
            config: config.clone(),
            bases: HashMap::new(),
            test_classes: HashSet::new(),
        };

        let ids: Vec<ClassId> = index.class_ids().collect();
        for id in &ids {
            let targets: Vec<BaseTarget> = index
                .class(*id)
                .bases
                .iter()
                .map(|expr| index.resolve_base(id.module, expr))
                .collect();
            index.bases.insert(*id, targets);
        }

        let mut memo = HashMap::new();
        for id in ids {
            if index.compute_is_test(id, &mut memo, &mut HashSet::new()) {
                index.test_classes.insert(id);
            }
        }

        debug!(
            modules = modules.len(),
            classes = index.by_qualified.len(),
            test_classes = index.test_classes.len(),
            "project index built"
        );
        index
    }

    pub fn test_class_count(&self) -> usize {
        self.test_classes.len()
    }

    /// Whether `qualified` (`module.Class`) names a test class of this project.
    pub fn is_test_class(&self, qualified: &str) -> bool {
        self.by_qualified
            .get(qualified)
            .is_some_and(|id| self.test_classes.contains(id))
    }

    /// Pairs of member files that share a dotted module name, as `(resolved, shadowed)`.
    /// Imports of that name resolve to the first file only.
    pub fn duplicate_modules(&self) -> impl Iterator<Item = (&'a Path, &'a Path)> + '_ {
        self.duplicate_modules.iter().map(|(owner, other)| {
            (
                self.modules[*owner].path.as_path(),
                self.modules[*other].path.as_path(),
            )
        })
    }

    /// Test methods of every test class, in module order, class order, then method
    /// resolution order. Each class's methods are resolved only when the iterator reaches it.
    pub fn test_declarations(&self) -> impl Iterator<Item = TestDeclaration> + '_ {
        self.class_ids()
            .filter(|id| self.test_classes.contains(id))
            .filter(|id| !self.is_shadowed(*id))
            .flat_map(|id| self.declarations_for(id))
    }

    fn class_ids(&self) -> impl Iterator<Item = ClassId> + 'a {
        self.modules
            .iter()
            .enumerate()
            .flat_map(|(module, outline)| {
                (0..outline.classes.len()).map(move |class| ClassId { module, class })
            })
    }

    fn class(&self, id: ClassId) -> &'a ClassOutline {
        &self.modules[id.module].classes[id.class]
    }

    /// The class statement that finally binds `name` in module `module_idx`.
    fn local_class(&self, module_idx: usize, name: &str) -> Option<ClassId> {
        self.modules[module_idx]
            .classes
            .iter()
            .rposition(|class| class.name == name)
            .map(|class| ClassId {
                module: module_idx,
                class,
            })
    }

    fn is_shadowed(&self, id: ClassId) -> bool {
        let class = self.class(id);
        let shadowed = self.local_class(id.module, &class.name) != Some(id);
        if shadowed {
            debug!(
                class = %class.name,
                path = %self.modules[id.module].path.display(),
                "skipping class redefined later in the module"
            );
        }
        shadowed
    }

    fn declarations_for(&self, id: ClassId) -> Vec<TestDeclaration> {
        let class_file = &self.modules[id.module].path;
        let class_name = &self.class(id).name;

        let mut seen_names: HashSet<&str> = HashSet::new();
        let mut visited: HashSet<ClassId> = HashSet::new();
        let mut declarations = Vec::new();
        let mut stack = vec![id];

        // Depth-first, left-to-right walk of project-local bases.
        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            let defining = &self.modules[current.module];
            for method in &self.class(current).methods {
                if !seen_names.insert(method.name.as_str()) {
                    continue;
                }
                if !self.config.is_test_method_name(&method.name) {
                    continue;
                }
                declarations.push(TestDeclaration {
                    class_file: class_file.clone(),
                    class_name: class_name.clone(),
                    method_name: method.name.clone(),
                    code_file: defining.path.clone(),
                    line: method.line,
                });
            }

            if let Some(targets) = self.bases.get(&current) {
                for target in targets.iter().rev() {
                    if let BaseTarget::Class(base) = target {
                        stack.push(*base);
                    }
                }
            }
        }

        trace!(
            class = %class_name,
            tests = declarations.len(),
            "resolved test methods"
        );
        declarations
    }

    fn compute_is_test(
        &self,
        id: ClassId,
        memo: &mut HashMap<ClassId, bool>,
        visiting: &mut HashSet<ClassId>,
    ) -> bool {
        if let Some(known) = memo.get(&id) {
            return *known;
        }
        if !visiting.insert(id) {
            // Inheritance cycle; the class cannot be a test class through itself.
            return false;
        }

        let mut is_test = false;
        if let Some(targets) = self.bases.get(&id) {
            for target in targets {
                is_test = match target {
                    BaseTarget::TestBase => true,
                    BaseTarget::Class(base) => self.compute_is_test(*base, memo, visiting),
                    BaseTarget::Unknown => false,
                };
                if is_test {
                    break;
                }
            }
        }

        visiting.remove(&id);
        memo.insert(id, is_test);
        is_test
    }

    /// Resolves one base expression written in module `module_idx`.
    fn resolve_base(&self, module_idx: usize, expr: &str) -> BaseTarget {
        let module = &self.modules[module_idx];

        if let Some(qualified) = module.imports.resolve(expr) {
            return self.lookup(&qualified, 0);
        }

        if !expr.contains('.') {
            if let Some(id) = self.local_class(module_idx, expr) {
                return BaseTarget::Class(id);
            }
        }

        for wildcard in module.imports.wildcards() {
            let target = self.lookup(&qualify(wildcard, expr), 0);
            if target != BaseTarget::Unknown {
                return target;
            }
        }

        self.lookup(expr, 0)
    }

    /// Looks up a fully-qualified name, following names that project modules re-export
    /// through their own imports.
    fn lookup(&self, qualified: &str, depth: usize) -> BaseTarget {
        if self.test_bases.contains(qualified) {
            return BaseTarget::TestBase;
        }
        if let Some(id) = self.by_qualified.get(qualified) {
            return BaseTarget::Class(*id);
        }
        if depth >= MAX_REEXPORT_DEPTH {
            return BaseTarget::Unknown;
        }

        let Some((module_name, name)) = qualified.rsplit_once('.') else {
            return BaseTarget::Unknown;
        };
        let Some(module_idx) = self.by_module.get(module_name) else {
            return BaseTarget::Unknown;
        };
        let module = &self.modules[*module_idx];

        if let Some(target) = module.imports.get(name) {
            return self.lookup(target, depth + 1);
        }
        for wildcard in module.imports.wildcards() {
            let target = self.lookup(&qualify(wildcard, name), depth + 1);
            if target != BaseTarget::Unknown {
                return target;
            }
        }

        BaseTarget::Unknown
    }
}

fn qualify(module: &str, name: &str) -> String {
    if module.is_empty() {
        name.to_string()
    } else {
        format!("{module}.{name}")
    }
}

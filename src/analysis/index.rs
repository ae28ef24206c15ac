//! Class index: the explicit manifest of every type found in the scanned
//! sources.
//!
//! The index answers the questions a facade generator would otherwise ask a
//! live runtime: does this class exist, what does it extend or implement,
//! and which methods can be called on it.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};

use crate::analysis::{php_analyzer, ClassDecl, FileFacts, Literal, MethodDecl};

/// All class-like declarations, keyed by lowercased fully qualified name.
#[derive(Debug, Default)]
pub struct ClassIndex {
    classes: HashMap<String, ClassDecl>,
    files_indexed: usize,
}

fn key(fqn: &str) -> String {
    fqn.trim_start_matches('\\').to_ascii_lowercase()
}

impl ClassIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse every file and index its declarations.
    ///
    /// Files that cannot be read or parsed are skipped; they simply
    /// contribute no types.
    pub fn build<P: AsRef<Path>>(files: &[PathBuf], base_dir: P) -> Self {
        let base_dir = base_dir.as_ref();
        let mut index = Self::new();

        for path in files {
            match index.analyze_file(path, base_dir) {
                Ok(()) => {}
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "skipping unparsable file");
                }
            }
        }

        tracing::debug!(
            files = index.files_indexed,
            classes = index.classes.len(),
            "class index built"
        );
        index
    }

    /// Analyze one file and add its declarations.
    pub fn analyze_file(&mut self, path: &Path, base_dir: &Path) -> crate::Result<()> {
        let source = fs::read(path)?;
        let rel_path = path
            .strip_prefix(base_dir)
            .unwrap_or(path)
            .to_string_lossy()
            .to_string();
        let facts = php_analyzer().analyze_source(&rel_path, source)?;
        self.add_file(facts);
        Ok(())
    }

    pub fn add_file(&mut self, facts: FileFacts) {
        self.files_indexed += 1;
        for decl in facts.classes {
            self.insert(decl);
        }
    }

    /// Add a declaration. The first declaration of a name wins, the same way
    /// PHP refuses to redeclare a class.
    pub fn insert(&mut self, decl: ClassDecl) {
        let k = key(&decl.fqn());
        if let Some(existing) = self.classes.get(&k) {
            tracing::debug!(
                class = %decl.fqn(),
                kept = %existing.path,
                ignored = %decl.path,
                "duplicate declaration"
            );
            return;
        }
        self.classes.insert(k, decl);
    }

    pub fn get(&self, fqn: &str) -> Option<&ClassDecl> {
        self.classes.get(&key(fqn))
    }

    pub fn contains(&self, fqn: &str) -> bool {
        self.classes.contains_key(&key(fqn))
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn files_indexed(&self) -> usize {
        self.files_indexed
    }

    /// Parent class chain of `fqn`, nearest first. The last entry may name a
    /// class that is not indexed (a vendor base class, for example).
    pub fn ancestors(&self, fqn: &str) -> Vec<String> {
        let mut chain = Vec::new();
        let mut seen = HashSet::from([key(fqn)]);
        let mut current = self.get(fqn);

        while let Some(class) = current {
            if class.kind != crate::analysis::ClassKind::Class {
                break;
            }
            let Some(parent) = class.extends.first() else {
                break;
            };
            if !seen.insert(key(parent)) {
                break;
            }
            chain.push(parent.clone());
            current = self.get(parent);
        }

        chain
    }

    /// Every interface `fqn` implements, including those declared on
    /// ancestors and those inherited through interface `extends`.
    pub fn interfaces(&self, fqn: &str) -> Vec<String> {
        let mut queue: VecDeque<String> = VecDeque::new();
        if let Some(class) = self.get(fqn) {
            queue.extend(class.implements.iter().cloned());
            if class.kind == crate::analysis::ClassKind::Interface {
                queue.extend(class.extends.iter().cloned());
            }
        }
        for ancestor in self.ancestors(fqn) {
            if let Some(class) = self.get(&ancestor) {
                queue.extend(class.implements.iter().cloned());
            }
        }

        let mut seen = HashSet::new();
        let mut found = Vec::new();
        while let Some(iface) = queue.pop_front() {
            if !seen.insert(key(&iface)) {
                continue;
            }
            if let Some(decl) = self.get(&iface) {
                queue.extend(decl.extends.iter().cloned());
            }
            found.push(iface);
        }
        found
    }

    /// Whether `fqn` declares conformance to `interface`.
    pub fn implements(&self, fqn: &str, interface: &str) -> bool {
        let target = key(interface);
        self.interfaces(fqn).iter().any(|i| key(i) == target)
    }

    /// Whether `fqn` derives from `parent`. Like PHP's `is_subclass_of`, an
    /// implemented interface also counts, and a class is not its own
    /// subclass.
    pub fn is_subclass_of(&self, fqn: &str, parent: &str) -> bool {
        let target = key(parent);
        if key(fqn) == target {
            return false;
        }
        self.ancestors(fqn).iter().any(|a| key(a) == target) || self.implements(fqn, parent)
    }

    /// Methods callable on `fqn`, in reflection order: own declarations,
    /// then trait methods, then inherited methods that were not overridden.
    pub fn methods_of(&self, fqn: &str) -> Vec<&MethodDecl> {
        let mut seen_names = HashSet::new();
        let mut methods = Vec::new();

        let mut classes = vec![fqn.to_string()];
        classes.extend(self.ancestors(fqn));

        for class_name in classes {
            let Some(class) = self.get(&class_name) else {
                break;
            };
            for method in &class.methods {
                if seen_names.insert(method.name.to_ascii_lowercase()) {
                    methods.push(method);
                }
            }
            let mut seen_traits = HashSet::new();
            for used in &class.traits {
                self.collect_trait_methods(used, &mut seen_traits, &mut seen_names, &mut methods);
            }
        }

        methods
    }

    /// Parent classes and used traits of `fqn` that are not indexed. Their
    /// methods are missing from [`ClassIndex::methods_of`].
    pub fn unindexed_supertypes(&self, fqn: &str) -> Vec<String> {
        let mut classes = vec![fqn.to_string()];
        classes.extend(self.ancestors(fqn));

        let mut missing = Vec::new();
        for class_name in classes {
            let Some(class) = self.get(&class_name) else {
                missing.push(class_name);
                break;
            };
            missing.extend(class.traits.iter().filter(|t| !self.contains(t)).cloned());
        }
        missing
    }

    fn collect_trait_methods<'a>(
        &'a self,
        trait_name: &str,
        seen_traits: &mut HashSet<String>,
        seen_names: &mut HashSet<String>,
        methods: &mut Vec<&'a MethodDecl>,
    ) {
        if !seen_traits.insert(key(trait_name)) {
            return;
        }
        let Some(decl) = self.get(trait_name) else {
            return;
        };
        for method in &decl.methods {
            if seen_names.insert(method.name.to_ascii_lowercase()) {
                methods.push(method);
            }
        }
        for nested in &decl.traits {
            self.collect_trait_methods(nested, seen_traits, seen_names, methods);
        }
    }

    /// First method named `name` visible on `fqn`.
    pub fn find_method(&self, fqn: &str, name: &str) -> Option<&MethodDecl> {
        self.methods_of(fqn)
            .into_iter()
            .find(|m| m.name.eq_ignore_ascii_case(name))
    }

    /// Class constant lookup through the class, its ancestors and its
    /// interfaces.
    pub fn constant(&self, fqn: &str, name: &str) -> Option<&Literal> {
        let mut owners = vec![fqn.to_string()];
        owners.extend(self.ancestors(fqn));
        owners.extend(self.interfaces(fqn));

        owners
            .iter()
            .filter_map(|owner| self.get(owner))
            .find_map(|class| class.constant(name))
    }

    /// Iterate over all indexed declarations in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &ClassDecl> {
        self.classes.values()
    }
}

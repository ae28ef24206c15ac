//! Source scanner: finds PHP files and guesses the class each one declares.

use lazy_static::lazy_static;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{Error, Result};

lazy_static! {
    /// First `namespace Foo\Bar;` in the file.
    static ref NAMESPACE_PATTERN: Regex = Regex::new(r"namespace\s+(.+?);").unwrap();
    /// First `class Name` in the file.
    static ref CLASS_PATTERN: Regex = Regex::new(r"class\s+(\w+)").unwrap();
}

/// A class name inferred from a file's text. Heuristic: the first matches
/// win, so files declaring several classes yield only the first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub path: PathBuf,
    pub namespace: Option<String>,
    pub short_name: String,
}

impl Candidate {
    /// Fully qualified name without a leading `\`.
    pub fn fqn(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{}\\{}", ns, self.short_name),
            None => self.short_name.clone(),
        }
    }
}

/// Extract a candidate class name from raw PHP source.
pub fn extract_candidate(path: &Path, contents: &str) -> Option<Candidate> {
    let namespace = NAMESPACE_PATTERN
        .captures(contents)
        .map(|c| c[1].trim().trim_start_matches('\\').to_string())
        .filter(|ns| !ns.is_empty());

    let short_name = CLASS_PATTERN.captures(contents)?[1].to_string();

    Some(Candidate {
        path: path.to_path_buf(),
        namespace,
        short_name,
    })
}

/// Walks a directory tree for `*.php` files.
pub struct SourceScanner {
    root: PathBuf,
    excluded: globset::GlobSet,
}

impl SourceScanner {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            excluded: globset::GlobSet::empty(),
        }
    }

    /// Skip files whose path (relative to the root) matches any pattern.
    pub fn exclude(mut self, patterns: &[String]) -> Result<Self> {
        let mut builder = globset::GlobSetBuilder::new();
        for pattern in patterns {
            let glob = globset::Glob::new(pattern).map_err(|e| {
                Error::InvalidConfig(format!("invalid excluded_paths pattern {:?}: {}", pattern, e))
            })?;
            builder.add(glob);
        }
        self.excluded = builder
            .build()
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        Ok(self)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Collect PHP files in lexical order.
    pub fn files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for entry in WalkDir::new(&self.root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                // Skip hidden directories
                !(e.depth() > 0 && e.file_type().is_dir() && e.file_name().to_string_lossy().starts_with('.'))
            })
        {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("php") {
                continue;
            }

            let rel = path.strip_prefix(&self.root).unwrap_or(path);
            if self.excluded.is_match(rel) {
                tracing::debug!(path = %rel.display(), "excluded");
                continue;
            }

            files.push(path.to_path_buf());
        }

        Ok(files)
    }

    /// Read a file and extract its candidate. Unreadable files and files
    /// without a class declaration yield nothing.
    pub fn candidate(&self, path: &Path) -> Option<Candidate> {
        let contents = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "skipping unreadable file");
                return None;
            }
        };
        let candidate = extract_candidate(path, &contents);
        if candidate.is_none() {
            tracing::debug!(path = %path.display(), "no class declaration");
        }
        candidate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_extract_namespaced_class() {
        let src = "<?php\n\nnamespace App\\Facade;\n\nuse Foo\\Bar;\n\nfinal class MailFacade extends Facade {}\n";
        let c = extract_candidate(Path::new("x.php"), src).unwrap();
        assert_eq!(c.namespace.as_deref(), Some("App\\Facade"));
        assert_eq!(c.short_name, "MailFacade");
        assert_eq!(c.fqn(), "App\\Facade\\MailFacade");
    }

    #[test]
    fn test_extract_global_class() {
        let c = extract_candidate(Path::new("x.php"), "<?php class Plain {}").unwrap();
        assert_eq!(c.namespace, None);
        assert_eq!(c.fqn(), "Plain");
    }

    #[test]
    fn test_no_class_no_candidate() {
        let src = "<?php\nnamespace App;\n\nfunction helper() { return 1; }\n";
        assert!(extract_candidate(Path::new("x.php"), src).is_none());
        let iface = "<?php\nnamespace App;\n\ninterface Contract {}\n";
        assert!(extract_candidate(Path::new("x.php"), iface).is_none());
    }

    #[test]
    fn test_first_class_wins() {
        let src = "<?php namespace A; class First {} class Second {}";
        assert_eq!(
            extract_candidate(Path::new("x.php"), src).unwrap().short_name,
            "First"
        );
    }

    #[test]
    fn test_files_sorted_and_filtered() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("b")).unwrap();
        fs::create_dir_all(root.join("a")).unwrap();
        fs::create_dir_all(root.join(".cache")).unwrap();
        fs::create_dir_all(root.join("Tests")).unwrap();
        fs::write(root.join("b/Two.php"), "<?php class Two {}").unwrap();
        fs::write(root.join("a/One.php"), "<?php class One {}").unwrap();
        fs::write(root.join("a/notes.txt"), "class Nope").unwrap();
        fs::write(root.join(".cache/Hidden.php"), "<?php class Hidden {}").unwrap();
        fs::write(root.join("Tests/OneTest.php"), "<?php class OneTest {}").unwrap();

        let scanner = SourceScanner::new(root)
            .exclude(&["Tests/**".to_string()])
            .unwrap();
        let files = scanner.files().unwrap();
        let rel: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(rel, vec!["a/One.php", "b/Two.php"]);
    }

    #[test]
    fn test_missing_root_is_error() {
        let temp = TempDir::new().unwrap();
        let scanner = SourceScanner::new(temp.path().join("nope"));
        assert!(matches!(scanner.files(), Err(Error::Walk(_))));
    }
}

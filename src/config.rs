//! Configuration schema for the helper generator.
//!
//! A config file is optional; every field has a default matching the
//! behavior of a stock Symfony project using `flawlol/facade`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Default config file names to search for in the project directory.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["facade-helper.yaml", ".facade-helper.yaml"];

/// Base class every facade of the `flawlol/facade` package extends.
pub const DEFAULT_FACADE_MARKER: &str = "Flawlol\\Facade\\Abstract\\Facade";

/// How stub classes are grouped into `namespace { }` blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NamespaceGrouping {
    /// One block per namespace, regardless of scan order.
    #[default]
    Grouped,
    /// A new block whenever the namespace changes between consecutive
    /// facades, so a namespace can appear more than once.
    Interleaved,
}

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Project root. Relative paths below are resolved against it.
    /// Filled in from the command line when absent.
    #[serde(default)]
    pub project_dir: Option<PathBuf>,
    /// Directory scanned for facades, relative to the project root.
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,
    /// Generated helper file, relative to the project root.
    #[serde(default = "default_output")]
    pub output: PathBuf,
    /// Base classes or interfaces that mark a class as a facade.
    #[serde(default = "default_markers")]
    pub facade_markers: Vec<String>,
    /// Service id to class name.
    #[serde(default)]
    pub services: BTreeMap<String, String>,
    /// Container parameters. `kernel.project_dir` is always set.
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
    /// Resolve a service id that is itself a class name to that class.
    #[serde(default = "default_true")]
    pub autowire: bool,
    #[serde(default)]
    pub namespace_grouping: NamespaceGrouping,
    /// Write to a temporary file and rename it over the output on success.
    #[serde(default = "default_true")]
    pub atomic_write: bool,
    /// Glob patterns for source paths to leave out of the scan.
    #[serde(default)]
    pub excluded_paths: Vec<String>,
    /// Extra directories parsed for type information only (vendor code
    /// defining service classes, for example). Never scanned for facades.
    #[serde(default)]
    pub index_paths: Vec<PathBuf>,
}

fn default_source_dir() -> PathBuf {
    PathBuf::from("src")
}

fn default_output() -> PathBuf {
    PathBuf::from("_ide-helper.php")
}

fn default_markers() -> Vec<String> {
    vec![DEFAULT_FACADE_MARKER.to_string()]
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project_dir: None,
            source_dir: default_source_dir(),
            output: default_output(),
            facade_markers: default_markers(),
            services: BTreeMap::new(),
            parameters: BTreeMap::new(),
            autowire: true,
            namespace_grouping: NamespaceGrouping::default(),
            atomic_write: true,
            excluded_paths: Vec::new(),
            index_paths: Vec::new(),
        }
    }
}

impl Config {
    /// Parse a config from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::parse_str(&content)
    }

    pub fn parse_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Look for one of the default config files in `dir`.
    pub fn discover<P: AsRef<Path>>(dir: P) -> Option<PathBuf> {
        DEFAULT_CONFIG_NAMES
            .iter()
            .map(|name| dir.as_ref().join(name))
            .find(|path| path.is_file())
    }

    /// Project root, defaulting to the current directory.
    pub fn project_dir(&self) -> PathBuf {
        self.project_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Validate a config for correctness.
pub fn validate(config: &Config) -> Result<()> {
    if config.facade_markers.iter().all(|m| m.trim().is_empty()) {
        return Err(Error::InvalidConfig(
            "facade_markers must name at least one class or interface".to_string(),
        ));
    }

    if config.output.as_os_str().is_empty() {
        return Err(Error::InvalidConfig("output must not be empty".to_string()));
    }

    for pattern in &config.excluded_paths {
        globset::Glob::new(pattern).map_err(|e| {
            Error::InvalidConfig(format!("invalid excluded_paths pattern {:?}: {}", pattern, e))
        })?;
    }

    for (id, class) in &config.services {
        if class.trim().is_empty() {
            return Err(Error::InvalidConfig(format!("service {:?} has no class", id)));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_config() {
        let yaml = r#"
source_dir: app
output: var/_ide-helper.php
services:
  mailer: App\Service\Mailer
namespace_grouping: interleaved
excluded_paths:
  - "**/Tests/**"
"#;
        let config = Config::parse_str(yaml).unwrap();
        assert_eq!(config.source_dir, PathBuf::from("app"));
        assert_eq!(config.output, PathBuf::from("var/_ide-helper.php"));
        assert_eq!(config.services["mailer"], "App\\Service\\Mailer");
        assert_eq!(config.namespace_grouping, NamespaceGrouping::Interleaved);
        assert_eq!(config.facade_markers, vec![DEFAULT_FACADE_MARKER]);
        assert!(config.autowire);
        assert!(config.atomic_write);
        validate(&config).unwrap();
    }

    #[test]
    fn test_empty_config_is_default() {
        let config = Config::parse_str("").unwrap();
        assert_eq!(config.source_dir, PathBuf::from("src"));
        assert_eq!(config.output, PathBuf::from("_ide-helper.php"));
        assert_eq!(config.namespace_grouping, NamespaceGrouping::Grouped);
    }

    #[test]
    fn test_validate_rejects_bad_glob() {
        let config = Config {
            excluded_paths: vec!["[".to_string()],
            ..Config::default()
        };
        assert!(matches!(validate(&config), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_rejects_missing_markers() {
        let config = Config {
            facade_markers: vec![],
            ..Config::default()
        };
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_discover() {
        let temp = TempDir::new().unwrap();
        assert!(Config::discover(temp.path()).is_none());
        std::fs::write(temp.path().join(".facade-helper.yaml"), "autowire: false\n").unwrap();
        let found = Config::discover(temp.path()).unwrap();
        assert!(!Config::parse_file(found).unwrap().autowire);
    }
}

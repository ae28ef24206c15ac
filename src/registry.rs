//! Service registry: the dependency-lookup container facades resolve through.
//!
//! The generator never instantiates services. A lookup only tells it which
//! class to introspect.

use std::collections::BTreeMap;
use std::path::Path;

use crate::analysis::ClassIndex;
use crate::config::Config;
use crate::error::{Error, Result};

/// Container parameter holding the project root.
pub const PROJECT_DIR_PARAMETER: &str = "kernel.project_dir";

/// A service resolved from the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceInstance {
    /// The id it was looked up by.
    pub id: String,
    /// Fully qualified class name, without a leading `\`.
    pub class: String,
}

/// Key-to-service lookup plus read access to container parameters.
pub trait ServiceRegistry {
    fn has(&self, id: &str) -> bool;

    /// Look up a service. Unknown ids are an error.
    fn get(&self, id: &str) -> Result<ServiceInstance>;

    fn parameter(&self, name: &str) -> Option<String>;
}

/// Registry built from the `services` and `parameters` sections of the
/// config.
#[derive(Debug, Clone, Default)]
pub struct ContainerRegistry {
    services: BTreeMap<String, String>,
    parameters: BTreeMap<String, String>,
}

impl ContainerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from config. `kernel.project_dir` is always set to the
    /// project root.
    pub fn from_config(config: &Config) -> Self {
        let mut registry = Self::new();
        for (id, class) in &config.services {
            registry = registry.with_service(id, class);
        }
        for (name, value) in &config.parameters {
            registry = registry.with_parameter(name, value);
        }
        registry.with_project_dir(config.project_dir())
    }

    pub fn with_service(mut self, id: &str, class: &str) -> Self {
        self.services
            .insert(id.to_string(), class.trim_start_matches('\\').to_string());
        self
    }

    pub fn with_parameter(mut self, name: &str, value: &str) -> Self {
        self.parameters.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_project_dir<P: AsRef<Path>>(self, dir: P) -> Self {
        let dir = dir.as_ref().to_string_lossy().to_string();
        self.with_parameter(PROJECT_DIR_PARAMETER, &dir)
    }
}

impl ServiceRegistry for ContainerRegistry {
    fn has(&self, id: &str) -> bool {
        self.services.contains_key(id)
    }

    fn get(&self, id: &str) -> Result<ServiceInstance> {
        let class = self
            .services
            .get(id)
            .ok_or_else(|| Error::ServiceNotFound { id: id.to_string() })?;

        Ok(ServiceInstance {
            id: id.to_string(),
            class: class.clone(),
        })
    }

    fn parameter(&self, name: &str) -> Option<String> {
        self.parameters.get(name).cloned()
    }
}

/// Wraps a registry so that an id naming a concrete indexed class resolves
/// to that class when the inner registry does not know it.
pub struct Autowiring<'a, R: ServiceRegistry + ?Sized> {
    inner: &'a R,
    index: &'a ClassIndex,
}

impl<'a, R: ServiceRegistry + ?Sized> Autowiring<'a, R> {
    pub fn new(inner: &'a R, index: &'a ClassIndex) -> Self {
        Self { inner, index }
    }

    fn autowired(&self, id: &str) -> Option<String> {
        self.index
            .get(id)
            .filter(|class| class.is_instantiable())
            .map(|class| class.fqn())
    }
}

impl<R: ServiceRegistry + ?Sized> ServiceRegistry for Autowiring<'_, R> {
    fn has(&self, id: &str) -> bool {
        self.inner.has(id) || self.autowired(id).is_some()
    }

    fn get(&self, id: &str) -> Result<ServiceInstance> {
        match self.inner.get(id) {
            Err(Error::ServiceNotFound { .. }) => match self.autowired(id) {
                Some(class) => {
                    tracing::debug!(id, class = %class, "autowired service");
                    Ok(ServiceInstance {
                        id: id.to_string(),
                        class,
                    })
                }
                None => Err(Error::ServiceNotFound { id: id.to_string() }),
            },
            other => other,
        }
    }

    fn parameter(&self, name: &str) -> Option<String> {
        self.inner.parameter(name)
    }
}

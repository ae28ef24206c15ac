//! Helper file emission.
//!
//! [`render`] turns analyzed methods into stub signatures and
//! [`writer`] lays the stub classes out as PHP source.

pub mod render;
pub mod writer;

pub use render::{export_float, export_string, Exporter, StubMethod};
pub use writer::StubWriter;

use crate::analysis::ClassIndex;
use crate::facade::FacadeDescriptor;

/// A facade stub: a class named after the facade whose static methods
/// forward to the service instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StubClass {
    /// Empty string for the global namespace.
    pub namespace: String,
    pub short_name: String,
    /// Fully qualified service class, without a leading `\`.
    pub service_class: String,
    pub methods: Vec<StubMethod>,
}

impl StubClass {
    /// Build the stub for `facade` from the public instance methods of
    /// `service_class`.
    pub fn build(facade: &FacadeDescriptor, service_class: &str, index: &ClassIndex) -> Self {
        let methods = index
            .methods_of(service_class)
            .into_iter()
            .filter(|m| m.is_forwardable())
            .map(|m| StubMethod::from_decl(m, service_class, index))
            .collect();

        Self {
            namespace: facade.namespace.clone(),
            short_name: facade.short_name.clone(),
            service_class: service_class.to_string(),
            methods,
        }
    }
}

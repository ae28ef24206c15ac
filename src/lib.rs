//! facade-ide-helper - IDE helper generator for PHP facades.
//!
//! A facade is a class whose static calls forward to a service resolved
//! from a dependency-injection container. IDEs cannot see through that
//! indirection, so this crate writes `_ide-helper.php`: one stub class per
//! facade, with a static method for every public instance method of the
//! backing service.
//!
//! # Architecture
//!
//! The pass is linear and single-threaded:
//!
//! - `scan`: walks the source directory and guesses each file's class name
//! - `analysis`: tree-sitter PHP analysis feeding a `ClassIndex`, the
//!   explicit manifest of known types that replaces runtime class loading
//! - `facade`: decides which candidates are facades and evaluates their
//!   `getFacadeAccessor()`
//! - `registry`: the key-to-service lookup
//! - `emit`: signature rendering and the namespace-block writer
//! - `generator`: ties the above together and writes the file atomically
//! - `config`, `report`, `logging`, `cli`: the surrounding tool

pub mod analysis;
pub mod cli;
pub mod config;
pub mod emit;
pub mod error;
pub mod facade;
pub mod generator;
pub mod logging;
pub mod registry;
pub mod report;
pub mod scan;

pub use analysis::{ClassIndex, PhpAnalyzer};
pub use config::Config;
pub use error::{Error, Result};
pub use facade::{FacadeDescriptor, FacadeFilter};
pub use generator::{FacadeSummary, GenerationReport, Generator};
pub use registry::{ContainerRegistry, ServiceInstance, ServiceRegistry};

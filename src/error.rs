//! Error types for the helper generator.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a generation run.
///
/// Per-file problems (unreadable sources, files without a class, abstract
/// classes) never surface here; the scanner and filter skip them.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("walking source tree: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("parsing {path}: {message}")]
    Parse { path: String, message: String },

    #[error("service {id:?} not found in the container")]
    ServiceNotFound { id: String },

    #[error("service {id:?} maps to class {class} which is not in the scanned sources")]
    ServiceClassUnknown { id: String, class: String },

    #[error("facade {facade} has no statically resolvable getFacadeAccessor()")]
    AccessorUnresolved { facade: String },

    #[error("writing {}: {source}", path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

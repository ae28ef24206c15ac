//! AST-backed analysis of PHP sources.
//!
//! This module replaces runtime reflection with facts read from the source
//! tree:
//! - Declarations (classes, interfaces, traits, enums) with their parents
//! - Methods with visibility, parameters, defaults and return types
//! - Class constants and statically evaluable `return` values
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────┐     ┌───────────────┐
//! │ PHP files       │────▶│ PhpAnalyzer  │────▶│ FileFacts     │
//! └─────────────────┘     │ (tree-sitter)│     │ (ClassDecls)  │
//!                         └──────────────┘     └───────────────┘
//!                                                      │
//!                                                      ▼
//!                                              ┌───────────────┐
//!                                              │ ClassIndex    │
//!                                              │ (by FQN)      │
//!                                              └───────────────┘
//! ```

mod facts;
mod index;
mod names;
mod php;

pub use facts::{
    ArrayEntry, ClassDecl, ClassKind, FileFacts, Literal, MethodDecl, Param, TypeHint,
    Visibility, BUILTIN_TYPES,
};
pub use index::ClassIndex;
pub use names::{last_segment, NameResolver};
pub use php::{ParsedFile, PhpAnalyzer};

use once_cell::sync::OnceCell;

/// Static storage for the PHP analyzer.
static PHP_ANALYZER: OnceCell<PhpAnalyzer> = OnceCell::new();

/// Shared analyzer instance, created on first use.
pub fn php_analyzer() -> &'static PhpAnalyzer {
    PHP_ANALYZER.get_or_init(PhpAnalyzer::new)
}

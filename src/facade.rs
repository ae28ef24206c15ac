//! Facade detection and accessor resolution.

use crate::analysis::{ClassDecl, ClassIndex, Literal};
use crate::error::{Error, Result};
use crate::scan::Candidate;

/// Static method every facade implements to name its backing service.
pub const ACCESSOR_METHOD: &str = "getFacadeAccessor";

/// Constant references are followed at most this many times.
const MAX_CONSTANT_DEPTH: usize = 8;

/// A concrete class that satisfies the facade contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacadeDescriptor {
    /// Fully qualified name, without a leading `\`.
    pub fqn: String,
    /// Empty string for the global namespace.
    pub namespace: String,
    pub short_name: String,
    /// Service id returned by `getFacadeAccessor()`.
    pub accessor: String,
    pub path: String,
}

/// Decides which candidates are facades, using only type-level facts.
pub struct FacadeFilter<'a> {
    index: &'a ClassIndex,
    markers: &'a [String],
}

impl<'a> FacadeFilter<'a> {
    pub fn new(index: &'a ClassIndex, markers: &'a [String]) -> Self {
        Self { index, markers }
    }

    /// Whether `fqn` extends or implements one of the facade markers.
    pub fn is_facade(&self, fqn: &str) -> bool {
        self.markers
            .iter()
            .any(|marker| self.index.is_subclass_of(fqn, marker) || self.index.implements(fqn, marker))
    }

    /// Resolve a candidate to an eligible facade declaration. Unknown names,
    /// abstract classes, interfaces, traits and enums are skipped.
    pub fn eligible(&self, candidate: &Candidate) -> Option<&'a ClassDecl> {
        let fqn = candidate.fqn();

        let Some(class) = self.index.get(&fqn) else {
            tracing::debug!(class = %fqn, "not a known class");
            return None;
        };

        if !class.is_instantiable() {
            tracing::debug!(class = %fqn, kind = %class.kind, "not a concrete class");
            return None;
        }

        if !self.is_facade(&fqn) {
            tracing::debug!(class = %fqn, "not a facade");
            return None;
        }

        Some(class)
    }

    /// Evaluate the facade's `getFacadeAccessor()`.
    pub fn accessor_key(&self, class: &ClassDecl) -> Result<String> {
        let fqn = class.fqn();
        let unresolved = || Error::AccessorUnresolved { facade: fqn.clone() };

        let method = self
            .index
            .find_method(&fqn, ACCESSOR_METHOD)
            .filter(|m| m.is_static)
            .ok_or_else(unresolved)?;

        method
            .constant_return
            .as_ref()
            .and_then(|value| self.evaluate_key(value, &fqn, 0))
            .ok_or_else(unresolved)
    }

    /// `called` is the facade being described; `static::` binds to it even
    /// when the accessor is inherited.
    fn evaluate_key(&self, value: &Literal, called: &str, depth: usize) -> Option<String> {
        match value {
            Literal::String(s) => Some(s.clone()),
            Literal::Int(i) => Some(i.to_string()),
            Literal::ClassConstant { class, name } if depth < MAX_CONSTANT_DEPTH => {
                let constant = self.index.constant(class, name)?;
                self.evaluate_key(constant, called, depth + 1)
            }
            Literal::LateStaticConstant { name, .. } if name.eq_ignore_ascii_case("class") => {
                Some(called.to_string())
            }
            Literal::LateStaticConstant { name, .. } if depth < MAX_CONSTANT_DEPTH => {
                let constant = self.index.constant(called, name)?;
                self.evaluate_key(constant, called, depth + 1)
            }
            Literal::Binary { op, left, right } if op == "." => {
                let left = self.evaluate_key(left, called, depth)?;
                Some(left + &self.evaluate_key(right, called, depth)?)
            }
            _ => None,
        }
    }

    /// Run the eligibility check and accessor resolution together.
    pub fn describe(&self, candidate: &Candidate) -> Result<Option<FacadeDescriptor>> {
        let Some(class) = self.eligible(candidate) else {
            return Ok(None);
        };

        let accessor = self.accessor_key(class)?;

        Ok(Some(FacadeDescriptor {
            fqn: class.fqn(),
            namespace: class.namespace.clone().unwrap_or_default(),
            short_name: class.name.clone(),
            accessor,
            path: class.path.clone(),
        }))
    }
}

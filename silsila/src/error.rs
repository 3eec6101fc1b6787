//! Error types for registry operations.
//!
//! Resolution has one real failure mode — the requested type was never
//! registered anywhere in the chain — plus the cast failure inherent to
//! a type-erased map: a factory or upcast adapter produced something
//! other than what its key promises.

use std::fmt;

use silsila_support::shorten_type_name;

use crate::key::TypeKey;

/// Main error type for all registry operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// No factory for the requested key, at any tier of any level.
    #[error("{}", .0)]
    MissingType(MissingTypeError),

    /// A factory or upcast adapter produced a value of the wrong type.
    #[error("factory for {key} produced a value that is not {expected}")]
    TypeMismatch {
        key: TypeKey,
        expected: &'static str,
    },
}

/// Error when resolution exhausts every tier without a match.
#[derive(Debug)]
pub struct MissingTypeError {
    /// The key that was requested.
    pub requested: TypeKey,
    /// Similar keys that ARE registered, for "did you mean?" output.
    pub suggestions: Vec<TypeKey>,
}

impl fmt::Display for MissingTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no factory registered for {}", self.requested)?;

        if !self.suggestions.is_empty() {
            write!(f, "\n  Did you mean one of:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n    - {}", shorten_type_name(suggestion.type_name()))?;
            }
        }

        write!(
            f,
            "\n  Hint: register a factory for {} or a subtype of it",
            shorten_type_name(self.requested.type_name())
        )
    }
}

/// Convenient Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

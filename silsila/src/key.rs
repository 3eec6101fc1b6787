//! Type keys — the lookup identity of a registration.
//!
//! [`TypeKey`] identifies a type in the registry. It pairs a [`TypeId`]
//! (equality and hashing) with the type's name (diagnostics). The
//! subtype-of relation between keys is not a property of the key itself:
//! Rust has no runtime subtype introspection, so that relation lives in
//! an explicit edge table next to the binding map (see `binding`).

use std::any::{TypeId, type_name};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Identifies a type used as a registration and lookup key.
///
/// # Examples
/// ```
/// use silsila::key::TypeKey;
///
/// let key = TypeKey::of::<String>();
/// assert!(key.type_name().ends_with("String"));
/// assert_eq!(key, TypeKey::of::<String>());
/// assert_ne!(key, TypeKey::of::<i32>());
/// ```
#[derive(Clone, Copy)]
pub struct TypeKey {
    type_id: TypeId,
    type_name: &'static str,
}

impl TypeKey {
    /// Creates the key for type `T`.
    ///
    /// Works for unsized types too, so trait objects such as
    /// `Arc<dyn Logger>` or `dyn Logger` itself can serve as keys.
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
        }
    }

    /// Returns the [`TypeId`] backing this key.
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the fully qualified type name, for diagnostics.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

// Equality and hashing go through the TypeId only; the name is carried
// purely for error messages.
impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({})", self.type_name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name)
    }
}

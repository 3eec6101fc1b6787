//! # Silsila — a minimal layered dependency-injection registry
//!
//! A requested type key resolves to a factory, with lookup falling back
//! through declared supertypes and, optionally, through a chain of
//! parent registries. Configuration goes through [`RegistryBuilder`];
//! resolution goes through the bound read-only [`Registry`]. The map
//! between them is shared, not copied, so late registrations are live.

pub mod binding;
pub mod error;
pub mod key;
pub mod registry;
pub mod shared;

pub use binding::{BoxedValue, FactoryFn, UpcastFn};
pub use error::{MissingTypeError, RegistryError, Result};
pub use key::TypeKey;
pub use registry::{Registry, RegistryBuilder};
pub use shared::shared;

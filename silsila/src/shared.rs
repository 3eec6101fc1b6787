//! The singleton wrapper — a factory decorator with a cached slot.
//!
//! [`shared`] wraps a typed factory in an `OnceCell` slot: the inner
//! factory runs at most once, lazily, on first resolution; every later
//! resolution returns a clone of the cached value. `OnceCell` blocks
//! concurrent initializers, so the at-most-once guarantee holds even
//! when two threads race on the first resolution.
//!
//! `T` must implement `Clone`; for identity-preserving sharing register
//! an `Arc<T>` so every clone points at the same instance.

use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::binding::{BoxedValue, FactoryFn};
use crate::error::Result;
use crate::registry::Registry;

/// Wraps `factory` so it is invoked at most once, caching its result.
///
/// ```rust,ignore
/// builder.register_key(TypeKey::of::<Arc<Database>>(), shared(|r| {
///     let url: String = r.get()?;
///     Ok(Arc::new(Database::connect(&url)))
/// }));
/// ```
pub fn shared<T>(factory: impl Fn(&Registry) -> Result<T> + Send + Sync + 'static) -> FactoryFn
where
    T: Clone + Send + Sync + 'static,
{
    let cell: Arc<OnceCell<T>> = Arc::new(OnceCell::new());

    Arc::new(move |registry: &Registry| {
        let value = cell.get_or_try_init(|| factory(registry))?;
        Ok(Box::new(value.clone()) as BoxedValue)
    })
}

//! # The registry — builder and resolver
//!
//! The two halves of the crate:
//!
//! ```text
//! RegistryBuilder  ──registry()──>  Registry
//!       │                              │
//!   register(...)                  get() / get_all()
//!       │                              │
//!       └───────── shared map ─────────┘
//! ```
//!
//! [`RegistryBuilder`] is the mutable configuration surface: it owns the
//! binding map and the one [`Registry`] bound to it. [`Registry`] is the
//! read-only resolver. The map is shared, not copied, so registrations
//! made after the resolver exists are still visible to it.
//!
//! # Examples
//! ```rust
//! use silsila::registry::RegistryBuilder;
//! use std::sync::Arc;
//!
//! struct Database {
//!     url: String,
//! }
//!
//! struct UserService {
//!     db: Arc<Database>,
//! }
//!
//! let mut builder = RegistryBuilder::new();
//! builder
//!     .register_instance(String::from("postgres://localhost"))
//!     .register_singleton::<Arc<Database>>(|r| {
//!         let url: String = r.get()?;
//!         Ok(Arc::new(Database { url }))
//!     })
//!     .register::<UserService>(|r| {
//!         let db: Arc<Database> = r.get()?;
//!         Ok(UserService { db })
//!     });
//!
//! let registry = builder.registry();
//! let service: UserService = registry.get().expect("failed to resolve");
//! assert_eq!(service.db.url, "postgres://localhost");
//! ```

use std::any::type_name;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use silsila_support::suggest_similar;
use tracing::{debug, trace};

use crate::binding::{BindingMap, BoxedValue, FactoryFn, UpcastFn};
use crate::error::{MissingTypeError, RegistryError, Result};
use crate::key::TypeKey;
use crate::shared::shared;

// ═══════════════════════════════════════════
// RegistryBuilder
// ═══════════════════════════════════════════

/// Mutable configuration front-end for a [`Registry`].
///
/// Every registration mutates the shared binding map in place, so the
/// bound resolver sees it immediately — including resolvers handed out
/// before the registration was made.
///
/// # Examples
/// ```rust,ignore
/// let mut builder = RegistryBuilder::with_parent(app_registry);
/// builder
///     .register::<RequestLog>(|_| Ok(RequestLog::new()))
///     .register_instance(RequestId(42));
/// let registry = builder.registry();
/// ```
pub struct RegistryBuilder {
    bindings: Arc<RwLock<BindingMap>>,
    registry: Registry,
}

impl RegistryBuilder {
    /// Creates a builder with an empty map and no parent.
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Creates a builder whose resolver falls back to `parent` when its
    /// own map yields no match at any tier.
    pub fn with_parent(parent: Registry) -> Self {
        Self::build(Some(parent))
    }

    fn build(parent: Option<Registry>) -> Self {
        let bindings = Arc::new(RwLock::new(BindingMap::new()));
        let registry = Registry {
            inner: Arc::new(RegistryInner {
                bindings: bindings.clone(),
                parent,
            }),
        };
        Self { bindings, registry }
    }

    /// Registers `factory` under the key derived from its return type.
    ///
    /// A new instance is produced on every resolution; wrap with
    /// [`register_singleton`](Self::register_singleton) to cache.
    /// Re-registering a key silently replaces the previous factory.
    pub fn register<T>(
        &mut self,
        factory: impl Fn(&Registry) -> Result<T> + Send + Sync + 'static,
    ) -> &mut Self
    where
        T: Send + Sync + 'static,
    {
        self.register_key(
            TypeKey::of::<T>(),
            Arc::new(move |registry: &Registry| {
                Ok(Box::new(factory(registry)?) as BoxedValue)
            }),
        )
    }

    /// Registers a type-erased `factory` under an explicit `key`.
    ///
    /// The typed registration methods all funnel into this one. The
    /// factory's produced value must downcast to what `key` promises;
    /// a mismatch surfaces as [`RegistryError::TypeMismatch`] at
    /// resolution time.
    pub fn register_key(&mut self, key: TypeKey, factory: FactoryFn) -> &mut Self {
        self.bindings.write().insert(key, factory);
        self
    }

    /// Registers a pre-built value under its own runtime type.
    ///
    /// The value is cloned on every resolution, which makes instance
    /// registration an inherently pre-built singleton: register an
    /// `Arc<T>` and every resolution shares the same instance.
    pub fn register_instance<T>(&mut self, value: T) -> &mut Self
    where
        T: Clone + Send + Sync + 'static,
    {
        self.register_key(
            TypeKey::of::<T>(),
            Arc::new(move |_: &Registry| Ok(Box::new(value.clone()) as BoxedValue)),
        )
    }

    /// Registers `factory` wrapped in the singleton decorator: invoked
    /// at most once, its result cached and cloned on later resolutions.
    ///
    /// **`T` must implement `Clone`** — use `Arc<T>` for services.
    pub fn register_singleton<T>(
        &mut self,
        factory: impl Fn(&Registry) -> Result<T> + Send + Sync + 'static,
    ) -> &mut Self
    where
        T: Clone + Send + Sync + 'static,
    {
        self.register_key(TypeKey::of::<T>(), shared(factory))
    }

    /// Declares `S` a subtype of `T`, capturing the upcast adapter.
    ///
    /// A request for `T` with no exact match is then satisfied by a
    /// binding registered under `S`, with `upcast` converting the
    /// produced value. Edges compose transitively within this builder's
    /// map.
    ///
    /// ```rust,ignore
    /// builder.implements::<Lemon, Arc<dyn Fruit>>(|lemon| Arc::new(lemon));
    /// ```
    pub fn implements<S, T>(
        &mut self,
        upcast: impl Fn(S) -> T + Send + Sync + 'static,
    ) -> &mut Self
    where
        S: Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        let adapter: UpcastFn = Arc::new(move |value: BoxedValue| {
            let concrete = value.downcast::<S>().map_err(|_| RegistryError::TypeMismatch {
                key: TypeKey::of::<S>(),
                expected: type_name::<S>(),
            })?;
            Ok(Box::new(upcast(*concrete)) as BoxedValue)
        });

        self.bindings
            .write()
            .add_edge(TypeKey::of::<S>(), TypeKey::of::<T>(), adapter);
        self
    }

    /// Returns the resolver bound to this builder's map.
    ///
    /// There is exactly one resolver per builder; this hands out cheap
    /// clones of it.
    pub fn registry(&self) -> Registry {
        self.registry.clone()
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RegistryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryBuilder")
            .field("registered", &self.bindings.read().len())
            .finish()
    }
}

// ═══════════════════════════════════════════
// Registry
// ═══════════════════════════════════════════

/// Read-only resolver over a shared binding map, with an optional
/// parent to fall back to.
///
/// Created once by [`RegistryBuilder`]; its map binding never changes,
/// only the map's contents do (via the builder). Cloning is cheap and
/// every clone is the same resolver.
#[derive(Clone)]
pub struct Registry {
    inner: Arc<RegistryInner>,
}

struct RegistryInner {
    bindings: Arc<RwLock<BindingMap>>,
    parent: Option<Registry>,
}

impl Registry {
    /// Resolves one instance of `T`.
    ///
    /// ```rust,ignore
    /// let db: Arc<Database> = registry.get()?;
    /// ```
    pub fn get<T: Send + Sync + 'static>(&self) -> Result<T> {
        let key = TypeKey::of::<T>();
        downcast::<T>(self.get_key(&key)?, &key)
    }

    /// Resolves one instance for an explicit `key`.
    ///
    /// Lookup runs exact match, then subtype match, each on the local
    /// map, then defers the whole algorithm to the parent. The found
    /// factory is invoked with `self` — the originating resolver — so a
    /// factory found in a parent still resolves its own dependencies
    /// starting from this level.
    pub fn get_key(&self, key: &TypeKey) -> Result<BoxedValue> {
        trace!(key = %key, "resolving");

        let (factory, upcasts) = self.find(key).ok_or_else(|| {
            debug!(key = %key, "resolution miss");
            RegistryError::MissingType(MissingTypeError {
                requested: *key,
                suggestions: self.find_suggestions(key),
            })
        })?;

        let mut value = factory(self)?;
        for upcast in &upcasts {
            value = upcast(value)?;
        }
        Ok(value)
    }

    /// Resolves every local binding whose key equals or is a subtype of
    /// `T`, in registration order.
    ///
    /// Only this resolver's own map is consulted, never the parent. An
    /// empty result is `Ok`, not an error; every call re-invokes the
    /// matching factories (singleton wrappers still cache internally).
    pub fn get_all<T: Send + Sync + 'static>(&self) -> Result<Vec<T>> {
        let key = TypeKey::of::<T>();
        self.get_all_key(&key)?
            .into_iter()
            .map(|value| downcast::<T>(value, &key))
            .collect()
    }

    /// Explicit-key form of [`get_all`](Self::get_all).
    pub fn get_all_key(&self, key: &TypeKey) -> Result<Vec<BoxedValue>> {
        // Collect matches under the read lock, invoke after dropping it:
        // factories recurse into this resolver and may register more.
        let matches = self.inner.bindings.read().all_matching(key);

        let mut values = Vec::with_capacity(matches.len());
        for (factory, upcasts) in matches {
            let mut value = factory(self)?;
            for upcast in &upcasts {
                value = upcast(value)?;
            }
            values.push(value);
        }
        Ok(values)
    }

    /// Returns true if `get_key` would find a factory for `key`.
    pub fn contains_key(&self, key: &TypeKey) -> bool {
        self.find(key).is_some()
    }

    /// The three-tier lookup: exact, then first subtype in insertion
    /// order, then the parent's own three tiers. A parent's exact match
    /// never jumps ahead of a local subtype match — locality wins over
    /// precision.
    fn find(&self, key: &TypeKey) -> Option<(FactoryFn, Vec<UpcastFn>)> {
        {
            let map = self.inner.bindings.read();
            if let Some(factory) = map.exact(key) {
                return Some((factory, Vec::new()));
            }
            if let Some(found) = map.first_subtype(key) {
                return Some(found);
            }
        }
        self.inner.parent.as_ref().and_then(|parent| parent.find(key))
    }

    fn find_suggestions(&self, key: &TypeKey) -> Vec<TypeKey> {
        let mut candidates = Vec::new();
        self.collect_keys(&mut candidates);

        let names: Vec<&str> = candidates.iter().map(|k| k.type_name()).collect();
        let picked = suggest_similar(key.type_name(), &names, 3);

        candidates
            .into_iter()
            .filter(|candidate| picked.iter().any(|name| name == candidate.type_name()))
            .collect()
    }

    fn collect_keys(&self, out: &mut Vec<TypeKey>) {
        out.extend(self.inner.bindings.read().keys());
        if let Some(parent) = &self.inner.parent {
            parent.collect_keys(out);
        }
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("registered", &self.inner.bindings.read().len())
            .field("has_parent", &self.inner.parent.is_some())
            .finish()
    }
}

fn downcast<T: Send + Sync + 'static>(value: BoxedValue, key: &TypeKey) -> Result<T> {
    value
        .downcast::<T>()
        .map(|boxed| *boxed)
        .map_err(|_| RegistryError::TypeMismatch {
            key: *key,
            expected: type_name::<T>(),
        })
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════

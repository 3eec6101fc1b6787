//! The binding map — stores factories and the supertype edge table.
//!
//! The map is insertion-ordered: iteration order is the tie-break when
//! several registered subtypes satisfy a request, and the enumeration
//! order of [`Registry::get_all`](crate::registry::Registry::get_all).
//!
//! Rust has no runtime subtype checks, so the subtype-of relation is an
//! explicit table of edges declared through
//! [`RegistryBuilder::implements`](crate::registry::RegistryBuilder::implements).
//! Each edge carries a checked upcast adapter that converts a produced
//! value into the supertype's representation, validated at the
//! registration boundary instead of an unchecked cast at every resolution.

use std::any::Any;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use tracing::debug;

use crate::error::Result;
use crate::key::TypeKey;
use crate::registry::Registry;

/// A type-erased value produced by a factory.
pub type BoxedValue = Box<dyn Any + Send + Sync>;

/// Type alias for factory functions.
///
/// A factory receives the originating [`Registry`] (to resolve its own
/// dependencies) and returns an erased value or an error.
///
/// `Arc` rather than `Box`: factories are shared between the builder's
/// live map and every resolver level that can see it.
pub type FactoryFn = Arc<dyn Fn(&Registry) -> Result<BoxedValue> + Send + Sync>;

/// A checked adapter converting a subtype value into a supertype value.
pub type UpcastFn = Arc<dyn Fn(BoxedValue) -> Result<BoxedValue> + Send + Sync>;

/// A single registered entry: one key, one factory.
#[derive(Clone)]
pub(crate) struct Binding {
    pub key: TypeKey,
    pub factory: FactoryFn,
}

impl std::fmt::Debug for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding").field("key", &self.key).finish()
    }
}

/// Insertion-ordered factory map plus supertype edges.
///
/// Shared (behind a lock) between a builder and its resolver, so
/// registrations made after the resolver exists are still visible.
#[derive(Default)]
pub(crate) struct BindingMap {
    entries: Vec<Binding>,
    index: HashMap<TypeKey, usize>,
    /// sub → [(super, upcast)] direct edges; transitive closure is
    /// computed on lookup.
    edges: HashMap<TypeKey, Vec<(TypeKey, UpcastFn)>>,
}

impl BindingMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or silently replaces the factory for `key`.
    ///
    /// A replaced entry keeps its original insertion position, so the
    /// subtype tie-break stays stable across re-registration.
    pub fn insert(&mut self, key: TypeKey, factory: FactoryFn) {
        match self.index.get(&key) {
            Some(&pos) => {
                debug!(key = %key, "replaced binding");
                self.entries[pos].factory = factory;
            }
            None => {
                debug!(key = %key, "registered binding");
                self.index.insert(key, self.entries.len());
                self.entries.push(Binding { key, factory });
            }
        }
    }

    /// Declares `sub` as a subtype of `superkey`, with its upcast adapter.
    pub fn add_edge(&mut self, sub: TypeKey, superkey: TypeKey, upcast: UpcastFn) {
        debug!(sub = %sub, superkey = %superkey, "declared subtype edge");
        self.edges.entry(sub).or_default().push((superkey, upcast));
    }

    /// Exact-match lookup.
    pub fn exact(&self, key: &TypeKey) -> Option<FactoryFn> {
        self.index.get(key).map(|&pos| self.entries[pos].factory.clone())
    }

    /// First entry, in insertion order, whose key is a subtype of `key`.
    ///
    /// Returned with the upcast chain to apply to the produced value.
    /// Which subtype wins when several match is implementation-defined;
    /// here it is deterministic for a fixed registration order.
    pub fn first_subtype(&self, key: &TypeKey) -> Option<(FactoryFn, Vec<UpcastFn>)> {
        self.entries.iter().find_map(|binding| {
            self.upcast_path(&binding.key, key)
                .map(|path| (binding.factory.clone(), path))
        })
    }

    /// Every entry whose key equals or is a subtype of `key`, in
    /// insertion order, each with its upcast chain.
    pub fn all_matching(&self, key: &TypeKey) -> Vec<(FactoryFn, Vec<UpcastFn>)> {
        self.entries
            .iter()
            .filter_map(|binding| {
                self.upcast_path(&binding.key, key)
                    .map(|path| (binding.factory.clone(), path))
            })
            .collect()
    }

    /// BFS over the edge table from `from` to `to`, composing adapters.
    ///
    /// `Some(vec![])` when the keys are equal (non-strict relation).
    fn upcast_path(&self, from: &TypeKey, to: &TypeKey) -> Option<Vec<UpcastFn>> {
        if from == to {
            return Some(Vec::new());
        }

        let mut visited: HashSet<TypeKey> = HashSet::new();
        visited.insert(*from);

        let mut queue: VecDeque<(TypeKey, Vec<UpcastFn>)> = VecDeque::new();
        queue.push_back((*from, Vec::new()));

        while let Some((key, path)) = queue.pop_front() {
            for (superkey, upcast) in self.edges.get(&key).into_iter().flatten() {
                if !visited.insert(*superkey) {
                    continue;
                }
                let mut next = path.clone();
                next.push(upcast.clone());
                if superkey == to {
                    return Some(next);
                }
                queue.push_back((*superkey, next));
            }
        }

        None
    }

    /// All registered keys, for "did you mean?" suggestions.
    pub fn keys(&self) -> Vec<TypeKey> {
        self.entries.iter().map(|binding| binding.key).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

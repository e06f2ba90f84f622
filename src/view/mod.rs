//! Accessor bundles over a property store.
//!
//! An [`Accessor`] is the surface a loader populates: either the whole
//! store, or a [`ScopedView`] that prefixes every key with a base path and
//! delegates to the owning store.

mod scoped;


pub use scoped::ScopedView;

use serde_json::{Map, Value};

use crate::store::PropertyStore;

/// How a scoped view treats `assign`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    /// `assign` sets each given key below the base, leaving siblings alone.
    Child,
    /// `assign` replaces the whole subtree at the base in one write.
    Leaf,
}

/// Where an accessor is rooted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    /// The whole store.
    Root,
    /// The subtree at `base`.
    Scoped {
        /// Full path of the subtree.
        base: String,
        /// Assign behavior of the view.
        kind: ScopeKind,
    },
}

/// Read and write operations shared by the root store and scoped views.
///
/// Keys are relative to the accessor's scope.
pub trait Accessor {
    /// Value at `key`, if any.
    fn get(&self, key: &str) -> Option<&Value>;

    /// Whether anything is stored at `key`.
    fn has(&self, key: &str) -> bool;

    /// Stores `value` at `key`. Returns `false` if the write was refused.
    fn set(&mut self, key: &str, value: Value) -> bool;

    /// Writes a batch of top-level entries.
    fn assign(&mut self, entries: Map<String, Value>);

    /// Value of the first present key.
    fn any(&self, keys: &[&str]) -> Option<&Value>;

    /// Shallow copy of the object at `key` restricted to `properties`.
    fn pick(&self, key: &str, properties: &[&str]) -> Map<String, Value>;

    /// Shallow copy of the object at `key` without `properties`.
    fn omit(&self, key: &str, properties: &[&str]) -> Map<String, Value>;

    /// Everything this accessor covers, or `None` for a scope never written.
    fn to_json(&self) -> Option<&Value>;

    /// Where this accessor is rooted.
    fn scope(&self) -> Scope;
}

impl Accessor for PropertyStore {
    fn get(&self, key: &str) -> Option<&Value> {
        PropertyStore::get(self, key)
    }

    fn has(&self, key: &str) -> bool {
        PropertyStore::has(self, key)
    }

    fn set(&mut self, key: &str, value: Value) -> bool {
        PropertyStore::set(self, key, value)
    }

    fn assign(&mut self, entries: Map<String, Value>) {
        PropertyStore::assign(self, entries);
    }

    fn any(&self, keys: &[&str]) -> Option<&Value> {
        PropertyStore::any(self, keys)
    }

    fn pick(&self, key: &str, properties: &[&str]) -> Map<String, Value> {
        PropertyStore::pick(self, key, properties)
    }

    fn omit(&self, key: &str, properties: &[&str]) -> Map<String, Value> {
        PropertyStore::omit(self, key, properties)
    }

    fn to_json(&self) -> Option<&Value> {
        Some(self.tree())
    }

    fn scope(&self) -> Scope {
        Scope::Root
    }
}

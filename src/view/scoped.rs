use serde_json::{Map, Value};
use tracing::trace;

use crate::store::PropertyStore;

use super::{Accessor, Scope, ScopeKind};

/// Accessor rooted at a base path of a borrowed store.
///
/// Holds no data of its own. Every key is turned into
/// `base + separator + key` using the store's separator at call time, and
/// the operation runs on the store.
#[derive(Debug)]
pub struct ScopedView<'a> {
    store: &'a mut PropertyStore,
    base: String,
    kind: ScopeKind,
}

impl<'a> ScopedView<'a> {
    pub(crate) fn new(store: &'a mut PropertyStore, base: &str, kind: ScopeKind) -> Self {
        Self {
            store,
            base: base.to_string(),
            kind,
        }
    }

    /// Base path of the view.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Assign behavior of the view.
    pub fn kind(&self) -> ScopeKind {
        self.kind
    }

    /// Sets each entry below the base. Keys already under the base that are
    /// not in `entries` are kept.
    pub fn assign_merge(&mut self, entries: Map<String, Value>) {
        for (key, value) in entries {
            let path = self.path(&key);
            self.store.set(&path, value);
        }
    }

    /// Replaces the subtree at the base with `entries` in a single write.
    ///
    /// Returns `false` if the base is sealed or cannot be created.
    pub fn assign_replace(&mut self, entries: Map<String, Value>) -> bool {
        trace!(base = %self.base, "Replacing scoped subtree");
        self.store.set(&self.base, Value::Object(entries))
    }

    fn path(&self, key: &str) -> String {
        self.store.options().resolver().child(&self.base, key)
    }

    fn paths(&self, keys: &[&str]) -> Vec<String> {
        keys.iter().map(|key| self.path(key)).collect()
    }
}

impl Accessor for ScopedView<'_> {
    fn get(&self, key: &str) -> Option<&Value> {
        self.store.get(&self.path(key))
    }

    fn has(&self, key: &str) -> bool {
        self.store.has(&self.path(key))
    }

    fn set(&mut self, key: &str, value: Value) -> bool {
        let path = self.path(key);
        self.store.set(&path, value)
    }

    fn assign(&mut self, entries: Map<String, Value>) {
        match self.kind {
            ScopeKind::Child => self.assign_merge(entries),
            ScopeKind::Leaf => {
                self.assign_replace(entries);
            }
        }
    }

    fn any(&self, keys: &[&str]) -> Option<&Value> {
        let paths = self.paths(keys);
        let paths: Vec<&str> = paths.iter().map(String::as_str).collect();
        self.store.any(&paths)
    }

    fn pick(&self, key: &str, properties: &[&str]) -> Map<String, Value> {
        self.store.pick(&self.path(key), properties)
    }

    fn omit(&self, key: &str, properties: &[&str]) -> Map<String, Value> {
        self.store.omit(&self.path(key), properties)
    }

    fn to_json(&self) -> Option<&Value> {
        self.store.get(&self.base)
    }

    fn scope(&self) -> Scope {
        Scope::Scoped {
            base: self.base.clone(),
            kind: self.kind,
        }
    }
}

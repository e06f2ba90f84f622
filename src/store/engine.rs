use std::{collections::HashSet, fmt};

use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::{
    Result,
    plugins::{
        EnvLoader, JsonLoader, Loader, LoaderPlugin, LiteralLoader, PluginRegistry, TomlLoader,
    },
    view::{Scope, ScopeKind, ScopedView},
};

use super::{
    index::{Location, ReferenceIndex},
    options::{OptionsUpdate, StoreOptions, validate_separator},
    path::PathResolver,
    tree::{NodeKind, PropertyTree, is_plain_object},
};

/// Per-write settings for [`PropertyStore::set_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetOptions {
    /// Index every descendant path of an object value. When false only the
    /// written path itself is indexed.
    pub references: bool,
}

impl Default for SetOptions {
    fn default() -> Self {
        Self { references: true }
    }
}

/// Hierarchical, path-addressed property store.
///
/// Values live in a nested tree. A flat path index records where each
/// stored path lives, so a read is one hash lookup followed by a walk to
/// that node; the index never copies values. All writes go through
/// [`set_with`](Self::set_with), which keeps both structures in step:
/// stale entries under an overwritten path are invalidated, missing
/// ancestors are created and indexed, and the new subtree is materialized.
///
/// ```
/// use proptree::PropertyStore;
/// use serde_json::json;
///
/// let mut store = PropertyStore::new();
/// store.set("nested.property.foo", json!("bar"));
///
/// assert_eq!(store.get("nested.property"), Some(&json!({ "foo": "bar" })));
/// ```
#[derive(Clone, Default)]
pub struct PropertyStore {
    tree: PropertyTree,
    index: ReferenceIndex,
    sealed: HashSet<String>,
    options: StoreOptions,
    plugins: PluginRegistry,
}

impl fmt::Debug for PropertyStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyStore")
            .field("tree", self.tree.root())
            .field("indexed_paths", &self.index.len())
            .field("sealed", &self.sealed)
            .field("options", &self.options)
            .field("plugins", &self.plugins)
            .finish()
    }
}

impl PropertyStore {
    /// Creates an empty store with the default `.` separator and no plugins.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store with the built-in `literal`, `env`, `json`
    /// and `toml` loaders registered.
    pub fn with_defaults() -> Self {
        let mut store = Self::new();
        store.plugin::<LiteralLoader>(LiteralLoader::NAME);
        store.plugin::<EnvLoader>(EnvLoader::NAME);
        store.plugin::<JsonLoader>(JsonLoader::NAME);
        store.plugin::<TomlLoader>(TomlLoader::NAME);
        store
    }

    /// Creates an empty store using the given options.
    ///
    /// # Errors
    /// * `StoreError::InvalidSeparator` - If the separator is empty
    pub fn with_options(options: StoreOptions) -> Result<Self> {
        validate_separator(&options.separator)?;
        Ok(Self {
            options,
            ..Self::default()
        })
    }

    /// Derives a fresh, empty store that shares this store's plugin
    /// registrations. No data, seals or options are carried over.
    pub fn instance(&self) -> Self {
        Self {
            plugins: self.plugins.clone(),
            ..Self::default()
        }
    }

    /// Current options.
    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// Merges `update` into the current options.
    ///
    /// Paths written before a separator change keep their original keys.
    ///
    /// # Errors
    /// * `StoreError::InvalidSeparator` - If the new separator is empty
    pub fn set_options(&mut self, update: OptionsUpdate) -> Result<()> {
        self.options.merge(update)?;
        debug!(separator = %self.options.separator, "Store options updated");
        Ok(())
    }

    /// Value stored at `path`, if any.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let location = self.index.location(path)?;
        self.tree.walk(location.segments(path))
    }

    /// Whether anything is stored at `path`.
    pub fn has(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// The whole tree, rooted at an object.
    pub fn tree(&self) -> &Value {
        self.tree.root()
    }

    /// Whether `path` holds a value equal to `value`.
    pub fn equals(&self, path: &str, value: &Value) -> bool {
        self.get(path) == Some(value)
    }

    /// Value of the first path in `paths` that is present.
    pub fn any(&self, paths: &[&str]) -> Option<&Value> {
        paths.iter().find_map(|path| self.get(path))
    }

    /// Shallow copy of the object at `path` restricted to `properties`.
    ///
    /// Returns an empty map when `path` is absent or not an object.
    pub fn pick(&self, path: &str, properties: &[&str]) -> Map<String, Value> {
        let Some(Value::Object(object)) = self.get(path) else {
            return Map::new();
        };

        properties
            .iter()
            .filter_map(|property| {
                object
                    .get(*property)
                    .map(|value| (property.to_string(), value.clone()))
            })
            .collect()
    }

    /// Shallow copy of the object at `path` without `properties`.
    ///
    /// Returns an empty map when `path` is absent or not an object.
    pub fn omit(&self, path: &str, properties: &[&str]) -> Map<String, Value> {
        let Some(Value::Object(object)) = self.get(path) else {
            return Map::new();
        };

        object
            .iter()
            .filter(|(key, _)| !properties.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Whether writes to exactly `path` are blocked.
    pub fn is_sealed(&self, path: &str) -> bool {
        self.sealed.contains(path)
    }

    /// Number of indexed paths.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// True if nothing has been stored.
    pub fn is_empty(&self) -> bool {
        self.index.len() == 0
    }

    /// Every indexed path, in no particular order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.index.paths()
    }

    /// Stores `value` at `path`, indexing every descendant of an object.
    ///
    /// Returns `false` when the write was refused by policy; see
    /// [`set_with`](Self::set_with).
    pub fn set(&mut self, path: &str, value: Value) -> bool {
        self.set_with(path, value, SetOptions::default())
    }

    /// Stores `value` at `path`.
    ///
    /// 1. A sealed `path` is left untouched.
    /// 2. Each missing ancestor, and each ancestor currently holding a leaf,
    ///    is replaced by an empty object written through this same method,
    ///    so it is indexed like any other value.
    /// 3. `path` and every path indexed from the value it replaces are
    ///    dropped from the index.
    /// 4. The value is written under the terminal key and indexed; with
    ///    `options.references` an object value is indexed all the way down.
    ///
    /// Overwriting replaces the whole subtree; nothing is merged.
    ///
    /// Returns `false` without writing when `path` is sealed, when the parent
    /// object is frozen and the terminal key is new, or when an ancestor
    /// could not be created for either reason.
    pub fn set_with(&mut self, path: &str, value: Value, options: SetOptions) -> bool {
        if self.sealed.contains(path) {
            debug!(path, "Ignoring write to sealed path");
            return false;
        }

        let separator = self.options.separator.clone();
        let resolver = PathResolver::new(&separator);
        let segments = resolver.split(path);
        let Some((terminal, ancestors)) = segments.split_last() else {
            return false;
        };

        for depth in 0..ancestors.len() {
            match self.tree.child_kind(&ancestors[..depth], ancestors[depth]) {
                NodeKind::Branch => {}
                NodeKind::Missing | NodeKind::Leaf => {
                    let ancestor = resolver.join(&ancestors[..=depth]);
                    let created = self.set_with(
                        &ancestor,
                        Value::Object(Map::new()),
                        SetOptions { references: true },
                    );

                    if !created {
                        debug!(path, %ancestor, "Ancestor could not be created, write rejected");
                        return false;
                    }
                }
            }
        }

        self.index
            .invalidate(path, self.tree.node(&segments), &separator);

        if let Err(error) = self.tree.insert(ancestors, terminal, value) {
            debug!(path, ?error, "Tree rejected write");
            return false;
        }

        if let Some(stored) = self.tree.node(&segments) {
            let location = Location::of(&segments, &separator);
            self.index
                .materialize(path, location, stored, &separator, options.references);
        }

        trace!(path, references = options.references, "Stored value");
        true
    }

    /// Sets every top-level entry of `entries` as its own path.
    ///
    /// Keys not present in `entries` are left alone; each given key replaces
    /// whatever was stored under it.
    pub fn assign(&mut self, entries: Map<String, Value>) {
        for (key, value) in entries {
            self.set(&key, value);
        }
    }

    /// Write-protects `path`.
    ///
    /// Does nothing if `path` is absent. An object value is re-stored and
    /// frozen so it cannot gain keys; its existing keys and any nested
    /// objects stay writable. Sealing covers exactly `path`, not its
    /// ancestors or descendants.
    pub fn seal(&mut self, path: &str) {
        let Some(value) = self.get(path) else {
            debug!(path, "Nothing to seal");
            return;
        };

        if is_plain_object(value) {
            let value = value.clone();
            if self.set(path, value) {
                let separator = self.options.separator.clone();
                let segments = PathResolver::new(&separator).split(path);
                self.tree.freeze(&segments);
            }
        }

        self.sealed.insert(path.to_string());
        debug!(path, "Sealed path");
    }

    /// Value a view with the given scope sees as its whole document.
    pub fn resolve(&self, scope: &Scope) -> Option<&Value> {
        match scope {
            Scope::Root => Some(self.tree()),
            Scope::Scoped { base, .. } => self.get(base),
        }
    }

    /// View rooted at `base` whose `assign` merges key by key.
    pub fn child(&mut self, base: &str) -> ScopedView<'_> {
        ScopedView::new(self, base, ScopeKind::Child)
    }

    /// View rooted at `base` whose `assign` replaces the whole subtree.
    pub fn leaf(&mut self, base: &str) -> ScopedView<'_> {
        ScopedView::new(self, base, ScopeKind::Leaf)
    }

    /// Registers loader `P` under `name`, replacing any previous binding.
    pub fn plugin<P: LoaderPlugin>(&mut self, name: &str) {
        self.plugins.register::<P>(name);
    }

    /// Registered loaders.
    pub fn plugins(&self) -> &PluginRegistry {
        &self.plugins
    }

    /// Runs the loader registered as `name` against the whole store.
    ///
    /// `args` are decoded into the loader's argument type; `null` selects
    /// its defaults.
    ///
    /// # Errors
    /// * `StoreError::UnregisteredPlugin` - If nothing is registered as `name`
    /// * `StoreError::InvalidLoaderArgs` - If `args` do not decode
    /// * Any error the loader itself reports
    pub fn load(&mut self, name: &str, args: Value) -> Result<Box<dyn Loader>> {
        let descriptor = self.plugins.descriptor(name)?;
        descriptor.construct(self, args)
    }

    /// Runs the loader registered as `name` against a child view at `base`.
    ///
    /// # Errors
    /// Same as [`load`](Self::load).
    pub fn load_child(&mut self, name: &str, base: &str, args: Value) -> Result<Box<dyn Loader>> {
        let descriptor = self.plugins.descriptor(name)?;
        descriptor.construct(&mut self.child(base), args)
    }

    /// Runs the loader registered as `name` against a leaf view at `base`.
    ///
    /// # Errors
    /// Same as [`load`](Self::load).
    pub fn load_leaf(&mut self, name: &str, base: &str, args: Value) -> Result<Box<dyn Loader>> {
        let descriptor = self.plugins.descriptor(name)?;
        descriptor.construct(&mut self.leaf(base), args)
    }
}

use std::{collections::HashMap, fmt, sync::Arc};

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::{Result, StoreError, view::Accessor};

use super::{Loader, LoaderPlugin};

type ConstructFn = dyn Fn(&mut dyn Accessor, Value) -> Result<Box<dyn Loader>>;

/// Type-erased constructor for one registered loader.
///
/// The same constructor serves the root store and scoped views; the caller
/// decides which accessor it runs against.
#[derive(Clone)]
pub struct PluginDescriptor {
    name: String,
    construct: Arc<ConstructFn>,
}

impl PluginDescriptor {
    /// Descriptor constructing `P`, reporting argument errors under `name`.
    pub fn of<P: LoaderPlugin>(name: &str) -> Self {
        let plugin = name.to_string();
        let construct = move |target: &mut dyn Accessor, args: Value| -> Result<Box<dyn Loader>> {
            let args = decode_args::<P::Args>(&plugin, args)?;
            let loader = P::construct(target, args)?;
            Ok(Box::new(loader))
        };

        Self {
            name: name.to_string(),
            construct: Arc::new(construct),
        }
    }

    /// Name the loader is registered under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Runs the loader against `target`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidLoaderArgs` if `args` do not decode, or
    /// whatever the loader reports.
    pub fn construct(&self, target: &mut dyn Accessor, args: Value) -> Result<Box<dyn Loader>> {
        debug!(plugin = %self.name, scope = ?target.scope(), "Constructing loader");
        (self.construct)(target, args)
    }
}

impl fmt::Debug for PluginDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginDescriptor")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Loaders available to a store, by name.
///
/// Cloning shares the descriptors, which is how derived stores inherit
/// registrations without sharing any data.
#[derive(Debug, Clone, Default)]
pub struct PluginRegistry {
    plugins: HashMap<String, PluginDescriptor>,
}

impl PluginRegistry {
    /// Registers `P` under `name`, replacing any previous binding.
    pub fn register<P: LoaderPlugin>(&mut self, name: &str) {
        self.plugins
            .insert(name.to_string(), PluginDescriptor::of::<P>(name));
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.plugins.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.plugins.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Descriptor registered as `name`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::UnregisteredPlugin` naming the plugin.
    pub fn descriptor(&self, name: &str) -> Result<PluginDescriptor> {
        self.plugins
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::UnregisteredPlugin(name.to_string()))
    }
}

fn decode_args<A: DeserializeOwned + Default>(plugin: &str, args: Value) -> Result<A> {
    let decoded: Option<A> =
        serde_json::from_value(args).map_err(|e| StoreError::InvalidLoaderArgs {
            plugin: plugin.to_string(),
            details: e.to_string(),
        })?;

    Ok(decoded.unwrap_or_default())
}

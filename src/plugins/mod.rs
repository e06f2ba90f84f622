//! Loaders that populate a store from external sources.
//!
//! A loader is registered by name on a store and constructed against an
//! [`Accessor`]: the whole store, or a scoped view. It does all of its work
//! during construction; the returned [`Loader`] only remembers where it came
//! from so file-backed loaders can write the data back.

mod env;
mod file;
mod json;
mod literal;
mod registry;
mod toml_source;


pub use env::EnvLoader;
pub use file::FileArgs;
pub use json::JsonLoader;
pub use literal::LiteralLoader;
pub use registry::{PluginDescriptor, PluginRegistry};
pub use toml_source::TomlLoader;

use std::{fmt, path::Path};

use serde::de::DeserializeOwned;

use crate::{Result, StoreError, store::PropertyStore, view::Accessor, view::Scope};

/// A constructed loader.
pub trait Loader: fmt::Debug {
    /// Name of the loader type.
    fn name(&self) -> &'static str;

    /// Scope the loader was bound to.
    fn scope(&self) -> &Scope;

    /// Writes the loader's scope of `store` back to a file.
    ///
    /// `filename` overrides the file the loader was created with.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotPersistable` unless the loader is file backed.
    fn save(&self, _store: &PropertyStore, _filename: Option<&Path>) -> Result<()> {
        Err(StoreError::NotPersistable {
            loader: self.name(),
        })
    }
}

/// A loader type that can be registered on a store.
pub trait LoaderPlugin: Loader + Sized + 'static {
    /// Default registration name.
    const NAME: &'static str;

    /// Loader-specific arguments, decoded from the JSON value passed to
    /// `PropertyStore::load`. `null` decodes to `Default::default()`.
    type Args: DeserializeOwned + Default;

    /// Populates `target` and returns the loader.
    ///
    /// # Errors
    ///
    /// Returns an error if a required source cannot be read or parsed.
    fn construct(target: &mut dyn Accessor, args: Self::Args) -> Result<Self>;
}

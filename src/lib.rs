//! Proptree - hierarchical, path-addressed property store.
//!
//! Values are read and written through separator-delimited paths such as
//! `server.http.port`. The store can be filled from several sources:
//!
//! - Literal JSON objects
//! - The process environment
//! - JSON and TOML files, which can also be saved back
//!
//! Sources can target the whole store or a scoped view rooted at a path.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use proptree::{PropertyStore, plugins::FileArgs};
//! use serde_json::json;
//!
//! let mut store = PropertyStore::with_defaults();
//! store.load("literal", json!({ "server": { "port": 8080 } }))?;
//! store.load_child("json", "overrides", FileArgs::optional("overrides.json").into_value())?;
//! store.seal("server.port");
//!
//! assert_eq!(store.get("server.port"), Some(&json!(8080)));
//! # Ok::<(), proptree::StoreError>(())
//! ```

/// Error types and result aliases.
pub mod error;

/// Tree, index and mutation engine.
pub mod store;

/// Root and scoped accessor bundles.
pub mod view;

/// Loaders and the plugin registry.
pub mod plugins;

/// Logging setup for applications embedding the store.
pub mod tracing_config;

pub use error::{Result, StoreError};
pub use store::{OptionsUpdate, PropertyStore, SetOptions, StoreOptions};
pub use view::{Accessor, Scope, ScopeKind, ScopedView};

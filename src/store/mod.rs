//! Path-addressed property storage.
//!
//! A [`PropertyStore`] keeps its data twice: as a nested tree and as a flat
//! index from full path to value. Every write passes through one mutation
//! routine that invalidates, writes and re-indexes in a single pass, so the
//! two never disagree.

mod engine;
mod index;
mod options;
mod path;
mod tree;

#[cfg(test)]
mod tests;

pub use engine::{PropertyStore, SetOptions};
pub use options::{OptionsUpdate, StoreOptions};
pub use path::PathResolver;
pub use tree::is_plain_object;

use std::env;

use serde_json::Value;
use tracing::{debug, instrument};

use crate::{Result, view::Accessor, view::Scope};

use super::{Loader, LoaderPlugin};

/// Copies the process environment into its scope, one top-level key per
/// variable.
///
/// The environment is read once, at construction. Variables whose name or
/// value is not valid Unicode are skipped.
#[derive(Debug, Clone)]
pub struct EnvLoader {
    scope: Scope,
}

impl LoaderPlugin for EnvLoader {
    const NAME: &'static str = "env";

    type Args = ();

    #[instrument(skip_all)]
    fn construct(target: &mut dyn Accessor, _args: ()) -> Result<Self> {
        let mut loaded = 0usize;
        let mut skipped = 0usize;

        for (key, value) in env::vars_os() {
            match (key.into_string(), value.into_string()) {
                (Ok(key), Ok(value)) => {
                    target.set(&key, Value::String(value));
                    loaded += 1;
                }
                _ => skipped += 1,
            }
        }

        debug!(loaded, skipped, "Loaded environment variables");
        Ok(Self {
            scope: target.scope(),
        })
    }
}

impl Loader for EnvLoader {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn scope(&self) -> &Scope {
        &self.scope
    }
}

use serde_json::{Map, Value};

use crate::{Result, view::Accessor, view::Scope};

use super::{Loader, LoaderPlugin};

/// Assigns a literal object into its scope.
#[derive(Debug, Clone)]
pub struct LiteralLoader {
    scope: Scope,
}

impl LoaderPlugin for LiteralLoader {
    const NAME: &'static str = "literal";

    type Args = Map<String, Value>;

    fn construct(target: &mut dyn Accessor, args: Map<String, Value>) -> Result<Self> {
        let scope = target.scope();
        if !args.is_empty() {
            target.assign(args);
        }

        Ok(Self { scope })
    }
}

impl Loader for LiteralLoader {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn scope(&self) -> &Scope {
        &self.scope
    }
}

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Serializer, Value, ser::PrettyFormatter};
use tracing::instrument;

use crate::{Result, StoreError, store::PropertyStore, view::Accessor, view::Scope};

use super::{
    Loader, LoaderPlugin,
    file::{self, FileArgs},
};

/// Loads a JSON file into its scope and can save the scope back.
///
/// Object documents are assigned key by key; array and string documents
/// assign their indices. Saved files are tab indented.
#[derive(Debug, Clone)]
pub struct JsonLoader {
    scope: Scope,
    filename: Option<PathBuf>,
}

impl JsonLoader {
    /// File the loader was created with, if any.
    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    fn parse(path: &Path) -> Result<Map<String, Value>> {
        let content = file::read(path)?;
        let document: Value =
            serde_json::from_str(&content).map_err(|source| StoreError::JsonParse {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(file::document_entries(document))
    }
}

impl LoaderPlugin for JsonLoader {
    const NAME: &'static str = "json";

    type Args = FileArgs;

    #[instrument(skip(target))]
    fn construct(target: &mut dyn Accessor, args: FileArgs) -> Result<Self> {
        let scope = target.scope();
        let filename = file::load_into(Self::NAME, target, args, Self::parse)?;

        Ok(Self { scope, filename })
    }
}

impl Loader for JsonLoader {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn scope(&self) -> &Scope {
        &self.scope
    }

    fn save(&self, store: &PropertyStore, filename: Option<&Path>) -> Result<()> {
        let (path, content) = file::save_target(
            Self::NAME,
            store,
            &self.scope,
            self.filename.as_deref(),
            filename,
        )?;

        let null = Value::Null;
        let mut buffer = Vec::new();
        let mut serializer =
            Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"\t"));

        content
            .unwrap_or(&null)
            .serialize(&mut serializer)
            .map_err(|e| StoreError::Serialization {
                format: "json",
                details: e.to_string(),
            })?;

        file::write(path, &buffer)
    }
}

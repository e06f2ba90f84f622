use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::{Result, StoreError, store::PropertyStore, view::Accessor, view::Scope};

/// Arguments shared by the file-backed loaders.
///
/// ```
/// use proptree::plugins::FileArgs;
///
/// let args = FileArgs::optional("settings.json").into_value();
/// assert_eq!(args["required"], false);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileArgs {
    /// File to read at construction and to save to by default.
    pub filename: Option<PathBuf>,
    /// When false, a missing, unreadable or malformed file leaves the store
    /// untouched instead of failing.
    pub required: bool,
}

impl Default for FileArgs {
    fn default() -> Self {
        Self {
            filename: None,
            required: true,
        }
    }
}

impl FileArgs {
    /// Arguments for a file that must exist and parse.
    pub fn required(filename: impl Into<PathBuf>) -> Self {
        Self {
            filename: Some(filename.into()),
            required: true,
        }
    }

    /// Arguments for a file that may be absent or broken.
    pub fn optional(filename: impl Into<PathBuf>) -> Self {
        Self {
            filename: Some(filename.into()),
            required: false,
        }
    }

    /// Encodes the arguments for `PropertyStore::load`.
    pub fn into_value(self) -> Value {
        let mut args = Map::new();
        if let Some(filename) = self.filename {
            args.insert(
                "filename".to_string(),
                Value::String(filename.to_string_lossy().into_owned()),
            );
        }
        args.insert("required".to_string(), Value::Bool(self.required));
        Value::Object(args)
    }
}

/// Reads `args.filename` with `parse` and assigns the result into `target`.
///
/// Returns the filename to remember for saving.
pub(super) fn load_into(
    loader: &'static str,
    target: &mut dyn Accessor,
    args: FileArgs,
    parse: impl FnOnce(&Path) -> Result<Map<String, Value>>,
) -> Result<Option<PathBuf>> {
    let FileArgs { filename, required } = args;

    let Some(filename) = filename else {
        if required {
            return Err(StoreError::MissingFilename { loader });
        }
        return Ok(None);
    };

    match parse(&filename) {
        Ok(entries) if entries.is_empty() => {
            debug!(loader, path = %filename.display(), "Source file has no entries");
        }
        Ok(entries) => {
            debug!(loader, path = %filename.display(), keys = entries.len(), "Loaded source file");
            target.assign(entries);
        }
        Err(error) if !required => {
            warn!(loader, path = %filename.display(), %error, "Skipping optional source file");
        }
        Err(error) => return Err(error),
    }

    Ok(Some(filename))
}

pub(super) fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| StoreError::io(e, path))
}

pub(super) fn write(path: &Path, contents: &[u8]) -> Result<()> {
    fs::write(path, contents).map_err(|e| StoreError::io(e, path))?;
    debug!(path = %path.display(), bytes = contents.len(), "Saved source file");
    Ok(())
}

/// Entries to assign for a parsed document.
///
/// Objects assign their keys, arrays their indices and strings one
/// character per index. Other values have no keys and assign nothing.
pub(super) fn document_entries(document: Value) -> Map<String, Value> {
    match document {
        Value::Object(object) => object,
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| (index.to_string(), item))
            .collect(),
        Value::String(text) => text
            .chars()
            .enumerate()
            .map(|(index, c)| (index.to_string(), Value::String(c.to_string())))
            .collect(),
        Value::Null | Value::Bool(_) | Value::Number(_) => Map::new(),
    }
}

/// Target path for `save` and the content of the loader's scope.
pub(super) fn save_target<'s>(
    loader: &'static str,
    store: &'s PropertyStore,
    scope: &Scope,
    remembered: Option<&'s Path>,
    filename: Option<&'s Path>,
) -> Result<(&'s Path, Option<&'s Value>)> {
    let path = filename
        .or(remembered)
        .ok_or(StoreError::MissingFilename { loader })?;

    Ok((path, store.resolve(scope)))
}

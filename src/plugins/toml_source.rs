use std::path::{Path, PathBuf};

use serde_json::{Map, Number, Value};
use tracing::instrument;

use crate::{Result, StoreError, store::PropertyStore, view::Accessor, view::Scope};

use super::{
    Loader, LoaderPlugin,
    file::{self, FileArgs},
};

/// Loads a TOML file into its scope and can save the scope back.
///
/// Datetimes are stored as strings. TOML has no null, so `null` values are
/// dropped when saving.
#[derive(Debug, Clone)]
pub struct TomlLoader {
    scope: Scope,
    filename: Option<PathBuf>,
}

impl TomlLoader {
    /// File the loader was created with, if any.
    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    fn parse(path: &Path) -> Result<Map<String, Value>> {
        let content = file::read(path)?;
        let table: toml::Table =
            toml::from_str(&content).map_err(|e| StoreError::toml_parse(e, Some(path)))?;

        Ok(table
            .into_iter()
            .map(|(key, value)| (key, toml_to_json(value)))
            .collect())
    }
}

impl LoaderPlugin for TomlLoader {
    const NAME: &'static str = "toml";

    type Args = FileArgs;

    #[instrument(skip(target))]
    fn construct(target: &mut dyn Accessor, args: FileArgs) -> Result<Self> {
        let scope = target.scope();
        let filename = file::load_into(Self::NAME, target, args, Self::parse)?;

        Ok(Self { scope, filename })
    }
}

impl Loader for TomlLoader {
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

        let Some(toml::Value::Table(table)) = content.and_then(json_to_toml) else {
            return Err(StoreError::Serialization {
                format: "toml",
                details: "document root must be a table".to_string(),
            });
        };

        let rendered = toml::to_string_pretty(&table).map_err(|e| StoreError::Serialization {
            format: "toml",
            details: e.to_string(),
        })?;

        file::write(path, rendered.as_bytes())
    }
}

fn toml_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::from(i),
        toml::Value::Float(f) => Number::from_f64(f).map_or(Value::Null, Value::Number),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(datetime) => Value::String(datetime.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(key, value)| (key, toml_to_json(value)))
                .collect(),
        ),
    }
}

fn json_to_toml(value: &Value) -> Option<toml::Value> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(toml::Value::Boolean(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Some(toml::Value::Integer(i)),
            None => n.as_f64().map(toml::Value::Float),
        },
        Value::String(s) => Some(toml::Value::String(s.clone())),
        Value::Array(items) => Some(toml::Value::Array(
            items.iter().filter_map(json_to_toml).collect(),
        )),
        Value::Object(object) => {
            let mut table = toml::Table::new();
            for (key, value) in object {
                if let Some(value) = json_to_toml(value) {
                    table.insert(key.clone(), value);
                }
            }
            Some(toml::Value::Table(table))
        }
    }
}

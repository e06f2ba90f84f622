use serde::{Deserialize, Serialize};

use crate::{Result, StoreError};

use super::path::PathResolver;

const DEFAULT_SEPARATOR: &str = ".";

/// Store-wide settings.
///
/// Mutable after construction through [`OptionsUpdate`]. Changing the
/// separator affects how later paths are parsed; paths already stored keep
/// the keys they were written under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreOptions {
    /// Delimiter between path segments.
    pub separator: String,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }
}

/// Partial options record merged into the current [`StoreOptions`].
///
/// Fields left as `None` keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionsUpdate {
    /// New path separator.
    pub separator: Option<String>,
}

impl OptionsUpdate {
    /// Update that only changes the separator.
    pub fn separator(separator: impl Into<String>) -> Self {
        Self {
            separator: Some(separator.into()),
        }
    }
}

impl StoreOptions {
    /// Parses options from TOML text, validating the result.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::TomlParse` for malformed TOML and
    /// `StoreError::InvalidSeparator` for an empty separator.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let options: StoreOptions =
            toml::from_str(content).map_err(|e| StoreError::toml_parse(e, None))?;
        validate_separator(&options.separator)?;
        Ok(options)
    }

    /// Merges `update` into these options.
    ///
    /// Validation happens before anything is applied, so a rejected update
    /// leaves the options untouched.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidSeparator` if the new separator is empty.
    pub fn merge(&mut self, update: OptionsUpdate) -> Result<()> {
        if let Some(separator) = update.separator {
            validate_separator(&separator)?;
            self.separator = separator;
        }
        Ok(())
    }

    /// Resolver bound to the current separator.
    pub fn resolver(&self) -> PathResolver<'_> {
        PathResolver::new(&self.separator)
    }
}

pub(crate) fn validate_separator(separator: &str) -> Result<()> {
    if separator.is_empty() {
        return Err(StoreError::InvalidSeparator {
            separator: separator.to_string(),
            reason: "separator must not be empty".to_string(),
        });
    }
    Ok(())
}

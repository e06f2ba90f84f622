use std::{
    fmt, io,
    path::{Path, PathBuf},
    result,
};

use thiserror::Error;

/// Error types for the property store.
///
/// Writes rejected by sealing are not errors; they are reported through the
/// `bool` returned by `set`. Everything here is either a misuse of the store
/// (unknown plugin, bad options) or a failure of a source while loading or
/// saving.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A loader was requested under a name nobody registered
    #[error("unregistered plugin '{0}'")]
    UnregisteredPlugin(String),

    /// The requested path separator cannot be used
    #[error("invalid path separator '{separator}': {reason}")]
    InvalidSeparator {
        /// The rejected separator
        separator: String,
        /// Why it was rejected
        reason: String,
    },

    /// Loader arguments could not be decoded into the plugin's argument type
    #[error("invalid arguments for plugin '{plugin}': {details}")]
    InvalidLoaderArgs {
        /// Name the plugin was invoked under
        plugin: String,
        /// Decoding error details
        details: String,
    },

    /// A file-backed loader was required but given no file to read
    #[error("{loader} loader requires a filename")]
    MissingFilename {
        /// Loader that needed the filename
        loader: &'static str,
    },

    /// File system error while reading or writing a source file
    #[error("I/O error on '{path}': {source}")]
    Io {
        /// File being accessed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// JSON source file did not parse
    #[error("failed to parse JSON at '{path}': {source}")]
    JsonParse {
        /// File being parsed
        path: PathBuf,
        /// Underlying parse error
        #[source]
        source: serde_json::Error,
    },

    /// TOML content did not parse
    #[error("failed to parse TOML at '{location}': {details}")]
    TomlParse {
        /// File path, or "string" for in-memory content
        location: String,
        /// Parse error details
        details: String,
    },

    /// Store content could not be serialized for saving
    #[error("failed to serialize {format}: {details}")]
    Serialization {
        /// Output format
        format: &'static str,
        /// Serialization error details
        details: String,
    },

    /// `save` was called on a loader that has no file behind it
    #[error("{loader} loader cannot be saved")]
    NotPersistable {
        /// Loader that was asked to save
        loader: &'static str,
    },
}

/// A specialized `Result` type for store operations.
pub type Result<T> = result::Result<T, StoreError>;

impl StoreError {
    /// Creates an I/O error with file path context.
    ///
    /// # Arguments
    ///
    /// * `source` - The underlying I/O error
    /// * `path` - Path of the file being read or written
    pub fn io(source: io::Error, path: &Path) -> Self {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Creates a TOML parsing error with optional file path context.
    ///
    /// # Arguments
    ///
    /// * `error` - The underlying parsing error
    /// * `path` - Optional path to the file that failed to parse
    pub fn toml_parse(error: impl fmt::Display, path: Option<&Path>) -> Self {
        let location = match path {
            Some(p) => {
                let clean_path = p.canonicalize().unwrap_or_else(|_| p.to_path_buf());
                clean_path.to_string_lossy().to_string()
            }
            None => "string".to_string(),
        };

        StoreError::TomlParse {
            location,
            details: error.to_string(),
        }
    }
}

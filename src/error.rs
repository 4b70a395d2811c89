//! Error types for dictionary loading, resolution and output

use thiserror::Error;

use crate::node::FieldType;

/// Result type for dictionary operations
pub type Result<T> = std::result::Result<T, DictionaryError>;

/// Dictionary errors
#[derive(Error, Debug)]
pub enum DictionaryError {
    #[error("Duplicate identifier conflict: '{id}' declared as {first} and as {second}")]
    DuplicateIdentifierConflict {
        id: String,
        first: String,
        second: String,
    },

    #[error("Dangling reference: '{from}' references undeclared identifier '{target}'")]
    DanglingReference { from: String, target: String },

    #[error("Invalid dictionary URI: {0}")]
    InvalidUri(String),

    #[error("Invalid namespace: {0}")]
    InvalidNamespace(String),

    #[error("Cannot convert {value} to {target}: {reason}")]
    Conversion {
        value: String,
        target: FieldType,
        reason: String,
    },

    #[error("Unsupported dictionary format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to write dictionary {dictionary}: {source}")]
    Write {
        dictionary: String,
        #[source]
        source: Box<DictionaryError>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl DictionaryError {
    /// Wrap an output failure with the name of the dictionary being written
    pub fn write_failed(dictionary: impl Into<String>, source: DictionaryError) -> Self {
        Self::Write {
            dictionary: dictionary.into(),
            source: Box::new(source),
        }
    }
}

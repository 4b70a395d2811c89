//! Dictionary Loading
//!
//! Reads a declaration tree from JSON or YAML and optionally builds it.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::declaration::DictionaryDecl;
use crate::error::{DictionaryError, Result};
use crate::graph::DictionaryGraph;

/// Text encoding of a dictionary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DictionaryFormat {
    #[default]
    Json,
    Yaml,
}

impl DictionaryFormat {
    /// Detect the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(Self::Json),
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => Ok(Self::Yaml),
            _ => Err(DictionaryError::UnsupportedFormat(path.display().to_string())),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }
}

impl std::str::FromStr for DictionaryFormat {
    type Err = DictionaryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            other => Err(DictionaryError::UnsupportedFormat(other.to_string())),
        }
    }
}

pub fn from_json_str(content: &str) -> Result<DictionaryDecl> {
    Ok(serde_json::from_str(content)?)
}

pub fn from_yaml_str(content: &str) -> Result<DictionaryDecl> {
    Ok(serde_yaml::from_str(content)?)
}

pub fn from_str(content: &str, format: DictionaryFormat) -> Result<DictionaryDecl> {
    match format {
        DictionaryFormat::Json => from_json_str(content),
        DictionaryFormat::Yaml => from_yaml_str(content),
    }
}

/// Read a declaration tree, detecting the format from the extension
pub fn load_from_path(path: &Path) -> Result<DictionaryDecl> {
    let format = DictionaryFormat::from_path(path)?;
    let content = fs::read_to_string(path)?;
    let dictionary = from_str(&content, format)?;
    debug!(
        path = %path.display(),
        dictionary = %dictionary.name,
        "Loaded dictionary declarations"
    );
    Ok(dictionary)
}

/// Read and build a dictionary file
pub fn build_from_path(path: &Path) -> Result<DictionaryGraph> {
    DictionaryGraph::build(&load_from_path(path)?)
}

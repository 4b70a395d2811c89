//! Configuration for the dictionary tools
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (dictionary.toml)
//! - Environment variables (DICTIONARY__*)
//!
//! ## Example config file (dictionary.toml):
//! ```toml
//! [output]
//! format = "yaml"
//! pretty = true
//!
//! [factory]
//! dictionary_uri = "fix:FIX44"
//! protocol = "FIX"
//!
//! [graph]
//! search_limit = 20
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::Result;
use crate::factory::MessageFactory;
use crate::graph::DictionaryGraph;
use crate::loader::DictionaryFormat;
use crate::uri::DictionaryUri;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DictionaryConfig {
    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Message factory settings
    #[serde(default)]
    pub factory: FactoryConfig,

    /// Graph query settings
    #[serde(default)]
    pub graph: GraphConfig,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Encoding used when no output extension decides it
    #[serde(default)]
    pub format: DictionaryFormat,

    /// Pretty-print JSON output
    #[serde(default = "default_true")]
    pub pretty: bool,
}

/// Message factory configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FactoryConfig {
    /// URI stamped on created messages
    #[serde(default)]
    pub dictionary_uri: DictionaryUri,

    /// Protocol stamped on created messages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
}

/// Graph query configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Maximum number of search results
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,
}

impl FactoryConfig {
    /// Message factory for `dictionary` stamped with the configured URI and protocol
    pub fn build_factory(&self, dictionary: Arc<DictionaryGraph>) -> Result<MessageFactory> {
        let factory = MessageFactory::new(self.dictionary_uri.clone(), dictionary)?;
        Ok(match &self.protocol {
            Some(protocol) => factory.with_protocol(protocol.clone()),
            None => factory,
        })
    }
}

fn default_true() -> bool {
    true
}

fn default_search_limit() -> usize {
    10
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: DictionaryFormat::Json,
            pretty: true,
        }
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            search_limit: default_search_limit(),
        }
    }
}

impl DictionaryConfig {
    /// Load configuration from default locations
    pub fn load() -> std::result::Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, adding a specific file on top of the defaults
    pub fn load_from(config_path: Option<&str>) -> std::result::Result<Self, ConfigError> {
        let mut builder = Config::builder();

        // Load from default locations
        let config_locations = [
            "dictionary.toml",
            ".dictionary.toml",
            "config/dictionary.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // Load from XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "message-dictionary", "dictionary") {
            let xdg_config = config_dir.config_dir().join("dictionary.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        // Load from specified path
        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // Load from environment variables (DICTIONARY__*)
        builder = builder.add_source(
            Environment::with_prefix("DICTIONARY")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }
}

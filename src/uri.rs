//! Dictionary URIs
//!
//! Compact `plugin:resource` tags naming a dictionary provided by a plugin.
//! The legacy three-part form `plugin:class:resource` is accepted and the
//! class part dropped.

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::OnceLock;

use crate::error::{DictionaryError, Result};

const SEPARATOR: char = ':';
const NULL_ALIAS: &str = "null";

fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("identifier pattern is valid"))
}

/// Plugin-scoped dictionary identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DictionaryUri {
    plugin_alias: String,
    resource_name: Option<String>,
}

impl DictionaryUri {
    /// The URI used when none is configured (`null:`)
    pub fn null() -> Self {
        Self {
            plugin_alias: NULL_ALIAS.to_string(),
            resource_name: None,
        }
    }

    /// URI naming a plugin only
    pub fn plugin(alias: &str) -> Result<Self> {
        check_identifier("plugin alias", alias)?;
        Ok(Self {
            plugin_alias: alias.to_string(),
            resource_name: None,
        })
    }

    /// URI naming a resource of a plugin
    pub fn new(alias: &str, resource: &str) -> Result<Self> {
        check_identifier("plugin alias", alias)?;
        check_identifier("resource name", resource)?;
        Ok(Self {
            plugin_alias: alias.to_string(),
            resource_name: Some(resource.to_string()),
        })
    }

    /// Parse a URI; `None` yields [`DictionaryUri::null`]
    pub fn parse(uri: Option<&str>) -> Result<Self> {
        let Some(uri) = uri else {
            return Ok(Self::null());
        };

        let parts: Vec<&str> = uri.split(SEPARATOR).collect();
        match parts.as_slice() {
            // `plugin:` displays with a trailing separator; accept it back
            [alias] | [alias, ""] => Self::plugin(alias),
            [alias, resource] => Self::new(alias, resource),
            [alias, _class, resource] => Self::new(alias, resource),
            _ => Err(DictionaryError::InvalidUri(uri.to_string())),
        }
    }

    pub fn plugin_alias(&self) -> &str {
        &self.plugin_alias
    }

    pub fn resource_name(&self) -> Option<&str> {
        self.resource_name.as_deref()
    }

    pub fn is_null(&self) -> bool {
        self.plugin_alias == NULL_ALIAS && self.resource_name.is_none()
    }
}

impl Default for DictionaryUri {
    fn default() -> Self {
        Self::null()
    }
}

impl fmt::Display for DictionaryUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.resource_name {
            Some(resource) => write!(f, "{}{}{}", self.plugin_alias, SEPARATOR, resource),
            None => write!(f, "{}{}", self.plugin_alias, SEPARATOR),
        }
    }
}

impl std::str::FromStr for DictionaryUri {
    type Err = DictionaryError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(Some(s))
    }
}

impl Serialize for DictionaryUri {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DictionaryUri {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

fn check_identifier(what: &str, value: &str) -> Result<()> {
    if identifier_pattern().is_match(value) {
        Ok(())
    } else {
        Err(DictionaryError::InvalidUri(format!("{} is not a valid {}", repr(value), what)))
    }
}

fn repr(s: &str) -> String {
    if s.is_empty() {
        "empty String".to_string()
    } else {
        format!("\"{}\"", s.replace('"', "\\\""))
    }
}

//! Message Factory
//!
//! Creates map-backed message instances for a resolved dictionary. Messages
//! of the factory's namespace are stamped with the dictionary URI, the
//! protocol and the `IsAdmin` flag. Whatever the namespace, every complex,
//! non-collection child flagged `CreateDefaultStructure` of a message the
//! dictionary declares is pre-populated with an empty nested message of the
//! dictionary's namespace (recursively).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::trace;

use crate::error::{DictionaryError, Result};
use crate::graph::DictionaryGraph;
use crate::node::attributes::{CREATE_DEFAULT_STRUCTURE, IS_ADMIN};
use crate::uri::DictionaryUri;

/// Message metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MsgMetaData {
    pub namespace: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dictionary_uri: Option<DictionaryUri>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
}

impl MsgMetaData {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            id: None,
            dictionary_uri: None,
            protocol: None,
            is_admin: false,
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }
}

/// Value stored in a message field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageValue {
    Message(Box<MapMessage>),
    Scalar(serde_json::Value),
}

/// Message backed by an insertion-ordered map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapMessage {
    pub metadata: MsgMetaData,
    #[serde(default)]
    pub fields: IndexMap<String, MessageValue>,
}

impl MapMessage {
    pub fn new(metadata: MsgMetaData) -> Self {
        Self {
            metadata,
            fields: IndexMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn namespace(&self) -> &str {
        &self.metadata.namespace
    }

    pub fn add_field(&mut self, name: impl Into<String>, value: MessageValue) {
        self.fields.insert(name.into(), value);
    }

    pub fn get_field(&self, name: &str) -> Option<&MessageValue> {
        self.fields.get(name)
    }

    /// Nested message stored under `name`
    pub fn get_message(&self, name: &str) -> Option<&MapMessage> {
        match self.fields.get(name) {
            Some(MessageValue::Message(m)) => Some(m),
            _ => None,
        }
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }
}

/// Factory bound to one dictionary and its namespace
#[derive(Debug, Clone)]
pub struct MessageFactory {
    namespace: String,
    dictionary_uri: DictionaryUri,
    dictionary: Arc<DictionaryGraph>,
    protocol: Option<String>,
}

impl MessageFactory {
    pub fn new(dictionary_uri: DictionaryUri, dictionary: Arc<DictionaryGraph>) -> Result<Self> {
        let namespace = dictionary.namespace().to_string();
        if namespace.trim().is_empty() {
            return Err(DictionaryError::InvalidNamespace(format!(
                "namespace of dictionary '{}' cannot be blank",
                dictionary.name()
            )));
        }
        Ok(Self {
            namespace,
            dictionary_uri,
            dictionary,
            protocol: None,
        })
    }

    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = Some(protocol.into());
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn dictionary_uri(&self) -> &DictionaryUri {
        &self.dictionary_uri
    }

    pub fn dictionary(&self) -> &DictionaryGraph {
        &self.dictionary
    }

    /// Create a message of the factory's namespace
    pub fn create_message(&self, name: &str) -> MapMessage {
        self.create_from_metadata(MsgMetaData::new(self.namespace.clone(), name))
    }

    pub fn create_message_in(&self, name: &str, namespace: &str) -> MapMessage {
        self.create_from_metadata(MsgMetaData::new(namespace, name))
    }

    pub fn create_message_with_id(&self, id: i64, name: &str, namespace: &str) -> MapMessage {
        self.create_from_metadata(MsgMetaData::new(namespace, name).with_id(id))
    }

    pub fn create_from_metadata(&self, metadata: MsgMetaData) -> MapMessage {
        let mut path = Vec::new();
        self.create_on_path(metadata, &mut path)
    }

    /// `path` holds the message names being populated above this one, so a
    /// structure that contains itself stops after one level.
    fn create_on_path(&self, mut metadata: MsgMetaData, path: &mut Vec<String>) -> MapMessage {
        let structure = self.dictionary.message(&metadata.name);
        if metadata.namespace == self.namespace {
            metadata.dictionary_uri = Some(self.dictionary_uri.clone());
            metadata.protocol = self.protocol.clone();
            if let Some(id) = structure {
                metadata.is_admin = self.dictionary.node(id).flag(IS_ADMIN);
            }
        }

        let mut message = MapMessage::new(metadata);
        let Some(structure) = structure else {
            return message;
        };

        path.push(message.name().to_string());
        for &child in self.dictionary.children(structure) {
            let node = self.dictionary.node(child);
            if !node.flag(CREATE_DEFAULT_STRUCTURE) || !self.dictionary.is_complex(child) || node.is_collection() {
                continue;
            }

            let sub_name = self.dictionary.reference_name(child).unwrap_or(node.name()).to_string();
            if path.contains(&sub_name) {
                trace!(message = message.name(), field = node.name(), "Skipping recursive default structure");
                continue;
            }

            trace!(message = message.name(), field = node.name(), sub = %sub_name, "Creating default structure");
            let sub = self.create_on_path(MsgMetaData::new(self.namespace.clone(), sub_name), path);
            message.add_field(node.name(), MessageValue::Message(Box::new(sub)));
        }
        path.pop();

        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declaration::{DictionaryDecl, FieldDecl, MessageDecl};
    use crate::node::FieldType;

    fn factory() -> MessageFactory {
        let dict = DictionaryDecl::new("fix")
            .with_namespace("FIX")
            .with_message(
                MessageDecl::new("Logon")
                    .with_attribute(IS_ADMIN, true)
                    .with_child(FieldDecl::new("HeartBtInt").with_type(FieldType::Integer)),
            )
            .with_message(
                MessageDecl::new("Header")
                    .with_id("hdr")
                    .with_child(FieldDecl::new("SeqNum").with_type(FieldType::Long)),
            )
            .with_message(
                MessageDecl::new("NewOrder")
                    .with_child(
                        FieldDecl::new("header")
                            .with_reference("hdr")
                            .with_attribute(CREATE_DEFAULT_STRUCTURE, true),
                    )
                    .with_child(
                        FieldDecl::new("legs")
                            .with_reference("hdr")
                            .with_attribute(CREATE_DEFAULT_STRUCTURE, true)
                            .collection(),
                    )
                    .with_child(FieldDecl::new("trailer").with_reference("hdr"))
                    .with_child(
                        FieldDecl::new("Price")
                            .with_type(FieldType::Decimal)
                            .with_attribute(CREATE_DEFAULT_STRUCTURE, true),
                    ),
            )
            .with_message(
                MessageDecl::new("Node")
                    .with_id("node")
                    .with_child(
                        FieldDecl::new("next")
                            .with_reference("node")
                            .with_attribute(CREATE_DEFAULT_STRUCTURE, true),
                    ),
            );
        let graph = Arc::new(DictionaryGraph::build(&dict).unwrap());
        MessageFactory::new(DictionaryUri::new("fix", "FIX44").unwrap(), graph)
            .unwrap()
            .with_protocol("FIX")
    }

    #[test]
    fn test_metadata_stamped_for_own_namespace() {
        let factory = factory();
        let logon = factory.create_message("Logon");
        assert_eq!(logon.namespace(), "FIX");
        assert!(logon.metadata.is_admin);
        assert_eq!(logon.metadata.dictionary_uri.as_ref().map(|u| u.to_string()), Some("fix:FIX44".into()));
        assert_eq!(logon.metadata.protocol.as_deref(), Some("FIX"));
        assert_eq!(logon.field_count(), 0);
    }

    #[test]
    fn test_foreign_namespace_is_not_stamped() {
        let factory = factory();
        let msg = factory.create_message_with_id(7, "NewOrder", "OTHER");
        assert_eq!(msg.metadata.id, Some(7));
        assert!(msg.metadata.dictionary_uri.is_none());
        assert!(msg.metadata.protocol.is_none());

        // Default structures still come from the dictionary, in its namespace
        let header = msg.get_message("header").expect("header pre-populated");
        assert_eq!(header.namespace(), "FIX");
        assert_eq!(header.metadata.protocol.as_deref(), Some("FIX"));

        let logon = factory.create_message_in("Logon", "OTHER");
        assert!(!logon.metadata.is_admin);
    }

    #[test]
    fn test_default_structure_only_for_complex_non_collections() {
        let factory = factory();
        let order = factory.create_message("NewOrder");
        let header = order.get_message("header").expect("header pre-populated");
        assert_eq!(header.name(), "Header");
        assert!(order.get_field("legs").is_none());
        assert!(order.get_field("trailer").is_none());
        assert!(order.get_field("Price").is_none());
    }

    #[test]
    fn test_recursive_default_structure_stops() {
        let factory = factory();
        let node = factory.create_message("Node");
        assert_eq!(node.field_count(), 0);
    }

    #[test]
    fn test_blank_namespace_rejected() {
        let graph = Arc::new(DictionaryGraph::build(&DictionaryDecl::new("x").with_namespace(" ")).unwrap());
        let err = MessageFactory::new(DictionaryUri::null(), graph).unwrap_err();
        assert!(matches!(err, DictionaryError::InvalidNamespace(_)));
    }
}

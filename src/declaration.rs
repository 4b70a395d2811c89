//! Declaration tree
//!
//! The parsed, not yet resolved form of a dictionary. Declarations may repeat
//! an identifier (a top-level entry and an embedded reference body, say); the
//! builder treats every repeat as the same entity.
//!
//! ## Text form (JSON shown, YAML is equivalent)
//! ```json
//! {
//!   "name": "orders",
//!   "fields": [ { "id": "f1", "name": "Price", "type": "decimal" } ],
//!   "messages": [
//!     { "id": "m1", "name": "Order", "fields": [
//!         { "kind": "field", "name": "Price", "reference": "f1" },
//!         { "kind": "field", "name": "Qty", "type": "integer" } ] },
//!     { "name": "Amendment", "reference": "m1" }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::node::FieldType;

/// A named attribute value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: serde_json::Value,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Root of the declaration tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DictionaryDecl {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
    /// Top-level field declarations
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
    /// Top-level message declarations
    #[serde(default)]
    pub messages: Vec<MessageDecl>,
}

impl DictionaryDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            description: None,
            attributes: Vec::new(),
            fields: Vec::new(),
            messages: Vec::new(),
        }
    }

    pub fn with_field(mut self, field: FieldDecl) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_message(mut self, message: MessageDecl) -> Self {
        self.messages.push(message);
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Namespace of the dictionary (falls back to its name)
    pub fn namespace(&self) -> &str {
        self.namespace.as_deref().unwrap_or(&self.name)
    }
}

/// Reference slot: either a back-reference by identifier or an embedded body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReferenceDecl {
    Id(String),
    Inline(Box<Declaration>),
}

impl From<&str> for ReferenceDecl {
    fn from(id: &str) -> Self {
        ReferenceDecl::Id(id.to_string())
    }
}

impl From<Declaration> for ReferenceDecl {
    fn from(decl: Declaration) -> Self {
        ReferenceDecl::Inline(Box::new(decl))
    }
}

impl From<FieldDecl> for ReferenceDecl {
    fn from(decl: FieldDecl) -> Self {
        Declaration::Field(decl).into()
    }
}

impl From<MessageDecl> for ReferenceDecl {
    fn from(decl: MessageDecl) -> Self {
        Declaration::Message(decl).into()
    }
}

/// Field declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDecl {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub field_type: Option<FieldType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_collection: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
    /// Named enumeration values
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<Attribute>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<ReferenceDecl>,
}

impl FieldDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            field_type: None,
            description: None,
            default_value: None,
            is_collection: false,
            required: false,
            attributes: Vec::new(),
            values: Vec::new(),
            reference: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_type(mut self, field_type: FieldType) -> Self {
        self.field_type = Some(field_type);
        self
    }

    pub fn with_reference(mut self, reference: impl Into<ReferenceDecl>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.attributes.push(Attribute::new(name, value));
        self
    }

    pub fn collection(mut self) -> Self {
        self.is_collection = true;
        self
    }
}

/// Message declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageDecl {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_collection: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<ReferenceDecl>,
    /// Nested fields and messages, in declaration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<Declaration>,
}

impl MessageDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: None,
            is_collection: false,
            attributes: Vec::new(),
            reference: None,
            fields: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_reference(mut self, reference: impl Into<ReferenceDecl>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.attributes.push(Attribute::new(name, value));
        self
    }

    pub fn with_child(mut self, child: impl Into<Declaration>) -> Self {
        self.fields.push(child.into());
        self
    }

    pub fn collection(mut self) -> Self {
        self.is_collection = true;
        self
    }
}

/// A field or message declaration, as found among a message's children
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Declaration {
    Field(FieldDecl),
    Message(MessageDecl),
}

impl From<FieldDecl> for Declaration {
    fn from(decl: FieldDecl) -> Self {
        Declaration::Field(decl)
    }
}

impl From<MessageDecl> for Declaration {
    fn from(decl: MessageDecl) -> Self {
        Declaration::Message(decl)
    }
}

impl Declaration {
    pub fn id(&self) -> Option<&str> {
        match self {
            Declaration::Field(f) => f.id.as_deref(),
            Declaration::Message(m) => m.id.as_deref(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Declaration::Field(f) => &f.name,
            Declaration::Message(m) => &m.name,
        }
    }

    pub fn reference(&self) -> Option<&ReferenceDecl> {
        match self {
            Declaration::Field(f) => f.reference.as_ref(),
            Declaration::Message(m) => m.reference.as_ref(),
        }
    }

    /// Nested children; always empty for fields
    pub fn children(&self) -> &[Declaration] {
        match self {
            Declaration::Field(_) => &[],
            Declaration::Message(m) => &m.fields,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Declaration::Field(_) => "field",
            Declaration::Message(_) => "message",
        }
    }
}

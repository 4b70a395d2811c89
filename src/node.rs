//! Resolved node types
//!
//! Nodes live in the arena owned by [`crate::DictionaryGraph`]. Containment
//! and reference edges are stored as [`NodeId`] handles into that arena, so
//! two edges point at the same entity exactly when their handles are equal.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle of a node in the graph arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Position of the node in the arena
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Scalar type tag of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Boolean,
    Byte,
    Short,
    Integer,
    Long,
    Float,
    Double,
    Decimal,
    Char,
    String,
    Date,
    Time,
    #[serde(rename = "datetime")]
    DateTime,
    ByteArray,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Boolean => "boolean",
            FieldType::Byte => "byte",
            FieldType::Short => "short",
            FieldType::Integer => "integer",
            FieldType::Long => "long",
            FieldType::Float => "float",
            FieldType::Double => "double",
            FieldType::Decimal => "decimal",
            FieldType::Char => "char",
            FieldType::String => "string",
            FieldType::Date => "date",
            FieldType::Time => "time",
            FieldType::DateTime => "datetime",
            FieldType::ByteArray => "byte_array",
        }
    }

    /// Whether values of this type are numbers
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            FieldType::Byte
                | FieldType::Short
                | FieldType::Integer
                | FieldType::Long
                | FieldType::Float
                | FieldType::Double
                | FieldType::Decimal
        )
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attribute values keyed by name, in declaration order
pub type Attributes = IndexMap<String, serde_json::Value>;

/// Well-known attribute names consulted by the message factory
pub mod attributes {
    /// Pre-populate a complex field with an empty nested message
    pub const CREATE_DEFAULT_STRUCTURE: &str = "CreateDefaultStructure";
    /// Marks administrative (session-level) messages
    pub const IS_ADMIN: &str = "IsAdmin";
}

/// Variant-specific payload of a node
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Field {
        field_type: Option<FieldType>,
        default_value: Option<serde_json::Value>,
        required: bool,
        /// Named enumeration values, in declaration order
        values: IndexMap<String, serde_json::Value>,
    },
    Message {
        /// Directly contained children, in declaration order
        children: Vec<NodeId>,
    },
}

/// A resolved field or message
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub(crate) id: Option<String>,
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) attributes: Attributes,
    pub(crate) is_collection: bool,
    pub(crate) reference: Option<NodeId>,
    pub(crate) kind: NodeKind,
}

impl Node {
    /// Declared identifier, if any
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Look up a single attribute value
    pub fn attribute(&self, key: &str) -> Option<&serde_json::Value> {
        self.attributes.get(key)
    }

    /// Attribute value interpreted as a boolean flag
    ///
    /// Accepts JSON booleans and the strings `"true"`/`"false"` (any case).
    pub fn flag(&self, key: &str) -> bool {
        match self.attribute(key) {
            Some(serde_json::Value::Bool(b)) => *b,
            Some(serde_json::Value::String(s)) => s.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }

    pub fn is_collection(&self) -> bool {
        self.is_collection
    }

    /// Node this one derives from, if any (non-owning)
    pub fn reference(&self) -> Option<NodeId> {
        self.reference
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn is_message(&self) -> bool {
        matches!(self.kind, NodeKind::Message { .. })
    }

    /// Owned children of a message; empty for fields
    pub fn children(&self) -> &[NodeId] {
        match &self.kind {
            NodeKind::Message { children } => children,
            NodeKind::Field { .. } => &[],
        }
    }

    /// Own type tag of a field (without following references)
    pub fn field_type(&self) -> Option<FieldType> {
        match &self.kind {
            NodeKind::Field { field_type, .. } => *field_type,
            NodeKind::Message { .. } => None,
        }
    }

    pub fn default_value(&self) -> Option<&serde_json::Value> {
        match &self.kind {
            NodeKind::Field { default_value, .. } => default_value.as_ref(),
            NodeKind::Message { .. } => None,
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(self.kind, NodeKind::Field { required: true, .. })
    }

    pub fn values(&self) -> Option<&IndexMap<String, serde_json::Value>> {
        match &self.kind {
            NodeKind::Field { values, .. } => Some(values),
            NodeKind::Message { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field(attributes: Attributes) -> Node {
        Node {
            id: None,
            name: "Price".into(),
            description: None,
            attributes,
            is_collection: false,
            reference: None,
            kind: NodeKind::Field {
                field_type: Some(FieldType::Decimal),
                default_value: None,
                required: false,
                values: IndexMap::new(),
            },
        }
    }

    #[test]
    fn test_flag_accepts_bool_and_string() {
        let mut attrs = Attributes::new();
        attrs.insert("A".into(), json!(true));
        attrs.insert("B".into(), json!("TRUE"));
        attrs.insert("C".into(), json!(1));
        let node = field(attrs);
        assert!(node.flag("A"));
        assert!(node.flag("B"));
        assert!(!node.flag("C"));
        assert!(!node.flag("missing"));
    }

    #[test]
    fn test_field_has_no_children() {
        let node = field(Attributes::new());
        assert!(node.children().is_empty());
        assert_eq!(node.field_type(), Some(FieldType::Decimal));
        assert!(!node.is_message());
    }

    #[test]
    fn test_field_type_serde_names() {
        assert_eq!(serde_json::to_string(&FieldType::DateTime).unwrap(), "\"datetime\"");
        assert_eq!(serde_json::to_string(&FieldType::ByteArray).unwrap(), "\"byte_array\"");
        let parsed: FieldType = serde_json::from_str("\"decimal\"").unwrap();
        assert_eq!(parsed, FieldType::Decimal);
    }
}

//! Resolved Dictionary Graph
//!
//! Flat arena of [`Node`]s plus the ordered top-level sequences and the
//! identifier table built by [`crate::builder::build`]. Nothing here mutates
//! after the build pass, so a graph can be shared across threads (for example
//! behind an `Arc`) and read without locking.
//!
//! This structure is shared between:
//! - the writer (re-emits declarations with identifier back-references)
//! - the message factory (walks message children and attributes)
//! - the graph export CLI (DOT, cycle report)

pub mod analysis;
pub mod dot;

pub use analysis::{ReferenceCycle, RelationGraph, EdgeKind};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::declaration::DictionaryDecl;
use crate::error::Result;
use crate::node::{Attributes, FieldType, Node, NodeId};

/// Search result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub node: NodeId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub is_message: bool,
    pub score: i64,
}

/// The resolved dictionary
#[derive(Debug, Clone)]
pub struct DictionaryGraph {
    pub(crate) name: String,
    pub(crate) namespace: String,
    pub(crate) description: Option<String>,
    pub(crate) attributes: Attributes,

    /// Node arena; `NodeId` indexes into it
    pub(crate) nodes: Vec<Node>,

    /// Top-level fields in declaration order
    pub(crate) fields: Vec<NodeId>,

    /// Top-level messages in declaration order
    pub(crate) messages: Vec<NodeId>,

    /// Identifier table in first-build order
    pub(crate) table: IndexMap<String, NodeId>,
}

impl DictionaryGraph {
    /// Build a graph from a declaration tree
    pub fn build(dictionary: &DictionaryDecl) -> Result<Self> {
        crate::builder::build(dictionary)
    }

    // ========== Dictionary metadata ==========

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    // ========== Arena access ==========

    /// Get a node by handle
    ///
    /// Handles are only produced by this graph, so indexing cannot miss.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Get a node by handle, if it belongs to this graph
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// All nodes with their handles, in creation order
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    // ========== Top-level sequences ==========

    pub fn fields(&self) -> &[NodeId] {
        &self.fields
    }

    pub fn messages(&self) -> &[NodeId] {
        &self.messages
    }

    /// Top-level field by name
    pub fn field(&self, name: &str) -> Option<NodeId> {
        self.fields.iter().copied().find(|&id| self.node(id).name() == name)
    }

    /// Top-level message by name
    pub fn message(&self, name: &str) -> Option<NodeId> {
        self.messages.iter().copied().find(|&id| self.node(id).name() == name)
    }

    // ========== Identifier table ==========

    /// Look up a node by declared identifier
    pub fn find(&self, identifier: &str) -> Option<&Node> {
        self.find_id(identifier).map(|id| self.node(id))
    }

    /// Look up a node handle by declared identifier
    pub fn find_id(&self, identifier: &str) -> Option<NodeId> {
        self.table.get(identifier).copied()
    }

    /// Identifier table entries in first-build order
    pub fn identifiers(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.table.iter().map(|(k, &v)| (k.as_str(), v))
    }

    // ========== Relations ==========

    /// Owned children of a message node
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).children()
    }

    /// Reference target of a node
    pub fn reference(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).reference()
    }

    pub fn attribute(&self, id: NodeId, key: &str) -> Option<&serde_json::Value> {
        self.node(id).attribute(key)
    }

    /// Follow the reference chain starting after `id`, stopping at cycles
    pub fn reference_chain(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut visited = HashSet::from([id]);
        let mut current = self.reference(id);
        while let Some(next) = current {
            if !visited.insert(next) {
                break;
            }
            chain.push(next);
            current = self.reference(next);
        }
        chain
    }

    /// Whether a node carries a nested structure
    ///
    /// True for messages and for fields whose reference chain reaches a message.
    pub fn is_complex(&self, id: NodeId) -> bool {
        self.node(id).is_message()
            || self
                .reference_chain(id)
                .into_iter()
                .any(|r| self.node(r).is_message())
    }

    /// Own type tag, else the first type tag along the reference chain
    pub fn effective_type(&self, id: NodeId) -> Option<FieldType> {
        self.node(id).field_type().or_else(|| {
            self.reference_chain(id)
                .into_iter()
                .find_map(|r| self.node(r).field_type())
        })
    }

    /// Name of the directly referenced node
    pub fn reference_name(&self, id: NodeId) -> Option<&str> {
        self.reference(id).map(|r| self.node(r).name())
    }

    // ========== Search ==========

    /// Search top-level fields and messages by name (fuzzy)
    pub fn search(&self, query: &str, limit: usize) -> Vec<SearchResult> {
        use fuzzy_matcher::skim::SkimMatcherV2;
        use fuzzy_matcher::FuzzyMatcher;

        let matcher = SkimMatcherV2::default();
        let mut results: Vec<(i64, NodeId)> = self
            .fields
            .iter()
            .chain(self.messages.iter())
            .filter_map(|&id| {
                matcher
                    .fuzzy_match(self.node(id).name(), query)
                    .map(|score| (score, id))
            })
            .collect();

        // Sort by score descending, ties keep declaration order
        results.sort_by(|a, b| b.0.cmp(&a.0));

        results
            .into_iter()
            .take(limit)
            .map(|(score, id)| {
                let node = self.node(id);
                SearchResult {
                    node: id,
                    name: node.name().to_string(),
                    id: node.id().map(str::to_string),
                    is_message: node.is_message(),
                    score,
                }
            })
            .collect()
    }
}

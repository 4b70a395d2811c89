//! Graph Builder
//!
//! Turns a [`DictionaryDecl`] into a [`DictionaryGraph`] in one depth-first
//! pass. Every identified declaration is materialized once; later
//! occurrences (top-level repeats, nested repeats, references by id or by
//! embedded body) resolve to the node already in the identifier table.
//!
//! Two resolution contexts exist:
//! - **nested**: a message reached as a direct child of another message has
//!   its own children expanded on the spot;
//! - **root**: top-level declarations and reference targets are built
//!   without expanding children. Top-level messages are expanded in an
//!   explicit follow-up step; reference targets are expanded only where some
//!   containment site walks them.
//!
//! A node is registered in the identifier table before its children or its
//! reference are resolved, so a declaration that points back at an ancestor
//! finds the partially built ancestor instead of recursing forever.
//!
//! Every `ReferenceDecl::Id` in the tree is checked against the declaration
//! index before the first node is built, including slots that resolution
//! never walks (repeats of an already built identifier, children of a
//! message reached only by reference).
//!
//! Resolution recurses once per reference link and per nesting level, so
//! the depth of a single reference chain or containment path is bounded by
//! the thread's stack. Inputs with chains or nesting in the thousands should
//! be built on a thread with a larger stack.

use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use tracing::{debug, trace};

use crate::declaration::{Declaration, DictionaryDecl, FieldDecl, MessageDecl, ReferenceDecl};
use crate::error::{DictionaryError, Result};
use crate::graph::DictionaryGraph;
use crate::node::{Attributes, Node, NodeId, NodeKind};

/// Build the resolved graph for a declaration tree
///
/// Fails fast with [`DictionaryError::DuplicateIdentifierConflict`] when one
/// identifier names declarations of different kind or name, and with
/// [`DictionaryError::DanglingReference`] when a reference names an
/// identifier declared nowhere in the tree. No partial graph is returned.
pub fn build(dictionary: &DictionaryDecl) -> Result<DictionaryGraph> {
    debug!(
        dictionary = %dictionary.name,
        fields = dictionary.fields.len(),
        messages = dictionary.messages.len(),
        "Building dictionary graph"
    );

    let mut builder = GraphBuilder::new();
    builder.index_dictionary(dictionary)?;

    let mut fields = TopLevel::with_capacity(dictionary.fields.len());
    for field in &dictionary.fields {
        let id = builder.resolve_top_level(DeclRef::Field(field))?;
        fields.push(id);
    }

    let mut messages = TopLevel::with_capacity(dictionary.messages.len());
    for message in &dictionary.messages {
        let id = builder.resolve_top_level(DeclRef::Message(message))?;
        messages.push(id);
    }

    debug!(
        dictionary = %dictionary.name,
        nodes = builder.nodes.len(),
        identified = builder.table.len(),
        expanded = builder.expanded.len(),
        "Dictionary graph built"
    );

    Ok(DictionaryGraph {
        name: dictionary.name.clone(),
        namespace: dictionary.namespace().to_string(),
        description: dictionary.description.clone(),
        attributes: collect_attributes(&dictionary.attributes),
        nodes: builder.nodes,
        fields: fields.ids,
        messages: messages.ids,
        table: builder.table,
    })
}

/// Borrowed view over either declaration variant
///
/// Top-level entries are typed (`FieldDecl`/`MessageDecl`) while nested
/// children are tagged [`Declaration`]s; this lets both flow through the same
/// resolution code.
#[derive(Debug, Clone, Copy)]
enum DeclRef<'d> {
    Field(&'d FieldDecl),
    Message(&'d MessageDecl),
}

impl<'d> From<&'d Declaration> for DeclRef<'d> {
    fn from(decl: &'d Declaration) -> Self {
        match decl {
            Declaration::Field(f) => DeclRef::Field(f),
            Declaration::Message(m) => DeclRef::Message(m),
        }
    }
}

impl<'d> DeclRef<'d> {
    fn id(self) -> Option<&'d str> {
        match self {
            DeclRef::Field(f) => f.id.as_deref(),
            DeclRef::Message(m) => m.id.as_deref(),
        }
    }

    fn name(self) -> &'d str {
        match self {
            DeclRef::Field(f) => &f.name,
            DeclRef::Message(m) => &m.name,
        }
    }

    fn kind_name(self) -> &'static str {
        match self {
            DeclRef::Field(_) => "field",
            DeclRef::Message(_) => "message",
        }
    }

    fn reference(self) -> Option<&'d ReferenceDecl> {
        match self {
            DeclRef::Field(f) => f.reference.as_ref(),
            DeclRef::Message(m) => m.reference.as_ref(),
        }
    }

    fn children(self) -> &'d [Declaration] {
        match self {
            DeclRef::Field(_) => &[],
            DeclRef::Message(m) => &m.fields,
        }
    }

    fn label(self) -> &'d str {
        self.id().unwrap_or_else(|| self.name())
    }

    /// Fresh node carrying the declaration's own attributes; no edges yet
    fn to_node(self) -> Node {
        match self {
            DeclRef::Field(f) => Node {
                id: f.id.clone(),
                name: f.name.clone(),
                description: f.description.clone(),
                attributes: collect_attributes(&f.attributes),
                is_collection: f.is_collection,
                reference: None,
                kind: NodeKind::Field {
                    field_type: f.field_type,
                    default_value: f.default_value.clone(),
                    required: f.required,
                    values: collect_attributes(&f.values),
                },
            },
            DeclRef::Message(m) => Node {
                id: m.id.clone(),
                name: m.name.clone(),
                description: m.description.clone(),
                attributes: collect_attributes(&m.attributes),
                is_collection: m.is_collection,
                reference: None,
                kind: NodeKind::Message {
                    children: Vec::with_capacity(m.fields.len()),
                },
            },
        }
    }
}

fn collect_attributes(attributes: &[crate::declaration::Attribute]) -> Attributes {
    attributes
        .iter()
        .map(|a| (a.name.clone(), a.value.clone()))
        .collect()
}

/// Ordered top-level sequence without repeats
struct TopLevel {
    ids: Vec<NodeId>,
    seen: HashSet<NodeId>,
}

impl TopLevel {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            ids: Vec::with_capacity(capacity),
            seen: HashSet::with_capacity(capacity),
        }
    }

    fn push(&mut self, id: NodeId) {
        if self.seen.insert(id) {
            self.ids.push(id);
        }
    }
}

/// State of a single build pass; discarded once the graph is returned
struct GraphBuilder<'d> {
    /// Every identified declaration in the tree, first occurrence wins
    index: HashMap<&'d str, DeclRef<'d>>,
    /// Node arena
    nodes: Vec<Node>,
    /// Identifier table: id -> node, in first-build order
    table: IndexMap<String, NodeId>,
    /// Messages whose children have been expanded
    expanded: HashSet<NodeId>,
}

impl<'d> GraphBuilder<'d> {
    fn new() -> Self {
        Self {
            index: HashMap::new(),
            nodes: Vec::new(),
            table: IndexMap::new(),
            expanded: HashSet::new(),
        }
    }

    // ========== Declaration index ==========

    fn index_dictionary(&mut self, dictionary: &'d DictionaryDecl) -> Result<()> {
        let mut references = Vec::new();
        for field in &dictionary.fields {
            self.index_decl(DeclRef::Field(field), &mut references)?;
        }
        for message in &dictionary.messages {
            self.index_decl(DeclRef::Message(message), &mut references)?;
        }
        self.check_references(&references)
    }

    /// Fail on the first identifier reference that names no declaration
    fn check_references(&self, references: &[(DeclRef<'d>, &'d str)]) -> Result<()> {
        match references.iter().find(|(_, target)| !self.index.contains_key(target)) {
            Some((owner, target)) => Err(DictionaryError::DanglingReference {
                from: owner.label().to_string(),
                target: target.to_string(),
            }),
            None => Ok(()),
        }
    }

    fn index_decl(&mut self, decl: DeclRef<'d>, references: &mut Vec<(DeclRef<'d>, &'d str)>) -> Result<()> {
        if let Some(id) = decl.id() {
            match self.index.get(id) {
                Some(first) => {
                    if first.kind_name() != decl.kind_name() || first.name() != decl.name() {
                        return Err(DictionaryError::DuplicateIdentifierConflict {
                            id: id.to_string(),
                            first: format!("{} '{}'", first.kind_name(), first.name()),
                            second: format!("{} '{}'", decl.kind_name(), decl.name()),
                        });
                    }
                }
                None => {
                    self.index.insert(id, decl);
                }
            }
        }

        match decl.reference() {
            Some(ReferenceDecl::Id(target)) => references.push((decl, target.as_str())),
            Some(ReferenceDecl::Inline(inner)) => self.index_decl(inner.as_ref().into(), references)?,
            None => {}
        }
        for child in decl.children() {
            self.index_decl(child.into(), references)?;
        }
        Ok(())
    }

    // ========== Resolution ==========

    /// Resolve a top-level declaration, then expand its children
    fn resolve_top_level(&mut self, decl: DeclRef<'d>) -> Result<NodeId> {
        let node = self.resolve(decl, true)?;
        self.expand(node, decl)?;
        Ok(node)
    }

    fn resolve(&mut self, decl: DeclRef<'d>, root_context: bool) -> Result<NodeId> {
        if let Some(&existing) = decl.id().and_then(|id| self.table.get(id)) {
            trace!(id = decl.label(), "Identifier table hit");
            if !root_context {
                self.expand(existing, decl)?;
            }
            return Ok(existing);
        }

        let node = NodeId(self.nodes.len());
        self.nodes.push(decl.to_node());
        if let Some(id) = decl.id() {
            self.table.insert(id.to_string(), node);
        }
        trace!(node = %node, name = decl.name(), kind = decl.kind_name(), "Created node");

        if !root_context {
            self.expand(node, decl)?;
        }

        if let Some(reference) = decl.reference() {
            let target = self.resolve_reference(decl, reference)?;
            self.nodes[node.0].reference = Some(target);
        }

        Ok(node)
    }

    /// Reference targets are resolved in root context
    fn resolve_reference(&mut self, owner: DeclRef<'d>, reference: &'d ReferenceDecl) -> Result<NodeId> {
        match reference {
            ReferenceDecl::Id(target) => {
                let Some(&decl) = self.index.get(target.as_str()) else {
                    return Err(DictionaryError::DanglingReference {
                        from: owner.label().to_string(),
                        target: target.clone(),
                    });
                };
                self.resolve(decl, true)
            }
            ReferenceDecl::Inline(decl) => self.resolve(decl.as_ref().into(), true),
        }
    }

    /// Attach resolved children to a message node, at most once per node
    ///
    /// A declaration without children does not count as an expansion, so a
    /// bare repeat of an identified message never hides the full declaration.
    fn expand(&mut self, node: NodeId, decl: DeclRef<'d>) -> Result<()> {
        let children = decl.children();
        if children.is_empty() || !self.nodes[node.0].is_message() {
            return Ok(());
        }
        if !self.expanded.insert(node) {
            trace!(node = %node, name = decl.name(), "Children already expanded");
            return Ok(());
        }

        trace!(node = %node, name = decl.name(), children = children.len(), "Expanding children");
        for child in children {
            let child_node = self.resolve(child.into(), false)?;
            if let NodeKind::Message { children } = &mut self.nodes[node.0].kind {
                children.push(child_node);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::FieldType;

    fn order_dictionary() -> DictionaryDecl {
        DictionaryDecl::new("orders")
            .with_message(
                MessageDecl::new("Order")
                    .with_id("m1")
                    .with_child(FieldDecl::new("Price").with_id("f1").with_type(FieldType::Decimal))
                    .with_child(FieldDecl::new("Qty").with_type(FieldType::Integer)),
            )
            .with_message(MessageDecl::new("Amendment").with_reference("m1"))
    }

    #[test]
    fn test_order_amendment_scenario() {
        let graph = build(&order_dictionary()).unwrap();

        assert_eq!(graph.messages().len(), 2);
        let order = graph.messages()[0];
        let amendment = graph.messages()[1];
        assert_eq!(graph.node(amendment).reference(), Some(order));

        let names: Vec<&str> = graph.children(order).iter().map(|&c| graph.node(c).name()).collect();
        assert_eq!(names, vec!["Price", "Qty"]);
        assert_eq!(graph.find_id("f1"), Some(graph.children(order)[0]));
    }

    #[test]
    fn test_empty_dictionary_is_valid() {
        let graph = build(&DictionaryDecl::new("empty")).unwrap();
        assert!(graph.fields().is_empty());
        assert!(graph.messages().is_empty());
        assert_eq!(graph.node_count(), 0);
    }

    #[test]
    fn test_unidentified_declarations_are_rebuilt() {
        let qty = FieldDecl::new("Qty").with_type(FieldType::Integer);
        let dict = DictionaryDecl::new("d")
            .with_message(MessageDecl::new("A").with_child(qty.clone()))
            .with_message(MessageDecl::new("B").with_child(qty));
        let graph = build(&dict).unwrap();

        let a = graph.children(graph.messages()[0])[0];
        let b = graph.children(graph.messages()[1])[0];
        assert_ne!(a, b);
        assert_eq!(graph.node(a), graph.node(b));
    }

    #[test]
    fn test_forward_reference_resolves_lazily() {
        let dict = DictionaryDecl::new("d")
            .with_field(FieldDecl::new("Alias").with_id("a").with_reference("b"))
            .with_field(FieldDecl::new("Base").with_id("b").with_type(FieldType::String));
        let graph = build(&dict).unwrap();

        assert_eq!(graph.fields().len(), 2);
        assert_eq!(graph.node(graph.fields()[0]).name(), "Alias");
        assert_eq!(graph.node(graph.fields()[0]).reference(), Some(graph.fields()[1]));
    }

    #[test]
    fn test_reference_chain_points_at_direct_target() {
        let dict = DictionaryDecl::new("d")
            .with_field(FieldDecl::new("A").with_id("a").with_reference("b"))
            .with_field(FieldDecl::new("B").with_id("b").with_reference("c"))
            .with_field(FieldDecl::new("C").with_id("c").with_type(FieldType::Long));
        let graph = build(&dict).unwrap();

        let a = graph.find("a").unwrap();
        assert_eq!(a.reference(), graph.find_id("b"));
        assert_eq!(graph.find("b").unwrap().reference(), graph.find_id("c"));
    }

    #[test]
    fn test_reference_does_not_expand_children() {
        // Template is only reachable through Alias's embedded reference body
        let template = MessageDecl::new("Template")
            .with_id("t")
            .with_child(FieldDecl::new("X").with_type(FieldType::Integer));
        let dict = DictionaryDecl::new("d").with_field(FieldDecl::new("Alias").with_reference(template));
        let graph = build(&dict).unwrap();

        let t = graph.find_id("t").unwrap();
        assert!(graph.children(t).is_empty());
        assert!(graph.messages().is_empty());
    }

    #[test]
    fn test_nested_message_expands_eagerly() {
        let dict = DictionaryDecl::new("d").with_message(
            MessageDecl::new("Outer").with_child(
                MessageDecl::new("Inner")
                    .with_id("inner")
                    .with_child(FieldDecl::new("Y").with_type(FieldType::Boolean)),
            ),
        );
        let graph = build(&dict).unwrap();

        let inner = graph.find_id("inner").unwrap();
        assert_eq!(graph.children(inner).len(), 1);
        assert_eq!(graph.children(graph.messages()[0]), &[inner]);
    }

    #[test]
    fn test_self_containing_message_terminates() {
        let dict = DictionaryDecl::new("d").with_message(
            MessageDecl::new("Tree")
                .with_id("tree")
                .with_child(FieldDecl::new("Value").with_type(FieldType::Integer))
                .with_child(MessageDecl::new("Tree").with_id("tree")),
        );
        let graph = build(&dict).unwrap();

        let tree = graph.find_id("tree").unwrap();
        assert_eq!(graph.children(tree).len(), 2);
        assert_eq!(graph.children(tree)[1], tree);
    }

    #[test]
    fn test_kind_mismatch_is_conflict() {
        let dict = DictionaryDecl::new("d")
            .with_field(FieldDecl::new("X").with_id("x"))
            .with_message(MessageDecl::new("X").with_id("x"));
        let err = build(&dict).unwrap_err();
        assert!(matches!(err, DictionaryError::DuplicateIdentifierConflict { ref id, .. } if id == "x"));
    }

    #[test]
    fn test_dangling_reference_on_repeat_fails() {
        // The repeat is a memo hit and its reference slot is never resolved
        let dict = DictionaryDecl::new("d")
            .with_field(FieldDecl::new("X").with_id("x"))
            .with_field(FieldDecl::new("X").with_id("x").with_reference("nowhere"));
        let err = build(&dict).unwrap_err();
        assert!(matches!(err, DictionaryError::DanglingReference { ref target, .. } if target == "nowhere"));
    }

    #[test]
    fn test_dangling_reference_under_reference_target_fails() {
        // Template is reached only by reference, so its children are never expanded
        let template = MessageDecl::new("Template")
            .with_id("t")
            .with_child(FieldDecl::new("Y").with_reference("nowhere"));
        let dict = DictionaryDecl::new("d").with_field(FieldDecl::new("Alias").with_reference(template));
        let err = build(&dict).unwrap_err();
        match err {
            DictionaryError::DanglingReference { from, target } => {
                assert_eq!(from, "Y");
                assert_eq!(target, "nowhere");
            }
            other => panic!("Expected DanglingReference, got {:?}", other),
        }
    }

    #[test]
    fn test_mutually_referencing_fields_resolve() {
        let dict = DictionaryDecl::new("d")
            .with_field(FieldDecl::new("A").with_id("a").with_reference("b"))
            .with_field(FieldDecl::new("B").with_id("b").with_reference("a"));
        let graph = build(&dict).unwrap();

        let a = graph.find_id("a").unwrap();
        let b = graph.find_id("b").unwrap();
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.fields(), &[a, b]);
        assert_eq!(graph.reference(a), Some(b));
        assert_eq!(graph.reference(b), Some(a));
    }

    #[test]
    fn test_long_reference_chain_resolves() {
        let mut dict = DictionaryDecl::new("d");
        for i in 0..2000 {
            let next = format!("f{}", i + 1);
            dict = dict.with_field(
                FieldDecl::new(format!("F{}", i))
                    .with_id(format!("f{}", i))
                    .with_reference(next.as_str()),
            );
        }
        dict = dict.with_field(FieldDecl::new("F2000").with_id("f2000").with_type(FieldType::Long));

        // Resolution depth follows the chain; give it room like a caller would
        let graph = std::thread::Builder::new()
            .stack_size(64 * 1024 * 1024)
            .spawn(move || build(&dict))
            .unwrap()
            .join()
            .unwrap()
            .unwrap();

        assert_eq!(graph.node_count(), 2001);
        let first = graph.find_id("f0").unwrap();
        assert_eq!(graph.reference_chain(first).len(), 2000);
        assert_eq!(graph.effective_type(first), Some(FieldType::Long));
    }

    #[test]
    fn test_dangling_reference_fails() {
        let dict = DictionaryDecl::new("d").with_field(FieldDecl::new("A").with_reference("nowhere"));
        let err = build(&dict).unwrap_err();
        match err {
            DictionaryError::DanglingReference { from, target } => {
                assert_eq!(from, "A");
                assert_eq!(target, "nowhere");
            }
            other => panic!("Expected DanglingReference, got {:?}", other),
        }
    }
}

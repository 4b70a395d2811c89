//! Dictionary Writer
//!
//! Re-emits a resolved graph as a declaration tree (JSON or YAML). Sharing
//! survives the round trip: a reference to an identified node that appears
//! somewhere in the emitted tree is written as its identifier, and an
//! identified message lists its children only at its first appearance.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

use crate::declaration::{Attribute, Declaration, DictionaryDecl, FieldDecl, MessageDecl, ReferenceDecl};
use crate::error::{DictionaryError, Result};
use crate::graph::DictionaryGraph;
use crate::loader::DictionaryFormat;
use crate::node::{Attributes, NodeId, NodeKind};

/// Convert a graph back into declarations
pub fn to_declarations(graph: &DictionaryGraph) -> DictionaryDecl {
    let mut emitter = Emitter::new(graph);

    let fields = graph
        .fields()
        .iter()
        .filter_map(|&id| match emitter.emit(id) {
            Declaration::Field(f) => Some(f),
            Declaration::Message(_) => None,
        })
        .collect();
    let messages = graph
        .messages()
        .iter()
        .filter_map(|&id| match emitter.emit(id) {
            Declaration::Message(m) => Some(m),
            Declaration::Field(_) => None,
        })
        .collect();

    DictionaryDecl {
        name: graph.name().to_string(),
        namespace: (graph.namespace() != graph.name()).then(|| graph.namespace().to_string()),
        description: graph.description().map(str::to_string),
        attributes: to_attribute_list(graph.attributes()),
        fields,
        messages,
    }
}

/// Serialize a graph to a string
pub fn to_string(graph: &DictionaryGraph, format: DictionaryFormat, pretty: bool) -> Result<String> {
    let mut buf = Vec::new();
    write(graph, &mut buf, format, pretty)?;
    String::from_utf8(buf).map_err(|e| {
        DictionaryError::write_failed(
            graph.name(),
            std::io::Error::new(std::io::ErrorKind::InvalidData, e).into(),
        )
    })
}

/// Serialize a graph into a writer
pub fn write<W: Write>(graph: &DictionaryGraph, mut out: W, format: DictionaryFormat, pretty: bool) -> Result<()> {
    let declarations = to_declarations(graph);
    let result: Result<()> = match format {
        DictionaryFormat::Json if pretty => serde_json::to_writer_pretty(&mut out, &declarations).map_err(Into::into),
        DictionaryFormat::Json => serde_json::to_writer(&mut out, &declarations).map_err(Into::into),
        DictionaryFormat::Yaml => serde_yaml::to_writer(&mut out, &declarations).map_err(Into::into),
    };
    result
        .and_then(|_| out.flush().map_err(Into::into))
        .map_err(|e| DictionaryError::write_failed(graph.name(), e))
}

/// Serialize a graph into a file
pub fn write_to_path(graph: &DictionaryGraph, path: &Path, format: DictionaryFormat, pretty: bool) -> Result<()> {
    let file = File::create(path).map_err(|e| DictionaryError::write_failed(graph.name(), e.into()))?;
    write(graph, BufWriter::new(file), format, pretty)?;
    debug!(path = %path.display(), dictionary = graph.name(), "Wrote dictionary");
    Ok(())
}

fn to_attribute_list(attributes: &Attributes) -> Vec<Attribute> {
    attributes
        .iter()
        .map(|(name, value)| Attribute::new(name.clone(), value.clone()))
        .collect()
}

struct Emitter<'g> {
    graph: &'g DictionaryGraph,
    /// Nodes reachable from the top level through containment
    placed: HashSet<NodeId>,
    /// Identified messages whose children were already written
    expanded: HashSet<NodeId>,
    /// Unplaced identified nodes already written inline
    inlined: HashSet<NodeId>,
}

impl<'g> Emitter<'g> {
    fn new(graph: &'g DictionaryGraph) -> Self {
        let mut placed = HashSet::new();
        let mut stack: Vec<NodeId> = graph.fields().iter().chain(graph.messages()).copied().collect();
        while let Some(id) = stack.pop() {
            if placed.insert(id) {
                stack.extend(graph.children(id).iter().copied());
            }
        }

        Self {
            graph,
            placed,
            expanded: HashSet::new(),
            inlined: HashSet::new(),
        }
    }

    fn emit(&mut self, id: NodeId) -> Declaration {
        let graph = self.graph;
        let node = graph.node(id);
        let reference = node.reference().map(|target| self.emit_reference(target));

        match node.kind() {
            NodeKind::Field {
                field_type,
                default_value,
                required,
                values,
            } => Declaration::Field(FieldDecl {
                id: node.id().map(str::to_string),
                name: node.name().to_string(),
                field_type: *field_type,
                description: node.description().map(str::to_string),
                default_value: default_value.clone(),
                is_collection: node.is_collection(),
                required: *required,
                attributes: to_attribute_list(node.attributes()),
                values: to_attribute_list(values),
                reference,
            }),
            NodeKind::Message { children } => {
                let write_children = node.id().is_none() || self.expanded.insert(id);
                let fields = if write_children {
                    children.iter().map(|&child| self.emit(child)).collect::<Vec<_>>()
                } else {
                    Vec::new()
                };
                Declaration::Message(MessageDecl {
                    id: node.id().map(str::to_string),
                    name: node.name().to_string(),
                    description: node.description().map(str::to_string),
                    is_collection: node.is_collection(),
                    attributes: to_attribute_list(node.attributes()),
                    reference,
                    fields,
                })
            }
        }
    }

    fn emit_reference(&mut self, target: NodeId) -> ReferenceDecl {
        let graph = self.graph;
        match graph.node(target).id() {
            Some(ident) if self.placed.contains(&target) || !self.inlined.insert(target) => {
                ReferenceDecl::Id(ident.to_string())
            }
            _ => ReferenceDecl::Inline(Box::new(self.emit(target))),
        }
    }
}

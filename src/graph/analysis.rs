//! Relation Graph Analysis
//!
//! Projects the arena onto a petgraph `DiGraph` (containment and reference
//! edges) and reports reference cycles as strongly connected components.

use petgraph::algo::kosaraju_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};

use super::DictionaryGraph;
use crate::node::NodeId;

/// Types of edges in the relation graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    /// Message owns child
    Contains,
    /// Node derives from / points at another node
    References,
}

/// petgraph projection of a [`DictionaryGraph`]
///
/// Node indices coincide with arena positions.
pub struct RelationGraph {
    pub(crate) graph: DiGraph<NodeId, EdgeKind>,
}

impl RelationGraph {
    pub fn from_dictionary(dictionary: &DictionaryGraph) -> Self {
        let node_count = dictionary.node_count();
        let mut graph = DiGraph::with_capacity(node_count, node_count * 2);

        for (id, _) in dictionary.iter() {
            graph.add_node(id);
        }

        for (id, node) in dictionary.iter() {
            let from = NodeIndex::new(id.index());
            for child in node.children() {
                graph.add_edge(from, NodeIndex::new(child.index()), EdgeKind::Contains);
            }
            if let Some(target) = node.reference() {
                graph.add_edge(from, NodeIndex::new(target.index()), EdgeKind::References);
            }
        }

        Self { graph }
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Nodes whose reference points at `id`
    pub fn referenced_by(&self, id: NodeId) -> Vec<NodeId> {
        self.graph
            .edges_directed(NodeIndex::new(id.index()), Direction::Incoming)
            .filter(|e| *e.weight() == EdgeKind::References)
            .filter_map(|e| self.graph.node_weight(e.source()).copied())
            .collect()
    }

    /// Messages that directly contain `id`
    pub fn contained_by(&self, id: NodeId) -> Vec<NodeId> {
        self.graph
            .edges_directed(NodeIndex::new(id.index()), Direction::Incoming)
            .filter(|e| *e.weight() == EdgeKind::Contains)
            .filter_map(|e| self.graph.node_weight(e.source()).copied())
            .collect()
    }

    /// Groups of nodes whose reference edges form a cycle
    pub fn reference_cycles(&self) -> Vec<ReferenceCycle> {
        let references = self.graph.filter_map(
            |_, &id| Some(id),
            |_, &kind| (kind == EdgeKind::References).then_some(kind),
        );

        let mut cycles: Vec<ReferenceCycle> = kosaraju_scc(&references)
            .into_iter()
            .filter_map(|scc| {
                let is_self_referential = scc.len() == 1
                    && references
                        .edges_directed(scc[0], Direction::Outgoing)
                        .any(|e| e.target() == scc[0]);
                if scc.len() == 1 && !is_self_referential {
                    return None;
                }
                let mut members: Vec<NodeId> = scc
                    .into_iter()
                    .filter_map(|idx| references.node_weight(idx).copied())
                    .collect();
                members.sort();
                Some(ReferenceCycle {
                    members,
                    is_self_referential,
                })
            })
            .collect();

        cycles.sort_by_key(|c| c.members[0]);
        cycles
    }
}

/// A strongly connected component of reference edges
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceCycle {
    /// Members in arena order
    pub members: Vec<NodeId>,
    /// Single node referencing itself
    pub is_self_referential: bool,
}

impl DictionaryGraph {
    /// petgraph view of containment and reference edges
    pub fn relation_graph(&self) -> RelationGraph {
        RelationGraph::from_dictionary(self)
    }

    /// Reference cycles, ordered by their first member
    pub fn reference_cycles(&self) -> Vec<ReferenceCycle> {
        self.relation_graph().reference_cycles()
    }
}

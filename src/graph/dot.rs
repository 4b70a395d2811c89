//! Graphviz export

use petgraph::visit::EdgeRef;

use super::analysis::EdgeKind;
use super::DictionaryGraph;

impl DictionaryGraph {
    /// Export containment and reference edges to DOT format
    pub fn to_dot(&self) -> String {
        let relations = self.relation_graph();
        let mut output = String::new();

        // Header with styling
        output.push_str(&format!("digraph \"{}\" {{\n", escape(&self.name)));
        output.push_str("  rankdir=LR;\n");
        output.push_str("  bgcolor=\"#1e1e1e\";\n");
        output.push_str("  node [shape=box, style=\"filled,rounded\", fontname=\"Helvetica\", fontsize=10, fontcolor=\"white\", color=\"#404040\"];\n");
        output.push_str("  edge [fontname=\"Helvetica\", fontsize=8, fontcolor=\"#808080\"];\n");
        output.push('\n');

        // Nodes
        for (id, node) in self.iter() {
            let color = if node.is_message() { "#2196F3" } else { "#607D8B" };
            let label = match (node.id(), node.field_type()) {
                (Some(ident), Some(ty)) => format!("{}\\n[{}] {}", escape(node.name()), escape(ident), ty),
                (Some(ident), None) => format!("{}\\n[{}]", escape(node.name()), escape(ident)),
                (None, Some(ty)) => format!("{}\\n{}", escape(node.name()), ty),
                (None, None) => escape(node.name()),
            };
            output.push_str(&format!("  n{} [label=\"{}\", fillcolor=\"{}\"];\n", id.index(), label, color));
        }

        output.push('\n');

        // Edges
        for edge in relations.graph.edge_references() {
            let style = match edge.weight() {
                EdgeKind::Contains => "solid",
                EdgeKind::References => "dashed",
            };
            output.push_str(&format!(
                "  n{} -> n{} [style={}];\n",
                edge.source().index(),
                edge.target().index(),
                style
            ));
        }

        output.push_str("}\n");
        output
    }
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

//! Golden Tests for Dictionary Resolution
//!
//! Builds the fixture dictionaries and checks the shape of the resolved graph:
//! single materialization, cycle safety, order, and the round trip through
//! the writer.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use message_dictionary::{
    loader, writer, DictionaryError, DictionaryFormat, DictionaryGraph, DictionaryUri, FieldType,
    MessageFactory, NodeId,
};

fn fixtures_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn orders() -> DictionaryGraph {
    loader::build_from_path(&fixtures_path().join("orders.yaml")).unwrap()
}

fn cyclic() -> DictionaryGraph {
    loader::build_from_path(&fixtures_path().join("cyclic.json")).unwrap()
}

fn names(graph: &DictionaryGraph, ids: &[NodeId]) -> Vec<String> {
    ids.iter().map(|&id| graph.node(id).name().to_string()).collect()
}

// =============================================================================
// Identity and Sharing
// =============================================================================

#[test]
fn test_repeated_identifier_is_one_node() {
    let graph = orders();

    let price = graph.find_id("f_price").unwrap();
    assert_eq!(graph.fields(), &[price, graph.find_id("f_side").unwrap()]);

    // Every reference to f_price lands on the same node
    let order = graph.find_id("m_order").unwrap();
    let nested_price = graph.children(order)[1];
    assert_eq!(graph.reference(nested_price), Some(price));

    let leg = graph.find_id("m_leg").unwrap();
    let leg_price = graph.children(leg)[0];
    assert_eq!(graph.reference(leg_price), Some(price));
}

#[test]
fn test_identifier_table_contents() {
    let graph = orders();
    let ids: Vec<&str> = graph.identifiers().map(|(id, _)| id).collect();
    assert_eq!(ids, vec!["f_price", "f_side", "m_header", "m_order", "m_leg"]);

    for (id, node) in graph.identifiers() {
        assert_eq!(graph.node(node).id(), Some(id));
    }
}

#[test]
fn test_node_count_has_no_duplicates() {
    let graph = orders();
    // Price, Side, Header, SeqNum, Order, header, Price, Side, Leg, LegPrice,
    // Amendment, Cancel, OrigOrder
    assert_eq!(graph.node_count(), 13);
}

#[test]
fn test_shared_message_is_expanded_once() {
    let graph = orders();
    let leg = graph.find_id("m_leg").unwrap();
    assert_eq!(names(&graph, graph.children(leg)), vec!["LegPrice"]);

    // Cancel lists the shared Leg node, not a copy
    let cancel = graph.message("Cancel").unwrap();
    assert_eq!(graph.children(cancel)[1], leg);
}

// =============================================================================
// Order and Top-Level Lists
// =============================================================================

#[test]
fn test_top_level_order() {
    let graph = orders();
    assert_eq!(names(&graph, graph.fields()), vec!["Price", "Side"]);
    assert_eq!(
        names(&graph, graph.messages()),
        vec!["Header", "Order", "Amendment", "Cancel"]
    );

    let order = graph.find_id("m_order").unwrap();
    assert_eq!(
        names(&graph, graph.children(order)),
        vec!["header", "Price", "Side", "Leg"]
    );
}

#[test]
fn test_reference_does_not_copy_children() {
    let graph = orders();
    let amendment = graph.message("Amendment").unwrap();
    assert!(graph.children(amendment).is_empty());
    assert_eq!(graph.reference(amendment), graph.find_id("m_order"));
    assert_eq!(graph.reference_name(amendment), Some("Order"));
    assert!(graph.is_complex(amendment));
}

#[test]
fn test_field_details_survive_resolution() {
    let graph = orders();
    let price = graph.find("f_price").unwrap();
    assert_eq!(price.field_type(), Some(FieldType::Decimal));
    assert!(price.is_required());

    let side = graph.find("f_side").unwrap();
    let values = side.values().unwrap();
    assert_eq!(values.get("Buy"), Some(&serde_json::json!("1")));

    let order = graph.find_id("m_order").unwrap();
    let nested_side = graph.children(order)[2];
    assert_eq!(graph.effective_type(nested_side), Some(FieldType::Char));
    assert_eq!(graph.attribute(order, "missing"), None);
    assert_eq!(graph.attributes().get("Version"), Some(&serde_json::json!(2)));
    assert_eq!(graph.namespace(), "ORD");
}

// =============================================================================
// Cycles
// =============================================================================

#[test]
fn test_self_containment_terminates() {
    let graph = cyclic();
    let node = graph.find_id("node").unwrap();
    assert_eq!(
        names(&graph, graph.children(node)),
        vec!["Value", "next", "Children"]
    );

    let next = graph.children(node)[1];
    assert_eq!(graph.reference(next), Some(node));

    let children = graph.find_id("children").unwrap();
    assert_eq!(graph.children(children), &[node]);
    assert_eq!(graph.node_count(), 6);
}

#[test]
fn test_mutual_references_resolve() {
    let graph = cyclic();
    let ping = graph.find_id("ping").unwrap();
    let pong = graph.find_id("pong").unwrap();
    assert_eq!(graph.reference(ping), Some(pong));
    assert_eq!(graph.reference(pong), Some(ping));
    assert_eq!(graph.reference_chain(ping), vec![pong]);

    let cycles = graph.reference_cycles();
    assert_eq!(cycles.len(), 1);
    let members: HashSet<NodeId> = cycles[0].members.iter().copied().collect();
    assert_eq!(members, HashSet::from([ping, pong]));
    assert!(!cycles[0].is_self_referential);
}

#[test]
fn test_cyclic_graph_exports_dot() {
    let graph = cyclic();
    let dot = graph.to_dot();
    assert!(dot.starts_with("digraph"));
    assert!(dot.contains("style=dashed"));
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn test_conflicting_identifier_fails() {
    let err = loader::build_from_path(&fixtures_path().join("conflict.yaml")).unwrap_err();
    match err {
        DictionaryError::DuplicateIdentifierConflict { id, .. } => assert_eq!(id, "x"),
        other => panic!("Expected DuplicateIdentifierConflict, got {:?}", other),
    }
}

#[test]
fn test_dangling_reference_fails() {
    let err = loader::build_from_path(&fixtures_path().join("dangling.json")).unwrap_err();
    match err {
        DictionaryError::DanglingReference { target, .. } => assert_eq!(target, "missing"),
        other => panic!("Expected DanglingReference, got {:?}", other),
    }
}

// =============================================================================
// Round Trip and Factory
// =============================================================================

#[test]
fn test_round_trip_through_files() {
    let graph = orders();
    let dir = tempfile::tempdir().unwrap();

    for format in [DictionaryFormat::Json, DictionaryFormat::Yaml] {
        let path = dir.path().join(format!("orders.{}", format.extension()));
        writer::write_to_path(&graph, &path, format, true).unwrap();

        let reloaded = loader::build_from_path(&path).unwrap();
        assert_eq!(reloaded.node_count(), graph.node_count());
        assert_eq!(names(&reloaded, reloaded.messages()), names(&graph, graph.messages()));

        let ids: Vec<&str> = reloaded.identifiers().map(|(id, _)| id).collect();
        assert_eq!(ids.len(), 5);

        let price = reloaded.find_id("f_price").unwrap();
        let leg = reloaded.find_id("m_leg").unwrap();
        assert_eq!(reloaded.reference(reloaded.children(leg)[0]), Some(price));
    }
}

#[test]
fn test_cyclic_round_trip() {
    let graph = cyclic();
    let text = writer::to_string(&graph, DictionaryFormat::Json, false).unwrap();
    let reloaded = DictionaryGraph::build(&loader::from_json_str(&text).unwrap()).unwrap();
    assert_eq!(reloaded.node_count(), graph.node_count());
    assert_eq!(reloaded.reference_cycles().len(), 1);
}

#[test]
fn test_graph_is_shareable_across_threads() {
    let graph = Arc::new(orders());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let graph = Arc::clone(&graph);
            std::thread::spawn(move || graph.find_id("m_order").map(|id| graph.children(id).len()))
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), Some(4));
    }
}

#[test]
fn test_factory_over_fixture() {
    let graph = Arc::new(orders());
    let factory = MessageFactory::new(DictionaryUri::new("ord", "Orders").unwrap(), graph)
        .unwrap()
        .with_protocol("ORD");

    let order = factory.create_message("Order");
    let header = order.get_message("header").expect("default structure");
    assert_eq!(header.name(), "Header");
    assert_eq!(header.metadata.protocol.as_deref(), Some("ORD"));
    assert!(order.get_field("Leg").is_none());
}

//! End-to-end tests for the incremental builder: the two identity-allocation
//! policies, fragment ingestion, and the fixed assembly order.

use ndex_cx::model::aspects;
use ndex_cx::{AspectFragment, Attribute, CxBuilder, CxNetwork, Value};
use pretty_assertions::assert_eq;

// ============================================================================
// 1. Builder deduplicates by name; the model never does
// ============================================================================

#[test]
fn test_builder_dedup_vs_model_allocation() {
    let mut builder = CxBuilder::new();
    let a = builder.add_node("bob", None, None);
    let b = builder.add_node("bob", None, None);
    assert_eq!(a, b);

    let mut net = CxNetwork::new();
    let x = net.create_node("bob", None);
    let y = net.create_node("bob", None);
    assert_ne!(x, y);
    assert_eq!(net.node_count(), 2);
}

#[test]
fn test_builder_represents_only_when_given() {
    let mut builder = CxBuilder::new();
    let a = builder.add_node("plain", None, None);
    let b = builder.add_node("tagged", Some("db:123"), None);
    let net = builder.build();
    assert_eq!(net.get_node(a).unwrap().represents, None);
    assert_eq!(net.get_node(b).unwrap().represents.as_deref(), Some("db:123"));
}

// ============================================================================
// 2. Fragment ingestion semantics
// ============================================================================

#[test]
fn test_node_fragments_idempotent_by_id() {
    let mut builder = CxBuilder::new();
    let source = vec![
        Ok(AspectFragment::parse(
            aspects::NODES,
            serde_json::json!({"@id": 3, "n": "first"}),
        )
        .unwrap()),
        Ok(AspectFragment::parse(
            aspects::NODES,
            serde_json::json!({"@id": 3, "n": "second"}),
        )
        .unwrap()),
    ];
    builder.consume(source).unwrap();
    let net = builder.build();
    assert_eq!(net.node_count(), 1);
    assert_eq!(net.get_node(3).unwrap().name.as_deref(), Some("second"));
}

#[test]
fn test_attribute_fragments_append_only() {
    let mut builder = CxBuilder::new();
    for value in [1i64, 2, 3] {
        builder.add_fragment(AspectFragment::NodeAttribute(Attribute {
            property_of: 0,
            name: "count".into(),
            value: Value::Int(value),
            datatype: None,
        }));
    }
    let net = builder.build();
    let attrs = net.get_node_attributes(0);
    assert_eq!(attrs.len(), 3);
    assert_eq!(attrs[2].value, Value::Int(3));
}

#[test]
fn test_citation_links_accumulate() {
    let mut builder = CxBuilder::new();
    builder
        .consume(
            [
                AspectFragment::parse(
                    aspects::CITATIONS,
                    serde_json::json!({"@id": 10, "dc:title": "paper"}),
                ),
                AspectFragment::parse(
                    aspects::NODE_CITATIONS,
                    serde_json::json!({"po": [0, 1], "citations": [10]}),
                ),
                AspectFragment::parse(
                    aspects::NODE_CITATIONS,
                    serde_json::json!({"po": [0], "citations": [11]}),
                ),
            ],
        )
        .unwrap();
    let net = builder.build();
    assert_eq!(net.get_node_citations(0), &[10, 11]);
    assert_eq!(net.get_node_citations(1), &[10]);
    assert!(net.get_citation(10).is_some());
}

#[test]
fn test_consume_stops_at_first_error() {
    let mut builder = CxBuilder::new();
    let source = vec![
        AspectFragment::parse(aspects::NODES, serde_json::json!({"@id": 0})),
        AspectFragment::parse(aspects::NODES, serde_json::json!({"no_id": true})),
        AspectFragment::parse(aspects::NODES, serde_json::json!({"@id": 1})),
    ];
    assert!(builder.consume(source).is_err());
}

// ============================================================================
// 3. Assembly
// ============================================================================

#[test]
fn test_build_assembles_all_staged_aspects() {
    let mut builder = CxBuilder::new();
    builder.set_name("assembled");
    builder.add_network_attribute("version", "1.0", None);
    let a = builder.add_node("a", None, None);
    let b = builder.add_node("b", None, None);
    let e = builder.add_edge(a, b, Some("activates"), None);
    builder.add_node_attribute(a, "k", "v", None);
    builder.add_edge_attribute(e, "weight", 0.5, None);
    builder.add_opaque_aspect("cartesianLayout", vec![serde_json::json!({"node": 0})]);
    builder.set_context(
        [("pmid".to_string(), "https://pubmed.example/".to_string())]
            .into_iter()
            .collect(),
    );

    let net = builder.build();
    assert_eq!(net.get_name(), Some("assembled"));
    assert_eq!(net.node_count(), 2);
    assert_eq!(net.edge_count(), 1);
    assert_eq!(net.get_edge(e).unwrap().interaction, "activates");
    assert_eq!(net.get_node_attributes(a).len(), 1);
    assert_eq!(net.get_edge_attributes(e).len(), 1);
    assert_eq!(net.get_opaque_aspect("cartesianLayout").unwrap().len(), 1);
    assert_eq!(
        net.get_context().get("pmid").map(String::as_str),
        Some("https://pubmed.example/")
    );
}

#[test]
fn test_opaque_fragments_grouped_by_name() {
    let mut builder = CxBuilder::new();
    for i in 0..3 {
        builder.add_fragment(AspectFragment::Opaque {
            aspect: "cartesianLayout".into(),
            record: serde_json::json!({"node": i}),
        });
    }
    let net = builder.build();
    assert_eq!(net.get_opaque_aspect("cartesianLayout").unwrap().len(), 3);
}

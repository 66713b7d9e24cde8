//! End-to-end tests for the attribute subsystem: datatype inference,
//! multiplicity, overwrite scope, and the fixed error messages.

use ndex_cx::{CxNetwork, DataType, Error, Value};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

// ============================================================================
// 1. Datatype inference through the public surface
// ============================================================================

#[test]
fn test_autodetect_datatype_int() {
    let mut net = CxNetwork::new();
    net.set_node_attribute(1u64, Some("attrname"), 5, None, false).unwrap();
    let res = net.get_node_attributes(1);
    assert_eq!(res.len(), 1);
    assert_eq!(res[0].property_of, 1);
    assert_eq!(res[0].name, "attrname");
    assert_eq!(res[0].value, Value::Int(5));
    assert_eq!(res[0].datatype, Some(DataType::Integer));
}

#[test]
fn test_autodetect_datatype_double() {
    let mut net = CxNetwork::new();
    net.set_node_attribute(1u64, Some("attrname"), 5.5, None, false).unwrap();
    let res = net.get_node_attributes(1);
    assert_eq!(res[0].value, Value::Double(5.5));
    assert_eq!(res[0].datatype, Some(DataType::Double));
}

#[test]
fn test_autodetect_datatype_bool() {
    let mut net = CxNetwork::new();
    net.set_node_attribute(1u64, Some("attrname"), true, None, false).unwrap();
    assert_eq!(
        net.get_node_attributes(1)[0].datatype,
        Some(DataType::Boolean)
    );
}

#[test]
fn test_autodetect_datatype_list_of_string() {
    let mut net = CxNetwork::new();
    net.set_node_attribute(1u64, Some("attrname"), vec!["hi", "bye"], None, false)
        .unwrap();
    let res = net.get_node_attributes(1);
    assert_eq!(res[0].value, Value::from(vec!["hi", "bye"]));
    assert_eq!(res[0].datatype, Some(DataType::ListOfString));
}

#[test]
fn test_explicit_datatype_wins_over_inference() {
    let mut net = CxNetwork::new();
    net.set_node_attribute(1u64, Some("attrname"), 1, Some(DataType::Double), false)
        .unwrap();
    let res = net.get_node_attributes(1);
    assert_eq!(res[0].value, Value::Int(1));
    assert_eq!(res[0].datatype, Some(DataType::Double));
}

// ============================================================================
// 2. Multiplicity: append by default, coarse replace on overwrite
// ============================================================================

#[test]
fn test_duplicate_attributes_preserved_in_call_order() {
    let mut net = CxNetwork::new();
    net.set_node_attribute(1u64, Some("k"), "v1", None, false).unwrap();
    net.set_node_attribute(1u64, Some("k"), "v2", None, false).unwrap();
    let res = net.get_node_attributes(1);
    assert_eq!(res.len(), 2);
    assert_eq!(res[0].value, Value::from("v1"));
    assert_eq!(res[1].value, Value::from("v2"));
}

#[test]
fn test_overwrite_keeps_single_latest_record() {
    let mut net = CxNetwork::new();
    net.set_node_attribute(1u64, Some("k"), "v1", None, true).unwrap();
    net.set_node_attribute(1u64, Some("k"), "v2", None, true).unwrap();
    let res = net.get_node_attributes(1);
    assert_eq!(res.len(), 1);
    assert_eq!(res[0].value, Value::from("v2"));
}

#[test]
fn test_overwrite_drops_other_names_too() {
    // Coarse replace scope: the owner's whole list goes, not just "k".
    let mut net = CxNetwork::new();
    net.set_node_attribute(1u64, Some("other"), "x", None, false).unwrap();
    net.set_node_attribute(1u64, Some("k"), "v", None, true).unwrap();
    let res = net.get_node_attributes(1);
    assert_eq!(res.len(), 1);
    assert_eq!(res[0].name, "k");
}

#[test]
fn test_edge_attributes_same_semantics() {
    let mut net = CxNetwork::new();
    net.set_edge_attribute(0u64, Some("weight"), 0.5, None, false).unwrap();
    net.set_edge_attribute(0u64, Some("weight"), 0.7, None, false).unwrap();
    assert_eq!(net.get_edge_attributes(0).len(), 2);
}

// ============================================================================
// 3. Fixed error messages
// ============================================================================

#[test]
fn test_missing_property_of() {
    let mut net = CxNetwork::new();
    let err = net
        .set_node_attribute(None, Some("k"), "v", None, false)
        .unwrap_err();
    match err {
        Error::InvalidArgument(msg) => {
            assert_eq!(msg, "Node attribute requires property_of")
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_missing_name_or_value() {
    let mut net = CxNetwork::new();
    let err = net
        .set_node_attribute(1u64, None, "v", None, false)
        .unwrap_err();
    match err {
        Error::InvalidArgument(msg) => {
            assert_eq!(msg, "Node attribute requires the name and values property")
        }
        other => panic!("unexpected error {other:?}"),
    }

    let err = net
        .set_node_attribute(1u64, Some("k"), Value::Null, None, false)
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
}

#[test]
fn test_record_reference_without_id() {
    let mut net = CxNetwork::new();
    let err = net
        .set_node_attribute(serde_json::json!({}), Some("attrname"), 5, None, false)
        .unwrap_err();
    match err {
        Error::InvalidArgument(msg) => assert_eq!(msg, "No id found in Node"),
        other => panic!("unexpected error {other:?}"),
    }

    let err = net
        .set_edge_attribute(serde_json::json!({}), Some("attrname"), 5, None, false)
        .unwrap_err();
    match err {
        Error::InvalidArgument(msg) => assert_eq!(msg, "No id found in Edge"),
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_getting_attributes_of_unknown_owner_is_empty() {
    let net = CxNetwork::new();
    assert!(net.get_node_attributes(42).is_empty());
    assert!(net.get_edge_attributes(42).is_empty());
}

// ============================================================================
// 4. Inference holds for arbitrary inputs
// ============================================================================

proptest! {
    #[test]
    fn prop_whole_numbers_infer_integer(v in any::<i64>()) {
        let mut net = CxNetwork::new();
        net.set_node_attribute(0u64, Some("k"), v, None, false).unwrap();
        prop_assert_eq!(
            net.get_node_attributes(0)[0].datatype,
            Some(DataType::Integer)
        );
    }

    #[test]
    fn prop_fractional_numbers_infer_double(v in -1e12f64..1e12f64) {
        let mut net = CxNetwork::new();
        net.set_node_attribute(0u64, Some("k"), v, None, false).unwrap();
        prop_assert_eq!(
            net.get_node_attributes(0)[0].datatype,
            Some(DataType::Double)
        );
    }

    #[test]
    fn prop_string_vecs_infer_list_of_string(
        v in proptest::collection::vec("[a-z]{1,8}", 1..6)
    ) {
        let mut net = CxNetwork::new();
        net.set_node_attribute(0u64, Some("k"), v, None, false).unwrap();
        prop_assert_eq!(
            net.get_node_attributes(0)[0].datatype,
            Some(DataType::ListOfString)
        );
    }
}

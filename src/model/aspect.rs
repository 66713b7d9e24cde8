//! The CX aspect fragment vocabulary and its wire mapping.
//!
//! A CX document is a JSON array of single-key "aspect bundles", each mapping
//! an aspect name to an array of fragment records. Every aspect the model
//! understands has a closed variant here; anything else is preserved verbatim
//! as an opaque fragment so round-tripping never drops data.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use serde::de::Error as DeError;
use serde::ser::SerializeMap;

use super::{DataType, Edge, Node, Value};
use crate::{Error, Result};

// ============================================================================
// Aspect names
// ============================================================================

/// Wire names of the aspects the model specifically understands.
pub mod aspects {
    pub const NODES: &str = "nodes";
    pub const EDGES: &str = "edges";
    pub const NODE_ATTRIBUTES: &str = "nodeAttributes";
    pub const EDGE_ATTRIBUTES: &str = "edgeAttributes";
    pub const NETWORK_ATTRIBUTES: &str = "networkAttributes";
    pub const CITATIONS: &str = "citations";
    pub const SUPPORTS: &str = "supports";
    pub const NODE_CITATIONS: &str = "nodeCitations";
    pub const EDGE_CITATIONS: &str = "edgeCitations";
    pub const EDGE_SUPPORTS: &str = "edgeSupports";
    pub const CONTEXT: &str = "@context";
    pub const METADATA: &str = "metaData";
    pub const STATUS: &str = "status";
    pub const NUMBER_VERIFICATION: &str = "numberVerification";
}

// ============================================================================
// Attribute records
// ============================================================================

/// A node or edge attribute record: `{po, n, v, d?}`.
///
/// Multiple records may share the same `(po, n)` pair; duplicates are a
/// valid, order-preserving state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    #[serde(rename = "po")]
    pub property_of: u64,

    #[serde(rename = "n")]
    pub name: String,

    #[serde(rename = "v")]
    pub value: Value,

    #[serde(rename = "d", default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<DataType>,
}

impl Attribute {
    /// Wire record, going through `Value::to_json` so byte/float encoding
    /// failures surface as `EncodingError` rather than opaque serde errors.
    pub fn to_record(&self) -> Result<serde_json::Value> {
        let mut map = serde_json::Map::new();
        map.insert("po".into(), self.property_of.into());
        map.insert("n".into(), self.name.clone().into());
        map.insert("v".into(), self.value.to_json()?);
        if let Some(d) = self.datatype {
            map.insert("d".into(), serde_json::to_value(d)?);
        }
        Ok(serde_json::Value::Object(map))
    }
}

/// A network-level attribute record: `{n, v, d?}`. One logical slot per name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkAttribute {
    #[serde(rename = "n")]
    pub name: String,

    #[serde(rename = "v")]
    pub value: Value,

    #[serde(rename = "d", default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<DataType>,
}

impl NetworkAttribute {
    pub fn to_record(&self) -> Result<serde_json::Value> {
        let mut map = serde_json::Map::new();
        map.insert("n".into(), self.name.clone().into());
        map.insert("v".into(), self.value.to_json()?);
        if let Some(d) = self.datatype {
            map.insert("d".into(), serde_json::to_value(d)?);
        }
        Ok(serde_json::Value::Object(map))
    }
}

// ============================================================================
// Citations / Supports
// ============================================================================

/// An `@id`-keyed citation record. Fields beyond the id (dc:title and
/// friends) are preserved verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    #[serde(rename = "@id")]
    pub id: u64,

    #[serde(flatten)]
    pub rest: serde_json::Map<String, serde_json::Value>,
}

/// An `@id`-keyed support record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Support {
    #[serde(rename = "@id")]
    pub id: u64,

    #[serde(flatten)]
    pub rest: serde_json::Map<String, serde_json::Value>,
}

/// Relationship fragment linking elements to citations:
/// `{po: [element ids], citations: [citation ids]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitationLinks {
    #[serde(rename = "po")]
    pub property_of: Vec<u64>,

    pub citations: Vec<u64>,
}

/// Relationship fragment linking edges to supports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportLinks {
    #[serde(rename = "po")]
    pub property_of: Vec<u64>,

    pub supports: Vec<u64>,
}

// ============================================================================
// Status
// ============================================================================

/// The trailing record the wire contract requires on every outbound stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub error: String,
    pub success: bool,
}

impl StatusRecord {
    pub fn ok() -> Self {
        Self { error: String::new(), success: true }
    }
}

// ============================================================================
// AspectFragment — the closed fragment vocabulary
// ============================================================================

/// One self-describing fragment of a CX stream.
#[derive(Debug, Clone, PartialEq)]
pub enum AspectFragment {
    Node(Node),
    Edge(Edge),
    NodeAttribute(Attribute),
    EdgeAttribute(Attribute),
    NetworkAttribute(NetworkAttribute),
    Citation(Citation),
    Support(Support),
    NodeCitations(CitationLinks),
    EdgeCitations(CitationLinks),
    EdgeSupports(SupportLinks),
    Context(HashMap<String, String>),
    Status(StatusRecord),
    /// Any aspect the model does not specifically understand, preserved
    /// verbatim. Visual styling travels through here.
    Opaque { aspect: String, record: serde_json::Value },
}

impl AspectFragment {
    /// Parse one record of the named aspect into a fragment.
    pub fn parse(aspect: &str, record: serde_json::Value) -> Result<AspectFragment> {
        let frag = match aspect {
            aspects::NODES => AspectFragment::Node(from_record(aspect, record)?),
            aspects::EDGES => AspectFragment::Edge(from_record(aspect, record)?),
            aspects::NODE_ATTRIBUTES => {
                AspectFragment::NodeAttribute(from_record(aspect, record)?)
            }
            aspects::EDGE_ATTRIBUTES => {
                AspectFragment::EdgeAttribute(from_record(aspect, record)?)
            }
            aspects::NETWORK_ATTRIBUTES => {
                AspectFragment::NetworkAttribute(from_record(aspect, record)?)
            }
            aspects::CITATIONS => AspectFragment::Citation(from_record(aspect, record)?),
            aspects::SUPPORTS => AspectFragment::Support(from_record(aspect, record)?),
            aspects::NODE_CITATIONS => {
                AspectFragment::NodeCitations(from_record(aspect, record)?)
            }
            aspects::EDGE_CITATIONS => {
                AspectFragment::EdgeCitations(from_record(aspect, record)?)
            }
            aspects::EDGE_SUPPORTS => {
                AspectFragment::EdgeSupports(from_record(aspect, record)?)
            }
            aspects::CONTEXT => AspectFragment::Context(from_record(aspect, record)?),
            aspects::STATUS => AspectFragment::Status(from_record(aspect, record)?),
            _ => AspectFragment::Opaque { aspect: aspect.to_owned(), record },
        };
        Ok(frag)
    }

    /// Wire name of the aspect this fragment belongs to.
    pub fn aspect_name(&self) -> &str {
        match self {
            AspectFragment::Node(_) => aspects::NODES,
            AspectFragment::Edge(_) => aspects::EDGES,
            AspectFragment::NodeAttribute(_) => aspects::NODE_ATTRIBUTES,
            AspectFragment::EdgeAttribute(_) => aspects::EDGE_ATTRIBUTES,
            AspectFragment::NetworkAttribute(_) => aspects::NETWORK_ATTRIBUTES,
            AspectFragment::Citation(_) => aspects::CITATIONS,
            AspectFragment::Support(_) => aspects::SUPPORTS,
            AspectFragment::NodeCitations(_) => aspects::NODE_CITATIONS,
            AspectFragment::EdgeCitations(_) => aspects::EDGE_CITATIONS,
            AspectFragment::EdgeSupports(_) => aspects::EDGE_SUPPORTS,
            AspectFragment::Context(_) => aspects::CONTEXT,
            AspectFragment::Status(_) => aspects::STATUS,
            AspectFragment::Opaque { aspect, .. } => aspect,
        }
    }
}

fn from_record<T: serde::de::DeserializeOwned>(
    aspect: &str,
    record: serde_json::Value,
) -> Result<T> {
    serde_json::from_value(record).map_err(|e| {
        Error::InvalidArgument(format!("malformed {aspect} fragment: {e}"))
    })
}

// ============================================================================
// AspectBundle — `{name: [records]}` on the wire
// ============================================================================

/// One aspect bundle of a CX document.
#[derive(Debug, Clone, PartialEq)]
pub struct AspectBundle {
    pub name: String,
    pub records: Vec<serde_json::Value>,
}

impl AspectBundle {
    pub fn new(name: impl Into<String>, records: Vec<serde_json::Value>) -> Self {
        Self { name: name.into(), records }
    }

    pub fn is_status(&self) -> bool {
        self.name == aspects::STATUS
    }
}

impl Serialize for AspectBundle {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.name, &self.records)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for AspectBundle {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let raw = serde_json::Map::<String, serde_json::Value>::deserialize(deserializer)?;
        if raw.len() != 1 {
            return Err(D::Error::custom(
                "aspect bundle must be a single-key object",
            ));
        }
        let (name, records) = raw.into_iter().next().ok_or_else(|| {
            D::Error::custom("aspect bundle must be a single-key object")
        })?;
        let records = match records {
            serde_json::Value::Array(items) => items,
            other => return Err(D::Error::custom(format!(
                "aspect {name} must map to an array, got {other}"
            ))),
        };
        Ok(AspectBundle { name, records })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundle_roundtrip() {
        let bundle = AspectBundle::new(
            aspects::NODES,
            vec![serde_json::json!({"@id": 0, "n": "bob"})],
        );
        let json = serde_json::to_string(&bundle).unwrap();
        assert_eq!(json, r#"{"nodes":[{"@id":0,"n":"bob"}]}"#);

        let back: AspectBundle = serde_json::from_str(&json).unwrap();
        assert_eq!(back, bundle);
    }

    #[test]
    fn test_bundle_rejects_multi_key() {
        let err = serde_json::from_str::<AspectBundle>(r#"{"nodes":[],"edges":[]}"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_parse_known_fragments() {
        let frag = AspectFragment::parse(
            aspects::NODES,
            serde_json::json!({"@id": 1, "n": "x"}),
        )
        .unwrap();
        assert!(matches!(frag, AspectFragment::Node(ref n) if n.id == 1));

        let frag = AspectFragment::parse(
            aspects::EDGE_ATTRIBUTES,
            serde_json::json!({"po": 0, "n": "weight", "v": 0.5, "d": "double"}),
        )
        .unwrap();
        match frag {
            AspectFragment::EdgeAttribute(a) => {
                assert_eq!(a.datatype, Some(DataType::Double));
                assert_eq!(a.value, Value::Double(0.5));
            }
            other => panic!("unexpected fragment {other:?}"),
        }
    }

    #[test]
    fn test_parse_unknown_aspect_is_opaque() {
        let rec = serde_json::json!({"properties_of": "network", "properties": {}});
        let frag = AspectFragment::parse("cyVisualProperties", rec.clone()).unwrap();
        match frag {
            AspectFragment::Opaque { aspect, record } => {
                assert_eq!(aspect, "cyVisualProperties");
                assert_eq!(record, rec);
            }
            other => panic!("unexpected fragment {other:?}"),
        }
    }

    #[test]
    fn test_citation_preserves_extra_fields() {
        let raw = serde_json::json!({"@id": 4, "dc:title": "A paper"});
        let cit: Citation = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(cit.id, 4);
        assert_eq!(serde_json::to_value(&cit).unwrap(), raw);
    }
}

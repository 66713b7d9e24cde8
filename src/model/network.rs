//! The aggregation container that owns every fragment of a CX network.
//!
//! `CxNetwork` is the single-owner, single-thread in-memory form of a
//! network: id-indexed stores for nodes/edges/citations/supports, per-owner
//! attribute lists, relationship indices, and replace-by-name singleton
//! aspects (network attributes, context, opaque aspects).
//!
//! No operation leaves the model partially mutated on failure: every
//! mutating call validates its input up front.

use hashbrown::HashMap;
use smallvec::SmallVec;

use super::aspect::{
    aspects, AspectBundle, Attribute, Citation, CitationLinks, NetworkAttribute,
    Support, SupportLinks,
};
use super::{DataType, Edge, Node, Value};
use crate::{Error, Result};

/// Id list for element→citation/support indices. Almost always short.
type IdList = SmallVec<[u64; 4]>;

/// Constant emitted in the `numberVerification` preamble bundle: the largest
/// integer the wire format guarantees to survive every consumer (2^48 - 1).
pub(crate) const LONG_NUMBER: u64 = 281_474_976_710_655;

// ============================================================================
// ElementRef — owner references for attribute calls
// ============================================================================

/// Reference to the node or edge an attribute call targets.
///
/// Callers may pass a plain id, a previously fetched element, or a raw JSON
/// record (which must carry an `@id` field). A closed enum instead of the
/// original's duck typing.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementRef {
    /// No owner supplied at all.
    Missing,
    Id(u64),
    /// A structured record; resolution looks for its `@id` field.
    Record(serde_json::Value),
}

impl ElementRef {
    fn resolve(&self, kind: &str) -> Result<u64> {
        match self {
            ElementRef::Missing => Err(Error::InvalidArgument(format!(
                "{kind} attribute requires property_of"
            ))),
            ElementRef::Id(id) => Ok(*id),
            ElementRef::Record(rec) => rec
                .get("@id")
                .and_then(serde_json::Value::as_u64)
                .ok_or_else(|| Error::InvalidArgument(format!("No id found in {kind}"))),
        }
    }
}

impl From<u64> for ElementRef {
    fn from(id: u64) -> Self { ElementRef::Id(id) }
}
impl From<Option<u64>> for ElementRef {
    fn from(id: Option<u64>) -> Self {
        id.map(ElementRef::Id).unwrap_or(ElementRef::Missing)
    }
}
impl From<&Node> for ElementRef {
    fn from(node: &Node) -> Self { ElementRef::Id(node.id) }
}
impl From<&Edge> for ElementRef {
    fn from(edge: &Edge) -> Self { ElementRef::Id(edge.id) }
}
impl From<serde_json::Value> for ElementRef {
    fn from(rec: serde_json::Value) -> Self { ElementRef::Record(rec) }
}

// ============================================================================
// CxNetwork
// ============================================================================

/// In-memory CX network.
#[derive(Debug, Clone, Default)]
pub struct CxNetwork {
    nodes: HashMap<u64, Node>,
    edges: HashMap<u64, Edge>,

    /// node id → attribute records, insertion order preserved.
    node_attributes: HashMap<u64, Vec<Attribute>>,
    /// edge id → attribute records, insertion order preserved.
    edge_attributes: HashMap<u64, Vec<Attribute>>,

    /// One logical slot per name; order of first insertion preserved.
    network_attributes: Vec<NetworkAttribute>,

    citations: HashMap<u64, Citation>,
    supports: HashMap<u64, Support>,
    node_citations: HashMap<u64, IdList>,
    edge_citations: HashMap<u64, IdList>,
    edge_supports: HashMap<u64, IdList>,

    /// At most one opaque aspect per name; insertion order preserved.
    opaque_aspects: Vec<(String, Vec<serde_json::Value>)>,

    /// Namespace prefix → URI.
    context: HashMap<String, String>,

    next_node_id: u64,
    next_edge_id: u64,
}

impl CxNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Nodes
    // ========================================================================

    /// Allocate the next node id and insert a node. Never deduplicates by
    /// name — that policy belongs to [`crate::CxBuilder`].
    ///
    /// `represents` defaults to the node name when not supplied.
    pub fn create_node(&mut self, name: impl Into<String>, represents: Option<&str>) -> u64 {
        let id = self.next_node_id;
        self.next_node_id += 1;
        let name = name.into();
        let represents = represents.map(str::to_owned).unwrap_or_else(|| name.clone());
        self.nodes.insert(id, Node { id, name: Some(name), represents: Some(represents) });
        id
    }

    /// Raw ingestion path: insert a fully formed node fragment, keyed by its
    /// own id. Last write for a given id wins. Advances the id counter past
    /// the fragment's id so later `create_node` calls cannot collide.
    pub fn add_node(&mut self, node: Node) {
        self.next_node_id = self.next_node_id.max(node.id + 1);
        self.nodes.insert(node.id, node);
    }

    pub fn get_node(&self, id: u64) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn get_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    // ========================================================================
    // Edges
    // ========================================================================

    /// Allocate the next edge id (independent namespace from node ids) and
    /// insert an edge. `interaction` defaults to `"interacts-with"`.
    pub fn create_edge(&mut self, source: u64, target: u64, interaction: Option<&str>) -> u64 {
        let id = self.next_edge_id;
        self.next_edge_id += 1;
        let mut edge = Edge::new(id, source, target);
        if let Some(i) = interaction {
            edge.interaction = i.to_owned();
        }
        self.edges.insert(id, edge);
        id
    }

    /// Raw ingestion path for edge fragments, last-write-wins by id.
    pub fn add_edge(&mut self, edge: Edge) {
        self.next_edge_id = self.next_edge_id.max(edge.id + 1);
        self.edges.insert(edge.id, edge);
    }

    pub fn get_edge(&self, id: u64) -> Option<&Edge> {
        self.edges.get(&id)
    }

    pub fn get_edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    // ========================================================================
    // Node / edge attributes
    // ========================================================================

    /// Attach an attribute to a node.
    ///
    /// With `overwrite = false` the record is appended even when an attribute
    /// of the same name already exists; duplicates are a valid state. With
    /// `overwrite = true` the node's ENTIRE attribute list is replaced by the
    /// single new record. That coarse scope is compatibility-sensitive
    /// behavior carried over from the original client — see DESIGN.md.
    pub fn set_node_attribute(
        &mut self,
        property_of: impl Into<ElementRef>,
        name: Option<&str>,
        value: impl Into<Value>,
        datatype: Option<DataType>,
        overwrite: bool,
    ) -> Result<()> {
        let id = property_of.into().resolve("Node")?;
        let attr = make_attribute("Node", id, name, value.into(), datatype)?;
        store_attribute(&mut self.node_attributes, attr, overwrite);
        Ok(())
    }

    /// Attach an attribute to an edge. Same multiplicity and overwrite
    /// semantics as [`Self::set_node_attribute`].
    pub fn set_edge_attribute(
        &mut self,
        property_of: impl Into<ElementRef>,
        name: Option<&str>,
        value: impl Into<Value>,
        datatype: Option<DataType>,
        overwrite: bool,
    ) -> Result<()> {
        let id = property_of.into().resolve("Edge")?;
        let attr = make_attribute("Edge", id, name, value.into(), datatype)?;
        store_attribute(&mut self.edge_attributes, attr, overwrite);
        Ok(())
    }

    /// All attributes of a node in insertion order, empty when none.
    pub fn get_node_attributes(&self, node: u64) -> &[Attribute] {
        self.node_attributes.get(&node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All attributes of an edge in insertion order, empty when none.
    pub fn get_edge_attributes(&self, edge: u64) -> &[Attribute] {
        self.edge_attributes.get(&edge).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Ingest an already-formed node attribute fragment (no inference, no
    /// overwrite — the stream said what it said).
    pub fn add_node_attribute(&mut self, attr: Attribute) {
        self.node_attributes.entry(attr.property_of).or_default().push(attr);
    }

    pub fn add_edge_attribute(&mut self, attr: Attribute) {
        self.edge_attributes.entry(attr.property_of).or_default().push(attr);
    }

    // ========================================================================
    // Network attributes (one slot per name)
    // ========================================================================

    /// Set a network-level attribute. Setting the same name again replaces
    /// the prior value; datatype is inferred when not supplied.
    pub fn set_network_attribute(
        &mut self,
        name: impl Into<String>,
        value: impl Into<Value>,
        datatype: Option<DataType>,
    ) {
        let name = name.into();
        let value = value.into();
        let datatype = Some(datatype.unwrap_or_else(|| DataType::infer(&value)));
        let attr = NetworkAttribute { name, value, datatype };
        match self.network_attributes.iter_mut().find(|a| a.name == attr.name) {
            Some(slot) => *slot = attr,
            None => self.network_attributes.push(attr),
        }
    }

    pub fn get_network_attribute(&self, name: &str) -> Option<&NetworkAttribute> {
        self.network_attributes.iter().find(|a| a.name == name)
    }

    pub fn get_network_attributes(&self) -> &[NetworkAttribute] {
        &self.network_attributes
    }

    /// Convenience for the `name` network attribute.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.set_network_attribute("name", name.into(), Some(DataType::String));
    }

    pub fn get_name(&self) -> Option<&str> {
        self.get_network_attribute("name").and_then(|a| a.value.as_str())
    }

    // ========================================================================
    // Citations / supports
    // ========================================================================

    pub fn add_citation(&mut self, citation: Citation) {
        self.citations.insert(citation.id, citation);
    }

    pub fn get_citation(&self, id: u64) -> Option<&Citation> {
        self.citations.get(&id)
    }

    pub fn add_support(&mut self, support: Support) {
        self.supports.insert(support.id, support);
    }

    pub fn get_support(&self, id: u64) -> Option<&Support> {
        self.supports.get(&id)
    }

    /// Link citations to nodes. Link fragments are append-only.
    pub fn add_node_citations(&mut self, links: &CitationLinks) {
        for po in &links.property_of {
            self.node_citations
                .entry(*po)
                .or_default()
                .extend_from_slice(&links.citations);
        }
    }

    pub fn add_edge_citations(&mut self, links: &CitationLinks) {
        for po in &links.property_of {
            self.edge_citations
                .entry(*po)
                .or_default()
                .extend_from_slice(&links.citations);
        }
    }

    pub fn add_edge_supports(&mut self, links: &SupportLinks) {
        for po in &links.property_of {
            self.edge_supports
                .entry(*po)
                .or_default()
                .extend_from_slice(&links.supports);
        }
    }

    pub fn get_node_citations(&self, node: u64) -> &[u64] {
        self.node_citations.get(&node).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn get_edge_citations(&self, edge: u64) -> &[u64] {
        self.edge_citations.get(&edge).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn get_edge_supports(&self, edge: u64) -> &[u64] {
        self.edge_supports.get(&edge).map(|v| v.as_slice()).unwrap_or(&[])
    }

    // ========================================================================
    // Opaque aspects / context
    // ========================================================================

    /// Store an opaque aspect. At most one per name; re-adding a name
    /// replaces the prior record sequence wholesale.
    pub fn add_opaque_aspect(
        &mut self,
        name: impl Into<String>,
        records: Vec<serde_json::Value>,
    ) {
        let name = name.into();
        match self.opaque_aspects.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = records,
            None => self.opaque_aspects.push((name, records)),
        }
    }

    pub fn get_opaque_aspect(&self, name: &str) -> Option<&[serde_json::Value]> {
        self.opaque_aspects
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, records)| records.as_slice())
    }

    pub fn remove_opaque_aspect(&mut self, name: &str) -> Option<Vec<serde_json::Value>> {
        let pos = self.opaque_aspects.iter().position(|(n, _)| n == name)?;
        Some(self.opaque_aspects.remove(pos).1)
    }

    pub fn get_opaque_aspect_names(&self) -> impl Iterator<Item = &str> {
        self.opaque_aspects.iter().map(|(n, _)| n.as_str())
    }

    /// Replace the network's namespace context.
    pub fn set_context(&mut self, context: HashMap<String, String>) {
        self.context = context;
    }

    pub fn get_context(&self) -> &HashMap<String, String> {
        &self.context
    }

    // ========================================================================
    // Wire form
    // ========================================================================

    /// Emit the network as aspect bundles in canonical order, with the
    /// `numberVerification` preamble and a generated `metaData` bundle.
    /// The trailing status bundle is the codec's job, not the model's.
    pub fn to_cx_bundles(&self) -> Result<Vec<AspectBundle>> {
        let mut out = Vec::new();

        out.push(AspectBundle::new(
            aspects::NUMBER_VERIFICATION,
            vec![serde_json::json!({"longNumber": LONG_NUMBER})],
        ));

        let mut body: Vec<AspectBundle> = Vec::new();

        if !self.context.is_empty() {
            let ctx = serde_json::to_value(&self.context)?;
            body.push(AspectBundle::new(aspects::CONTEXT, vec![ctx]));
        }

        if !self.network_attributes.is_empty() {
            let records = self
                .network_attributes
                .iter()
                .map(NetworkAttribute::to_record)
                .collect::<Result<Vec<_>>>()?;
            body.push(AspectBundle::new(aspects::NETWORK_ATTRIBUTES, records));
        }

        if !self.nodes.is_empty() {
            body.push(AspectBundle::new(
                aspects::NODES,
                sorted_records(&self.nodes)?,
            ));
        }
        if let Some(records) = attribute_records(&self.node_attributes)? {
            body.push(AspectBundle::new(aspects::NODE_ATTRIBUTES, records));
        }

        if !self.edges.is_empty() {
            body.push(AspectBundle::new(
                aspects::EDGES,
                sorted_records(&self.edges)?,
            ));
        }
        if let Some(records) = attribute_records(&self.edge_attributes)? {
            body.push(AspectBundle::new(aspects::EDGE_ATTRIBUTES, records));
        }

        if !self.citations.is_empty() {
            body.push(AspectBundle::new(
                aspects::CITATIONS,
                sorted_records(&self.citations)?,
            ));
        }
        if let Some(records) = link_records(&self.node_citations, "citations") {
            body.push(AspectBundle::new(aspects::NODE_CITATIONS, records));
        }
        if let Some(records) = link_records(&self.edge_citations, "citations") {
            body.push(AspectBundle::new(aspects::EDGE_CITATIONS, records));
        }

        if !self.supports.is_empty() {
            body.push(AspectBundle::new(
                aspects::SUPPORTS,
                sorted_records(&self.supports)?,
            ));
        }
        if let Some(records) = link_records(&self.edge_supports, "supports") {
            body.push(AspectBundle::new(aspects::EDGE_SUPPORTS, records));
        }

        for (name, records) in &self.opaque_aspects {
            body.push(AspectBundle::new(name.clone(), records.clone()));
        }

        out.push(self.metadata_bundle(&body));
        out.extend(body);
        Ok(out)
    }

    /// Generated `metaData` bundle describing every emitted aspect.
    fn metadata_bundle(&self, body: &[AspectBundle]) -> AspectBundle {
        let records = body
            .iter()
            .map(|bundle| {
                let id_counter = match bundle.name.as_str() {
                    aspects::NODES => Some(self.next_node_id),
                    aspects::EDGES => Some(self.next_edge_id),
                    _ => None,
                };
                let mut rec = serde_json::json!({
                    "name": bundle.name,
                    "elementCount": bundle.records.len(),
                    "version": "1.0",
                    "consistencyGroup": 1,
                    "properties": [],
                });
                if let Some(counter) = id_counter {
                    rec["idCounter"] = counter.into();
                }
                rec
            })
            .collect();
        AspectBundle::new(aspects::METADATA, records)
    }
}

// ============================================================================
// Attribute plumbing
// ============================================================================

fn make_attribute(
    kind: &str,
    property_of: u64,
    name: Option<&str>,
    value: Value,
    datatype: Option<DataType>,
) -> Result<Attribute> {
    let name = match name {
        Some(n) => n,
        None => {
            return Err(Error::InvalidArgument(format!(
                "{kind} attribute requires the name and values property"
            )))
        }
    };
    if value.is_null() {
        return Err(Error::InvalidArgument(format!(
            "{kind} attribute requires the name and values property"
        )));
    }
    let datatype = Some(datatype.unwrap_or_else(|| DataType::infer(&value)));
    Ok(Attribute { property_of, name: name.to_owned(), value, datatype })
}

fn store_attribute(
    store: &mut HashMap<u64, Vec<Attribute>>,
    attr: Attribute,
    overwrite: bool,
) {
    if overwrite {
        // Replaces the owner's whole list, not just same-named records.
        store.insert(attr.property_of, vec![attr]);
    } else {
        store.entry(attr.property_of).or_default().push(attr);
    }
}

// ============================================================================
// Record emission helpers
// ============================================================================

fn sorted_records<T: serde::Serialize>(
    store: &HashMap<u64, T>,
) -> Result<Vec<serde_json::Value>> {
    let mut ids: Vec<u64> = store.keys().copied().collect();
    ids.sort_unstable();
    ids.iter()
        .map(|id| serde_json::to_value(&store[id]).map_err(Error::from))
        .collect()
}

fn attribute_records(
    store: &HashMap<u64, Vec<Attribute>>,
) -> Result<Option<Vec<serde_json::Value>>> {
    if store.is_empty() {
        return Ok(None);
    }
    let mut ids: Vec<u64> = store.keys().copied().collect();
    ids.sort_unstable();
    let mut records = Vec::new();
    for id in ids {
        for attr in &store[&id] {
            records.push(attr.to_record()?);
        }
    }
    Ok(Some(records))
}

fn link_records(
    store: &HashMap<u64, IdList>,
    link_key: &str,
) -> Option<Vec<serde_json::Value>> {
    if store.is_empty() {
        return None;
    }
    let mut ids: Vec<u64> = store.keys().copied().collect();
    ids.sort_unstable();
    Some(
        ids.iter()
            .map(|id| {
                let mut map = serde_json::Map::new();
                map.insert("po".into(), serde_json::json!([id]));
                map.insert(link_key.to_owned(), serde_json::json!(store[id].as_slice()));
                serde_json::Value::Object(map)
            })
            .collect(),
    )
}

// ============================================================================
// Tests
// ============================================================================

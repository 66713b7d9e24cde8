//! Incremental builder: assembles a [`CxNetwork`] from a fragment stream.
//!
//! The builder is the authoring convenience layer. It holds only transient
//! staging inventories (name→id lookup, id counters, per-aspect lists) and
//! flushes them into a fresh model on [`CxBuilder::build`], after which the
//! builder is gone.
//!
//! Two distinct identity policies live here on purpose:
//! - `add_node` deduplicates by NAME and returns the existing id — authoring
//!   convenience for callers assembling a network from tabular data.
//! - fragment ingestion is idempotent by ID (last write wins) and never
//!   deduplicates — ingested fragments are already identified.
//! The model's own `create_node` does neither; see `model::network`.

use hashbrown::HashMap;
use tracing::debug;

use crate::model::aspect::{
    aspects, AspectFragment, Attribute, Citation, CitationLinks, NetworkAttribute,
    Support, SupportLinks,
};
use crate::model::{CxNetwork, DataType, Edge, Node, Value, DEFAULT_INTERACTION};
use crate::Result;

/// Staged, not-yet-assembled network.
#[derive(Debug, Default)]
pub struct CxBuilder {
    node_id_lookup: HashMap<String, u64>,
    node_inventory: HashMap<u64, Node>,
    edge_inventory: HashMap<u64, Edge>,

    node_attribute_inventory: Vec<Attribute>,
    edge_attribute_inventory: Vec<Attribute>,
    network_attribute_inventory: Vec<NetworkAttribute>,

    citation_inventory: HashMap<u64, Citation>,
    support_inventory: HashMap<u64, Support>,
    node_citation_links: Vec<CitationLinks>,
    edge_citation_links: Vec<CitationLinks>,
    edge_support_links: Vec<SupportLinks>,

    opaque_inventory: Vec<(String, Vec<serde_json::Value>)>,
    context: HashMap<String, String>,

    node_id_counter: u64,
    edge_id_counter: u64,
}

impl CxBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Authoring API
    // ========================================================================

    /// Add a node, deduplicating by name: when a node with this name is
    /// already staged, its existing id is returned and nothing changes.
    ///
    /// An explicit `id` advances the allocation counter past itself so later
    /// automatic ids cannot collide.
    pub fn add_node(
        &mut self,
        name: impl Into<String>,
        represents: Option<&str>,
        id: Option<u64>,
    ) -> u64 {
        let name = name.into();
        if let Some(existing) = self.node_id_lookup.get(&name) {
            return *existing;
        }

        let node_id = match id {
            Some(id) => id,
            None => self.node_id_counter,
        };
        self.node_id_counter = self.node_id_counter.max(node_id + 1);

        let mut node = Node::new(node_id).with_name(name.clone());
        if let Some(r) = represents {
            node = node.with_represents(r);
        }
        self.node_id_lookup.insert(name, node_id);
        self.node_inventory.insert(node_id, node);
        node_id
    }

    /// Add an edge. `interaction` defaults to `"interacts-with"`.
    pub fn add_edge(
        &mut self,
        source: u64,
        target: u64,
        interaction: Option<&str>,
        id: Option<u64>,
    ) -> u64 {
        let edge_id = match id {
            Some(id) => id,
            None => self.edge_id_counter,
        };
        self.edge_id_counter = self.edge_id_counter.max(edge_id + 1);

        let edge = Edge::new(edge_id, source, target)
            .with_interaction(interaction.unwrap_or(DEFAULT_INTERACTION));
        self.edge_inventory.insert(edge_id, edge);
        edge_id
    }

    /// Stage a node attribute record as given — no inference, no overwrite.
    pub fn add_node_attribute(
        &mut self,
        property_of: u64,
        name: impl Into<String>,
        value: impl Into<Value>,
        datatype: Option<DataType>,
    ) {
        self.node_attribute_inventory.push(Attribute {
            property_of,
            name: name.into(),
            value: value.into(),
            datatype,
        });
    }

    pub fn add_edge_attribute(
        &mut self,
        property_of: u64,
        name: impl Into<String>,
        value: impl Into<Value>,
        datatype: Option<DataType>,
    ) {
        self.edge_attribute_inventory.push(Attribute {
            property_of,
            name: name.into(),
            value: value.into(),
            datatype,
        });
    }

    /// Stage a network attribute. Last record for a name wins at assembly.
    pub fn add_network_attribute(
        &mut self,
        name: impl Into<String>,
        value: impl Into<Value>,
        datatype: Option<DataType>,
    ) {
        self.network_attribute_inventory.push(NetworkAttribute {
            name: name.into(),
            value: value.into(),
            datatype,
        });
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.add_network_attribute("name", name.into(), Some(DataType::String));
    }

    /// Replace the staged namespace context.
    pub fn set_context(&mut self, context: HashMap<String, String>) {
        self.context = context;
    }

    /// Stage an opaque aspect, replacing any staged sequence of the same name.
    pub fn add_opaque_aspect(
        &mut self,
        name: impl Into<String>,
        records: Vec<serde_json::Value>,
    ) {
        let name = name.into();
        match self.opaque_inventory.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = records,
            None => self.opaque_inventory.push((name, records)),
        }
    }

    // ========================================================================
    // Fragment ingestion
    // ========================================================================

    /// Ingest one fragment. Nodes and edges are idempotent by id (last write
    /// wins); attribute, citation, and support fragments append.
    pub fn add_fragment(&mut self, fragment: AspectFragment) {
        match fragment {
            AspectFragment::Node(node) => {
                self.node_id_counter = self.node_id_counter.max(node.id + 1);
                self.node_inventory.insert(node.id, node);
            }
            AspectFragment::Edge(edge) => {
                self.edge_id_counter = self.edge_id_counter.max(edge.id + 1);
                self.edge_inventory.insert(edge.id, edge);
            }
            AspectFragment::NodeAttribute(attr) => {
                self.node_attribute_inventory.push(attr)
            }
            AspectFragment::EdgeAttribute(attr) => {
                self.edge_attribute_inventory.push(attr)
            }
            AspectFragment::NetworkAttribute(attr) => {
                self.network_attribute_inventory.push(attr)
            }
            AspectFragment::Citation(c) => {
                self.citation_inventory.insert(c.id, c);
            }
            AspectFragment::Support(s) => {
                self.support_inventory.insert(s.id, s);
            }
            AspectFragment::NodeCitations(links) => self.node_citation_links.push(links),
            AspectFragment::EdgeCitations(links) => self.edge_citation_links.push(links),
            AspectFragment::EdgeSupports(links) => self.edge_support_links.push(links),
            AspectFragment::Context(ctx) => self.context.extend(ctx),
            // The codec regenerates status, metaData and numberVerification
            // on output; carrying them through would duplicate bundles.
            AspectFragment::Status(_) => {}
            AspectFragment::Opaque { aspect, record } => {
                if aspect == aspects::METADATA || aspect == aspects::NUMBER_VERIFICATION {
                    return;
                }
                match self.opaque_inventory.iter_mut().find(|(n, _)| *n == aspect) {
                    Some((_, records)) => records.push(record),
                    None => self.opaque_inventory.push((aspect, vec![record])),
                }
            }
        }
    }

    /// Drive a lazy, single-pass fragment source to exhaustion. The source
    /// is consumed exactly once and may block on I/O; the first error stops
    /// ingestion and is returned as-is.
    pub fn consume<I>(&mut self, source: I) -> Result<()>
    where
        I: IntoIterator<Item = Result<AspectFragment>>,
    {
        for fragment in source {
            self.add_fragment(fragment?);
        }
        Ok(())
    }

    // ========================================================================
    // Finalization
    // ========================================================================

    /// Flush all staged inventories into a fresh [`CxNetwork`] in the fixed
    /// aspect order: context → network attributes → nodes → node attributes
    /// → edges → edge attributes → citations/supports → opaque aspects.
    ///
    /// Consumes the builder; staging state is not reusable afterward.
    pub fn build(self) -> CxNetwork {
        debug!(
            nodes = self.node_inventory.len(),
            edges = self.edge_inventory.len(),
            "assembling network from staged inventories"
        );

        let mut net = CxNetwork::new();

        net.set_context(self.context);

        for attr in self.network_attribute_inventory {
            net.set_network_attribute(attr.name, attr.value, attr.datatype);
        }

        for (_, node) in self.node_inventory {
            net.add_node(node);
        }
        for attr in self.node_attribute_inventory {
            net.add_node_attribute(attr);
        }

        for (_, edge) in self.edge_inventory {
            net.add_edge(edge);
        }
        for attr in self.edge_attribute_inventory {
            net.add_edge_attribute(attr);
        }

        for (_, citation) in self.citation_inventory {
            net.add_citation(citation);
        }
        for (_, support) in self.support_inventory {
            net.add_support(support);
        }
        for links in &self.node_citation_links {
            net.add_node_citations(links);
        }
        for links in &self.edge_citation_links {
            net.add_edge_citations(links);
        }
        for links in &self.edge_support_links {
            net.add_edge_supports(links);
        }

        for (name, records) in self.opaque_inventory {
            net.add_opaque_aspect(name, records);
        }

        net
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_node_dedupes_by_name() {
        let mut builder = CxBuilder::new();
        let a = builder.add_node("bob", None, None);
        let b = builder.add_node("bob", None, None);
        assert_eq!(a, b);

        let net = builder.build();
        assert_eq!(net.node_count(), 1);
    }

    #[test]
    fn test_add_node_explicit_id_advances_counter() {
        let mut builder = CxBuilder::new();
        builder.add_node("a", None, Some(5));
        let next = builder.add_node("b", None, None);
        assert_eq!(next, 6);
    }

    #[test]
    fn test_add_edge_default_interaction() {
        let mut builder = CxBuilder::new();
        let a = builder.add_node("a", None, None);
        let b = builder.add_node("b", None, None);
        let e = builder.add_edge(a, b, None, None);
        let net = builder.build();
        assert_eq!(net.get_edge(e).unwrap().interaction, DEFAULT_INTERACTION);
    }

    #[test]
    fn test_fragment_ingestion_last_write_wins() {
        let mut builder = CxBuilder::new();
        builder.add_fragment(AspectFragment::Node(Node::new(0).with_name("old")));
        builder.add_fragment(AspectFragment::Node(Node::new(0).with_name("new")));
        let net = builder.build();
        assert_eq!(net.node_count(), 1);
        assert_eq!(net.get_node(0).unwrap().name.as_deref(), Some("new"));
    }

    #[test]
    fn test_attribute_fragments_append() {
        let mut builder = CxBuilder::new();
        for v in ["a", "b"] {
            builder.add_fragment(AspectFragment::NodeAttribute(Attribute {
                property_of: 0,
                name: "k".into(),
                value: Value::from(v),
                datatype: None,
            }));
        }
        let net = builder.build();
        assert_eq!(net.get_node_attributes(0).len(), 2);
    }

    #[test]
    fn test_network_attribute_last_wins_at_assembly() {
        let mut builder = CxBuilder::new();
        builder.set_name("first");
        builder.set_name("second");
        let net = builder.build();
        assert_eq!(net.get_name(), Some("second"));
    }

    #[test]
    fn test_metadata_and_status_fragments_dropped() {
        let mut builder = CxBuilder::new();
        builder.add_fragment(AspectFragment::Opaque {
            aspect: aspects::METADATA.into(),
            record: serde_json::json!({"name": "nodes"}),
        });
        builder.add_fragment(AspectFragment::Status(
            crate::model::StatusRecord::ok(),
        ));
        let net = builder.build();
        assert_eq!(net.get_opaque_aspect_names().count(), 0);
    }
}

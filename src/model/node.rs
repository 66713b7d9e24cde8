//! Node in the CX network model.

use serde::{Deserialize, Serialize};

/// A node fragment.
///
/// `represents` is an alternate external identifier for the entity the node
/// stands for (e.g. a database accession). Node ids live in their own
/// namespace, independent of edge ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    #[serde(rename = "@id")]
    pub id: u64,

    #[serde(rename = "n", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "r", default, skip_serializing_if = "Option::is_none")]
    pub represents: Option<String>,
}

impl Node {
    pub fn new(id: u64) -> Self {
        Self { id, name: None, represents: None }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_represents(mut self, represents: impl Into<String>) -> Self {
        self.represents = Some(represents.into());
        self
    }
}

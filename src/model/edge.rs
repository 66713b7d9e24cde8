//! Edge in the CX network model.

use serde::{Deserialize, Serialize};

/// Interaction assigned to edges that arrive without one.
pub const DEFAULT_INTERACTION: &str = "interacts-with";

/// A directed edge fragment.
///
/// `source` and `target` SHOULD reference existing node ids, but the model
/// does not enforce referential integrity at ingestion time — fragments may
/// legitimately arrive before their referents in a CX stream. Verifying
/// integrity before consuming the graph is the caller's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    #[serde(rename = "@id")]
    pub id: u64,

    #[serde(rename = "s")]
    pub source: u64,

    #[serde(rename = "t")]
    pub target: u64,

    #[serde(rename = "i", default = "default_interaction")]
    pub interaction: String,
}

fn default_interaction() -> String {
    DEFAULT_INTERACTION.to_owned()
}

impl Edge {
    pub fn new(id: u64, source: u64, target: u64) -> Self {
        Self { id, source, target, interaction: default_interaction() }
    }

    pub fn with_interaction(mut self, interaction: impl Into<String>) -> Self {
        self.interaction = interaction.into();
        self
    }

    /// The "other" endpoint of the edge from the given node id.
    pub fn other_node(&self, from: u64) -> Option<u64> {
        if from == self.source { Some(self.target) }
        else if from == self.target { Some(self.source) }
        else { None }
    }
}

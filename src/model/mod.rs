//! # CX Network Model
//!
//! Clean DTOs for the CX aspect vocabulary and the aggregation container
//! that owns them. These types cross every boundary: builder ↔ codec ↔ user.
//!
//! Design rule: this module is pure data — no I/O, no transport, no async.

pub mod node;
pub mod edge;
pub mod value;
pub mod aspect;
pub mod network;

pub use node::Node;
pub use edge::{Edge, DEFAULT_INTERACTION};
pub use value::{Value, DataType};
pub use aspect::{
    AspectFragment, AspectBundle, Attribute, NetworkAttribute,
    Citation, Support, CitationLinks, SupportLinks, StatusRecord,
    aspects,
};
pub use network::{CxNetwork, ElementRef};

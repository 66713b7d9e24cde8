//! # ndex-cx — CX Network Model for Rust
//!
//! An in-memory model of the CX aspect-oriented network interchange format,
//! plus the machinery around it: an incremental builder that assembles a
//! network from a flat fragment stream, a visual-style reconciliation engine,
//! and a streaming codec for the wire form.
//!
//! ## Design Principles
//!
//! 1. **Pure DTOs**: `Node`, `Edge`, `Attribute`, `Value` cross all boundaries
//! 2. **Model owns everything**: all fragments live in `CxNetwork`, indexed by id
//! 3. **Builder owns nothing**: staging inventories are discarded on `build()`
//! 4. **Codec is transport-agnostic**: it only ever sees `io::Read`/`io::Write`
//!
//! ## Quick Start
//!
//! ```rust
//! use ndex_cx::{CxNetwork, Value};
//!
//! # fn example() -> ndex_cx::Result<()> {
//! let mut net = CxNetwork::new();
//! net.set_name("my network");
//!
//! let a = net.create_node("ABC1", None);
//! let b = net.create_node("DEF2", None);
//! let _e = net.create_edge(a, b, None);
//!
//! net.set_node_attribute(a, Some("score"), Value::from(1.5), None, false)?;
//!
//! let mut out = Vec::new();
//! net.write_cx(&mut out)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Aspects
//!
//! | Aspect | Wire name | Handling |
//! |--------|-----------|----------|
//! | Nodes / Edges | `nodes`, `edges` | id-indexed, O(1) lookup |
//! | Attributes | `nodeAttributes`, `edgeAttributes` | per-owner lists, order-preserving |
//! | Network attributes | `networkAttributes` | one slot per name, upsert |
//! | Citations / Supports | `citations`, `supports`, link aspects | id-indexed + link indices |
//! | Visual style | `cyVisualProperties` / `visualProperties` | normalized by `style` |
//! | Anything else | — | preserved verbatim as opaque aspects |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod builder;
pub mod style;
pub mod codec;

// ============================================================================
// Re-exports: Model (the DTOs)
// ============================================================================

pub use model::{
    Node, Edge, Value, DataType, Attribute, NetworkAttribute,
    Citation, Support, StatusRecord, ElementRef,
    AspectFragment, AspectBundle, CxNetwork,
};

// ============================================================================
// Re-exports: Builder / Codec / Style
// ============================================================================

pub use builder::CxBuilder;
pub use codec::{CxDocument, read_cx, write_cx};
pub use style::{CY_VISUAL_PROPERTIES, VISUAL_PROPERTIES};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed or missing required input to a node/edge/attribute operation.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Style transplant source carries no visual-styling aspect.
    #[error("No style found: {0}")]
    NoStyleFound(String),

    /// Styling aspect in a shape neither decode path recognizes.
    #[error("Unsupported style schema: {0}")]
    UnsupportedSchema(String),

    /// Non-ASCII binary value or non-serializable number during CX output.
    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

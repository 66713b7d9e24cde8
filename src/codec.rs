//! CX codec — the wire form in and out.
//!
//! Output is streamed bundle-by-bundle to an `io::Write`; the codec never
//! builds the whole document as one allocated string. The trailing status
//! bundle required by the wire contract is appended (or an empty one
//! augmented) here, exactly once.
//!
//! Input parses a CX document into bundles once, then yields fragments
//! lazily — a single-pass iterator suitable for `CxBuilder::consume`.

use std::io::{Read, Write};

use tracing::debug;

use crate::model::aspect::{aspects, AspectBundle, AspectFragment, StatusRecord};
use crate::model::CxNetwork;
use crate::{CxBuilder, Result};

// ============================================================================
// Encoding
// ============================================================================

/// Serialize aspect bundles as a CX document, guaranteeing the trailing
/// status bundle.
pub fn write_cx<W: Write>(bundles: &[AspectBundle], mut writer: W) -> Result<()> {
    debug!(bundles = bundles.len(), "writing CX stream");

    writer.write_all(b"[")?;

    let mut first = true;
    let mut write_bundle = |writer: &mut W, bundle: &AspectBundle| -> Result<()> {
        if !first {
            writer.write_all(b",")?;
        }
        first = false;
        serde_json::to_writer(&mut *writer, bundle)?;
        Ok(())
    };

    let (body, last) = match bundles.split_last() {
        Some((last, body)) => (body, Some(last)),
        None => (bundles, None),
    };

    for bundle in body {
        write_bundle(&mut writer, bundle)?;
    }

    match last {
        Some(bundle) if bundle.is_status() && bundle.records.is_empty() => {
            // Augment the empty status bundle in place.
            write_bundle(&mut writer, &status_bundle()?)?;
        }
        Some(bundle) if bundle.is_status() => {
            write_bundle(&mut writer, bundle)?;
        }
        Some(bundle) => {
            write_bundle(&mut writer, bundle)?;
            write_bundle(&mut writer, &status_bundle()?)?;
        }
        None => {
            write_bundle(&mut writer, &status_bundle()?)?;
        }
    }

    writer.write_all(b"]")?;
    writer.flush()?;
    Ok(())
}

fn status_bundle() -> Result<AspectBundle> {
    Ok(AspectBundle::new(
        aspects::STATUS,
        vec![serde_json::to_value(StatusRecord::ok())?],
    ))
}

// ============================================================================
// Decoding
// ============================================================================

/// A parsed CX document: the ordered bundle list, fragments on demand.
#[derive(Debug, Clone, PartialEq)]
pub struct CxDocument {
    pub bundles: Vec<AspectBundle>,
}

impl CxDocument {
    /// Lazy fragment stream over the whole document, in wire order. Parsed
    /// record by record; a malformed record surfaces as an `Err` item.
    pub fn fragments(&self) -> impl Iterator<Item = Result<AspectFragment>> + '_ {
        self.bundles.iter().flat_map(|bundle| {
            bundle
                .records
                .iter()
                .map(move |record| AspectFragment::parse(&bundle.name, record.clone()))
        })
    }

    /// Consuming variant of [`Self::fragments`]; avoids cloning records.
    pub fn into_fragments(self) -> impl Iterator<Item = Result<AspectFragment>> {
        self.bundles.into_iter().flat_map(|bundle| {
            let name = bundle.name;
            bundle
                .records
                .into_iter()
                .map(move |record| AspectFragment::parse(&name, record))
        })
    }
}

/// Parse a CX document from a byte stream.
pub fn read_cx<R: Read>(reader: R) -> Result<CxDocument> {
    let bundles: Vec<AspectBundle> = serde_json::from_reader(reader)?;
    Ok(CxDocument { bundles })
}

// ============================================================================
// CxNetwork convenience surface
// ============================================================================

impl CxNetwork {
    /// Serialize this network as a CX document, status bundle included.
    pub fn write_cx<W: Write>(&self, writer: W) -> Result<()> {
        write_cx(&self.to_cx_bundles()?, writer)
    }

    /// Build a network straight from a CX byte stream.
    pub fn from_cx_reader<R: Read>(reader: R) -> Result<CxNetwork> {
        let document = read_cx(reader)?;
        let mut builder = CxBuilder::new();
        builder.consume(document.into_fragments())?;
        Ok(builder.build())
    }
}

// ============================================================================
// Tests
// ============================================================================

//! Visual-style reconciliation: transplant styling from one network onto
//! another.
//!
//! The styling opaque aspect exists in two historical shapes, distinguished
//! by aspect name. Both decode paths converge on one canonical form: exactly
//! three category bundles (network default, node default, edge default).
//! Per-node and per-edge override records are discarded during transplant —
//! element ids are not guaranteed to correspond between two networks, so
//! style is only ever copied at the category level.

use tracing::debug;

use crate::model::CxNetwork;
use crate::{Error, Result};

/// Aspect name of the current styling schema.
pub const CY_VISUAL_PROPERTIES: &str = "cyVisualProperties";

/// Aspect name of the legacy styling schema.
pub const VISUAL_PROPERTIES: &str = "visualProperties";

/// The three canonical category bundles, in emission order.
const CATEGORIES: [&str; 3] = ["network", "nodes:default", "edges:default"];

// ============================================================================
// Schema detection
// ============================================================================

/// The styling aspect as found in a source network, tagged by schema.
#[derive(Debug, Clone, Copy)]
enum StyleAspect<'a> {
    Current(&'a [serde_json::Value]),
    Legacy(&'a [serde_json::Value]),
}

impl<'a> StyleAspect<'a> {
    /// Locate the styling aspect of a network, preferring the current
    /// schema name over the legacy one.
    fn find(net: &'a CxNetwork) -> Option<Self> {
        if let Some(records) = net.get_opaque_aspect(CY_VISUAL_PROPERTIES) {
            return Some(StyleAspect::Current(records));
        }
        net.get_opaque_aspect(VISUAL_PROPERTIES).map(StyleAspect::Legacy)
    }

    fn records(&self) -> &'a [serde_json::Value] {
        match self {
            StyleAspect::Current(r) | StyleAspect::Legacy(r) => r,
        }
    }
}

// ============================================================================
// Normalization
// ============================================================================

/// Reduce a styling aspect to the three canonical category bundles.
///
/// Per-element override records (`properties_of` of `"nodes"` / `"edges"`)
/// are dropped; a category absent from the source is synthesized as an empty
/// default bundle so the output always has exactly 3 records. Anything the
/// schema does not account for fails with `UnsupportedSchema`.
fn normalize(aspect: StyleAspect<'_>) -> Result<Vec<serde_json::Value>> {
    let mut found: [Option<&serde_json::Value>; 3] = [None; 3];

    for record in aspect.records() {
        let category = record
            .get("properties_of")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| {
                Error::UnsupportedSchema(
                    "visual properties record has no properties_of field".into(),
                )
            })?;

        match category {
            // Per-element overrides: intentionally discarded.
            "nodes" | "edges" => continue,
            _ => match CATEGORIES.iter().position(|c| *c == category) {
                Some(slot) => {
                    if found[slot].is_none() {
                        found[slot] = Some(record);
                    }
                }
                None => {
                    return Err(Error::UnsupportedSchema(format!(
                        "unrecognized visual properties category '{category}'"
                    )))
                }
            },
        }
    }

    Ok(CATEGORIES
        .iter()
        .zip(found)
        .map(|(category, record)| match record {
            Some(rec) => rec.clone(),
            None => serde_json::json!({
                "properties_of": category,
                "properties": {},
            }),
        })
        .collect())
}

// ============================================================================
// Transplant
// ============================================================================

impl CxNetwork {
    /// Replace this network's styling aspect with the normalized style of
    /// `source`. Only the styling aspect is touched; on failure the target
    /// is left exactly as it was.
    pub fn apply_style_from(&mut self, source: Option<&CxNetwork>) -> Result<()> {
        let source = source
            .ok_or_else(|| Error::InvalidArgument("Object passed in is None".into()))?;

        let aspect = StyleAspect::find(source).ok_or_else(|| {
            Error::NoStyleFound("No visual style found in network".into())
        })?;

        self.transplant(normalize(aspect)?);
        Ok(())
    }

    /// Wire-level variant: take the style straight from a raw CX document
    /// (the JSON array of aspect bundles) instead of a built model.
    pub fn apply_style_from_cx(&mut self, raw: Option<&serde_json::Value>) -> Result<()> {
        let raw = match raw {
            None | Some(serde_json::Value::Null) => {
                return Err(Error::InvalidArgument("Object passed in is None".into()))
            }
            Some(v) => v,
        };

        let bundles = raw.as_array().ok_or_else(|| {
            Error::InvalidArgument("Object passed in is not NiceCXNetwork".into())
        })?;

        let mut found: Option<StyleAspect<'_>> = None;
        for bundle in bundles {
            let obj = bundle.as_object().filter(|o| o.len() == 1).ok_or_else(|| {
                Error::InvalidArgument("Object passed in is not NiceCXNetwork".into())
            })?;
            // Single-key object, checked above.
            let (name, records) = obj.iter().next().ok_or_else(|| {
                Error::InvalidArgument("Object passed in is not NiceCXNetwork".into())
            })?;
            let records = records.as_array().ok_or_else(|| {
                Error::InvalidArgument("Object passed in is not NiceCXNetwork".into())
            })?;
            match name.as_str() {
                CY_VISUAL_PROPERTIES => found = Some(StyleAspect::Current(records)),
                VISUAL_PROPERTIES => {
                    if found.is_none() {
                        found = Some(StyleAspect::Legacy(records));
                    }
                }
                _ => {}
            }
        }

        let aspect = found.ok_or_else(|| {
            Error::NoStyleFound("No visual style found in network".into())
        })?;

        self.transplant(normalize(aspect)?);
        Ok(())
    }

    fn transplant(&mut self, bundles: Vec<serde_json::Value>) {
        debug!(records = bundles.len(), "transplanting normalized visual style");
        self.remove_opaque_aspect(VISUAL_PROPERTIES);
        self.add_opaque_aspect(CY_VISUAL_PROPERTIES, bundles);
    }
}

// ============================================================================
// Tests
// ============================================================================

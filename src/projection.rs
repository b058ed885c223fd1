//! Output field-name extraction from a projection stage document.
//!
//! Every executed query needs its result-column list, so this runs once per
//! statement on the hot path: one pass over the stage, one output vector
//! sized to the stage's element count.

use crate::ast::{AstElement, AstValue};
use crate::{DialectError, Result};

/// Derive the ordered output field names a query using `stage` will yield.
///
/// Stage order is preserved. `_id` excluded explicitly (`_id: 0` or
/// `false`) is omitted; present with any non-exclusion marker it is
/// included like any other field. A value that is not a recognized
/// inclusion, exclusion, or expression marker is an extraction error.
pub fn projected_field_names(stage: &[AstElement]) -> Result<Vec<String>> {
    let mut names = Vec::with_capacity(stage.len());
    for element in stage {
        match classify(&element.value) {
            Marker::Include => names.push(element.name.clone()),
            // Covers the conventional `_id: 0` suppression; an excluded
            // field never appears in output.
            Marker::Exclude => {}
            Marker::Unrecognized => {
                return Err(DialectError::Extraction(format!(
                    "field {:?} has no recognized inclusion/exclusion/expression marker",
                    element.name
                )));
            }
        }
    }
    Ok(names)
}

enum Marker {
    Include,
    Exclude,
    Unrecognized,
}

fn classify(value: &AstValue) -> Marker {
    match value {
        AstValue::Int32(0) | AstValue::Int64(0) | AstValue::Boolean(false) => Marker::Exclude,
        AstValue::Double(d) if *d == 0.0 => Marker::Exclude,
        AstValue::Int32(_) | AstValue::Int64(_) | AstValue::Double(_) | AstValue::Boolean(true) => {
            Marker::Include
        }
        // Expression projections: field path references and operator docs.
        AstValue::String(_) | AstValue::Document(_) => Marker::Include,
        _ => Marker::Unrecognized,
    }
}

use crate::records::error::ResponseError;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// One possible value of a facet and the number of offers matching it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetValue {
    pub value: String,
    pub count: u64,
}

/// A named filter dimension (`typeContrat`, `experience`, ...) with its value counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facet {
    pub name: String,
    pub values: Vec<FacetValue>,
}

impl Facet {
    /// Total number of offers across all values of this facet.
    pub fn total(&self) -> u64 {
        self.values.iter().map(|v| v.count).sum()
    }
}

/// Parses the `filtresPossibles` member:
/// `[{"filtre": "...", "agregation": [{"valeurPossible": "...", "nbResultats": n}]}]`.
pub fn parse_facets(key: &str, raw: &JsonValue) -> Result<Vec<Facet>, ResponseError> {
    let invalid = |expected| ResponseError::InvalidShape {
        key: key.to_string(),
        expected,
    };

    let entries = raw.as_array().ok_or_else(|| invalid("an array of facets"))?;
    let mut facets = Vec::with_capacity(entries.len());

    for entry in entries {
        let name = entry
            .get("filtre")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| invalid("facets with a `filtre` name"))?;

        let mut values = Vec::new();
        if let Some(aggregations) = entry.get("agregation") {
            let aggregations = aggregations
                .as_array()
                .ok_or_else(|| invalid("facets with an `agregation` array"))?;
            for agg in aggregations {
                let value = match agg.get("valeurPossible") {
                    Some(JsonValue::String(s)) => s.clone(),
                    Some(other) if !other.is_null() => other.to_string(),
                    _ => return Err(invalid("aggregations with a `valeurPossible`")),
                };
                let count = agg
                    .get("nbResultats")
                    .and_then(count_of)
                    .ok_or_else(|| invalid("aggregations with a numeric `nbResultats`"))?;
                values.push(FacetValue { value, count });
            }
        }

        facets.push(Facet {
            name: name.to_string(),
            values,
        });
    }

    Ok(facets)
}

/// Reads a non-negative count that may be encoded as a number or a numeric string.
pub(crate) fn count_of(value: &JsonValue) -> Option<u64> {
    match value {
        JsonValue::Number(n) => n.as_u64(),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

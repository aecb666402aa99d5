use crate::{
    core::identifiers::RowId,
    records::{
        error::ResponseError,
        facet::{Facet, count_of, parse_facets},
        record::Record,
    },
};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::{HashMap, HashSet};
use tracing::debug;

pub const RESULTS_KEY: &str = "resultats";
pub const FACETS_KEY: &str = "filtresPossibles";
pub const CONTENT_RANGE_KEY: &str = "Content-Range";

/// Range/count metadata of one search call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContentRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_index: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_index: Option<u64>,
    /// Total number of offers matching the query, not only those returned.
    pub max_results: u64,
}

impl ContentRange {
    fn parse(raw: &JsonValue) -> Result<Self, ResponseError> {
        let invalid = |expected| ResponseError::InvalidShape {
            key: CONTENT_RANGE_KEY.to_string(),
            expected,
        };

        let obj = raw
            .as_object()
            .ok_or_else(|| invalid("an object with `max_results`"))?;
        let max_results = obj
            .get("max_results")
            .and_then(count_of)
            .ok_or_else(|| invalid("an object with a numeric `max_results`"))?;

        Ok(ContentRange {
            first_index: obj.get("first_index").and_then(count_of),
            last_index: obj.get("last_index").and_then(count_of),
            max_results,
        })
    }
}

/// The records of one search call plus its facet and count metadata.
///
/// Immutable once built; every derived table is keyed by `ids`.
#[derive(Debug, Clone)]
pub struct RecordSet {
    records: Vec<Record>,
    ids: Vec<RowId>,
    facets: Vec<Facet>,
    content_range: ContentRange,
}

impl RecordSet {
    /// Builds a record set, deriving one unique row id per record from `id_field`.
    ///
    /// Records without an id get a positional id (`row-<index>`); a repeated id
    /// is suffixed (`<id>#2`, `<id>#3`, ...), skipping suffixes already taken by
    /// another record, so that row identity stays unique.
    pub fn new(
        records: Vec<Record>,
        facets: Vec<Facet>,
        content_range: ContentRange,
        id_field: &str,
    ) -> Self {
        let mut emitted: HashSet<String> = HashSet::new();
        let mut occurrences: HashMap<String, usize> = HashMap::new();
        let ids = records
            .iter()
            .enumerate()
            .map(|(idx, record)| {
                let base = match record.get(id_field) {
                    Some(JsonValue::String(s)) => s.clone(),
                    Some(JsonValue::Null) | None => format!("row-{idx}"),
                    Some(other) => other.to_string(),
                };
                let mut n = occurrences.get(&base).copied().unwrap_or(1);
                let mut id = base.clone();
                while emitted.contains(&id) {
                    n += 1;
                    id = format!("{base}#{n}");
                }
                if id != base {
                    debug!("Duplicate record id `{}`, using `{}`", base, id);
                }
                occurrences.insert(base, n);
                emitted.insert(id.clone());
                RowId::new(id)
            })
            .collect();

        Self {
            records,
            ids,
            facets,
            content_range,
        }
    }

    /// Extracts records, facets and count metadata from a raw search response.
    ///
    /// All three top-level members are required; nothing is returned when any is absent.
    pub fn from_response(raw: &JsonValue, id_field: &str) -> Result<Self, ResponseError> {
        let root = raw.as_object().ok_or(ResponseError::InvalidShape {
            key: "<root>".to_string(),
            expected: "a JSON object",
        })?;

        let results = root
            .get(RESULTS_KEY)
            .ok_or(ResponseError::MissingKey(RESULTS_KEY))?;
        let facets = root
            .get(FACETS_KEY)
            .ok_or(ResponseError::MissingKey(FACETS_KEY))?;
        let content_range = root
            .get(CONTENT_RANGE_KEY)
            .ok_or(ResponseError::MissingKey(CONTENT_RANGE_KEY))?;

        let items = results.as_array().ok_or_else(|| ResponseError::InvalidShape {
            key: RESULTS_KEY.to_string(),
            expected: "an array of records",
        })?;
        let records = items
            .iter()
            .map(|item| {
                item.as_object()
                    .cloned()
                    .ok_or_else(|| ResponseError::InvalidShape {
                        key: RESULTS_KEY.to_string(),
                        expected: "an array of JSON objects",
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let facets = parse_facets(FACETS_KEY, facets)?;
        let content_range = ContentRange::parse(content_range)?;

        Ok(Self::new(records, facets, content_range, id_field))
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn ids(&self) -> &[RowId] {
        &self.ids
    }

    /// Records paired with their row ids, in response order.
    pub fn iter(&self) -> impl Iterator<Item = (&RowId, &Record)> {
        self.ids.iter().zip(self.records.iter())
    }

    pub fn facets(&self) -> &[Facet] {
        &self.facets
    }

    pub fn content_range(&self) -> ContentRange {
        self.content_range
    }

    pub fn max_results(&self) -> u64 {
        self.content_range.max_results
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response() -> JsonValue {
        json!({
            "resultats": [
                {"id": "170AAA", "intitule": "Data analyst"},
                {"intitule": "BI developer"},
                {"id": "170AAA", "intitule": "Repost"}
            ],
            "filtresPossibles": [],
            "Content-Range": {"first_index": 0, "last_index": 2, "max_results": "1234"}
        })
    }

    #[test]
    fn test_from_response() {
        let set = RecordSet::from_response(&response(), "id").unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.max_results(), 1234);
        assert_eq!(set.content_range().last_index, Some(2));
        assert!(set.facets().is_empty());
    }

    #[test]
    fn test_row_ids_are_unique() {
        let set = RecordSet::from_response(&response(), "id").unwrap();
        let ids: Vec<&str> = set.ids().iter().map(RowId::as_str).collect();
        assert_eq!(ids, vec!["170AAA", "row-1", "170AAA#2"]);
    }

    #[test]
    fn test_suffixed_ids_never_reuse_an_existing_id() {
        let raw = json!({
            "resultats": [
                {"id": "a"},
                {"id": "a#2"},
                {"id": "a"},
                {"id": "row-4"},
                {}
            ],
            "filtresPossibles": [],
            "Content-Range": {"max_results": 5}
        });
        let set = RecordSet::from_response(&raw, "id").unwrap();
        let ids: Vec<&str> = set.ids().iter().map(RowId::as_str).collect();
        assert_eq!(ids, vec!["a", "a#2", "a#3", "row-4", "row-4#2"]);
    }

    #[test]
    fn test_each_required_key_is_checked() {
        for key in [RESULTS_KEY, FACETS_KEY, CONTENT_RANGE_KEY] {
            let mut raw = response();
            raw.as_object_mut().unwrap().remove(key);
            let err = RecordSet::from_response(&raw, "id").unwrap_err();
            assert_eq!(err, ResponseError::MissingKey(key));
        }
    }

    #[test]
    fn test_content_range_requires_max_results() {
        let mut raw = response();
        raw["Content-Range"] = json!({"first_index": 0});
        let err = RecordSet::from_response(&raw, "id").unwrap_err();
        assert!(matches!(err, ResponseError::InvalidShape { .. }));
    }
}

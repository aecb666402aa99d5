#![allow(dead_code)]

use model::records::record_set::{ContentRange, RecordSet};
use serde_json::Value as JsonValue;

pub mod integration;
pub mod utils;

/// Raw response of a four-offer search, as the API returns it.
pub const SEARCH_RESPONSE: &str = include_str!("../fixtures/search_response.json");

pub fn search_response() -> JsonValue {
    serde_json::from_str(SEARCH_RESPONSE).expect("fixture is valid JSON")
}

/// Wraps bare records into a raw response with empty facets.
pub fn response_of(records: Vec<JsonValue>) -> JsonValue {
    let max_results = records.len();
    serde_json::json!({
        "resultats": records,
        "filtresPossibles": [],
        "Content-Range": {"max_results": max_results}
    })
}

/// Record set keyed by the `id` field, without facets.
pub fn record_set(records: Vec<JsonValue>) -> RecordSet {
    let records = records
        .into_iter()
        .map(|r| r.as_object().cloned().expect("record is a JSON object"))
        .collect();
    RecordSet::new(records, vec![], ContentRange::default(), "id")
}

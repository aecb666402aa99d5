use serde_json::{Map, Value as JsonValue};

/// One job offer as returned by the search API.
pub type Record = Map<String, JsonValue>;

/// Resolves a dotted field path (`lieuTravail.libelle`) inside a record.
///
/// A key that literally contains the dotted path wins over descending into
/// nested objects. Returns `None` when any segment is absent or when an
/// intermediate value is not an object.
pub fn resolve_path<'a>(record: &'a Record, path: &str) -> Option<&'a JsonValue> {
    if let Some(value) = record.get(path) {
        return Some(value);
    }

    let mut segments = path.split('.');
    let first = segments.next()?;
    let mut current = record.get(first)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Last segment of a dotted path, used to name a column for scalar values.
pub fn leaf_name(path: &str) -> &str {
    path.rsplit('.').next().unwrap_or(path)
}

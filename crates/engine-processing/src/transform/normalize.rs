use super::error::TransformError;
use model::{
    core::value::Value,
    records::{record::Record, record_set::RecordSet, table::FlatTable},
};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use tracing::debug;

/// Full-depth normalization of a record set into the base table.
///
/// Nested mappings become dotted-path columns (`lieuTravail.libelle`), lists stay
/// whole as opaque values, JSON `null` becomes the missing marker. The column set
/// is the union over all records in first-seen order; a record lacking a column
/// gets a missing marker there.
pub fn normalize(records: &RecordSet) -> Result<FlatTable, TransformError> {
    let mut columns: Vec<String> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut rows: Vec<Vec<(usize, Value)>> = Vec::with_capacity(records.len());

    for record in records.records() {
        let mut entries = Vec::new();
        walk_record("", record, &mut entries);

        let cells = entries
            .into_iter()
            .map(|(path, value)| {
                let idx = *positions.entry(path.clone()).or_insert_with(|| {
                    columns.push(path);
                    columns.len() - 1
                });
                (idx, value)
            })
            .collect();
        rows.push(cells);
    }

    let width = columns.len();
    let mut table = FlatTable::new(columns)?;
    for (id, sparse) in records.ids().iter().zip(rows) {
        let mut cells = vec![Value::Null; width];
        for (idx, value) in sparse {
            cells[idx] = value;
        }
        table.push_row(id.clone(), cells)?;
    }

    debug!(
        "Normalized {} records into {} columns",
        table.row_count(),
        table.column_count()
    );
    Ok(table)
}

fn walk_record(prefix: &str, map: &Record, out: &mut Vec<(String, Value)>) {
    for (key, value) in map {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };

        match value {
            // An empty mapping contributes no column.
            JsonValue::Object(inner) => walk_record(&path, inner, out),
            other => out.push((path, Value::from_json(other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::records::record_set::ContentRange;
    use serde_json::json;

    fn record_set(items: Vec<JsonValue>) -> RecordSet {
        let records = items
            .into_iter()
            .filter_map(|v| v.as_object().cloned())
            .collect();
        RecordSet::new(records, vec![], ContentRange::default(), "id")
    }

    #[test]
    fn test_nested_objects_become_dotted_columns() {
        let set = record_set(vec![
            json!({"id": "1", "lieuTravail": {"libelle": "33 - Bordeaux", "coords": {"lat": 44.8}}}),
            json!({"id": "2", "salaire": {"libelle": "35k"}}),
        ]);

        let table = normalize(&set).unwrap();
        assert_eq!(
            table.columns(),
            &[
                "id".to_string(),
                "lieuTravail.libelle".to_string(),
                "lieuTravail.coords.lat".to_string(),
                "salaire.libelle".to_string(),
            ]
        );
        assert_eq!(table.value("1", "lieuTravail.coords.lat"), Some(&Value::Float(44.8)));
        assert_eq!(table.value("1", "salaire.libelle"), Some(&Value::Null));
        assert_eq!(table.value("2", "lieuTravail.libelle"), Some(&Value::Null));
    }

    #[test]
    fn test_lists_stay_opaque_and_null_is_missing() {
        let set = record_set(vec![json!({
            "id": "1",
            "competences": [{"libelle": "SQL"}],
            "entreprise": {},
            "salaire": null
        })]);

        let table = normalize(&set).unwrap();
        assert!(!table.contains_column("entreprise"));
        assert_eq!(table.value("1", "salaire"), Some(&Value::Null));
        assert!(matches!(
            table.value("1", "competences"),
            Some(Value::Json(JsonValue::Array(_)))
        ));
    }

    #[test]
    fn test_empty_record_set() {
        let table = normalize(&record_set(vec![])).unwrap();
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.column_count(), 0);
    }
}

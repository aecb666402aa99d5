use super::error::{FLATTENING, TransformError};
use model::{
    core::value::Value,
    records::{
        record::{leaf_name, resolve_path},
        record_set::RecordSet,
        table::FlatTable,
    },
    transform::flatten_spec::{FieldFlattenSpec, FlattenStrategy},
};
use serde_json::Value as JsonValue;
use tracing::debug;

/// Expands one nested field of every record into a fragment table.
///
/// The fragment has exactly one row per record, keyed by the record's row id.
/// A record where the field is absent (or `null`) gets missing markers in every
/// generated column. Fails with `FieldNotFound` only when no record of the
/// batch has the field at all.
pub fn flatten(records: &RecordSet, spec: &FieldFlattenSpec) -> Result<FlatTable, TransformError> {
    let values: Vec<Option<&JsonValue>> = records
        .records()
        .iter()
        .map(|record| resolve_path(record, &spec.path))
        .collect();

    if values.iter().all(Option::is_none) {
        return Err(TransformError::FieldNotFound {
            path: spec.path.clone(),
        });
    }

    let (columns, rows) = match &spec.strategy {
        FlattenStrategy::SplitOnDelimiter {
            separator,
            new_fields,
        } => split_on_delimiter(&values, separator, new_fields),
        FlattenStrategy::ObjectToColumns { keys, prefix } => {
            object_to_columns(&values, &spec.path, keys.as_deref(), prefix.as_deref())
        }
        FlattenStrategy::ListToIndexedColumns {
            max_items,
            item_key,
        } => list_to_indexed_columns(&values, spec, *max_items, item_key.as_deref()),
    };

    let mut fragment =
        FlatTable::new(columns).map_err(|e| TransformError::at_stage(e, FLATTENING))?;
    for (id, cells) in records.ids().iter().zip(rows) {
        fragment.push_row(id.clone(), cells)?;
    }

    debug!(
        "Flattened `{}` into {} columns",
        spec.path,
        fragment.column_count()
    );
    Ok(fragment)
}

type Cells = (Vec<String>, Vec<Vec<Value>>);

fn split_on_delimiter(
    values: &[Option<&JsonValue>],
    separator: &str,
    new_fields: &[String],
) -> Cells {
    let width = new_fields.len();
    let rows = values
        .iter()
        .map(|value| {
            let mut cells = vec![Value::Null; width];
            if width == 0 {
                return cells;
            }
            match value {
                Some(JsonValue::String(s)) => {
                    // The last destination keeps any remaining separators.
                    for (cell, part) in cells.iter_mut().zip(s.splitn(width, separator)) {
                        *cell = Value::text(part.trim());
                    }
                }
                Some(other) => cells[0] = Value::from_json(other),
                None => {}
            }
            cells
        })
        .collect();

    (new_fields.to_vec(), rows)
}

fn object_to_columns(
    values: &[Option<&JsonValue>],
    path: &str,
    declared: Option<&[String]>,
    prefix: Option<&str>,
) -> Cells {
    let keys: Vec<String> = match declared {
        Some(keys) => keys.to_vec(),
        None => {
            let mut seen: Vec<String> = Vec::new();
            for obj in values.iter().filter_map(|v| v.and_then(JsonValue::as_object)) {
                for key in obj.keys() {
                    if !seen.contains(key) {
                        seen.push(key.clone());
                    }
                }
            }
            seen
        }
    };

    // Records where the field holds a plain value instead of a mapping keep it
    // in `<leaf>_value`, apart from the sub-key columns.
    let has_plain = values
        .iter()
        .any(|v| matches!(v, Some(v) if !v.is_object() && !v.is_null()));

    let column_name = |key: &str| match prefix {
        Some(p) => format!("{p}_{key}"),
        None => key.to_string(),
    };

    let mut columns: Vec<String> = keys.iter().map(|k| column_name(k)).collect();
    if has_plain {
        columns.push(column_name(&format!("{}_value", leaf_name(path))));
    }

    let rows = values
        .iter()
        .map(|value| {
            let mut cells: Vec<Value> = keys
                .iter()
                .map(|key| match value {
                    Some(JsonValue::Object(obj)) => {
                        obj.get(key).map(Value::from_json).unwrap_or_default()
                    }
                    _ => Value::Null,
                })
                .collect();
            if has_plain {
                cells.push(match value {
                    Some(v) if !v.is_object() => Value::from_json(v),
                    _ => Value::Null,
                });
            }
            cells
        })
        .collect();

    (columns, rows)
}

fn list_to_indexed_columns(
    values: &[Option<&JsonValue>],
    spec: &FieldFlattenSpec,
    max_items: Option<usize>,
    item_key: Option<&str>,
) -> Cells {
    let items: Vec<Vec<&JsonValue>> = values
        .iter()
        .map(|value| match value {
            Some(JsonValue::Array(list)) => list.iter().collect(),
            Some(JsonValue::Null) | None => Vec::new(),
            // A lone value is a one-item list.
            Some(other) => vec![*other],
        })
        .collect();

    let width = max_items.unwrap_or_else(|| items.iter().map(Vec::len).max().unwrap_or(0));
    let columns = (0..width).map(|i| spec.indexed_column(i)).collect();

    let rows = items
        .iter()
        .map(|list| {
            let mut cells = vec![Value::Null; width];
            for (cell, item) in cells.iter_mut().zip(list.iter()) {
                *cell = match (item_key, item) {
                    (Some(key), JsonValue::Object(obj)) => {
                        obj.get(key).map(Value::from_json).unwrap_or_default()
                    }
                    _ => Value::from_json(item),
                };
            }
            cells
        })
        .collect();

    (columns, rows)
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
    fn test_object_columns_are_union_of_keys() {
        let set = record_set(vec![
            json!({"id": "1", "salaire": {"libelle": "35k"}}),
            json!({"id": "2"}),
            json!({"id": "3", "salaire": {"commentaire": "selon profil", "libelle": "40k"}}),
        ]);

        let fragment = flatten(&set, &FieldFlattenSpec::object("salaire")).unwrap();
        assert_eq!(
            fragment.columns(),
            &["libelle".to_string(), "commentaire".to_string()]
        );
        assert_eq!(fragment.row_count(), 3);
        assert_eq!(fragment.value("1", "commentaire"), Some(&Value::Null));
        assert!(fragment.rows()[1].cells.iter().all(Value::is_missing));
        assert_eq!(fragment.value("3", "libelle"), Some(&Value::from("40k")));
    }

    #[test]
    fn test_object_with_declared_keys_and_prefix() {
        let set = record_set(vec![json!({"id": "1", "contact": {"nom": "Mme X", "telephone": "01"}})]);
        let spec = FieldFlattenSpec::with_strategy(
            "contact",
            FlattenStrategy::ObjectToColumns {
                keys: Some(vec!["nom".into(), "courriel".into()]),
                prefix: Some("contact".into()),
            },
        );

        let fragment = flatten(&set, &spec).unwrap();
        assert_eq!(
            fragment.columns(),
            &["contact_nom".to_string(), "contact_courriel".to_string()]
        );
        assert_eq!(fragment.value("1", "contact_nom"), Some(&Value::from("Mme X")));
        assert_eq!(fragment.value("1", "contact_courriel"), Some(&Value::Null));
    }

    #[test]
    fn test_object_strategy_keeps_plain_values() {
        let set = record_set(vec![
            json!({"id": "1", "salaire": {"libelle": "35k"}}),
            json!({"id": "2", "salaire": "a negocier"}),
        ]);

        let fragment = flatten(&set, &FieldFlattenSpec::object("salaire")).unwrap();
        assert_eq!(
            fragment.columns(),
            &["libelle".to_string(), "salaire_value".to_string()]
        );
        assert_eq!(fragment.value("2", "salaire_value"), Some(&Value::from("a negocier")));
        assert_eq!(fragment.value("1", "salaire_value"), Some(&Value::Null));
    }

    #[test]
    fn test_plain_value_column_does_not_shadow_sub_key() {
        let set = record_set(vec![
            json!({"id": "1", "salaire": {"salaire": "35k", "libelle": "Annuel"}}),
            json!({"id": "2", "salaire": "a negocier"}),
        ]);

        let fragment = flatten(&set, &FieldFlattenSpec::object("salaire")).unwrap();
        assert_eq!(
            fragment.columns(),
            &[
                "salaire".to_string(),
                "libelle".to_string(),
                "salaire_value".to_string()
            ]
        );
        assert_eq!(fragment.value("1", "salaire"), Some(&Value::from("35k")));
        assert_eq!(fragment.value("2", "salaire_value"), Some(&Value::from("a negocier")));
    }

    #[test]
    fn test_flattening_collision_only_invalidates_its_field() {
        let set = record_set(vec![json!({"id": "1", "salaire": {"a": "x"}})]);
        let spec = FieldFlattenSpec::with_strategy(
            "salaire",
            FlattenStrategy::ObjectToColumns {
                keys: Some(vec!["a".into(), "a".into()]),
                prefix: None,
            },
        );

        let err = flatten(&set, &spec).unwrap_err();
        assert!(matches!(
            err,
            TransformError::DuplicateColumn { stage: "flattening", .. }
        ));
        assert!(err.is_field_scoped());
    }

    #[test]
    fn test_empty_split_parts_are_missing() {
        let set = record_set(vec![json!({"id": "1", "lieuTravail": {"libelle": "33 - "}})]);
        let spec = FieldFlattenSpec::split("lieuTravail.libelle", " - ", &["departement", "ville"]);

        let fragment = flatten(&set, &spec).unwrap();
        assert_eq!(fragment.value("1", "departement"), Some(&Value::from("33")));
        assert_eq!(fragment.value("1", "ville"), Some(&Value::Null));
    }

    #[test]
    fn test_split_on_delimiter() {
        let set = record_set(vec![
            json!({"id": "1", "lieuTravail": {"libelle": "33 - Bordeaux"}}),
            json!({"id": "2", "lieuTravail": {"libelle": "75"}}),
            json!({"id": "3", "lieuTravail": {"libelle": "2A - Ajaccio - Corse"}}),
            json!({"id": "4"}),
        ]);
        let spec = FieldFlattenSpec::split("lieuTravail.libelle", " - ", &["departement", "ville"]);

        let fragment = flatten(&set, &spec).unwrap();
        assert_eq!(fragment.value("1", "departement"), Some(&Value::from("33")));
        assert_eq!(fragment.value("1", "ville"), Some(&Value::from("Bordeaux")));
        assert_eq!(fragment.value("2", "departement"), Some(&Value::from("75")));
        assert_eq!(fragment.value("2", "ville"), Some(&Value::Null));
        assert_eq!(fragment.value("3", "ville"), Some(&Value::from("Ajaccio - Corse")));
        assert_eq!(fragment.value("4", "departement"), Some(&Value::Null));
    }

    #[test]
    fn test_list_width_is_batch_maximum() {
        let set = record_set(vec![
            json!({"id": "1", "langues": ["fr", "en", "de"]}),
            json!({"id": "2", "langues": ["fr"]}),
            json!({"id": "3"}),
        ]);

        let fragment = flatten(&set, &FieldFlattenSpec::list("langues")).unwrap();
        assert_eq!(
            fragment.columns(),
            &["langues_0".to_string(), "langues_1".to_string(), "langues_2".to_string()]
        );
        assert_eq!(fragment.value("2", "langues_0"), Some(&Value::from("fr")));
        assert_eq!(fragment.value("2", "langues_2"), Some(&Value::Null));
        assert!(fragment.rows()[2].cells.iter().all(Value::is_missing));
    }

    #[test]
    fn test_list_with_max_items_and_item_key() {
        let set = record_set(vec![json!({
            "id": "1",
            "competences": [
                {"code": "1", "libelle": "SQL"},
                {"code": "2", "libelle": "Python"},
                {"code": "3"},
                {"code": "4", "libelle": "Excel"}
            ]
        })]);
        let spec = FieldFlattenSpec::list("competences")
            .max_items(3)
            .item_key("libelle");

        let fragment = flatten(&set, &spec).unwrap();
        assert_eq!(fragment.column_count(), 3);
        assert_eq!(fragment.value("1", "competences_1"), Some(&Value::from("Python")));
        assert_eq!(fragment.value("1", "competences_2"), Some(&Value::Null));
    }

    #[test]
    fn test_field_absent_everywhere_is_an_error() {
        let set = record_set(vec![json!({"id": "1"}), json!({"id": "2"})]);
        let err = flatten(&set, &FieldFlattenSpec::object("salaire")).unwrap_err();
        assert_eq!(
            err,
            TransformError::FieldNotFound {
                path: "salaire".into()
            }
        );
    }

    #[test]
    fn test_field_present_once_is_enough() {
        let set = record_set(vec![json!({"id": "1"}), json!({"id": "2", "permis": null})]);
        let fragment = flatten(&set, &FieldFlattenSpec::list("permis")).unwrap();
        assert_eq!(fragment.row_count(), 2);
        assert_eq!(fragment.column_count(), 0);
    }
}

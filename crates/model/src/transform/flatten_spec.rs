use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_SEPARATOR: &str = " - ";

/// How one nested field is expanded into flat columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "kebab-case")]
pub enum FlattenStrategy {
    /// Split a composite string into the named destination columns.
    SplitOnDelimiter {
        #[serde(default = "default_separator")]
        separator: String,
        new_fields: Vec<String>,
    },

    /// One column per sub-key of an embedded mapping.
    ///
    /// The column set is `keys` when declared, otherwise the union of the
    /// sub-keys seen across the batch, in first-seen order.
    ObjectToColumns {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        keys: Option<Vec<String>>,
        /// Columns are named `<prefix>_<key>` when set, `<key>` otherwise.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        prefix: Option<String>,
    },

    /// One column per list position, named `<field>_<index>`.
    ///
    /// Width is `max_items` when declared (longer lists are truncated),
    /// otherwise the longest list in the batch.
    ListToIndexedColumns {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_items: Option<usize>,
        /// For lists of objects, the sub-key whose value fills the cell.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        item_key: Option<String>,
    },
}

fn default_separator() -> String {
    DEFAULT_SEPARATOR.to_string()
}

/// Configuration entry describing how one nested field is flattened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldFlattenSpec {
    /// Dotted path of the field inside a record.
    pub path: String,

    #[serde(flatten)]
    pub strategy: FlattenStrategy,

    /// Generated column name -> final column name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub renames: BTreeMap<String, String>,

    /// Generated columns removed before renaming.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub drop: Vec<String>,
}

impl FieldFlattenSpec {
    pub fn split(path: &str, separator: &str, new_fields: &[&str]) -> Self {
        Self::with_strategy(
            path,
            FlattenStrategy::SplitOnDelimiter {
                separator: separator.to_string(),
                new_fields: new_fields.iter().map(|f| f.to_string()).collect(),
            },
        )
    }

    pub fn object(path: &str) -> Self {
        Self::with_strategy(
            path,
            FlattenStrategy::ObjectToColumns {
                keys: None,
                prefix: None,
            },
        )
    }

    pub fn list(path: &str) -> Self {
        Self::with_strategy(
            path,
            FlattenStrategy::ListToIndexedColumns {
                max_items: None,
                item_key: None,
            },
        )
    }

    pub fn with_strategy(path: &str, strategy: FlattenStrategy) -> Self {
        Self {
            path: path.to_string(),
            strategy,
            renames: BTreeMap::new(),
            drop: Vec::new(),
        }
    }

    pub fn rename(mut self, from: &str, to: &str) -> Self {
        self.renames.insert(from.to_string(), to.to_string());
        self
    }

    pub fn drop_columns(mut self, columns: &[&str]) -> Self {
        self.drop.extend(columns.iter().map(|c| c.to_string()));
        self
    }

    /// Caps a list strategy at `max_items` columns; no effect on other strategies.
    pub fn max_items(mut self, max: usize) -> Self {
        if let FlattenStrategy::ListToIndexedColumns { max_items, .. } = &mut self.strategy {
            *max_items = Some(max);
        }
        self
    }

    /// Projects `key` out of list-of-object items; no effect on other strategies.
    pub fn item_key(mut self, key: &str) -> Self {
        if let FlattenStrategy::ListToIndexedColumns { item_key, .. } = &mut self.strategy {
            *item_key = Some(key.to_string());
        }
        self
    }

    /// Name of the column generated for list position `index`.
    pub fn indexed_column(&self, index: usize) -> String {
        format!("{}_{index}", self.path.replace('.', "_"))
    }

    /// Whether a base-table column is an expansion of this spec's source field.
    pub fn covers_column(&self, column: &str) -> bool {
        column == self.path
            || column
                .strip_prefix(self.path.as_str())
                .is_some_and(|rest| rest.starts_with('.'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_from_config() {
        let raw = r#"[
            {"path": "lieuTravail.libelle", "strategy": "split-on-delimiter", "new_fields": ["departement", "ville"]},
            {"path": "salaire", "strategy": "object-to-columns", "renames": {"libelle": "salaire"}},
            {"path": "competences", "strategy": "list-to-indexed-columns", "max_items": 3, "item_key": "libelle"}
        ]"#;
        let specs: Vec<FieldFlattenSpec> = serde_json::from_str(raw).unwrap();

        assert_eq!(
            specs[0],
            FieldFlattenSpec::split("lieuTravail.libelle", " - ", &["departement", "ville"])
        );
        assert_eq!(specs[1], FieldFlattenSpec::object("salaire").rename("libelle", "salaire"));
        assert_eq!(
            specs[2],
            FieldFlattenSpec::list("competences").max_items(3).item_key("libelle")
        );
    }

    #[test]
    fn test_covers_column() {
        let spec = FieldFlattenSpec::object("salaire");
        assert!(spec.covers_column("salaire"));
        assert!(spec.covers_column("salaire.libelle"));
        assert!(!spec.covers_column("salaireBrut"));
        assert!(!spec.covers_column("entreprise.salaire"));
    }

    #[test]
    fn test_indexed_column_name() {
        let spec = FieldFlattenSpec::list("competences");
        assert_eq!(spec.indexed_column(2), "competences_2");
    }
}

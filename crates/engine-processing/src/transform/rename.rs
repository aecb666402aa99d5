use super::{error::TransformError, pipeline::Transform};
use model::records::table::FlatTable;
use std::collections::BTreeMap;
use tracing::debug;

/// Applies an explicit old-name -> new-name map to the columns of a table.
#[derive(Debug, Clone, Default)]
pub struct ColumnRenamer {
    renames: BTreeMap<String, String>,
}

impl ColumnRenamer {
    pub fn new(renames: BTreeMap<String, String>) -> Self {
        Self { renames }
    }
}

impl Transform for ColumnRenamer {
    fn apply(&self, table: FlatTable) -> Result<FlatTable, TransformError> {
        rename(table, &self.renames)
    }
}

/// Renames the mapped columns; names not in the map are left unchanged.
///
/// Fails with `DuplicateColumn` when a new name collides with another column
/// of the table, including another renamed one.
pub fn rename(
    table: FlatTable,
    renames: &BTreeMap<String, String>,
) -> Result<FlatTable, TransformError> {
    if renames.is_empty() {
        return Ok(table);
    }

    for source in renames.keys() {
        if !table.contains_column(source) {
            debug!("Rename source `{}` not present, skipping", source);
        }
    }

    table
        .rename_columns(|column| renames.get(column).cloned())
        .map_err(|e| TransformError::at_stage(e, "renaming"))
}

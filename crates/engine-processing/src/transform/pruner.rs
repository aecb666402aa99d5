use super::{error::TransformError, pipeline::Transform};
use model::records::table::FlatTable;
use std::collections::{BTreeSet, HashSet};
use tracing::debug;

/// Drops a fixed set of columns; names absent from the table are ignored.
#[derive(Debug, Clone, Default)]
pub struct ColumnPruner {
    columns: BTreeSet<String>,
}

impl ColumnPruner {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }
}

impl Transform for ColumnPruner {
    fn apply(&self, table: FlatTable) -> Result<FlatTable, TransformError> {
        Ok(prune(table, &self.columns))
    }
}

pub fn prune(mut table: FlatTable, columns: &BTreeSet<String>) -> FlatTable {
    let names: HashSet<&str> = columns.iter().map(String::as_str).collect();
    let removed = table.drop_columns(&names);
    if !removed.is_empty() {
        debug!("Pruned columns: {:?}", removed);
    }
    table
}

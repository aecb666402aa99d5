use super::error::TransformError;
use model::{
    core::{identifiers::RowId, value::Value},
    records::table::FlatTable,
};
use std::collections::{HashMap, HashSet};
use tracing::debug;

const STAGE: &str = "assembling";

/// Left-joins every fragment onto `base` by row id.
///
/// The base table decides the row population: each base row is kept, in base
/// order, and fragment rows without a matching base row are dropped. A column
/// name that appears twice across the base and fragments fails with
/// `DuplicateColumn`.
pub fn assemble(base: FlatTable, fragments: &[FlatTable]) -> Result<FlatTable, TransformError> {
    let mut seen: HashSet<&str> = base.columns().iter().map(String::as_str).collect();
    let mut columns = base.columns().to_vec();
    for fragment in fragments {
        for column in fragment.columns() {
            if !seen.insert(column.as_str()) {
                return Err(TransformError::DuplicateColumn {
                    column: column.clone(),
                    stage: STAGE,
                });
            }
            columns.push(column.clone());
        }
    }

    let base_ids: HashSet<&RowId> = base.row_ids().collect();
    let lookups: Vec<HashMap<&RowId, &[Value]>> = fragments
        .iter()
        .map(|fragment| {
            let lookup: HashMap<&RowId, &[Value]> = fragment
                .rows()
                .iter()
                .map(|row| (&row.id, row.cells.as_slice()))
                .collect();
            let unmatched = lookup
                .keys()
                .filter(|id| !base_ids.contains(*id))
                .count();
            if unmatched > 0 {
                debug!("Dropping {} fragment rows with no base row", unmatched);
            }
            lookup
        })
        .collect();

    let mut table = FlatTable::new(columns).map_err(|e| TransformError::at_stage(e, STAGE))?;
    for row in base.rows() {
        let mut cells = row.cells.clone();
        for (fragment, lookup) in fragments.iter().zip(&lookups) {
            match lookup.get(&row.id) {
                Some(values) => cells.extend_from_slice(values),
                None => cells.extend(std::iter::repeat_n(Value::Null, fragment.column_count())),
            }
        }
        table.push_row(row.id.clone(), cells)?;
    }

    debug!(
        "Assembled {} fragments into {} columns over {} rows",
        fragments.len(),
        table.column_count(),
        table.row_count()
    );
    Ok(table)
}

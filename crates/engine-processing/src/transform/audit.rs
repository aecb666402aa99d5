use model::{
    records::table::FlatTable,
    report::missingness::{ColumnMissingness, MissingnessReport},
};
use std::collections::BTreeSet;

/// Counts missing markers per column.
///
/// Only the missing marker counts as missing: lists and objects left in a
/// column are present values. A table without rows reports 0% everywhere.
pub fn audit(table: &FlatTable) -> MissingnessReport {
    let total_rows = table.row_count();
    let mut missing = vec![0usize; table.column_count()];
    for row in table.rows() {
        for (count, cell) in missing.iter_mut().zip(&row.cells) {
            if cell.is_missing() {
                *count += 1;
            }
        }
    }

    let columns = table
        .columns()
        .iter()
        .zip(missing)
        .map(|(column, missing)| ColumnMissingness {
            column: column.clone(),
            missing,
            present: total_rows - missing,
            missing_pct: if total_rows == 0 {
                0.0
            } else {
                missing as f64 / total_rows as f64 * 100.0
            },
        })
        .collect();

    MissingnessReport {
        total_rows,
        columns,
    }
}

/// Columns whose missing percentage is strictly above `threshold`.
pub fn detect_high_missingness(report: &MissingnessReport, threshold: f64) -> BTreeSet<String> {
    report
        .columns
        .iter()
        .filter(|c| c.missing_pct > threshold)
        .map(|c| c.column.clone())
        .collect()
}

#![allow(dead_code)]

use model::{core::value::Value, records::table::FlatTable, report::missingness::MissingnessReport};
use std::collections::HashSet;

pub fn column_names(table: &FlatTable) -> Vec<&str> {
    table.columns().iter().map(String::as_str).collect()
}

/// Number of cells of `column` holding a value.
pub fn non_missing_count(table: &FlatTable, column: &str) -> usize {
    table
        .column_values(column)
        .unwrap_or_else(|| panic!("column `{column}` not in table"))
        .filter(|v| !v.is_missing())
        .count()
}

pub fn cell<'a>(table: &'a FlatTable, id: &str, column: &str) -> &'a Value {
    table
        .value(id, column)
        .unwrap_or_else(|| panic!("no cell at ({id}, {column})"))
}

pub fn assert_row_count(table: &FlatTable, expected: usize) {
    assert_eq!(
        table.row_count(),
        expected,
        "Row count mismatch: expected {expected}, found {}",
        table.row_count()
    );
}

pub fn assert_all_missing(table: &FlatTable, id: &str) {
    let row = table
        .rows()
        .iter()
        .find(|r| r.id.as_str() == id)
        .unwrap_or_else(|| panic!("row `{id}` not in table"));
    assert!(
        row.cells.iter().all(Value::is_missing),
        "row `{id}` has values: {:?}",
        row.cells
    );
}

/// Each column of the report accounts for every row of the table.
pub fn assert_report_consistent(report: &MissingnessReport, table: &FlatTable) {
    assert_eq!(report.total_rows, table.row_count());
    assert_eq!(report.columns.len(), table.column_count());
    let mut seen = HashSet::new();
    for entry in &report.columns {
        assert!(seen.insert(entry.column.as_str()), "duplicate `{}`", entry.column);
        assert_eq!(entry.missing + entry.present, report.total_rows, "column `{}`", entry.column);
        assert!(entry.missing <= report.total_rows);
        assert!((0.0..=100.0).contains(&entry.missing_pct));
    }
}

use serde::{Deserialize, Serialize};

/// Missing-value statistics of one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMissingness {
    pub column: String,
    pub missing: usize,
    pub present: usize,
    /// `missing / total_rows * 100`, 0 for an empty table.
    pub missing_pct: f64,
}

/// Per-column missing-value audit of a flat table.
///
/// For every column `missing + present == total_rows`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MissingnessReport {
    pub total_rows: usize,
    pub columns: Vec<ColumnMissingness>,
}

impl MissingnessReport {
    pub fn get(&self, column: &str) -> Option<&ColumnMissingness> {
        self.columns.iter().find(|c| c.column == column)
    }

    /// Columns with the most missing values first; ties keep table order.
    pub fn sorted_by_missing(&self) -> Vec<&ColumnMissingness> {
        let mut sorted: Vec<&ColumnMissingness> = self.columns.iter().collect();
        sorted.sort_by(|a, b| b.missing.cmp(&a.missing));
        sorted
    }

    /// Number of missing cells across the whole table.
    pub fn total_missing(&self) -> usize {
        self.columns.iter().map(|c| c.missing).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

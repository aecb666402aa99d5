use crate::core::{identifiers::RowId, value::Value};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("Duplicate column `{0}`")]
    DuplicateColumn(String),

    #[error("Row `{row}` has {actual} cells but the table has {expected} columns")]
    RowWidth {
        row: String,
        expected: usize,
        actual: usize,
    },
}

/// One row of a flat table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlatRow {
    pub id: RowId,
    pub cells: Vec<Value>,
}

/// A rectangular table: ordered unique column names, one row per record.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlatTable {
    columns: Vec<String>,
    #[serde(skip)]
    positions: HashMap<String, usize>,
    rows: Vec<FlatRow>,
}

impl FlatTable {
    /// Creates an empty table with the given columns.
    pub fn new(columns: Vec<String>) -> Result<Self, TableError> {
        let mut positions = HashMap::with_capacity(columns.len());
        for (idx, name) in columns.iter().enumerate() {
            if positions.insert(name.clone(), idx).is_some() {
                return Err(TableError::DuplicateColumn(name.clone()));
            }
        }
        Ok(Self {
            columns,
            positions,
            rows: Vec::new(),
        })
    }

    pub fn push_row(&mut self, id: RowId, cells: Vec<Value>) -> Result<(), TableError> {
        if cells.len() != self.columns.len() {
            return Err(TableError::RowWidth {
                row: id.to_string(),
                expected: self.columns.len(),
                actual: cells.len(),
            });
        }
        self.rows.push(FlatRow { id, cells });
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[FlatRow] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    pub fn contains_column(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    pub fn row_ids(&self) -> impl Iterator<Item = &RowId> {
        self.rows.iter().map(|r| &r.id)
    }

    /// Value of `column` in the row identified by `id`.
    pub fn value(&self, id: &str, column: &str) -> Option<&Value> {
        let col = self.column_index(column)?;
        self.rows
            .iter()
            .find(|r| r.id.as_str() == id)
            .map(|r| &r.cells[col])
    }

    /// All values of one column, in row order.
    pub fn column_values(&self, column: &str) -> Option<impl Iterator<Item = &Value>> {
        let col = self.column_index(column)?;
        Some(self.rows.iter().map(move |r| &r.cells[col]))
    }

    /// Renames columns through `rename`, failing if two columns end up with the same name.
    pub fn rename_columns<F>(self, mut rename: F) -> Result<Self, TableError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let columns = self
            .columns
            .iter()
            .map(|c| rename(c).unwrap_or_else(|| c.clone()))
            .collect();
        let mut renamed = FlatTable::new(columns)?;
        renamed.rows = self.rows;
        Ok(renamed)
    }

    /// Removes the named columns that exist; unknown names are ignored.
    /// Returns the names that were actually removed, in table order.
    pub fn drop_columns(&mut self, names: &HashSet<&str>) -> Vec<String> {
        let keep: Vec<bool> = self
            .columns
            .iter()
            .map(|c| !names.contains(c.as_str()))
            .collect();
        if keep.iter().all(|k| *k) {
            return Vec::new();
        }

        let removed = self
            .columns
            .iter()
            .zip(&keep)
            .filter(|(_, k)| !**k)
            .map(|(c, _)| c.clone())
            .collect();

        self.columns = retain_by_mask(std::mem::take(&mut self.columns), &keep);
        for row in &mut self.rows {
            row.cells = retain_by_mask(std::mem::take(&mut row.cells), &keep);
        }
        self.reindex();
        removed
    }

    /// Projection onto the given columns, in the given order. Unknown names are skipped.
    pub fn select(&self, columns: &[&str]) -> Self {
        let picked: Vec<usize> = columns
            .iter()
            .filter_map(|c| self.column_index(c))
            .collect();

        let mut out = Self {
            columns: picked.iter().map(|i| self.columns[*i].clone()).collect(),
            positions: HashMap::new(),
            rows: self
                .rows
                .iter()
                .map(|r| FlatRow {
                    id: r.id.clone(),
                    cells: picked.iter().map(|i| r.cells[*i].clone()).collect(),
                })
                .collect(),
        };
        out.reindex();
        out
    }

    /// Rows that have a value in every one of `columns` (all columns when empty).
    ///
    /// A view for display; it intentionally changes the row population.
    pub fn without_missing(&self, columns: &[&str]) -> Self {
        let checked: Vec<usize> = if columns.is_empty() {
            (0..self.columns.len()).collect()
        } else {
            columns
                .iter()
                .filter_map(|c| self.column_index(c))
                .collect()
        };

        let mut out = self.clone();
        out.rows
            .retain(|r| checked.iter().all(|i| !r.cells[*i].is_missing()));
        out
    }

    fn reindex(&mut self) {
        self.positions = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();
    }
}

fn retain_by_mask<T>(items: Vec<T>, keep: &[bool]) -> Vec<T> {
    items
        .into_iter()
        .zip(keep)
        .filter(|(_, k)| **k)
        .map(|(item, _)| item)
        .collect()
}

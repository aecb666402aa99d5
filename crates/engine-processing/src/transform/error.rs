use model::records::{error::ResponseError, table::TableError};
use thiserror::Error;

pub(crate) const FLATTENING: &str = "flattening";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    /// The field path is absent from every record of the batch.
    #[error("Field `{path}` not found in any record")]
    FieldNotFound { path: String },

    #[error("Duplicate column `{column}` while {stage}")]
    DuplicateColumn { column: String, stage: &'static str },

    #[error(transparent)]
    MalformedResponse(#[from] ResponseError),

    #[error("Table error: {0}")]
    Table(TableError),
}

impl TransformError {
    /// Errors that only invalidate the fragment of one field.
    pub fn is_field_scoped(&self) -> bool {
        matches!(
            self,
            TransformError::FieldNotFound { .. }
                | TransformError::DuplicateColumn {
                    stage: FLATTENING,
                    ..
                }
        )
    }

    pub(crate) fn at_stage(err: TableError, stage: &'static str) -> Self {
        match err {
            TableError::DuplicateColumn(column) => TransformError::DuplicateColumn { column, stage },
            other => TransformError::Table(other),
        }
    }
}

impl From<TableError> for TransformError {
    fn from(err: TableError) -> Self {
        Self::at_stage(err, "building a table")
    }
}

use model::records::table::TableError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FileError {
    #[error("File not found: {0}")]
    NotFound(String),
    #[error("Invalid file format: {0}")]
    InvalidFormat(String),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("Cannot export {rows} rows without any column")]
    NoColumns { rows: usize },
    #[error("Invalid table: {0}")]
    Table(#[from] TableError),
}

use crate::file::csv::error::FileError;
use model::{
    core::{identifiers::RowId, value::Value},
    records::table::FlatTable,
};
use std::{fs::File, io, path::Path};

/// Parses CSV produced by the writer back into a table of text cells.
///
/// Empty fields become missing markers. Rows are identified by position.
pub fn read_table_from<R: io::Read>(reader: R) -> Result<FlatTable, FileError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader.headers()?.iter().map(str::to_string).collect();
    let mut table = FlatTable::new(headers)?;

    for (idx, record) in csv_reader.records().enumerate() {
        let record = record?;
        let cells = record
            .iter()
            .map(|field| {
                if field.is_empty() {
                    Value::Null
                } else {
                    Value::String(field.to_string())
                }
            })
            .collect();
        table.push_row(RowId::new(format!("row-{idx}")), cells)?;
    }

    Ok(table)
}

pub fn read_table(path: &Path) -> Result<FlatTable, FileError> {
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => FileError::NotFound(path.display().to_string()),
        _ => FileError::IoError(e),
    })?;
    read_table_from(io::BufReader::new(file))
}

use crate::file::csv::error::FileError;
use model::{core::value::Value, records::table::FlatTable};
use std::{fs::File, io, path::Path};
use tracing::info;

/// Writes `table` as UTF-8, comma-delimited CSV: a header row with the column
/// names, then one line per row. Missing values are empty fields.
///
/// A table without columns has no CSV form: it exports as an empty file when it
/// has no rows either, and fails with `NoColumns` otherwise.
pub fn write_table<W: io::Write>(table: &FlatTable, writer: W) -> Result<(), FileError> {
    if table.column_count() == 0 && table.row_count() > 0 {
        return Err(FileError::NoColumns {
            rows: table.row_count(),
        });
    }

    let mut csv_writer = csv::Writer::from_writer(writer);
    if table.column_count() > 0 {
        csv_writer.write_record(table.columns())?;
        for row in table.rows() {
            csv_writer.write_record(row.cells.iter().map(Value::to_csv_field))?;
        }
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn to_csv_bytes(table: &FlatTable) -> Result<Vec<u8>, FileError> {
    let mut buf = Vec::new();
    write_table(table, &mut buf)?;
    Ok(buf)
}

pub fn export_csv(table: &FlatTable, path: &Path) -> Result<(), FileError> {
    let file = File::create(path)?;
    write_table(table, io::BufWriter::new(file))?;
    info!(
        "Exported {} rows x {} columns to {}",
        table.row_count(),
        table.column_count(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_values_are_empty_fields() {
        let mut table = FlatTable::new(vec!["id".into(), "ville".into(), "langues".into()]).unwrap();
        table
            .push_row(
                "1".into(),
                vec!["1".into(), Value::Null, Value::Json(json!(["fr", "en"]))],
            )
            .unwrap();
        table
            .push_row("2".into(), vec!["2".into(), "Bordeaux, centre".into(), Value::Int(3)])
            .unwrap();

        let text = String::from_utf8(to_csv_bytes(&table).unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "id,ville,langues");
        assert_eq!(lines[1], r#"1,,"[""fr"",""en""]""#);
        assert_eq!(lines[2], r#"2,"Bordeaux, centre",3"#);
        assert!(!text.contains("nan") && !text.contains("None"));
    }

    #[test]
    fn test_rows_without_columns_are_not_dropped_silently() {
        let mut table = FlatTable::new(vec![]).unwrap();
        table.push_row("1".into(), vec![]).unwrap();
        table.push_row("2".into(), vec![]).unwrap();

        let err = to_csv_bytes(&table).unwrap_err();
        assert!(matches!(err, FileError::NoColumns { rows: 2 }));
        assert!(to_csv_bytes(&FlatTable::default()).unwrap().is_empty());
    }

    #[test]
    fn test_export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("offres.csv");
        let table = FlatTable::new(vec!["id".into()]).unwrap();

        export_csv(&table, &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "id\n");
    }
}

use crate::error::CliError;
use connectors::file::csv::writer::export_csv;
use engine_processing::search::SearchOutcome;
use model::{records::facet::Facet, report::missingness::MissingnessReport};
use std::path::Path;

pub fn write_report(report: &MissingnessReport, path: &Path) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Prints the run summary, then writes the requested files.
pub fn emit(
    outcome: &SearchOutcome,
    csv_path: Option<&Path>,
    report_path: Option<&Path>,
) -> Result<(), CliError> {
    print_summary(outcome);

    if let Some(path) = csv_path {
        export_csv(&outcome.table, path)?;
        println!("Table exported to {}", path.display());
    }
    if let Some(path) = report_path {
        write_report(&outcome.report, path)?;
        println!("Missing-data report written to {}", path.display());
    }
    Ok(())
}

pub fn print_summary(outcome: &SearchOutcome) {
    println!("Total number of job offers: {}", outcome.max_results);
    println!(
        "Table: {} rows x {} columns",
        outcome.table.row_count(),
        outcome.table.column_count()
    );

    for skipped in &outcome.skipped {
        println!("Skipped field {}: {}", skipped.path, skipped.reason);
    }
    if !outcome.dropped.is_empty() {
        println!("Dropped columns: {}", outcome.dropped.join(", "));
    }

    println!();
    print_missingness(&outcome.report);
}

pub fn print_missingness(report: &MissingnessReport) {
    let width = report
        .columns
        .iter()
        .map(|c| c.column.len())
        .max()
        .unwrap_or(6)
        .max(6);

    println!(
        "{:<width$} {:>8} {:>8} {:>9}",
        "Column", "Missing", "Present", "Missing %"
    );
    println!("{}", "-".repeat(width + 28));
    for entry in report.sorted_by_missing() {
        println!(
            "{:<width$} {:>8} {:>8} {:>8.2}%",
            entry.column, entry.missing, entry.present, entry.missing_pct
        );
    }
}

pub fn print_facets(facets: &[Facet]) {
    for facet in facets {
        println!("{} ({} offers)", facet.name, facet.total());
        for value in &facet.values {
            println!("  {:<40} {:>8}", value.value, value.count);
        }
    }
}

use crate::transform::{
    assemble::assemble,
    audit::{audit, detect_high_missingness},
    error::TransformError,
    flatten::flatten,
    normalize::normalize,
    pipeline::{Transform, TransformPipeline, TransformPipelineExt},
    pruner::ColumnPruner,
    rename::ColumnRenamer,
};
use engine_config::settings::pipeline::PipelineSettings;
use model::{
    records::{facet::Facet, record_set::RecordSet, table::FlatTable},
    report::missingness::MissingnessReport,
    transform::flatten_spec::FieldFlattenSpec,
};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::collections::{BTreeSet, HashSet};
use tracing::{info, warn};

/// A flatten spec whose fragment was left out of the assembled table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedField {
    pub path: String,
    pub reason: String,
}

/// Everything one pipeline run hands back to the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    /// Final table after pruning.
    pub table: FlatTable,
    /// Audit of the assembled table, taken before any column was pruned.
    pub report: MissingnessReport,
    /// Columns above the missing-data threshold.
    pub high_missingness: BTreeSet<String>,
    /// Columns actually removed from the assembled table, in table order.
    pub dropped: Vec<String>,
    pub skipped: Vec<SkippedField>,
    pub max_results: u64,
    pub facets: Vec<Facet>,
}

/// Turns a raw search response into a flat table and its missing-data report.
///
/// Steps: extract the record set, normalize it into the base table, build one
/// fragment per flatten spec (flatten, drop sub-columns, rename), left-join the
/// fragments onto the base table, audit, then prune the columns above the
/// threshold and the explicit drop list.
#[derive(Debug, Clone)]
pub struct SearchResultPipeline {
    specs: Vec<FieldFlattenSpec>,
    missing_threshold: Option<f64>,
    id_field: String,
    drop_columns: Vec<String>,
}

impl SearchResultPipeline {
    pub fn new(specs: Vec<FieldFlattenSpec>, missing_threshold: Option<f64>) -> Self {
        Self {
            specs,
            missing_threshold,
            id_field: "id".to_string(),
            drop_columns: Vec::new(),
        }
    }

    pub fn from_settings(settings: &PipelineSettings) -> Self {
        Self::new(settings.flatten.clone(), settings.missing_threshold)
            .with_id_field(&settings.id_field)
            .with_drop_columns(settings.drop_columns.clone())
    }

    pub fn with_id_field(mut self, id_field: &str) -> Self {
        self.id_field = id_field.to_string();
        self
    }

    pub fn with_drop_columns(mut self, columns: Vec<String>) -> Self {
        self.drop_columns = columns;
        self
    }

    pub fn with_threshold(mut self, threshold: Option<f64>) -> Self {
        self.missing_threshold = threshold;
        self
    }

    pub fn specs(&self) -> &[FieldFlattenSpec] {
        &self.specs
    }

    pub fn missing_threshold(&self) -> Option<f64> {
        self.missing_threshold
    }

    /// Runs the pipeline over a raw response.
    ///
    /// A response lacking `resultats`, `filtresPossibles` or `Content-Range`
    /// fails before any table is built.
    pub fn run(&self, raw: &JsonValue) -> Result<SearchOutcome, TransformError> {
        let records = RecordSet::from_response(raw, &self.id_field)?;
        info!(
            "Extracted {} records out of {} matching offers",
            records.len(),
            records.max_results()
        );
        self.run_records(&records)
    }

    pub fn run_records(&self, records: &RecordSet) -> Result<SearchOutcome, TransformError> {
        let mut skipped = Vec::new();
        let mut fragments = Vec::with_capacity(self.specs.len());

        for spec in &self.specs {
            match self.fragment(records, spec) {
                Ok(fragment) => fragments.push(fragment),
                Err(err) if err.is_field_scoped() => {
                    warn!("Skipping field `{}`: {}", spec.path, err);
                    skipped.push(SkippedField {
                        path: spec.path.clone(),
                        reason: err.to_string(),
                    });
                }
                Err(err) => return Err(err),
            }
        }

        // The source columns of every flattened field are replaced by its fragment.
        let base = normalize(records)?;
        let covered: Vec<String> = base
            .columns()
            .iter()
            .filter(|c| self.specs.iter().any(|s| s.covers_column(c)))
            .cloned()
            .collect();
        let base = ColumnPruner::new(covered).apply(base)?;

        let assembled = assemble(base, &fragments)?;
        let report = audit(&assembled);
        let high_missingness = self
            .missing_threshold
            .map(|t| detect_high_missingness(&report, t))
            .unwrap_or_default();

        let before: Vec<String> = assembled.columns().to_vec();
        let table = TransformPipeline::new()
            .add_if(!high_missingness.is_empty(), || {
                ColumnPruner::new(high_missingness.iter().cloned())
            })
            .add_if(!self.drop_columns.is_empty(), || {
                ColumnPruner::new(self.drop_columns.iter().cloned())
            })
            .apply(assembled)?;

        let kept: HashSet<&str> = table.columns().iter().map(String::as_str).collect();
        let dropped: Vec<String> = before
            .into_iter()
            .filter(|c| !kept.contains(c.as_str()))
            .collect();

        info!(
            "Pipeline produced {} rows x {} columns ({} pruned, {} fields skipped)",
            table.row_count(),
            table.column_count(),
            dropped.len(),
            skipped.len()
        );

        Ok(SearchOutcome {
            table,
            report,
            high_missingness,
            dropped,
            skipped,
            max_results: records.max_results(),
            facets: records.facets().to_vec(),
        })
    }

    fn fragment(
        &self,
        records: &RecordSet,
        spec: &FieldFlattenSpec,
    ) -> Result<FlatTable, TransformError> {
        let fragment = flatten(records, spec)?;
        TransformPipeline::new()
            .add_if(!spec.drop.is_empty(), || ColumnPruner::new(spec.drop.iter().cloned()))
            .add_if(!spec.renames.is_empty(), || {
                ColumnRenamer::new(spec.renames.clone())
            })
            .apply(fragment)
    }
}

/// One-shot form of [`SearchResultPipeline::run`] returning the final table and
/// the pre-prune report.
pub fn run(
    raw: &JsonValue,
    specs: &[FieldFlattenSpec],
    missing_threshold: Option<f64>,
) -> Result<(FlatTable, MissingnessReport), TransformError> {
    let outcome = SearchResultPipeline::new(specs.to_vec(), missing_threshold).run(raw)?;
    Ok((outcome.table, outcome.report))
}

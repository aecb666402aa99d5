use crate::transform::error::TransformError;
use model::{
    core::value::Value,
    records::{facet::Facet, table::FlatTable},
};

pub const FACET_COLUMNS: [&str; 3] = ["filtre", "valeur_possible", "nb_resultats"];

/// Facet dimensions offered for charting.
pub const CHART_FACETS: [&str; 4] = ["typeContrat", "experience", "qualification", "natureContrat"];

/// One row per (facet, value) pair, with columns `filtre`, `valeur_possible`,
/// `nb_resultats`. Row ids are `<filtre>/<valeur_possible>`.
pub fn facets_to_table(facets: &[Facet]) -> Result<FlatTable, TransformError> {
    let mut table = FlatTable::new(FACET_COLUMNS.iter().map(|c| c.to_string()).collect())?;
    for facet in facets {
        for value in &facet.values {
            table.push_row(
                format!("{}/{}", facet.name, value.value).into(),
                vec![
                    Value::from(facet.name.as_str()),
                    Value::from(value.value.as_str()),
                    Value::Uint(value.count),
                ],
            )?;
        }
    }
    Ok(table)
}

pub fn facet_by_name<'a>(facets: &'a [Facet], name: &str) -> Option<&'a Facet> {
    facets.iter().find(|f| f.name == name)
}

use crate::error::SettingsError;
use model::transform::flatten_spec::{FieldFlattenSpec, FlattenStrategy};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// What the normalization pipeline flattens, drops and prunes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Record field holding the offer id, used as row identity.
    pub id_field: String,

    /// Flatten specs, applied in order.
    pub flatten: Vec<FieldFlattenSpec>,

    /// Columns removed from the assembled table after the threshold prune.
    pub drop_columns: Vec<String>,

    /// Columns missing in more than this percentage of rows are pruned.
    /// `None` disables the prune.
    pub missing_threshold: Option<f64>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            id_field: "id".to_string(),
            flatten: default_flatten_specs(),
            drop_columns: DEFAULT_DROP_COLUMNS.iter().map(|c| c.to_string()).collect(),
            missing_threshold: None,
        }
    }
}

/// Low-value columns of a job offer.
const DEFAULT_DROP_COLUMNS: &[&str] = &[
    "experienceCommentaire",
    "deplacementCode",
    "deplacementLibelle",
    "complementExercice",
    "agence.courriel",
    "complement2",
    "coordonnees2",
    "coordonnees3",
    "telephone",
    "courriel",
];

/// Field policy table of a job-offer search response.
pub fn default_flatten_specs() -> Vec<FieldFlattenSpec> {
    vec![
        FieldFlattenSpec::split("lieuTravail.libelle", " - ", &["departement", "ville"]),
        FieldFlattenSpec::object("entreprise")
            .rename("nom", "nomEntreprise")
            .rename("description", "descriptionEntreprise")
            .drop_columns(&["logo", "url"]),
        FieldFlattenSpec::object("salaire")
            .rename("libelle", "salaire")
            .drop_columns(&["commentaire", "complement1"]),
        FieldFlattenSpec::object("contact")
            .rename("nom", "nomContact")
            .drop_columns(&["coordonnees1", "urlPostulation", "commentaire"]),
        FieldFlattenSpec::object("origineOffre").rename("origine", "origineOffre"),
        FieldFlattenSpec::list("qualitesProfessionnelles").item_key("libelle"),
        FieldFlattenSpec::list("competences")
            .max_items(3)
            .item_key("libelle"),
        FieldFlattenSpec::list("permis").item_key("libelle"),
        FieldFlattenSpec::list("formations").item_key("domaineLibelle"),
        FieldFlattenSpec::list("langues").item_key("libelle"),
    ]
}

impl PipelineSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if let Some(threshold) = self.missing_threshold {
            if !(0.0..=100.0).contains(&threshold) {
                return Err(SettingsError::InvalidThreshold(threshold));
            }
        }

        let mut paths = HashSet::new();
        for (idx, spec) in self.flatten.iter().enumerate() {
            if spec.path.trim().is_empty() {
                return Err(SettingsError::EmptyPath(idx));
            }
            if !paths.insert(spec.path.as_str()) {
                return Err(SettingsError::DuplicatePath(spec.path.clone()));
            }
            if let FlattenStrategy::SplitOnDelimiter {
                separator,
                new_fields,
            } = &spec.strategy
            {
                if separator.is_empty() {
                    return Err(SettingsError::MissingSeparator(spec.path.clone()));
                }
                if new_fields.is_empty() {
                    return Err(SettingsError::NoDestinationFields(spec.path.clone()));
                }
            }
        }

        Ok(())
    }

    /// Overrides the threshold, keeping validation.
    pub fn with_threshold(mut self, threshold: Option<f64>) -> Result<Self, SettingsError> {
        self.missing_threshold = threshold;
        self.validate()?;
        Ok(self)
    }
}

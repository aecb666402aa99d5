use crate::error::ApiError;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Wire format of creation-date bounds.
pub const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Query parameters of one search call, passed through to the data source.
///
/// Serializes to the query-string names the search endpoint expects; unset
/// parameters are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParams {
    #[serde(rename = "motsCles", skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub departement: Option<String>,

    #[serde(rename = "typeContrat", skip_serializing_if = "Option::is_none")]
    pub contract_type: Option<String>,

    #[serde(
        rename = "minCreationDate",
        with = "iso_seconds",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub min_creation_date: Option<DateTime<Utc>>,

    #[serde(
        rename = "maxCreationDate",
        with = "iso_seconds",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub max_creation_date: Option<DateTime<Utc>>,

    #[serde(
        rename = "qualitesProfessionnelles",
        skip_serializing_if = "Option::is_none"
    )]
    pub professional_qualities: Option<String>,

    /// Result window, `<first>-<last>` (e.g. `0-149`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
}

impl SearchParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keywords(mut self, keywords: &str) -> Self {
        self.keywords = Some(keywords.to_string());
        self
    }

    pub fn departement(mut self, code: &str) -> Self {
        self.departement = Some(code.to_string());
        self
    }

    pub fn contract_type(mut self, code: &str) -> Self {
        self.contract_type = Some(code.to_string());
        self
    }

    pub fn created_between(mut self, min: DateTime<Utc>, max: DateTime<Utc>) -> Self {
        self.min_creation_date = Some(min);
        self.max_creation_date = Some(max);
        self
    }

    pub fn professional_qualities(mut self, qualities: &str) -> Self {
        self.professional_qualities = Some(qualities.to_string());
        self
    }

    pub fn range(mut self, range: &str) -> Self {
        self.range = Some(range.to_string());
        self
    }

    /// Checks the constraints the search endpoint enforces.
    ///
    /// Creation dates come as a pair spanning at least one day; a range is
    /// `<first>-<last>` with `first <= last`.
    pub fn validate(&self) -> Result<(), ApiError> {
        match (self.min_creation_date, self.max_creation_date) {
            (Some(min), Some(max)) => {
                if max - min < Duration::days(1) {
                    return Err(ApiError::InvalidParams(
                        "the creation date window must span at least one day".to_string(),
                    ));
                }
            }
            (None, None) => {}
            _ => {
                return Err(ApiError::InvalidParams(
                    "minCreationDate and maxCreationDate must be given together".to_string(),
                ));
            }
        }

        if let Some(range) = &self.range {
            let bounds = range
                .split_once('-')
                .and_then(|(a, b)| Some((a.trim().parse::<u64>().ok()?, b.trim().parse::<u64>().ok()?)));
            match bounds {
                Some((first, last)) if first <= last => {}
                _ => {
                    return Err(ApiError::InvalidParams(format!(
                        "range `{range}` is not `<first>-<last>`"
                    )));
                }
            }
        }

        Ok(())
    }

    /// Stable digest of the parameters, used as a cache key.
    pub fn cache_key(&self) -> Result<String, ApiError> {
        let bytes =
            serde_json::to_vec(self).map_err(|e| ApiError::InvalidParams(e.to_string()))?;
        Ok(blake3::hash(&bytes).to_hex().to_string())
    }
}

/// Parses a date given as `YYYY-MM-DD` or in the wire format.
pub fn parse_date(raw: &str) -> Result<DateTime<Utc>, ApiError> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| ApiError::InvalidParams(format!("`{raw}` is not a date")))
}

mod iso_seconds {
    use super::DATE_FORMAT;
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_str(&dt.format(DATE_FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| {
                NaiveDateTime::parse_from_str(&raw, DATE_FORMAT)
                    .map(|dt| dt.and_utc())
                    .map_err(D::Error::custom)
            })
            .transpose()
    }
}

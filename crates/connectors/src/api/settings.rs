use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_TOKEN_URL: &str =
    "https://entreprise.francetravail.fr/connexion/oauth2/access_token?realm=%2Fpartenaire";
pub const DEFAULT_SEARCH_URL: &str =
    "https://api.francetravail.io/partenaire/offresdemploi/v2/offres/search";
pub const DEFAULT_SCOPE: &str = "api_offresdemploiv2 o2dsoffre";

/// Endpoints and limits of the job-offer search API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub token_url: String,
    pub search_url: String,
    pub scope: String,
    /// Upper bound on one HTTP call.
    pub timeout_secs: u64,
    /// How long a cached search payload stays valid.
    pub cache_ttl_secs: u64,
    /// Attempts per search, the first one included.
    pub max_attempts: usize,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            token_url: DEFAULT_TOKEN_URL.to_string(),
            search_url: DEFAULT_SEARCH_URL.to_string(),
            scope: DEFAULT_SCOPE.to_string(),
            timeout_secs: 30,
            cache_ttl_secs: 900,
            max_attempts: 3,
        }
    }
}

impl ApiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

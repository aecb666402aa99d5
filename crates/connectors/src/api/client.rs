use crate::{
    api::{
        auth::{AccessToken, Credentials, request_token},
        params::SearchParams,
        settings::ApiSettings,
        source::SearchSource,
    },
    error::{ApiError, SearchFailure},
};
use async_trait::async_trait;
use model::records::record_set::{CONTENT_RANGE_KEY, ContentRange, FACETS_KEY, RESULTS_KEY};
use reqwest::{StatusCode, header::CONTENT_RANGE};
use serde_json::{Value as JsonValue, json};
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Authenticated session with the job-offer search API.
///
/// The token is requested on the first search, refreshed when it expires and
/// dropped by `logout`. Nothing is shared outside the session object.
pub struct ApiSession {
    client: reqwest::Client,
    settings: ApiSettings,
    credentials: Credentials,
    token: Mutex<Option<AccessToken>>,
}

impl ApiSession {
    pub fn new(settings: ApiSettings, credentials: Credentials) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout())
            .build()
            .map_err(|e| SearchFailure::Transport(e.to_string()))?;
        Ok(Self {
            client,
            settings,
            credentials,
            token: Mutex::new(None),
        })
    }

    pub fn settings(&self) -> &ApiSettings {
        &self.settings
    }

    pub async fn is_authenticated(&self) -> bool {
        self.token
            .lock()
            .await
            .as_ref()
            .is_some_and(|t| !t.is_expired(Instant::now()))
    }

    async fn bearer(&self) -> Result<String, ApiError> {
        let mut token = self.token.lock().await;
        match token.as_ref() {
            Some(current) if !current.is_expired(Instant::now()) => Ok(current.value().to_string()),
            _ => {
                let fresh =
                    request_token(&self.client, &self.settings, &self.credentials).await?;
                info!("Authenticated against the search API");
                let value = fresh.value().to_string();
                *token = Some(fresh);
                Ok(value)
            }
        }
    }

    fn failure(&self, err: reqwest::Error) -> SearchFailure {
        if err.is_timeout() {
            SearchFailure::Timeout(self.settings.timeout())
        } else {
            SearchFailure::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl SearchSource for ApiSession {
    async fn search(&self, params: &SearchParams) -> Result<JsonValue, ApiError> {
        params.validate()?;
        let bearer = self.bearer().await?;

        debug!("GET {} with {:?}", self.settings.search_url, params);
        let response = self
            .client
            .get(&self.settings.search_url)
            .bearer_auth(bearer)
            .query(params)
            .send()
            .await
            .map_err(|e| self.failure(e))?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            info!("Search matched no offers");
            return Ok(empty_payload());
        }
        if !status.is_success() {
            if status == StatusCode::UNAUTHORIZED {
                // Force a new token on the next attempt.
                *self.token.lock().await = None;
            }
            let body = response.text().await.unwrap_or_default();
            return Err(SearchFailure::Status {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let range = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range);

        let mut payload: JsonValue = response
            .json()
            .await
            .map_err(|e| SearchFailure::Body(e.to_string()))?;

        match (range, payload.as_object_mut()) {
            (Some(range), Some(obj)) => {
                obj.insert(CONTENT_RANGE_KEY.to_string(), content_range_json(range));
            }
            (None, _) => warn!("Search response carries no Content-Range header"),
            (Some(_), None) => {
                return Err(SearchFailure::Body("payload is not a JSON object".to_string()).into());
            }
        }

        Ok(payload)
    }

    async fn logout(&self) {
        if self.token.lock().await.take().is_some() {
            info!("Logged out of the search API");
        }
    }
}

/// Parses a `Content-Range` header such as `offres 0-149/1234`.
pub fn parse_content_range(header: &str) -> Option<ContentRange> {
    let spec = header.trim();
    let spec = spec.split_once(' ').map_or(spec, |(_, rest)| rest.trim());
    let (window, total) = spec.split_once('/')?;
    let max_results = total.trim().parse().ok()?;
    let (first, last) = window.split_once('-')?;
    Some(ContentRange {
        first_index: first.trim().parse().ok(),
        last_index: last.trim().parse().ok(),
        max_results,
    })
}

fn content_range_json(range: ContentRange) -> JsonValue {
    serde_json::to_value(range).unwrap_or_else(|_| json!({"max_results": range.max_results}))
}

/// Payload standing for a search that matched nothing.
pub fn empty_payload() -> JsonValue {
    json!({
        RESULTS_KEY: [],
        FACETS_KEY: [],
        CONTENT_RANGE_KEY: {"max_results": 0},
    })
}

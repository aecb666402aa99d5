use crate::{api::settings::ApiSettings, error::ApiError};
use serde::Deserialize;
use std::{
    fmt,
    time::{Duration, Instant},
};
use tracing::debug;

/// A token is refreshed this long before its announced expiry.
const EXPIRY_MARGIN: Duration = Duration::from_secs(30);

/// Client credentials of the search API.
#[derive(Clone)]
pub struct Credentials {
    client_id: String,
    client_secret: String,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

/// A bearer token and the instant it stops being usable.
#[derive(Debug, Clone)]
pub struct AccessToken {
    value: String,
    expires_at: Instant,
}

impl AccessToken {
    pub fn new(value: impl Into<String>, lifetime: Duration, now: Instant) -> Self {
        Self {
            value: value.into(),
            expires_at: now + lifetime.saturating_sub(EXPIRY_MARGIN),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// OAuth2 client-credentials exchange against the token endpoint.
pub async fn request_token(
    client: &reqwest::Client,
    settings: &ApiSettings,
    credentials: &Credentials,
) -> Result<AccessToken, ApiError> {
    debug!("Requesting access token for client `{}`", credentials.client_id);

    let form = [
        ("grant_type", "client_credentials"),
        ("client_id", credentials.client_id.as_str()),
        ("client_secret", credentials.client_secret.as_str()),
        ("scope", settings.scope.as_str()),
    ];
    let response = client
        .post(&settings.token_url)
        .form(&form)
        .send()
        .await
        .map_err(|e| ApiError::Auth(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::Auth(format!(
            "token endpoint answered {status}: {body}"
        )));
    }

    let token: TokenResponse = response
        .json()
        .await
        .map_err(|e| ApiError::Auth(format!("unreadable token response: {e}")))?;

    Ok(AccessToken::new(
        token.access_token,
        Duration::from_secs(token.expires_in),
        Instant::now(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_expires_before_announced_lifetime() {
        let now = Instant::now();
        let token = AccessToken::new("abc", Duration::from_secs(1499), now);
        assert!(!token.is_expired(now));
        assert!(!token.is_expired(now + Duration::from_secs(1400)));
        assert!(token.is_expired(now + Duration::from_secs(1470)));
    }

    #[test]
    fn test_short_lived_token_is_expired_at_once() {
        let now = Instant::now();
        let token = AccessToken::new("abc", Duration::from_secs(10), now);
        assert!(token.is_expired(now));
    }

    #[test]
    fn test_debug_hides_secret() {
        let creds = Credentials::new("id", "s3cret");
        assert!(!format!("{creds:?}").contains("s3cret"));
    }
}

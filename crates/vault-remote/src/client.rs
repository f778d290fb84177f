//! HTTP client and configuration for the remote store.
//!
//! The remote store exposes a table-like query API under `/rest/v1/` and an
//! auth API under `/auth/v1/`. Every request carries the project `apikey`
//! header; requests on behalf of a signed-in user additionally carry a
//! bearer token obtained from the injected [`SessionProvider`].
//!
//! Status-to-error mapping lives here, in one place, so every repository
//! call surfaces the same taxonomy: transport failures, auth failures,
//! not-found, and remote validation messages.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::warn;

use vault_core::defaults::{
    ENV_REMOTE_API_KEY, ENV_REMOTE_TIMEOUT_SECS, ENV_REMOTE_URL, REMOTE_TIMEOUT_SECS,
};
use vault_core::{AuthUser, Error, Result, SessionProvider};

/// Configuration for the remote store connection.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Project base URL, e.g. `https://abc123.example.co`.
    pub base_url: String,
    /// Project API key, sent as the `apikey` header on every request.
    pub api_key: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl RemoteConfig {
    /// Create a configuration with the default timeout.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(REMOTE_TIMEOUT_SECS),
        }
    }

    /// Set the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Create from environment variables.
    ///
    /// | Variable | Meaning |
    /// |----------|---------|
    /// | `VAULT_REMOTE_URL` | Project base URL (required) |
    /// | `VAULT_REMOTE_API_KEY` | Project API key (required) |
    /// | `VAULT_REMOTE_TIMEOUT_SECS` | Request timeout override |
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var(ENV_REMOTE_URL)
            .map_err(|_| Error::Config(format!("{} is not set", ENV_REMOTE_URL)))?;
        let api_key = std::env::var(ENV_REMOTE_API_KEY)
            .map_err(|_| Error::Config(format!("{} is not set", ENV_REMOTE_API_KEY)))?;
        let timeout = std::env::var(ENV_REMOTE_TIMEOUT_SECS)
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(REMOTE_TIMEOUT_SECS);

        Ok(Self::new(base_url, api_key).timeout(Duration::from_secs(timeout)))
    }
}

/// Shared HTTP client for the remote store's query API.
#[derive(Clone)]
pub struct RemoteClient {
    http: Client,
    config: RemoteConfig,
    session: Arc<dyn SessionProvider>,
}

impl RemoteClient {
    /// Create a new client with the given configuration and session source.
    pub fn new(config: RemoteConfig, session: Arc<dyn SessionProvider>) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            config,
            session,
        })
    }

    /// The injected session provider.
    pub fn session(&self) -> &Arc<dyn SessionProvider> {
        &self.session
    }

    /// URL for a query-API resource, e.g. `recipes` or `rpc/list_user_tags`.
    pub(crate) fn rest_url(&self, resource: &str) -> String {
        format!(
            "{}/rest/v1/{}",
            self.config.base_url.trim_end_matches('/'),
            resource
        )
    }

    /// The authenticated user, or [`Error::Unauthorized`].
    pub(crate) async fn require_user(&self) -> Result<AuthUser> {
        self.session
            .current_user()
            .await
            .ok_or_else(|| Error::Unauthorized("User not authenticated".to_string()))
    }

    /// Build a request with the `apikey` header and, when a session token
    /// exists, the bearer authorization header.
    pub(crate) async fn request(&self, method: Method, url: String) -> RequestBuilder {
        let mut builder = self
            .http
            .request(method, url)
            .header("apikey", &self.config.api_key);

        if let Some(token) = self.session.access_token().await {
            builder = builder.bearer_auth(token);
        }

        builder
    }

    /// Check a response's status, converting failures into the error
    /// taxonomy. The response body is consumed on failure.
    pub(crate) async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = extract_remote_message(&body);
        warn!(status = status.as_u16(), error = %message, "remote store request failed");

        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::Unauthorized(
                if message.is_empty() {
                    "Not authenticated".to_string()
                } else {
                    message
                },
            ),
            StatusCode::NOT_FOUND => Error::NotFound(message),
            s if s.is_client_error() => Error::Validation(message),
            s => Error::Request(format!("remote store returned {}: {}", s, message)),
        })
    }

    /// Deserialize a successful response body.
    pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| Error::Serialization(format!("failed to parse remote response: {}", e)))
    }
}

/// Pull the human-readable message out of a query-API error body.
///
/// The store reports errors as `{"message": "...", ...}`; anything else is
/// passed through trimmed.
fn extract_remote_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(message) = value.get("message").and_then(|m| m.as_str()) {
            return message.to_string();
        }
    }
    body.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = RemoteConfig::new("https://example.co", "key");
        assert_eq!(config.timeout, Duration::from_secs(REMOTE_TIMEOUT_SECS));
    }

    #[test]
    fn test_config_timeout_builder() {
        let config = RemoteConfig::new("https://example.co", "key").timeout(Duration::from_secs(5));
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_extract_remote_message_json() {
        let body = r#"{"code":"23505","message":"duplicate key value"}"#;
        assert_eq!(extract_remote_message(body), "duplicate key value");
    }

    #[test]
    fn test_extract_remote_message_plain() {
        assert_eq!(extract_remote_message("  upstream timeout \n"), "upstream timeout");
    }

    #[test]
    fn test_rest_url_trims_trailing_slash() {
        let session = Arc::new(vault_core::StaticSession::anonymous());
        let client =
            RemoteClient::new(RemoteConfig::new("https://example.co/", "key"), session).unwrap();
        assert_eq!(
            client.rest_url("recipes"),
            "https://example.co/rest/v1/recipes"
        );
    }
}

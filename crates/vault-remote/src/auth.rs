//! Auth API client and remote-backed session provider.
//!
//! Wraps the remote store's auth endpoints (`/auth/v1/`): sign-up, password
//! sign-in, token refresh, and sign-out. Successful calls update the shared
//! session state and emit [`SessionEvent`]s so gating logic (migration
//! trigger, UI routing) can react without polling.
//!
//! Auth failures are mapped to the user-facing message table before they
//! leave this module — callers display [`Error::user_message`] directly.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, RwLock};
use tracing::{info, instrument, warn};

use vault_core::{AuthUser, Error, Result, SessionBus, SessionEvent, SessionProvider};

use crate::client::RemoteConfig;

/// In-memory session: the signed-in user plus the tokens backing it.
#[derive(Debug, Clone)]
struct SessionState {
    user: AuthUser,
    access_token: String,
    refresh_token: Option<String>,
}

/// Auth client and [`SessionProvider`] backed by the remote auth API.
pub struct RemoteAuth {
    http: Client,
    config: RemoteConfig,
    state: RwLock<Option<SessionState>>,
    bus: SessionBus,
}

#[derive(Serialize)]
struct CredentialsPayload<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct UserPayload {
    id: uuid::Uuid,
    email: String,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<UserPayload> for AuthUser {
    fn from(payload: UserPayload) -> Self {
        AuthUser {
            id: payload.id,
            email: payload.email,
            created_at: payload.created_at,
        }
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    user: UserPayload,
}

#[derive(Deserialize)]
struct AuthErrorBody {
    #[serde(alias = "msg", alias = "error_description", default)]
    message: String,
}

impl RemoteAuth {
    /// Create a new auth client. No session exists until sign-in.
    pub fn new(config: RemoteConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            config,
            state: RwLock::new(None),
            bus: SessionBus::default(),
        })
    }

    fn auth_url(&self, path: &str) -> String {
        format!(
            "{}/auth/v1/{}",
            self.config.base_url.trim_end_matches('/'),
            path
        )
    }

    /// Register a new user. The account may require email confirmation
    /// before it can sign in; no session is established here.
    #[instrument(skip(self, password), fields(subsystem = "auth", component = "session", op = "sign_up"))]
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser> {
        let response = self
            .http
            .post(self.auth_url("signup"))
            .header("apikey", &self.config.api_key)
            .json(&CredentialsPayload { email, password })
            .send()
            .await?;

        let response = Self::check_auth(response).await?;
        let payload: UserPayload = response
            .json()
            .await
            .map_err(|e| Error::Serialization(format!("failed to parse signup response: {}", e)))?;

        info!(user_id = %payload.id, "user signed up");
        Ok(payload.into())
    }

    /// Sign in with email and password. On success the session state is
    /// replaced and a [`SessionEvent::SignedIn`] is emitted.
    #[instrument(skip(self, password), fields(subsystem = "auth", component = "session", op = "sign_in"))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser> {
        let response = self
            .http
            .post(self.auth_url("token"))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.config.api_key)
            .json(&CredentialsPayload { email, password })
            .send()
            .await?;

        let response = Self::check_auth(response).await?;
        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| Error::Serialization(format!("failed to parse token response: {}", e)))?;

        let user: AuthUser = token.user.into();
        *self.state.write().await = Some(SessionState {
            user: user.clone(),
            access_token: token.access_token,
            refresh_token: token.refresh_token,
        });

        info!(user_id = %user.id, "user signed in");
        self.bus.emit(SessionEvent::SignedIn { user: user.clone() });
        Ok(user)
    }

    /// Exchange the stored refresh token for a fresh access token and emit
    /// [`SessionEvent::TokenRefreshed`].
    #[instrument(skip(self), fields(subsystem = "auth", component = "session", op = "refresh"))]
    pub async fn refresh(&self) -> Result<()> {
        let refresh_token = {
            let state = self.state.read().await;
            state
                .as_ref()
                .and_then(|s| s.refresh_token.clone())
                .ok_or_else(|| Error::Unauthorized("No session to refresh".to_string()))?
        };

        let response = self
            .http
            .post(self.auth_url("token"))
            .query(&[("grant_type", "refresh_token")])
            .header("apikey", &self.config.api_key)
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .send()
            .await?;

        let response = Self::check_auth(response).await?;
        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| Error::Serialization(format!("failed to parse token response: {}", e)))?;

        *self.state.write().await = Some(SessionState {
            user: token.user.into(),
            access_token: token.access_token,
            refresh_token: token.refresh_token,
        });

        self.bus.emit(SessionEvent::TokenRefreshed);
        Ok(())
    }

    /// Sign out: revoke the session remotely, clear local state, and emit
    /// [`SessionEvent::SignedOut`]. Local state is cleared even when the
    /// remote revocation fails — the user asked to leave.
    #[instrument(skip(self), fields(subsystem = "auth", component = "session", op = "sign_out"))]
    pub async fn sign_out(&self) -> Result<()> {
        let token = {
            let state = self.state.read().await;
            state.as_ref().map(|s| s.access_token.clone())
        };

        let remote_result = match token {
            Some(token) => {
                let response = self
                    .http
                    .post(self.auth_url("logout"))
                    .header("apikey", &self.config.api_key)
                    .bearer_auth(token)
                    .send()
                    .await;
                match response {
                    Ok(r) => Self::check_auth(r).await.map(|_| ()),
                    Err(e) => Err(e.into()),
                }
            }
            None => Ok(()),
        };

        *self.state.write().await = None;
        self.bus.emit(SessionEvent::SignedOut);

        if let Err(ref e) = remote_result {
            warn!(error = %e, "remote sign-out failed; local session cleared anyway");
        }
        remote_result
    }

    /// Check an auth response, mapping failures to user-facing messages.
    async fn check_auth(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let raw = serde_json::from_str::<AuthErrorBody>(&body)
            .map(|b| b.message)
            .unwrap_or_else(|_| body.trim().to_string());

        Err(Error::Unauthorized(map_auth_error(status, &raw)))
    }
}

/// Map an auth API failure to a user-friendly message.
///
/// Specific message fragments win over status codes; unknown short messages
/// pass through; everything else collapses to a generic line.
pub fn map_auth_error(status: StatusCode, message: &str) -> String {
    let lower = message.to_lowercase();

    if lower.contains("email not confirmed") || lower.contains("confirm your email") {
        return "Please confirm your email before logging in.".to_string();
    }
    if lower.contains("invalid login credentials") || lower.contains("invalid email or password") {
        return "Incorrect email or password.".to_string();
    }
    if lower.contains("too many requests") || lower.contains("rate limit") {
        return "Too many login attempts. Please try again later.".to_string();
    }
    if lower.contains("network") || lower.contains("fetch") || lower.contains("server") {
        return "Connection error. Please check your internet connection and try again."
            .to_string();
    }

    match status.as_u16() {
        400 => "Incorrect email or password.".to_string(),
        422 => "Please confirm your email before logging in.".to_string(),
        429 => "Too many login attempts. Please try again later.".to_string(),
        500 | 502 | 503 => "Server error. Please try again later.".to_string(),
        _ => {
            if !message.is_empty() && message.len() < 100 {
                message.to_string()
            } else {
                "An error occurred during login. Please try again.".to_string()
            }
        }
    }
}

#[async_trait]
impl SessionProvider for RemoteAuth {
    async fn current_user(&self) -> Option<AuthUser> {
        self.state.read().await.as_ref().map(|s| s.user.clone())
    }

    async fn access_token(&self) -> Option<String> {
        self.state
            .read()
            .await
            .as_ref()
            .map(|s| s.access_token.clone())
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.bus.subscribe()
    }
}

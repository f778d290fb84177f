//! Auth session abstraction and session-change notifications.
//!
//! The core never talks to the auth service itself — it consumes a
//! [`SessionProvider`] injected at construction: current user, access token,
//! and a broadcast stream of sign-in/sign-out/refresh events that gating
//! logic (e.g. the migration trigger) subscribes to.

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::defaults::SESSION_BUS_CAPACITY;
use crate::models::AuthUser;

/// A session lifecycle change.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    SignedIn { user: AuthUser },
    SignedOut,
    TokenRefreshed,
}

impl SessionEvent {
    /// Event name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::SignedIn { .. } => "signed_in",
            SessionEvent::SignedOut => "signed_out",
            SessionEvent::TokenRefreshed => "token_refreshed",
        }
    }
}

/// Broadcast bus for session events. Each subscriber gets an independent
/// stream; events emitted with no subscribers are dropped.
pub struct SessionBus {
    tx: broadcast::Sender<SessionEvent>,
}

impl SessionBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn emit(&self, event: SessionEvent) {
        tracing::debug!(
            event = event.name(),
            subscriber_count = self.tx.receiver_count(),
            "session event"
        );
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for SessionBus {
    fn default() -> Self {
        Self::new(SESSION_BUS_CAPACITY)
    }
}

/// Source of the current user identity, injected into everything that needs
/// auth state.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// The authenticated user, or `None` when signed out.
    async fn current_user(&self) -> Option<AuthUser>;

    /// Bearer token for remote requests, or `None` when signed out.
    async fn access_token(&self) -> Option<String>;

    async fn is_authenticated(&self) -> bool {
        self.current_user().await.is_some()
    }

    /// Subscribe to session lifecycle changes.
    fn subscribe(&self) -> broadcast::Receiver<SessionEvent>;
}

/// A fixed session that never changes — an anonymous or pre-authenticated
/// identity for tests, examples, and tools.
pub struct StaticSession {
    user: Option<AuthUser>,
    token: Option<String>,
    bus: SessionBus,
}

impl StaticSession {
    /// A session that is permanently signed out.
    pub fn anonymous() -> Self {
        Self {
            user: None,
            token: None,
            bus: SessionBus::default(),
        }
    }

    /// A session permanently signed in as `user`.
    pub fn authenticated(user: AuthUser, token: impl Into<String>) -> Self {
        Self {
            user: Some(user),
            token: Some(token.into()),
            bus: SessionBus::default(),
        }
    }
}

#[async_trait]
impl SessionProvider for StaticSession {
    async fn current_user(&self) -> Option<AuthUser> {
        self.user.clone()
    }

    async fn access_token(&self) -> Option<String> {
        self.token.clone()
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.bus.subscribe()
    }
}

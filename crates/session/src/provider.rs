//! Identity provider boundary (consumed, not implemented).
//!
//! The provider verifies credentials, hashes passwords and issues tokens.
//! This workspace only subscribes to its change notifications and invokes
//! the handful of operations below.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::identity::{Session, SessionChange};

/// Failure surfaced by the identity provider.
///
/// These are recovered at the screen boundary and rendered as advisory
/// text; they never propagate past the initiating operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("invalid login credentials")]
    InvalidCredentials,

    #[error("email already registered")]
    AlreadyRegistered,

    #[error("email not confirmed")]
    EmailNotConfirmed,

    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

/// Registration payload for a new developer account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

/// A live subscription to session-change notifications.
///
/// Changes are delivered in emission order. Dropping the subscription
/// unregisters it from the provider.
#[derive(Debug)]
pub struct SessionEvents {
    receiver: mpsc::UnboundedReceiver<SessionChange>,
}

impl SessionEvents {
    pub fn new(receiver: mpsc::UnboundedReceiver<SessionChange>) -> Self {
        Self { receiver }
    }

    /// Wait for the next change. `None` means the provider side is gone.
    pub async fn next(&mut self) -> Option<SessionChange> {
        self.receiver.recv().await
    }
}

/// External identity provider operations consumed by the session layer.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Register for session-change notifications.
    ///
    /// Must be called before [`current_session`](Self::current_session) when
    /// seeding state, so that a change emitted mid-query is not lost.
    fn subscribe(&self) -> SessionEvents;

    /// One-shot query for the currently active session, if any.
    async fn current_session(&self) -> Result<Option<Session>, ProviderError>;

    /// Register a new developer account.
    async fn sign_up(&self, request: SignUpRequest) -> Result<(), ProviderError>;

    /// Authenticate with email and password; emits a change on success.
    async fn sign_in_with_password(&self, email: &str, password: &str)
        -> Result<(), ProviderError>;

    /// End the current session; emits a change.
    async fn sign_out(&self) -> Result<(), ProviderError>;
}

//! Identities and sessions as owned by the external identity provider.

use serde::{Deserialize, Serialize};

use devgate_core::UserId;

/// A principal authenticated by the identity provider.
///
/// Read-only to this workspace; the provider owns the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,
    pub email: String,
}

/// Time-bounded proof that an [`Identity`] is currently authenticated.
///
/// Created on sign-in, replaced on token refresh, destroyed on sign-out or
/// expiry. The token material is opaque here; all cryptographic concerns
/// stay with the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub identity: Identity,
}

/// Change notification emitted by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionChange {
    /// A session is now active (sign-in or token refresh).
    Established(Session),
    /// No session is active (sign-out or expiry).
    Cleared,
}

impl SessionChange {
    /// The session carried by this change, if any.
    pub fn into_session(self) -> Option<Session> {
        match self {
            SessionChange::Established(session) => Some(session),
            SessionChange::Cleared => None,
        }
    }
}

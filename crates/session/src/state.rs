//! The in-memory access state derived from session + directory data.

use devgate_access::{AccessView, ApprovalStatus, Role};
use devgate_core::UserId;

use crate::identity::{Identity, Session};

/// Process-wide access state held by the [`SessionStore`](crate::store).
///
/// Invariants:
/// - `is_loading` starts `true` and flips to `false` after the first
///   resolution cycle; it never reverts within a process lifetime.
/// - `role` is `Role::None` and `approval` is `None` whenever `identity`
///   is `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessState {
    pub identity: Option<Identity>,
    pub session: Option<Session>,
    pub role: Role,
    pub approval: Option<ApprovalStatus>,
    pub is_loading: bool,
}

impl Default for AccessState {
    fn default() -> Self {
        Self {
            identity: None,
            session: None,
            role: Role::None,
            approval: None,
            is_loading: true,
        }
    }
}

impl AccessState {
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.identity.as_ref().map(|i| i.id)
    }

    /// Projection consumed by the navigation policy.
    pub fn view(&self) -> AccessView {
        AccessView {
            is_authenticated: self.is_authenticated(),
            role: self.role,
            approval: self.approval,
            is_loading: self.is_loading,
        }
    }
}

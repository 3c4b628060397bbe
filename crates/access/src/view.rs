//! The projection of access state consumed by the navigation policy.

use crate::approval::ApprovalStatus;
use crate::role::Role;

/// Snapshot of the facts the navigation policy decides on.
///
/// Produced by the session layer from its full access state. Invariant
/// carried over from there: `role == Role::None` and `approval == None`
/// whenever `is_authenticated` is false.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AccessView {
    pub is_authenticated: bool,
    pub role: Role,
    pub approval: Option<ApprovalStatus>,
    /// True until the first session + profile resolution cycle completes.
    /// The policy does not evaluate while this is set.
    pub is_loading: bool,
}

impl AccessView {
    /// View of an anonymous visitor after loading has finished.
    pub fn anonymous() -> Self {
        Self {
            is_authenticated: false,
            role: Role::None,
            approval: None,
            is_loading: false,
        }
    }

    /// View of an authenticated principal after loading has finished.
    pub fn authenticated(role: Role, approval: Option<ApprovalStatus>) -> Self {
        Self {
            is_authenticated: true,
            role,
            approval,
            is_loading: false,
        }
    }
}

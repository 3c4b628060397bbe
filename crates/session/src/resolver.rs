//! Access profile resolution: identity -> effective role + approval status.

use devgate_access::{effective_role, ApprovalStatus, Role};
use devgate_core::UserId;

use crate::directory::Directory;

/// The atomic pair a resolution produces. Role and approval are always
/// applied to the store together, never one without the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessProfile {
    pub role: Role,
    pub approval: Option<ApprovalStatus>,
}

/// Resolve a user's role rows and approval record into an [`AccessProfile`].
///
/// Returns `None` when either query fails: resolution runs inside detached
/// background tasks with no caller to observe an error, so failures are
/// logged here and the store keeps its prior values. A missing approval
/// record is not a failure (admins never have one).
pub async fn resolve_profile(directory: &dyn Directory, user: UserId) -> Option<AccessProfile> {
    let rows = match directory.roles(user).await {
        Ok(rows) => rows,
        Err(e) => {
            tracing::warn!(%user, error = %e, "role query failed, keeping prior access state");
            return None;
        }
    };

    let approval = match directory.approval_status(user).await {
        Ok(approval) => approval,
        Err(e) => {
            tracing::warn!(%user, error = %e, "approval query failed, keeping prior access state");
            return None;
        }
    };

    Some(AccessProfile {
        role: effective_role(&rows),
        approval,
    })
}

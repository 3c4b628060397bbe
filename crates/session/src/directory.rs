//! Record store boundary ("directory"): role rows, approval records,
//! profiles.
//!
//! The store itself is an external query service; this module only fixes
//! the row shapes and the operations the rest of the workspace consumes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use devgate_access::{ApprovalStatus, Role};
use devgate_core::{ApprovalId, UserId};

/// Failure surfaced by the record store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    /// The addressed record does not exist.
    #[error("record not found")]
    NotFound,

    /// The store could not be reached or answered with an error.
    #[error("record store unavailable: {0}")]
    Unavailable(String),
}

/// One developer approval record. At most one exists per user; admins never
/// receive one. Mutated only through [`ReviewUpdate`], never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalRecord {
    pub id: ApprovalId,
    pub user_id: UserId,
    pub status: ApprovalStatus,
    pub created_at: DateTime<Utc>,
    pub reviewed_by: Option<UserId>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

/// Read-only profile projection used by the admin overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: UserId,
    pub email: String,
    pub full_name: Option<String>,
}

/// Review decision written onto an approval record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewUpdate {
    pub status: ApprovalStatus,
    pub reviewed_by: UserId,
    pub reviewed_at: DateTime<Utc>,
}

/// Record store operations consumed by this workspace.
#[async_trait]
pub trait Directory: Send + Sync {
    /// All role rows for a user. A user may hold several.
    async fn roles(&self, user: UserId) -> Result<Vec<Role>, DirectoryError>;

    /// Approval status for a user; `None` when no record exists (the
    /// expected state for admin identities).
    async fn approval_status(&self, user: UserId)
        -> Result<Option<ApprovalStatus>, DirectoryError>;

    /// Every approval record (admin overview).
    async fn list_approvals(&self) -> Result<Vec<ApprovalRecord>, DirectoryError>;

    /// Profiles for the given user ids; unknown ids are simply absent from
    /// the result.
    async fn profiles(&self, ids: &[UserId]) -> Result<Vec<Profile>, DirectoryError>;

    /// Apply a review decision to the record addressed by its own id.
    /// Fails with [`DirectoryError::NotFound`] for an unknown id.
    async fn update_approval(
        &self,
        id: ApprovalId,
        update: ReviewUpdate,
    ) -> Result<(), DirectoryError>;
}

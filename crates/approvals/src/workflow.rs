//! Approval state transitions (`approve` / `reject`).
//!
//! Both operations act on exactly one record addressed by its own id, not
//! by the owning user. They are idempotent on status: re-reviewing an
//! already-decided record converges to the same status while always
//! refreshing reviewer and timestamp. There is no restriction on moving a
//! rejected record back to approved.

use chrono::Utc;
use thiserror::Error;

use devgate_access::{ApprovalStatus, Role};
use devgate_core::{ApprovalId, UserId};
use devgate_session::{Directory, DirectoryError, ReviewUpdate};

/// The caller of a review operation.
///
/// Screens are kept away from these operations by the navigation policy,
/// but that policy is a UX convenience, not a security boundary; the role
/// is verified again here before any record is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reviewer {
    id: UserId,
    role: Role,
}

impl Reviewer {
    pub fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }
}

/// Failure of a review operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    /// The caller does not hold the admin role.
    #[error("unauthorized: admin role required")]
    Unauthorized,

    /// No approval record exists with the given id.
    #[error("approval record not found")]
    NotFound,

    /// The record store failed.
    #[error(transparent)]
    Directory(DirectoryError),
}

/// Approve the record addressed by `id`.
pub async fn approve(
    directory: &dyn Directory,
    reviewer: &Reviewer,
    id: ApprovalId,
) -> Result<(), WorkflowError> {
    review(directory, reviewer, id, ApprovalStatus::Approved).await
}

/// Reject the record addressed by `id`.
pub async fn reject(
    directory: &dyn Directory,
    reviewer: &Reviewer,
    id: ApprovalId,
) -> Result<(), WorkflowError> {
    review(directory, reviewer, id, ApprovalStatus::Rejected).await
}

async fn review(
    directory: &dyn Directory,
    reviewer: &Reviewer,
    id: ApprovalId,
    status: ApprovalStatus,
) -> Result<(), WorkflowError> {
    if reviewer.role() != Role::Admin {
        tracing::warn!(
            reviewer = %reviewer.id(),
            role = %reviewer.role(),
            "non-admin attempted a review operation"
        );
        return Err(WorkflowError::Unauthorized);
    }

    let update = ReviewUpdate {
        status,
        reviewed_by: reviewer.id(),
        reviewed_at: Utc::now(),
    };

    directory
        .update_approval(id, update)
        .await
        .map_err(|e| match e {
            DirectoryError::NotFound => WorkflowError::NotFound,
            other => WorkflowError::Directory(other),
        })?;

    tracing::info!(approval = %id, reviewer = %reviewer.id(), %status, "approval reviewed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use std::sync::Mutex;

    use devgate_session::{ApprovalRecord, Profile};

    /// Single-record directory double for workflow tests.
    struct OneRecord {
        record: Mutex<ApprovalRecord>,
    }

    impl OneRecord {
        fn pending() -> Self {
            Self {
                record: Mutex::new(ApprovalRecord {
                    id: ApprovalId::new(),
                    user_id: UserId::new(),
                    status: ApprovalStatus::Pending,
                    created_at: Utc::now(),
                    reviewed_by: None,
                    reviewed_at: None,
                }),
            }
        }

        fn snapshot(&self) -> ApprovalRecord {
            self.record.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Directory for OneRecord {
        async fn roles(&self, _user: UserId) -> Result<Vec<Role>, DirectoryError> {
            Ok(vec![])
        }

        async fn approval_status(
            &self,
            user: UserId,
        ) -> Result<Option<ApprovalStatus>, DirectoryError> {
            let record = self.record.lock().unwrap();
            Ok((record.user_id == user).then_some(record.status))
        }

        async fn list_approvals(&self) -> Result<Vec<ApprovalRecord>, DirectoryError> {
            Ok(vec![self.snapshot()])
        }

        async fn profiles(&self, _ids: &[UserId]) -> Result<Vec<Profile>, DirectoryError> {
            Ok(vec![])
        }

        async fn update_approval(
            &self,
            id: ApprovalId,
            update: ReviewUpdate,
        ) -> Result<(), DirectoryError> {
            let mut record = self.record.lock().unwrap();
            if record.id != id {
                return Err(DirectoryError::NotFound);
            }
            record.status = update.status;
            record.reviewed_by = Some(update.reviewed_by);
            record.reviewed_at = Some(update.reviewed_at);
            Ok(())
        }
    }

    fn admin() -> Reviewer {
        Reviewer::new(UserId::new(), Role::Admin)
    }

    #[tokio::test]
    async fn approve_stamps_reviewer_and_timestamp() {
        let directory = OneRecord::pending();
        let reviewer = admin();
        let id = directory.snapshot().id;

        approve(&directory, &reviewer, id).await.unwrap();

        let record = directory.snapshot();
        assert_eq!(record.status, ApprovalStatus::Approved);
        assert_eq!(record.reviewed_by, Some(reviewer.id()));
        assert!(record.reviewed_at.is_some());
    }

    #[tokio::test]
    async fn reject_is_symmetric() {
        let directory = OneRecord::pending();
        let id = directory.snapshot().id;

        reject(&directory, &admin(), id).await.unwrap();
        assert_eq!(directory.snapshot().status, ApprovalStatus::Rejected);
    }

    #[tokio::test]
    async fn repeated_approval_converges_but_refreshes_review_stamp() {
        let directory = OneRecord::pending();
        let id = directory.snapshot().id;
        let first_admin = admin();
        let second_admin = admin();

        approve(&directory, &first_admin, id).await.unwrap();
        let first: Option<DateTime<Utc>> = directory.snapshot().reviewed_at;

        approve(&directory, &second_admin, id).await.unwrap();
        let record = directory.snapshot();

        assert_eq!(record.status, ApprovalStatus::Approved);
        assert_eq!(record.reviewed_by, Some(second_admin.id()));
        assert!(record.reviewed_at >= first);
    }

    #[tokio::test]
    async fn rejected_record_can_be_approved_again() {
        let directory = OneRecord::pending();
        let id = directory.snapshot().id;

        reject(&directory, &admin(), id).await.unwrap();
        approve(&directory, &admin(), id).await.unwrap();
        assert_eq!(directory.snapshot().status, ApprovalStatus::Approved);
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let directory = OneRecord::pending();
        let result = approve(&directory, &admin(), ApprovalId::new()).await;
        assert_eq!(result, Err(WorkflowError::NotFound));
    }

    #[tokio::test]
    async fn non_admin_caller_is_rejected_before_any_write() {
        let directory = OneRecord::pending();
        let id = directory.snapshot().id;
        let caller = Reviewer::new(UserId::new(), Role::Developer);

        let result = approve(&directory, &caller, id).await;

        assert_eq!(result, Err(WorkflowError::Unauthorized));
        assert_eq!(directory.snapshot().status, ApprovalStatus::Pending);
        assert_eq!(directory.snapshot().reviewed_by, None);
    }
}

//! In-memory record store.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use devgate_access::{ApprovalStatus, Role};
use devgate_core::{ApprovalId, UserId};
use devgate_session::{ApprovalRecord, Directory, DirectoryError, Profile, ReviewUpdate};

#[derive(Debug, Default)]
struct Tables {
    roles: Vec<(UserId, Role)>,
    approvals: Vec<ApprovalRecord>,
    profiles: Vec<Profile>,
}

/// In-memory directory.
///
/// Intended for tests/dev. Carries two fault knobs: `set_unavailable`
/// makes every query fail, `set_latency` delays every query, which is how
/// tests provoke the in-flight-resolution races.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    tables: RwLock<Tables>,
    unavailable: AtomicBool,
    latency_ms: AtomicU64,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent query fail with `Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Delay every subsequent query by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        self.latency_ms
            .store(latency.as_millis() as u64, Ordering::SeqCst);
    }

    /// Add a role row. A user may accumulate several rows.
    pub fn insert_role_row(&self, user: UserId, role: Role) {
        if let Ok(mut tables) = self.tables.write() {
            tables.roles.push((user, role));
        }
    }

    pub fn insert_profile(&self, profile: Profile) {
        if let Ok(mut tables) = self.tables.write() {
            tables.profiles.push(profile);
        }
    }

    /// Create a pending approval record for a user, unless one exists
    /// already (at most one record per user).
    pub fn create_approval(&self, user: UserId) -> ApprovalId {
        let mut tables = match self.tables.write() {
            Ok(tables) => tables,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(existing) = tables.approvals.iter().find(|a| a.user_id == user) {
            return existing.id;
        }
        let id = ApprovalId::new();
        tables.approvals.push(ApprovalRecord {
            id,
            user_id: user,
            status: ApprovalStatus::Pending,
            created_at: Utc::now(),
            reviewed_by: None,
            reviewed_at: None,
        });
        id
    }

    /// Test helper: the approval record owned by `user`, if any.
    pub fn approval_for_user(&self, user: UserId) -> Option<ApprovalRecord> {
        self.tables
            .read()
            .ok()?
            .approvals
            .iter()
            .find(|a| a.user_id == user)
            .cloned()
    }

    async fn gate(&self) -> Result<(), DirectoryError> {
        let latency = self.latency_ms.load(Ordering::SeqCst);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DirectoryError::Unavailable("directory offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl Directory for InMemoryDirectory {
    async fn roles(&self, user: UserId) -> Result<Vec<Role>, DirectoryError> {
        self.gate().await?;
        let tables = self
            .tables
            .read()
            .map_err(|_| DirectoryError::Unavailable("lock poisoned".into()))?;
        Ok(tables
            .roles
            .iter()
            .filter(|(id, _)| *id == user)
            .map(|(_, role)| *role)
            .collect())
    }

    async fn approval_status(
        &self,
        user: UserId,
    ) -> Result<Option<ApprovalStatus>, DirectoryError> {
        self.gate().await?;
        let tables = self
            .tables
            .read()
            .map_err(|_| DirectoryError::Unavailable("lock poisoned".into()))?;
        Ok(tables
            .approvals
            .iter()
            .find(|a| a.user_id == user)
            .map(|a| a.status))
    }

    async fn list_approvals(&self) -> Result<Vec<ApprovalRecord>, DirectoryError> {
        self.gate().await?;
        let tables = self
            .tables
            .read()
            .map_err(|_| DirectoryError::Unavailable("lock poisoned".into()))?;
        Ok(tables.approvals.clone())
    }

    async fn profiles(&self, ids: &[UserId]) -> Result<Vec<Profile>, DirectoryError> {
        self.gate().await?;
        let tables = self
            .tables
            .read()
            .map_err(|_| DirectoryError::Unavailable("lock poisoned".into()))?;
        Ok(tables
            .profiles
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn update_approval(
        &self,
        id: ApprovalId,
        update: ReviewUpdate,
    ) -> Result<(), DirectoryError> {
        self.gate().await?;
        let mut tables = self
            .tables
            .write()
            .map_err(|_| DirectoryError::Unavailable("lock poisoned".into()))?;
        let record = tables
            .approvals
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(DirectoryError::NotFound)?;
        record.status = update.status;
        record.reviewed_by = Some(update.reviewed_by);
        record.reviewed_at = Some(update.reviewed_at);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn approval_record_is_unique_per_user() {
        let directory = InMemoryDirectory::new();
        let user = UserId::new();

        let first = directory.create_approval(user);
        let second = directory.create_approval(user);

        assert_eq!(first, second);
        assert_eq!(directory.list_approvals().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_approval_unknown_id_is_not_found() {
        let directory = InMemoryDirectory::new();
        let result = directory
            .update_approval(
                ApprovalId::new(),
                ReviewUpdate {
                    status: ApprovalStatus::Approved,
                    reviewed_by: UserId::new(),
                    reviewed_at: Utc::now(),
                },
            )
            .await;
        assert_eq!(result, Err(DirectoryError::NotFound));
    }

    #[tokio::test]
    async fn unavailable_switch_fails_every_query() {
        let directory = InMemoryDirectory::new();
        directory.set_unavailable(true);
        assert!(directory.roles(UserId::new()).await.is_err());
        assert!(directory.approval_status(UserId::new()).await.is_err());

        directory.set_unavailable(false);
        assert!(directory.roles(UserId::new()).await.is_ok());
    }
}

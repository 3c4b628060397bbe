//! Admin review overview: approval records joined with applicant profiles.

use std::collections::HashMap;

use devgate_access::ApprovalStatus;
use devgate_core::UserId;
use devgate_session::{ApprovalRecord, Directory, DirectoryError, Profile};

/// One row of the review table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverviewRow {
    pub record: ApprovalRecord,
    /// Missing when the profile projection has no row for the applicant.
    pub profile: Option<Profile>,
}

/// Summary counters shown above the review table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OverviewStats {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
}

/// The assembled review overview, newest applications first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overview {
    pub rows: Vec<OverviewRow>,
    pub stats: OverviewStats,
}

/// Load all approval records, batch-fetch the owners' profiles and join
/// them in memory. Query failures surface to the calling screen.
pub async fn load_overview(directory: &dyn Directory) -> Result<Overview, DirectoryError> {
    let mut records = directory.list_approvals().await?;
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let ids: Vec<UserId> = records.iter().map(|r| r.user_id).collect();
    let profiles: HashMap<UserId, Profile> = directory
        .profiles(&ids)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    let mut stats = OverviewStats {
        total: records.len(),
        ..OverviewStats::default()
    };
    for record in &records {
        match record.status {
            ApprovalStatus::Pending => stats.pending += 1,
            ApprovalStatus::Approved => stats.approved += 1,
            ApprovalStatus::Rejected => {}
        }
    }

    let rows = records
        .into_iter()
        .map(|record| {
            let profile = profiles.get(&record.user_id).cloned();
            OverviewRow { record, profile }
        })
        .collect();

    Ok(Overview { rows, stats })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{Duration, Utc};

    use devgate_access::Role;
    use devgate_core::ApprovalId;
    use devgate_session::ReviewUpdate;

    struct Fixed {
        records: Vec<ApprovalRecord>,
        profiles: Vec<Profile>,
    }

    #[async_trait]
    impl Directory for Fixed {
        async fn roles(&self, _user: UserId) -> Result<Vec<Role>, DirectoryError> {
            Ok(vec![])
        }

        async fn approval_status(
            &self,
            _user: UserId,
        ) -> Result<Option<ApprovalStatus>, DirectoryError> {
            Ok(None)
        }

        async fn list_approvals(&self) -> Result<Vec<ApprovalRecord>, DirectoryError> {
            Ok(self.records.clone())
        }

        async fn profiles(&self, ids: &[UserId]) -> Result<Vec<Profile>, DirectoryError> {
            Ok(self
                .profiles
                .iter()
                .filter(|p| ids.contains(&p.id))
                .cloned()
                .collect())
        }

        async fn update_approval(
            &self,
            _id: ApprovalId,
            _update: ReviewUpdate,
        ) -> Result<(), DirectoryError> {
            Err(DirectoryError::NotFound)
        }
    }

    fn record(status: ApprovalStatus, age_minutes: i64) -> ApprovalRecord {
        ApprovalRecord {
            id: ApprovalId::new(),
            user_id: UserId::new(),
            status,
            created_at: Utc::now() - Duration::minutes(age_minutes),
            reviewed_by: None,
            reviewed_at: None,
        }
    }

    #[tokio::test]
    async fn joins_profiles_and_counts_statuses() {
        let older = record(ApprovalStatus::Approved, 60);
        let newer = record(ApprovalStatus::Pending, 5);
        let rejected = record(ApprovalStatus::Rejected, 30);
        let profile = Profile {
            id: newer.user_id,
            email: "new@example.com".into(),
            full_name: Some("New Applicant".into()),
        };

        let directory = Fixed {
            records: vec![older.clone(), newer.clone(), rejected.clone()],
            profiles: vec![profile.clone()],
        };

        let overview = load_overview(&directory).await.unwrap();

        assert_eq!(overview.stats.total, 3);
        assert_eq!(overview.stats.pending, 1);
        assert_eq!(overview.stats.approved, 1);

        // Newest first; only the newest applicant has a profile row.
        assert_eq!(overview.rows[0].record.id, newer.id);
        assert_eq!(overview.rows[0].profile, Some(profile));
        assert_eq!(overview.rows[1].record.id, rejected.id);
        assert_eq!(overview.rows[1].profile, None);
        assert_eq!(overview.rows[2].record.id, older.id);
    }

    #[tokio::test]
    async fn empty_directory_yields_empty_overview() {
        let directory = Fixed {
            records: vec![],
            profiles: vec![],
        };
        let overview = load_overview(&directory).await.unwrap();
        assert!(overview.rows.is_empty());
        assert_eq!(overview.stats, OverviewStats::default());
    }
}

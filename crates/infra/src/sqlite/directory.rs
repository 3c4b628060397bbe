//! Record store persisted in SQLite.
//!
//! Holds the same three tables the hosted record store exposes
//! (`user_roles`, `developer_approvals`, `profiles`) and bootstraps its
//! schema on connect.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};

use devgate_access::{ApprovalStatus, Role};
use devgate_core::{ApprovalId, UserId};
use devgate_session::{ApprovalRecord, Directory, DirectoryError, Profile, ReviewUpdate};

/// SQLite-backed directory.
///
/// Cheap to clone; the pool is shared.
#[derive(Debug, Clone)]
pub struct SqliteDirectory {
    pool: SqlitePool,
}

impl SqliteDirectory {
    /// Connect to `url` and create the schema if missing.
    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        let pool = SqlitePool::connect(url).await?;
        let directory = Self { pool };
        directory.ensure_schema().await?;
        Ok(directory)
    }

    /// Private in-memory database, used by tests and local development.
    ///
    /// Pinned to a single connection: every pooled connection would
    /// otherwise get its own empty `:memory:` database.
    pub async fn in_memory() -> anyhow::Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        let directory = Self { pool };
        directory.ensure_schema().await?;
        Ok(directory)
    }

    async fn ensure_schema(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS user_roles (
                user_id TEXT NOT NULL,
                role    TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS developer_approvals (
                id          TEXT PRIMARY KEY,
                user_id     TEXT NOT NULL UNIQUE,
                status      TEXT NOT NULL,
                created_at  TEXT NOT NULL,
                reviewed_by TEXT,
                reviewed_at TEXT
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS profiles (
                id        TEXT PRIMARY KEY,
                email     TEXT NOT NULL,
                full_name TEXT
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Add a role row for a user.
    pub async fn insert_role_row(&self, user: UserId, role: Role) -> anyhow::Result<()> {
        sqlx::query("INSERT INTO user_roles (user_id, role) VALUES (?, ?)")
            .bind(user.to_string())
            .bind(role.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn insert_profile(&self, profile: &Profile) -> anyhow::Result<()> {
        sqlx::query("INSERT INTO profiles (id, email, full_name) VALUES (?, ?, ?)")
            .bind(profile.id.to_string())
            .bind(profile.email.as_str())
            .bind(profile.full_name.as_deref())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Create a pending approval record for a user; returns the existing id
    /// when one is already present (at most one record per user).
    pub async fn create_approval(&self, user: UserId) -> anyhow::Result<ApprovalId> {
        if let Some(row) = sqlx::query("SELECT id FROM developer_approvals WHERE user_id = ?")
            .bind(user.to_string())
            .fetch_optional(&self.pool)
            .await?
        {
            let id: String = row.try_get("id")?;
            return Ok(id.parse()?);
        }

        let id = ApprovalId::new();
        sqlx::query(
            "INSERT INTO developer_approvals (id, user_id, status, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(user.to_string())
        .bind(ApprovalStatus::Pending.as_str())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(id)
    }
}

fn unavailable(e: impl core::fmt::Display) -> DirectoryError {
    DirectoryError::Unavailable(e.to_string())
}

fn decode_approval(row: &sqlx::sqlite::SqliteRow) -> Result<ApprovalRecord, DirectoryError> {
    let id: String = row.try_get("id").map_err(unavailable)?;
    let user_id: String = row.try_get("user_id").map_err(unavailable)?;
    let status: String = row.try_get("status").map_err(unavailable)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(unavailable)?;
    let reviewed_by: Option<String> = row.try_get("reviewed_by").map_err(unavailable)?;
    let reviewed_at: Option<DateTime<Utc>> = row.try_get("reviewed_at").map_err(unavailable)?;

    let reviewed_by = reviewed_by
        .map(|s| s.parse::<UserId>())
        .transpose()
        .map_err(unavailable)?;

    Ok(ApprovalRecord {
        id: id.parse().map_err(unavailable)?,
        user_id: user_id.parse().map_err(unavailable)?,
        status: status.parse().map_err(unavailable)?,
        created_at,
        reviewed_by,
        reviewed_at,
    })
}

#[async_trait]
impl Directory for SqliteDirectory {
    async fn roles(&self, user: UserId) -> Result<Vec<Role>, DirectoryError> {
        let rows = sqlx::query("SELECT role FROM user_roles WHERE user_id = ?")
            .bind(user.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(unavailable)?;

        let mut roles = Vec::with_capacity(rows.len());
        for row in rows {
            let value: String = row.try_get("role").map_err(unavailable)?;
            match value.parse::<Role>() {
                Ok(role) => roles.push(role),
                Err(e) => tracing::warn!(%user, error = %e, "skipping unknown role row"),
            }
        }
        Ok(roles)
    }

    async fn approval_status(
        &self,
        user: UserId,
    ) -> Result<Option<ApprovalStatus>, DirectoryError> {
        let row = sqlx::query("SELECT status FROM developer_approvals WHERE user_id = ?")
            .bind(user.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(unavailable)?;

        match row {
            None => Ok(None),
            Some(row) => {
                let status: String = row.try_get("status").map_err(unavailable)?;
                Ok(Some(status.parse().map_err(unavailable)?))
            }
        }
    }

    async fn list_approvals(&self) -> Result<Vec<ApprovalRecord>, DirectoryError> {
        let rows = sqlx::query(
            "SELECT id, user_id, status, created_at, reviewed_by, reviewed_at \
             FROM developer_approvals ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(unavailable)?;

        rows.iter().map(decode_approval).collect()
    }

    async fn profiles(&self, ids: &[UserId]) -> Result<Vec<Profile>, DirectoryError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql =
            format!("SELECT id, email, full_name FROM profiles WHERE id IN ({placeholders})");
        let mut query = sqlx::query(&sql);
        for id in ids {
            query = query.bind(id.to_string());
        }

        let rows = query.fetch_all(&self.pool).await.map_err(unavailable)?;
        let mut profiles = Vec::with_capacity(rows.len());
        for row in rows {
            let id: String = row.try_get("id").map_err(unavailable)?;
            profiles.push(Profile {
                id: id.parse().map_err(unavailable)?,
                email: row.try_get("email").map_err(unavailable)?,
                full_name: row.try_get("full_name").map_err(unavailable)?,
            });
        }
        Ok(profiles)
    }

    async fn update_approval(
        &self,
        id: ApprovalId,
        update: ReviewUpdate,
    ) -> Result<(), DirectoryError> {
        let result = sqlx::query(
            "UPDATE developer_approvals SET status = ?, reviewed_by = ?, reviewed_at = ? \
             WHERE id = ?",
        )
        .bind(update.status.as_str())
        .bind(update.reviewed_by.to_string())
        .bind(update.reviewed_at)
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(unavailable)?;

        if result.rows_affected() == 0 {
            return Err(DirectoryError::NotFound);
        }
        Ok(())
    }
}

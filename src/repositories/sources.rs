use crate::entities::{Source, SourceStatus};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

/// Read side and health bookkeeping of the source registry.
///
/// Neither status call can move a source out of `blocked`; blocking and
/// unblocking belong to operators.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SourceRegistry: Send + Sync {
    /// Every source that is not blocked, ordered by name.
    async fn list_eligible(&self) -> Result<Vec<Source>>;

    /// Status `active`, error log cleared. Returns false when nothing was updated.
    async fn mark_healthy(&self, id: Uuid, checked_at: DateTime<Utc>) -> Result<bool>;

    /// Status `error` with the message recorded.
    async fn mark_errored(&self, id: Uuid, checked_at: DateTime<Utc>, message: &str)
    -> Result<bool>;
}

#[derive(Clone)]
pub struct PgSourceRegistry {
    pool: Pool<Postgres>,
}

impl PgSourceRegistry {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SourceRegistry for PgSourceRegistry {
    async fn list_eligible(&self) -> Result<Vec<Source>> {
        let sources = sqlx::query_as::<_, Source>(
            r#"
            SELECT id, name, url, target_type, region, pattern, status,
                   last_checked_at, error_log, created_at
            FROM sources
            WHERE status <> $1
            ORDER BY name
            "#,
        )
        .bind(SourceStatus::Blocked)
        .fetch_all(&self.pool)
        .await?;

        Ok(sources)
    }

    async fn mark_healthy(&self, id: Uuid, checked_at: DateTime<Utc>) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE sources
            SET status = $2,
                last_checked_at = $3,
                error_log = NULL
            WHERE id = $1 AND status <> $4
            "#,
        )
        .bind(id)
        .bind(SourceStatus::Active)
        .bind(checked_at)
        .bind(SourceStatus::Blocked)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn mark_errored(
        &self,
        id: Uuid,
        checked_at: DateTime<Utc>,
        message: &str,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE sources
            SET status = $2,
                last_checked_at = $3,
                error_log = $4
            WHERE id = $1 AND status <> $5
            "#,
        )
        .bind(id)
        .bind(SourceStatus::Error)
        .bind(checked_at)
        .bind(message)
        .bind(SourceStatus::Blocked)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

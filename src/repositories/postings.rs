use crate::entities::{NewPosting, Posting, PostingStatus};
use anyhow::Result;
use async_trait::async_trait;
use sqlx::{Pool, Postgres, types::Json};

const POSTING_COLUMNS: &str = r#"
    id, title, slug, organization, post_date, total_vacancy, description,
    application_fee, age_limit, qualification, important_dates, important_links,
    pattern_changed, pattern_change_summary, post_type, status, source_url,
    ai_confidence, created_at
"#;

/// Result of an insert-if-absent keyed by origin URL (and, through it, slug).
#[derive(Debug, Clone)]
pub enum InsertOutcome {
    Inserted(Posting),
    /// A posting for this origin URL already existed; nothing was written.
    Duplicate,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostingStore: Send + Sync {
    /// Whether a posting already exists for this origin URL.
    async fn exists(&self, source_url: &str) -> Result<bool>;

    /// Insert as `draft` unless the origin URL is already taken. Racing
    /// inserts for one URL also collide on the slug; both report `Duplicate`.
    async fn insert_draft(&self, posting: NewPosting) -> Result<InsertOutcome>;
}

#[derive(Clone)]
pub struct PgPostingStore {
    pool: Pool<Postgres>,
}

impl PgPostingStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostingStore for PgPostingStore {
    async fn exists(&self, source_url: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM postings WHERE source_url = $1)")
                .bind(source_url)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn insert_draft(&self, posting: NewPosting) -> Result<InsertOutcome> {
        let sql = format!(
            r#"
            INSERT INTO postings
                (title, slug, organization, post_date, total_vacancy, description,
                 application_fee, age_limit, qualification, important_dates,
                 important_links, pattern_changed, pattern_change_summary,
                 post_type, status, source_url, ai_confidence)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            ON CONFLICT DO NOTHING
            RETURNING {POSTING_COLUMNS}
            "#
        );

        let inserted = sqlx::query_as::<_, Posting>(&sql)
            .bind(&posting.title)
            .bind(&posting.slug)
            .bind(&posting.organization)
            .bind(&posting.post_date)
            .bind(&posting.total_vacancy)
            .bind(&posting.description)
            .bind(&posting.application_fee)
            .bind(&posting.age_limit)
            .bind(&posting.qualification)
            .bind(Json(&posting.important_dates))
            .bind(Json(&posting.important_links))
            .bind(posting.pattern_changed)
            .bind(&posting.pattern_change_summary)
            .bind(posting.post_type)
            .bind(PostingStatus::Draft)
            .bind(&posting.source_url)
            .bind(posting.ai_confidence)
            .fetch_optional(&self.pool)
            .await?;

        Ok(match inserted {
            Some(row) => InsertOutcome::Inserted(row),
            None => InsertOutcome::Duplicate,
        })
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::{ImportantDate, ImportantLink, PostType, Posting, PostingStatus};

const MAX_URL_LEN: usize = 2048;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateDraftRequest {
    /// Notice page to draft from.
    pub url: String,
    /// Defaults to `job_notification`. `job` is accepted as an alias.
    pub post_type: Option<PostType>,
}

impl CreateDraftRequest {
    pub fn validate(&self) -> Result<Url, String> {
        let url = self.url.trim();
        if url.is_empty() {
            return Err("URL is required".to_string());
        }
        if url.len() > MAX_URL_LEN {
            return Err("URL too long".to_string());
        }
        let parsed = Url::parse(url).map_err(|e| format!("Invalid URL: {e}"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err("URL must be http or https".to_string());
        }
        Ok(parsed)
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PostingResponse {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub organization: String,
    pub post_date: String,
    pub total_vacancy: Option<String>,
    pub description: String,
    pub application_fee: Option<String>,
    pub age_limit: Option<String>,
    pub qualification: Option<String>,
    pub important_dates: Vec<ImportantDate>,
    pub important_links: Vec<ImportantLink>,
    pub pattern_changed: Option<bool>,
    pub pattern_change_summary: Option<String>,
    pub post_type: PostType,
    pub status: PostingStatus,
    pub source_url: String,
    pub ai_confidence: f64,
    pub created_at: DateTime<Utc>,
}

impl From<Posting> for PostingResponse {
    fn from(p: Posting) -> Self {
        Self {
            id: p.id,
            title: p.title,
            slug: p.slug,
            organization: p.organization,
            post_date: p.post_date,
            total_vacancy: p.total_vacancy,
            description: p.description,
            application_fee: p.application_fee,
            age_limit: p.age_limit,
            qualification: p.qualification,
            important_dates: p.important_dates.0,
            important_links: p.important_links.0,
            pattern_changed: p.pattern_changed,
            pattern_change_summary: p.pattern_change_summary,
            post_type: p.post_type,
            status: p.status,
            source_url: p.source_url,
            ai_confidence: p.ai_confidence,
            created_at: p.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateDraftResponse {
    pub posting: PostingResponse,
    /// Set when the extraction service failed and a fallback draft was saved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

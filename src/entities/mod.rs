use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};
use std::{fmt, str::FromStr};
use utoipa::ToSchema;
use uuid::Uuid;

/// --- PostgreSQL Enums ---
#[derive(sqlx::Type, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[sqlx(type_name = "source_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SourceStatus {
    Active,
    Error,
    Blocked,
}

/// Classification of a source and of the postings drafted from it.
#[derive(sqlx::Type, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[sqlx(type_name = "post_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PostType {
    #[serde(alias = "job")]
    JobNotification,
    AdmitCard,
    Result,
}

impl PostType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostType::JobNotification => "job_notification",
            PostType::AdmitCard => "admit_card",
            PostType::Result => "result",
        }
    }
}

impl fmt::Display for PostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown post type: {0}")]
pub struct UnknownPostType(pub String);

impl FromStr for PostType {
    type Err = UnknownPostType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            // legacy spelling
            "job" | "job_notification" => Ok(PostType::JobNotification),
            "admit_card" => Ok(PostType::AdmitCard),
            "result" => Ok(PostType::Result),
            other => Err(UnknownPostType(other.to_string())),
        }
    }
}

#[derive(sqlx::Type, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[sqlx(type_name = "posting_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PostingStatus {
    Draft,
    Published,
    Archived,
}

/// --- JSONB values ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ImportantDate {
    pub label: String,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ImportantLink {
    pub label: String,
    pub url: String,
}

/// --- Tables ---

#[derive(Debug, Clone, FromRow)]
pub struct Source {
    pub id: Uuid,
    pub name: String,
    pub url: String,
    pub target_type: PostType,
    pub region: Option<String>,
    pub pattern: Option<String>, // regex candidate URLs must match
    pub status: SourceStatus,
    pub last_checked_at: Option<DateTime<Utc>>,
    pub error_log: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct Posting {
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
    pub important_dates: Json<Vec<ImportantDate>>,
    pub important_links: Json<Vec<ImportantLink>>,
    pub pattern_changed: Option<bool>,
    pub pattern_change_summary: Option<String>,
    pub post_type: PostType,
    pub status: PostingStatus,
    pub source_url: String, // dedup key
    pub ai_confidence: f64,
    pub created_at: DateTime<Utc>,
}

/// A posting about to be inserted as a draft.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPosting {
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
    pub source_url: String,
    pub ai_confidence: f64,
}

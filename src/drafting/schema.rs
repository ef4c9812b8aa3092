//! Strict parsing of extraction responses into a tagged union.
//!
//! Unknown fields are ignored. Missing or mistyped required fields, an empty
//! title, a confidence outside `[0, 1]` and non-http link URLs are rejected
//! as [`ExtractionError::Malformed`].

use crate::{
    drafting::{errors::ExtractionError, slug::posting_slug},
    entities::{ImportantDate, ImportantLink, NewPosting, PostType},
};
use serde::Deserialize;
use url::Url;

/// Sentinel for a field that applies to the classification but that the
/// source text does not state.
pub const NOT_SPECIFIED: &str = "Not Specified";

/// Fields every classification carries.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonFields {
    pub title: String,
    pub organization: String,
    pub post_date: String,
    pub description: String,
    pub important_dates: Vec<ImportantDate>,
    pub important_links: Vec<ImportantLink>,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobNotificationFields {
    #[serde(flatten)]
    pub common: CommonFields,
    #[serde(deserialize_with = "text_or_number")]
    pub total_vacancy: String,
    pub application_fee: String,
    pub age_limit: String,
    pub qualification: String,
    pub pattern_changed: bool,
    pub pattern_change_summary: Option<String>,
}

/// Admit cards and results. Fee, age limit and qualification do not apply.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamNoticeFields {
    #[serde(flatten)]
    pub common: CommonFields,
    #[serde(deserialize_with = "text_or_number")]
    pub total_vacancy: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    JobNotification(JobNotificationFields),
    AdmitCard(ExamNoticeFields),
    Result(ExamNoticeFields),
}

impl Extraction {
    pub fn post_type(&self) -> PostType {
        match self {
            Extraction::JobNotification(_) => PostType::JobNotification,
            Extraction::AdmitCard(_) => PostType::AdmitCard,
            Extraction::Result(_) => PostType::Result,
        }
    }

    pub fn common(&self) -> &CommonFields {
        match self {
            Extraction::JobNotification(fields) => &fields.common,
            Extraction::AdmitCard(fields) | Extraction::Result(fields) => &fields.common,
        }
    }

    pub fn title(&self) -> &str {
        &self.common().title
    }

    pub fn confidence(&self) -> f64 {
        self.common().confidence
    }

    /// Draft row for this extraction, keyed by the origin URL.
    pub fn into_new_posting(self, source_url: &str) -> NewPosting {
        let post_type = self.post_type();
        let (common, total_vacancy, fee, age, qualification, pattern_changed, summary) = match self
        {
            Extraction::JobNotification(f) => (
                f.common,
                Some(f.total_vacancy),
                Some(f.application_fee),
                Some(f.age_limit),
                Some(f.qualification),
                Some(f.pattern_changed),
                f.pattern_change_summary,
            ),
            Extraction::AdmitCard(f) | Extraction::Result(f) => {
                (f.common, Some(f.total_vacancy), None, None, None, None, None)
            }
        };

        NewPosting {
            slug: posting_slug(&common.title, source_url),
            title: common.title,
            organization: common.organization,
            post_date: common.post_date,
            total_vacancy,
            description: common.description,
            application_fee: fee,
            age_limit: age,
            qualification,
            important_dates: common.important_dates,
            important_links: common.important_links,
            pattern_changed,
            pattern_change_summary: summary,
            post_type,
            source_url: source_url.to_string(),
            ai_confidence: common.confidence,
        }
    }
}

/// Parse the raw JSON text returned by the extraction service.
pub fn parse_extraction(raw: &str, post_type: PostType) -> Result<Extraction, ExtractionError> {
    let json = strip_code_fence(raw);
    let malformed = |e: serde_json::Error| ExtractionError::Malformed(e.to_string());

    let extraction = match post_type {
        PostType::JobNotification => {
            Extraction::JobNotification(serde_json::from_str(json).map_err(malformed)?)
        }
        PostType::AdmitCard => Extraction::AdmitCard(serde_json::from_str(json).map_err(malformed)?),
        PostType::Result => Extraction::Result(serde_json::from_str(json).map_err(malformed)?),
    };

    validate(extraction.common())?;
    Ok(extraction)
}

fn validate(common: &CommonFields) -> Result<(), ExtractionError> {
    if common.title.trim().is_empty() {
        return Err(ExtractionError::Malformed("title is empty".into()));
    }

    if !(0.0..=1.0).contains(&common.confidence) {
        return Err(ExtractionError::Malformed(format!(
            "confidence {} outside [0, 1]",
            common.confidence
        )));
    }

    for link in &common.important_links {
        let is_http = Url::parse(&link.url)
            .map(|u| matches!(u.scheme(), "http" | "https"))
            .unwrap_or(false);
        if !is_http {
            return Err(ExtractionError::Malformed(format!(
                "link {:?} has non-http url {:?}",
                link.label, link.url
            )));
        }
    }

    Ok(())
}

/// Models occasionally wrap JSON-mode output in a markdown fence.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Vacancy counts arrive as either `"120"` or `120`.
fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TextOrNumber {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match TextOrNumber::deserialize(deserializer)? {
        TextOrNumber::Text(s) => s,
        TextOrNumber::Number(n) => n.to_string(),
    })
}

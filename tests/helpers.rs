#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jobscout::{
    config::{DiscoverySettings, GeminiSettings},
    drafting::DraftingClient,
    entities::{NewPosting, PostType, Posting, PostingStatus, Source, SourceStatus},
    fetcher::Fetcher,
    notifications::Notifier,
    pipeline::Pipeline,
    repositories::{InsertOutcome, PostingStore, SourceRegistry},
};
use serde_json::{Value, json};
use sqlx::types::Json;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};
use uuid::Uuid;
use wiremock::ResponseTemplate;

pub const API_KEY: &str = "test-key";
pub const GENERATE_PATH: &str = "/v1beta/models/gemini-1.5-flash:generateContent";

/// Source registry kept in memory, with the same blocked guard as Postgres.
#[derive(Default)]
pub struct InMemoryRegistry {
    sources: Mutex<Vec<Source>>,
}

impl InMemoryRegistry {
    pub fn new(sources: Vec<Source>) -> Self {
        Self {
            sources: Mutex::new(sources),
        }
    }

    pub fn get(&self, id: Uuid) -> Source {
        self.sources
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .expect("source exists")
    }

    fn update(&self, id: Uuid, apply: impl FnOnce(&mut Source)) -> bool {
        let mut sources = self.sources.lock().unwrap();
        match sources
            .iter_mut()
            .find(|s| s.id == id && s.status != SourceStatus::Blocked)
        {
            Some(source) => {
                apply(source);
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl SourceRegistry for InMemoryRegistry {
    async fn list_eligible(&self) -> Result<Vec<Source>> {
        let mut eligible: Vec<Source> = self
            .sources
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.status != SourceStatus::Blocked)
            .cloned()
            .collect();
        eligible.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(eligible)
    }

    async fn mark_healthy(&self, id: Uuid, checked_at: DateTime<Utc>) -> Result<bool> {
        Ok(self.update(id, |s| {
            s.status = SourceStatus::Active;
            s.last_checked_at = Some(checked_at);
            s.error_log = None;
        }))
    }

    async fn mark_errored(
        &self,
        id: Uuid,
        checked_at: DateTime<Utc>,
        message: &str,
    ) -> Result<bool> {
        Ok(self.update(id, |s| {
            s.status = SourceStatus::Error;
            s.last_checked_at = Some(checked_at);
            s.error_log = Some(message.to_string());
        }))
    }
}

/// Posting store keyed by origin URL.
#[derive(Default)]
pub struct InMemoryStore {
    postings: Mutex<HashMap<String, Posting>>,
}

impl InMemoryStore {
    pub fn len(&self) -> usize {
        self.postings.lock().unwrap().len()
    }

    pub fn get(&self, source_url: &str) -> Option<Posting> {
        self.postings.lock().unwrap().get(source_url).cloned()
    }

    pub fn seed(&self, source_url: &str) {
        let posting = to_posting(sample_new_posting(source_url));
        self.postings
            .lock()
            .unwrap()
            .insert(source_url.to_string(), posting);
    }
}

#[async_trait]
impl PostingStore for InMemoryStore {
    async fn exists(&self, source_url: &str) -> Result<bool> {
        Ok(self.postings.lock().unwrap().contains_key(source_url))
    }

    async fn insert_draft(&self, posting: NewPosting) -> Result<InsertOutcome> {
        let mut postings = self.postings.lock().unwrap();
        if postings.contains_key(&posting.source_url) {
            return Ok(InsertOutcome::Duplicate);
        }
        let row = to_posting(posting);
        postings.insert(row.source_url.clone(), row.clone());
        Ok(InsertOutcome::Inserted(row))
    }
}

fn to_posting(p: NewPosting) -> Posting {
    Posting {
        id: Uuid::new_v4(),
        title: p.title,
        slug: p.slug,
        organization: p.organization,
        post_date: p.post_date,
        total_vacancy: p.total_vacancy,
        description: p.description,
        application_fee: p.application_fee,
        age_limit: p.age_limit,
        qualification: p.qualification,
        important_dates: Json(p.important_dates),
        important_links: Json(p.important_links),
        pattern_changed: p.pattern_changed,
        pattern_change_summary: p.pattern_change_summary,
        post_type: p.post_type,
        status: PostingStatus::Draft,
        source_url: p.source_url,
        ai_confidence: p.ai_confidence,
        created_at: Utc::now(),
    }
}

pub fn sample_new_posting(source_url: &str) -> NewPosting {
    NewPosting {
        title: "Existing notice".to_string(),
        slug: format!("existing-notice-{}", &Uuid::new_v4().simple().to_string()[..8]),
        organization: "Board".to_string(),
        post_date: "2025-01-01".to_string(),
        total_vacancy: Some("10".to_string()),
        description: "Already drafted.".to_string(),
        application_fee: None,
        age_limit: None,
        qualification: None,
        important_dates: Vec::new(),
        important_links: Vec::new(),
        pattern_changed: None,
        pattern_change_summary: None,
        post_type: PostType::JobNotification,
        source_url: source_url.to_string(),
        ai_confidence: 0.9,
    }
}

pub fn source(name: &str, url: &str, status: SourceStatus) -> Source {
    Source {
        id: Uuid::new_v4(),
        name: name.to_string(),
        url: url.to_string(),
        target_type: PostType::JobNotification,
        region: None,
        pattern: None,
        status,
        last_checked_at: None,
        error_log: None,
        created_at: Utc::now(),
    }
}

pub fn gemini_settings(base_url: &str, backoff: Duration) -> GeminiSettings {
    GeminiSettings {
        api_key: API_KEY.to_string(),
        model: "gemini-1.5-flash".to_string(),
        base_url: base_url.to_string(),
        max_retries: 3,
        backoff,
    }
}

pub fn discovery_settings() -> DiscoverySettings {
    DiscoverySettings {
        concurrency: 2,
        candidate_cap: 5,
        max_text_chars: 15_000,
        fetch_timeout: Duration::from_secs(5),
    }
}

pub fn build_pipeline(
    registry: Arc<InMemoryRegistry>,
    store: Arc<InMemoryStore>,
    gemini_base: &str,
) -> Arc<Pipeline> {
    let settings = discovery_settings();
    let extractor = DraftingClient::new(
        &gemini_settings(gemini_base, Duration::from_millis(10)),
        settings.max_text_chars,
    )
    .expect("drafting client");

    Arc::new(Pipeline::new(
        Fetcher::new(settings.fetch_timeout).expect("fetcher"),
        registry,
        store,
        Arc::new(extractor),
        Notifier::disabled(),
        settings,
    ))
}

pub fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!("<html><head><title>Notice</title></head><body>{body}</body></html>"),
        "text/html; charset=utf-8",
    )
}

/// A notice page long enough to pass the thin-content check.
pub fn notice_page(title: &str) -> ResponseTemplate {
    html(&format!(
        "<nav>Home | About</nav><main><h1>{title}</h1>\
         <p>The State Staff Selection Board invites online applications from eligible \
         candidates for the recruitment of Junior Engineers. Applications open on \
         01/07/2025 and close on 31/07/2025. Total vacancies: 120.</p></main>\
         <footer>Copyright</footer>"
    ))
}

pub fn job_extraction(title: &str) -> Value {
    json!({
        "title": title,
        "organization": "State Staff Selection Board",
        "postDate": "2025-07-01",
        "totalVacancy": "120",
        "description": "Online applications are invited for Junior Engineer posts.",
        "applicationFee": "Not Specified",
        "ageLimit": "18-32 years",
        "qualification": "Diploma in Civil Engineering",
        "importantDates": [
            {"label": "Application Start", "date": "2025-07-01"},
            {"label": "Last Date", "date": "2025-07-31"}
        ],
        "importantLinks": [
            {"label": "Apply Online", "url": "https://ssb.example.gov/apply"}
        ],
        "patternChanged": false,
        "patternChangeSummary": null,
        "confidence": 0.9
    })
}

/// `generateContent` success envelope around `extraction`.
pub fn gemini_ok(extraction: &Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [{ "text": extraction.to_string() }]
            },
            "finishReason": "STOP"
        }]
    }))
}

pub fn gemini_rate_limited() -> ResponseTemplate {
    ResponseTemplate::new(429).set_body_json(json!({
        "error": {
            "code": 429,
            "message": "Resource has been exhausted (e.g. check quota).",
            "status": "RESOURCE_EXHAUSTED"
        }
    }))
}

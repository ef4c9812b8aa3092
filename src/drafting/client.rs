use crate::{
    config::GeminiSettings,
    drafting::{
        errors::ExtractionError,
        prompt::build_prompt,
        schema::{Extraction, parse_extraction},
    },
    entities::PostType,
    extractor::{detect_language, model::truncate_chars},
    retry::{RetryError, RetryPolicy, retry_notify},
};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, instrument, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(90);

/// Turns cleaned page text into a structured posting.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExtractionService: Send + Sync {
    async fn draft(
        &self,
        text: &str,
        source_url: &str,
        post_type: PostType,
    ) -> Result<Extraction, ExtractionError>;
}

/// Gemini `generateContent` client in JSON mode.
#[derive(Clone, Debug)]
pub struct DraftingClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    max_text_chars: usize,
    retry_policy: RetryPolicy,
}

impl DraftingClient {
    pub fn new(settings: &GeminiSettings, max_text_chars: usize) -> Result<Self, ExtractionError> {
        if settings.api_key.trim().is_empty() {
            return Err(ExtractionError::Config("api key is empty".into()));
        }

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ExtractionError::Config(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: format!(
                "{}/v1beta/models/{}:generateContent",
                settings.base_url.trim_end_matches('/'),
                settings.model
            ),
            api_key: settings.api_key.clone(),
            max_text_chars,
            retry_policy: RetryPolicy::fixed(settings.max_retries, settings.backoff),
        })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry_policy
    }

    /// [`ExtractionService::draft`] with a callback invoked before every
    /// rate-limit backoff sleep.
    #[instrument(skip_all, fields(source_url = %source_url, post_type = %post_type))]
    pub async fn draft_notify<N>(
        &self,
        text: &str,
        source_url: &str,
        post_type: PostType,
        notify: N,
    ) -> Result<Extraction, ExtractionError>
    where
        N: FnMut(&ExtractionError, Duration),
    {
        let text = truncate_chars(text, self.max_text_chars);
        let language = detect_language(text);
        let prompt = build_prompt(post_type, text, source_url, language.as_ref());

        let raw = retry_notify(
            self.retry_policy,
            || self.generate(&prompt),
            ExtractionError::is_rate_limit,
            notify,
        )
        .await
        .map_err(|e| match e {
            RetryError::Exhausted { attempts, .. } => ExtractionError::RateLimited { attempts },
            RetryError::Permanent { error, .. } => error,
        })?;

        parse_extraction(&raw, post_type)
    }

    /// One `generateContent` call. Returns the candidate's JSON text.
    async fn generate(&self, prompt: &str) -> Result<String, ExtractionError> {
        let body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "temperature": 0.1
            }
        });

        let response = self
            .http
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(ExtractionError::from_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ExtractionError::Api {
                status: status.as_u16(),
                message: api_error_message(&text, status),
            });
        }

        let payload: GenerateContentResponse = response
            .json()
            .await
            .map_err(ExtractionError::from_reqwest_error)?;
        debug!(candidates = payload.candidates.len(), "generateContent response");

        payload.into_text()
    }
}

#[async_trait]
impl ExtractionService for DraftingClient {
    async fn draft(
        &self,
        text: &str,
        source_url: &str,
        post_type: PostType,
    ) -> Result<Extraction, ExtractionError> {
        self.draft_notify(text, source_url, post_type, |error, delay| {
            warn!(
                error = %error,
                delay_secs = delay.as_secs(),
                "extraction service rate limited, backing off"
            );
        })
        .await
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GenerateContentResponse {
    fn into_text(self) -> Result<String, ExtractionError> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(ExtractionError::Blocked(format!("prompt blocked: {reason}")));
        }

        let Some(candidate) = self.candidates.into_iter().next() else {
            return Err(ExtractionError::Blocked("no candidates returned".into()));
        };

        if let Some(reason) = candidate.finish_reason.as_deref()
            && matches!(reason, "SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT")
        {
            return Err(ExtractionError::Blocked(format!("candidate finished with {reason}")));
        }

        candidate
            .content
            .into_iter()
            .flat_map(|c| c.parts)
            .find_map(|p| p.text)
            .ok_or_else(|| ExtractionError::Malformed("candidate has no text part".into()))
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
    status: Option<String>,
}

/// `"<STATUS>: <message>"` from a Google API error body, else the HTTP reason.
fn api_error_message(body: &str, status: reqwest::StatusCode) -> String {
    match serde_json::from_str::<ApiErrorEnvelope>(body) {
        Ok(ApiErrorEnvelope { error }) => match (error.status, error.message) {
            (Some(s), Some(m)) => format!("{s}: {m}"),
            (Some(s), None) => s,
            (None, Some(m)) => m,
            (None, None) => status.to_string(),
        },
        Err(_) => status.to_string(),
    }
}

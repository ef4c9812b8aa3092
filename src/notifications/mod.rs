//! Best-effort alerts sent after a draft is created.
//!
//! Every configured sink gets the message. Failures are retried on 429/5xx,
//! then logged and dropped; they never affect the draft.

pub mod telegram;
pub mod whatsapp;

use crate::{
    config::NotificationSettings,
    entities::Posting,
    retry::{RetryPolicy, retry_notify},
};
use async_trait::async_trait;
use std::{sync::Arc, time::Duration};
use thiserror::Error;
use tracing::{debug, info, warn};

pub use telegram::TelegramSink;
pub use whatsapp::WhatsAppSink;

const DELIVERY_ATTEMPTS: u32 = 3;
const DELIVERY_BASE_BACKOFF: Duration = Duration::from_millis(500);
const SINK_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("{sink} returned {status}: {body}")]
    Http {
        sink: &'static str,
        status: u16,
        body: String,
    },

    #[error("{sink} request failed: {message}")]
    Transport { sink: &'static str, message: String },
}

impl NotifyError {
    /// 429 and server errors are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            NotifyError::Http { status, .. } => *status == 429 || (500..600).contains(status),
            NotifyError::Transport { .. } => false,
        }
    }
}

/// What a reviewer needs to know about a fresh draft.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftNotice {
    pub title: String,
    pub organization: String,
    pub confidence: f64,
    pub dashboard_url: String,
}

impl DraftNotice {
    pub fn for_posting(posting: &Posting, dashboard_url: &str) -> Self {
        Self {
            title: posting.title.clone(),
            organization: posting.organization.clone(),
            confidence: posting.ai_confidence,
            dashboard_url: dashboard_url.to_string(),
        }
    }

    fn confidence_pct(&self) -> u32 {
        (self.confidence.clamp(0.0, 1.0) * 100.0).round() as u32
    }

    /// Telegram legacy Markdown. Dynamic values are escaped.
    pub fn markdown(&self) -> String {
        format!(
            "*New draft ready for review*\n\n*Title:* {}\n*Organization:* {}\n*Confidence:* {}%\n\n[Open dashboard]({})",
            escape_markdown(&self.title),
            escape_markdown(&self.organization),
            self.confidence_pct(),
            self.dashboard_url
        )
    }

    pub fn plain(&self) -> String {
        format!(
            "New draft ready for review\nTitle: {}\nOrganization: {}\nConfidence: {}%\nDashboard: {}",
            self.title,
            self.organization,
            self.confidence_pct(),
            self.dashboard_url
        )
    }
}

fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '_' | '*' | '[' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationSink: Send + Sync {
    fn name(&self) -> &'static str;

    /// One delivery attempt.
    async fn send(&self, notice: &DraftNotice) -> Result<(), NotifyError>;
}

/// Fan-out over the configured sinks.
#[derive(Clone)]
pub struct Notifier {
    sinks: Vec<Arc<dyn NotificationSink>>,
    dashboard_url: String,
    retry_policy: RetryPolicy,
}

impl Notifier {
    pub fn new(sinks: Vec<Arc<dyn NotificationSink>>, dashboard_url: impl Into<String>) -> Self {
        Self {
            sinks,
            dashboard_url: dashboard_url.into(),
            retry_policy: RetryPolicy::exponential(DELIVERY_ATTEMPTS, DELIVERY_BASE_BACKOFF),
        }
    }

    /// No sinks; every call is a no-op.
    pub fn disabled() -> Self {
        Self::new(Vec::new(), String::new())
    }

    /// Sinks whose credentials are present. Missing credentials disable that
    /// sink only.
    pub fn from_settings(settings: &NotificationSettings) -> Result<Self, NotifyError> {
        let http = reqwest::Client::builder()
            .timeout(SINK_TIMEOUT)
            .build()
            .map_err(|e| NotifyError::Transport {
                sink: "notifier",
                message: e.to_string(),
            })?;

        let mut sinks: Vec<Arc<dyn NotificationSink>> = Vec::new();
        match &settings.telegram {
            Some(telegram) => sinks.push(Arc::new(TelegramSink::new(http.clone(), telegram))),
            None => debug!("telegram not configured, skipping sink"),
        }
        match &settings.whatsapp {
            Some(whatsapp) => sinks.push(Arc::new(WhatsAppSink::new(http.clone(), whatsapp))),
            None => debug!("whatsapp not configured, skipping sink"),
        }

        Ok(Self::new(sinks, settings.dashboard_url.clone()))
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    pub fn is_enabled(&self) -> bool {
        !self.sinks.is_empty()
    }

    /// Deliver to every sink. Returns how many sinks accepted the message.
    pub async fn notify_posting(&self, posting: &Posting) -> usize {
        if self.sinks.is_empty() {
            return 0;
        }
        let notice = DraftNotice::for_posting(posting, &self.dashboard_url);
        self.notify(&notice).await
    }

    pub async fn notify(&self, notice: &DraftNotice) -> usize {
        let mut delivered = 0;

        for sink in &self.sinks {
            let result = retry_notify(
                self.retry_policy,
                || sink.send(notice),
                NotifyError::is_retryable,
                |error, delay| {
                    debug!(sink = sink.name(), error = %error, delay_ms = delay.as_millis() as u64, "retrying notification");
                },
            )
            .await;

            match result {
                Ok(()) => {
                    info!(sink = sink.name(), "notification sent");
                    delivered += 1;
                }
                Err(e) => {
                    let attempts = e.attempts();
                    warn!(sink = sink.name(), attempts, error = %e.into_inner(), "notification failed");
                }
            }
        }

        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notice() -> DraftNotice {
        DraftNotice {
            title: "SSC_CGL *2025*".into(),
            organization: "Staff Selection Commission".into(),
            confidence: 0.876,
            dashboard_url: "http://localhost:3000/admin/dashboard".into(),
        }
    }

    fn fast(notifier: Notifier) -> Notifier {
        notifier.with_retry_policy(RetryPolicy::exponential(3, Duration::ZERO))
    }

    #[test]
    fn test_markdown_escapes_values() {
        let text = notice().markdown();
        assert!(text.contains("*Title:* SSC\\_CGL \\*2025\\*"));
        assert!(text.contains("*Confidence:* 88%"));
        assert!(text.ends_with("[Open dashboard](http://localhost:3000/admin/dashboard)"));
    }

    #[test]
    fn test_plain_text() {
        let text = notice().plain();
        assert!(text.contains("Title: SSC_CGL *2025*"));
        assert!(text.contains("Dashboard: http://localhost:3000/admin/dashboard"));
    }

    #[test]
    fn test_retryable_statuses() {
        let http = |status| NotifyError::Http {
            sink: "test",
            status,
            body: String::new(),
        };
        assert!(http(429).is_retryable());
        assert!(http(503).is_retryable());
        assert!(!http(400).is_retryable());
        assert!(
            !NotifyError::Transport {
                sink: "test",
                message: "dns".into()
            }
            .is_retryable()
        );
    }

    #[tokio::test]
    async fn test_disabled_notifier_is_noop() {
        let notifier = Notifier::disabled();
        assert!(!notifier.is_enabled());
        assert_eq!(notifier.notify(&notice()).await, 0);
    }

    #[tokio::test]
    async fn test_retries_server_errors_then_succeeds() {
        let mut sink = MockNotificationSink::new();
        sink.expect_name().return_const("mock");
        let mut seq = mockall::Sequence::new();
        sink.expect_send()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Err(NotifyError::Http {
                    sink: "mock",
                    status: 502,
                    body: "bad gateway".into(),
                })
            });
        sink.expect_send()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        let notifier = fast(Notifier::new(vec![Arc::new(sink)], "http://dash"));
        assert_eq!(notifier.notify(&notice()).await, 1);
    }

    #[tokio::test]
    async fn test_failing_sink_does_not_stop_others() {
        let mut broken = MockNotificationSink::new();
        broken.expect_name().return_const("broken");
        broken.expect_send().times(3).returning(|_| {
            Err(NotifyError::Http {
                sink: "broken",
                status: 429,
                body: String::new(),
            })
        });

        let mut healthy = MockNotificationSink::new();
        healthy.expect_name().return_const("healthy");
        healthy.expect_send().times(1).returning(|_| Ok(()));

        let notifier = fast(Notifier::new(
            vec![Arc::new(broken), Arc::new(healthy)],
            "http://dash",
        ));
        assert_eq!(notifier.notify(&notice()).await, 1);
    }

    #[tokio::test]
    async fn test_client_errors_are_not_retried() {
        let mut sink = MockNotificationSink::new();
        sink.expect_name().return_const("mock");
        sink.expect_send().times(1).returning(|_| {
            Err(NotifyError::Http {
                sink: "mock",
                status: 401,
                body: "Unauthorized".into(),
            })
        });

        let notifier = fast(Notifier::new(vec![Arc::new(sink)], "http://dash"));
        assert_eq!(notifier.notify(&notice()).await, 0);
    }
}

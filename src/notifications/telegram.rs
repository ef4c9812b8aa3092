use super::{DraftNotice, NotificationSink, NotifyError};
use crate::config::TelegramSettings;
use async_trait::async_trait;
use serde_json::json;

const TELEGRAM_API: &str = "https://api.telegram.org";
const SINK: &str = "telegram";

/// Bot API `sendMessage` to one chat.
pub struct TelegramSink {
    http: reqwest::Client,
    api_base: String,
    bot_token: String,
    chat_id: String,
}

impl TelegramSink {
    pub fn new(http: reqwest::Client, settings: &TelegramSettings) -> Self {
        Self {
            http,
            api_base: TELEGRAM_API.to_string(),
            bot_token: settings.bot_token.clone(),
            chat_id: settings.chat_id.clone(),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.api_base.trim_end_matches('/'),
            self.bot_token
        )
    }
}

#[async_trait]
impl NotificationSink for TelegramSink {
    fn name(&self) -> &'static str {
        SINK
    }

    async fn send(&self, notice: &DraftNotice) -> Result<(), NotifyError> {
        let body = json!({
            "chat_id": self.chat_id,
            "text": notice.markdown(),
            "parse_mode": "Markdown",
        });

        let response = self
            .http
            .post(self.endpoint())
            .json(&body)
            .send()
            .await
            .map_err(|e| NotifyError::Transport {
                sink: SINK,
                message: e.without_url().to_string(),
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        Err(NotifyError::Http {
            sink: SINK,
            status: status.as_u16(),
            body: response.text().await.unwrap_or_default(),
        })
    }
}

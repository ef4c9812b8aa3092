use super::{DraftNotice, NotificationSink, NotifyError};
use crate::config::WhatsAppSettings;
use async_trait::async_trait;
use url::Url;

const CALLMEBOT_API: &str = "https://api.callmebot.com/whatsapp.php";
const SINK: &str = "whatsapp";

/// WhatsApp delivery through the CallMeBot gateway.
pub struct WhatsAppSink {
    http: reqwest::Client,
    endpoint: String,
    phone: String,
    api_key: String,
}

impl WhatsAppSink {
    pub fn new(http: reqwest::Client, settings: &WhatsAppSettings) -> Self {
        Self {
            http,
            endpoint: CALLMEBOT_API.to_string(),
            phone: settings.phone.clone(),
            api_key: settings.api_key.clone(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn request_url(&self, text: &str) -> Result<Url, NotifyError> {
        Url::parse_with_params(
            &self.endpoint,
            &[
                ("phone", self.phone.as_str()),
                ("text", text),
                ("apikey", self.api_key.as_str()),
            ],
        )
        .map_err(|e| NotifyError::Transport {
            sink: SINK,
            message: format!("invalid endpoint: {e}"),
        })
    }
}

#[async_trait]
impl NotificationSink for WhatsAppSink {
    fn name(&self) -> &'static str {
        SINK
    }

    async fn send(&self, notice: &DraftNotice) -> Result<(), NotifyError> {
        let url = self.request_url(&notice.plain())?;

        let response = self
            .http
            .get(url)
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

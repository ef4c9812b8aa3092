use crate::fetcher::{charset::decode_body, errors::FetchError, types::PageResponse};
use once_cell::sync::Lazy;
use reqwest::{
    Client, ClientBuilder,
    header::{self, HeaderMap, HeaderValue},
};
use std::time::Duration;
use tracing::{debug, instrument};

const MAX_BODY_SIZE: u64 = 5 * 1024 * 1024; // 5MB
const MAX_REDIRECTS: usize = 10;
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Headers a desktop Chrome sends on a top-level navigation. Many notice
/// boards reject anything that looks like a script.
static BROWSER_HEADERS: Lazy<HeaderMap> = Lazy::new(|| {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-US,en;q=0.9"),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(
        "sec-ch-ua",
        HeaderValue::from_static(
            "\"Not_A Brand\";v=\"8\", \"Chromium\";v=\"120\", \"Google Chrome\";v=\"120\"",
        ),
    );
    headers.insert("sec-ch-ua-mobile", HeaderValue::from_static("?0"));
    headers.insert("sec-ch-ua-platform", HeaderValue::from_static("\"Windows\""));
    headers.insert("sec-fetch-dest", HeaderValue::from_static("document"));
    headers.insert("sec-fetch-mode", HeaderValue::from_static("navigate"));
    headers.insert("sec-fetch-site", HeaderValue::from_static("none"));
    headers.insert("sec-fetch-user", HeaderValue::from_static("?1"));
    headers.insert(
        header::UPGRADE_INSECURE_REQUESTS,
        HeaderValue::from_static("1"),
    );
    headers
});

/// Live page reader. Holds one pooled client; cheap to clone.
#[derive(Clone, Debug)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Build a fetcher with the given overall request timeout.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = ClientBuilder::new()
            .connect_timeout(Duration::from_secs(10).min(timeout))
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .default_headers(BROWSER_HEADERS.clone())
            .build()
            .map_err(|e| FetchError::Unknown(format!("failed to build http client: {}", e)))?;

        Ok(Self { client })
    }

    /// GET `url` and decode the body. Every call is a live read: no response
    /// cache sits in front of the client and `no-cache` is always sent.
    #[instrument(skip_all, fields(url = %url))]
    pub async fn fetch(&self, url: &str) -> Result<PageResponse, FetchError> {
        let parsed_url = url::Url::parse(url)?;

        let response = self
            .client
            .get(parsed_url)
            .send()
            .await
            .map_err(FetchError::from_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http { status });
        }

        // Check content length before downloading
        if let Some(content_length) = response.content_length()
            && content_length > MAX_BODY_SIZE
        {
            return Err(FetchError::BodyTooLarge(content_length));
        }

        let url_final = response.url().clone();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|ct| ct.to_str().ok())
            .unwrap_or("text/html")
            .to_ascii_lowercase();

        if !is_textual(&content_type) {
            return Err(FetchError::UnsupportedContentType(content_type));
        }

        let body_bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::Io(e.to_string()))?;

        // Check body size after download (in case Content-Length was missing)
        if body_bytes.len() as u64 > MAX_BODY_SIZE {
            return Err(FetchError::BodyTooLarge(body_bytes.len() as u64));
        }

        let (body_utf8, encoding) = decode_body(&content_type, &body_bytes);

        debug!(
            url_final = %url_final,
            bytes = body_bytes.len(),
            encoding = encoding.name(),
            "page fetched"
        );

        Ok(PageResponse {
            url_final,
            body_utf8,
            encoding,
        })
    }
}

fn is_textual(content_type: &str) -> bool {
    content_type.contains("text/html")
        || content_type.contains("application/xhtml")
        || content_type.contains("text/plain")
}

use crate::{
    drafting::ExtractionService,
    fetcher::Fetcher,
    repositories::{PgPostingStore, PostingStore},
};
use sqlx::{Pool, Postgres};
use std::{sync::Arc, time::Duration};

/// Upper bound on the extraction call inside a request, retries included.
pub const DEFAULT_EXTRACTION_TIMEOUT: Duration = Duration::from_secs(45);

#[derive(Clone)]
pub struct AppState {
    pub db_pool: Pool<Postgres>,
    pub postings: Arc<dyn PostingStore>,
    pub extractor: Arc<dyn ExtractionService>,
    pub fetcher: Fetcher,
    pub max_text_chars: usize,
    pub extraction_timeout: Duration,
}

impl AppState {
    pub fn new(
        pool: Pool<Postgres>,
        fetcher: Fetcher,
        extractor: Arc<dyn ExtractionService>,
        max_text_chars: usize,
    ) -> Self {
        Self {
            postings: Arc::new(PgPostingStore::new(pool.clone())),
            db_pool: pool,
            extractor,
            fetcher,
            max_text_chars,
            extraction_timeout: DEFAULT_EXTRACTION_TIMEOUT,
        }
    }

    pub fn with_extraction_timeout(mut self, timeout: Duration) -> Self {
        self.extraction_timeout = timeout;
        self
    }
}

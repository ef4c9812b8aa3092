use crate::{drafting::ExtractionError, extractor::LinkFilterError, fetcher::FetchError};
use thiserror::Error;

/// Fails a whole source. The message lands in the source's `error_log`.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    InvalidPattern(#[from] LinkFilterError),
}

/// Fails one candidate. The source is unaffected.
#[derive(Debug, Error)]
pub enum CandidateError {
    #[error("posting lookup failed: {0}")]
    Lookup(#[source] anyhow::Error),

    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("page text too thin to draft ({chars} chars)")]
    ThinContent { chars: usize },

    #[error("extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("saving draft failed: {0}")]
    Persist(#[source] anyhow::Error),
}

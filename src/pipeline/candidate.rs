use super::{CandidateError, Pipeline};
use crate::{
    entities::Source,
    extractor::{extract_text, reject::should_reject},
    repositories::InsertOutcome,
};
use tracing::{debug, info, instrument};
use url::Url;
use uuid::Uuid;

/// What happened to one candidate URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateOutcome {
    /// A posting already existed for the URL; nothing was fetched.
    SkippedExisting,
    Drafted { posting_id: Uuid },
    /// Lost the insert race to another writer.
    Duplicate,
}

impl Pipeline {
    /// Dedup check, fetch, clean, extract, insert, notify.
    #[instrument(skip_all, fields(url = %url))]
    pub(crate) async fn process_candidate(
        &self,
        source: &Source,
        url: &Url,
    ) -> Result<CandidateOutcome, CandidateError> {
        let origin = url.as_str();

        if self
            .store
            .exists(origin)
            .await
            .map_err(CandidateError::Lookup)?
        {
            debug!("posting already exists, skipping");
            return Ok(CandidateOutcome::SkippedExisting);
        }

        let page = self.fetcher.fetch(origin).await?;
        let text = extract_text(&page.body_utf8, self.settings.max_text_chars);
        if should_reject(&text) {
            return Err(CandidateError::ThinContent {
                chars: text.chars().count(),
            });
        }

        let extraction = self
            .extractor
            .draft(&text, origin, source.target_type)
            .await?;
        let confidence = extraction.confidence();

        match self
            .store
            .insert_draft(extraction.into_new_posting(origin))
            .await
            .map_err(CandidateError::Persist)?
        {
            InsertOutcome::Inserted(posting) => {
                info!(
                    posting_id = %posting.id,
                    slug = %posting.slug,
                    confidence,
                    "draft created"
                );
                self.notifier.notify_posting(&posting).await;
                Ok(CandidateOutcome::Drafted {
                    posting_id: posting.id,
                })
            }
            InsertOutcome::Duplicate => {
                debug!("posting inserted concurrently, treating as duplicate");
                Ok(CandidateOutcome::Duplicate)
            }
        }
    }
}

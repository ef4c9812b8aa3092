use super::{
    CandidateError, SourceError,
    candidate::CandidateOutcome,
    report::{CandidateCounts, RunReport, SourceOutcome, SourceReport},
};
use crate::{
    config::DiscoverySettings,
    drafting::ExtractionService,
    entities::{Source, SourceStatus},
    extractor::{LinkFilter, extract_links},
    fetcher::Fetcher,
    notifications::Notifier,
    repositories::{PostingStore, SourceRegistry},
};
use chrono::Utc;
use std::{sync::Arc, time::Instant};
use tokio::{signal, sync::Semaphore, task::JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, info_span, warn};

/// One discovery run over the source registry.
pub struct Pipeline {
    pub(crate) fetcher: Fetcher,
    pub(crate) registry: Arc<dyn SourceRegistry>,
    pub(crate) store: Arc<dyn PostingStore>,
    pub(crate) extractor: Arc<dyn ExtractionService>,
    pub(crate) notifier: Notifier,
    pub(crate) settings: DiscoverySettings,
    shutdown_token: CancellationToken,
}

impl Pipeline {
    pub fn new(
        fetcher: Fetcher,
        registry: Arc<dyn SourceRegistry>,
        store: Arc<dyn PostingStore>,
        extractor: Arc<dyn ExtractionService>,
        notifier: Notifier,
        settings: DiscoverySettings,
    ) -> Self {
        Self {
            fetcher,
            registry,
            store,
            extractor,
            notifier,
            settings,
            shutdown_token: CancellationToken::new(),
        }
    }

    /// Cancelling this token stops new sources from starting. Sources
    /// already in flight finish.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown_token.clone()
    }

    /// Cancel the run on ctrl-c.
    pub fn spawn_shutdown_listener(&self) {
        let shutdown_token = self.shutdown_token.clone();
        tokio::spawn(async move {
            if let Err(e) = signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
                return;
            }
            info!("Received shutdown signal, finishing in-flight sources...");
            shutdown_token.cancel();
        });
    }

    /// Load the eligible sources and run over them. Fails only when the
    /// registry cannot be read.
    pub async fn run_once(self: &Arc<Self>) -> anyhow::Result<RunReport> {
        let sources = self.registry.list_eligible().await?;
        info!(sources = sources.len(), "loaded source registry");
        Ok(self.run(sources).await)
    }

    /// Process `sources` with bounded parallelism. Never fails: every source
    /// and candidate error is recorded in the report instead.
    pub async fn run(self: &Arc<Self>, sources: Vec<Source>) -> RunReport {
        let mut report = RunReport::new(Utc::now());
        let concurrency = self.settings.concurrency.max(1);
        let semaphore = Arc::new(Semaphore::new(concurrency));
        let mut tasks = JoinSet::new();
        let total = sources.len();

        info!(sources = total, concurrency, "starting discovery run");

        let mut pending = sources.into_iter();
        while let Some(source) = pending.next() {
            if source.status == SourceStatus::Blocked {
                warn!(source = %source.name, "skipping blocked source");
                report.skipped_blocked += 1;
                continue;
            }

            let permit = tokio::select! {
                biased;
                _ = self.shutdown_token.cancelled() => None,
                permit = semaphore.clone().acquire_owned() => permit.ok(),
            };
            let Some(permit) = permit else {
                let (blocked, unstarted): (Vec<_>, Vec<_>) =
                    pending.by_ref().partition(|s| s.status == SourceStatus::Blocked);
                report.skipped_blocked += blocked.len();
                report.not_started = 1 + unstarted.len();
                warn!(not_started = report.not_started, "run cancelled before all sources started");
                break;
            };

            let pipeline = Arc::clone(self);
            let span = info_span!("source", id = %source.id, name = %source.name);
            tasks.spawn(
                async move {
                    let _permit = permit; // Hold permit until the source completes
                    pipeline.process_source(source).await
                }
                .instrument(span),
            );
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(source_report) => report.sources.push(source_report),
                Err(e) => error!("source task panicked: {}", e),
            }
        }

        report.finished_at = Some(Utc::now());
        report.log_summary();
        report
    }

    /// Discover one source and record its health. Candidate failures do not
    /// change the outcome.
    async fn process_source(&self, source: Source) -> SourceReport {
        let started = Instant::now();
        let mut counts = CandidateCounts::default();

        let outcome = match self.discover(&source, &mut counts).await {
            Ok(()) => {
                if let Err(e) = self.registry.mark_healthy(source.id, Utc::now()).await {
                    error!("Failed to mark source healthy: {}", e);
                }
                SourceOutcome::Healthy
            }
            Err(source_error) => {
                let message = source_error.to_string();
                warn!(error = %message, "source failed");
                if let Err(e) = self
                    .registry
                    .mark_errored(source.id, Utc::now(), &message)
                    .await
                {
                    error!("Failed to mark source errored: {}", e);
                }
                SourceOutcome::Errored(message)
            }
        };

        SourceReport {
            source_id: source.id,
            name: source.name,
            outcome,
            candidates: counts,
            elapsed_ms: started.elapsed().as_millis() as u64,
        }
    }

    async fn discover(
        &self,
        source: &Source,
        counts: &mut CandidateCounts,
    ) -> Result<(), SourceError> {
        let filter = LinkFilter::new(source.pattern.as_deref(), self.settings.candidate_cap)?;
        let page = self.fetcher.fetch(&source.url).await?;
        let candidates = extract_links(&page.body_utf8, &page.url_final, &filter);

        info!(candidates = candidates.len(), "discovered candidate links");

        for url in &candidates {
            counts.seen += 1;
            match self.process_candidate(source, url).await {
                Ok(CandidateOutcome::SkippedExisting) => counts.skipped_existing += 1,
                Ok(CandidateOutcome::Drafted { .. }) => counts.drafted += 1,
                Ok(CandidateOutcome::Duplicate) => counts.duplicate += 1,
                Err(e) => {
                    counts.failed += 1;
                    log_candidate_error(url.as_str(), &e);
                }
            }
        }

        Ok(())
    }
}

fn log_candidate_error(url: &str, error: &CandidateError) {
    match error {
        CandidateError::ThinContent { .. } => debug!(url, error = %error, "candidate skipped"),
        _ => warn!(url, error = %error, "candidate failed"),
    }
}

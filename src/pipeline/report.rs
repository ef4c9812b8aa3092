use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

/// Per-candidate tallies for one source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CandidateCounts {
    pub seen: usize,
    pub skipped_existing: usize,
    pub drafted: usize,
    pub duplicate: usize,
    pub failed: usize,
}

impl CandidateCounts {
    fn add(&mut self, other: &CandidateCounts) {
        self.seen += other.seen;
        self.skipped_existing += other.skipped_existing;
        self.drafted += other.drafted;
        self.duplicate += other.duplicate;
        self.failed += other.failed;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "error", rename_all = "snake_case")]
pub enum SourceOutcome {
    Healthy,
    Errored(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceReport {
    pub source_id: Uuid,
    pub name: String,
    pub outcome: SourceOutcome,
    pub candidates: CandidateCounts,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunTotals {
    pub sources_ok: usize,
    pub sources_errored: usize,
    pub sources_skipped_blocked: usize,
    pub sources_not_started: usize,
    pub candidates: CandidateCounts,
}

/// Summary of one discovery run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub sources: Vec<SourceReport>,
    pub skipped_blocked: usize,
    /// Sources never started because the run was cancelled.
    pub not_started: usize,
}

impl RunReport {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            finished_at: None,
            sources: Vec::new(),
            skipped_blocked: 0,
            not_started: 0,
        }
    }

    pub fn source(&self, id: Uuid) -> Option<&SourceReport> {
        self.sources.iter().find(|s| s.source_id == id)
    }

    pub fn totals(&self) -> RunTotals {
        let mut totals = RunTotals {
            sources_skipped_blocked: self.skipped_blocked,
            sources_not_started: self.not_started,
            ..RunTotals::default()
        };
        for source in &self.sources {
            match source.outcome {
                SourceOutcome::Healthy => totals.sources_ok += 1,
                SourceOutcome::Errored(_) => totals.sources_errored += 1,
            }
            totals.candidates.add(&source.candidates);
        }
        totals
    }

    pub fn log_summary(&self) {
        let totals = self.totals();
        let elapsed_ms = self
            .finished_at
            .map(|end| (end - self.started_at).num_milliseconds())
            .unwrap_or_default();

        info!(
            sources_ok = totals.sources_ok,
            sources_errored = totals.sources_errored,
            sources_skipped_blocked = totals.sources_skipped_blocked,
            sources_not_started = totals.sources_not_started,
            candidates_seen = totals.candidates.seen,
            skipped_existing = totals.candidates.skipped_existing,
            drafted = totals.candidates.drafted,
            duplicate = totals.candidates.duplicate,
            failed = totals.candidates.failed,
            elapsed_ms,
            "discovery run finished"
        );
    }
}

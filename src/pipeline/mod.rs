//! The discovery run: sources → candidate links → drafts.

pub mod candidate;
pub mod errors;
pub mod report;
pub mod runner;

pub use candidate::CandidateOutcome;
pub use errors::{CandidateError, SourceError};
pub use report::{CandidateCounts, RunReport, RunTotals, SourceOutcome, SourceReport};
pub use runner::Pipeline;

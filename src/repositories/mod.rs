pub mod postings;
pub mod sources;

pub use postings::{InsertOutcome, PgPostingStore, PostingStore};
pub use sources::{PgSourceRegistry, SourceRegistry};

pub mod client;
pub mod errors;
pub mod prompt;
pub mod schema;
pub mod slug;

pub use client::{DraftingClient, ExtractionService};
pub use errors::ExtractionError;
pub use schema::{CommonFields, ExamNoticeFields, Extraction, JobNotificationFields, NOT_SPECIFIED};
pub use slug::posting_slug;

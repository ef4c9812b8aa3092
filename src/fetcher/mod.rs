pub mod charset;
pub mod client;
pub mod errors;
pub mod types;

pub use client::Fetcher;
pub use errors::FetchError;
pub use types::PageResponse;

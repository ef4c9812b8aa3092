pub mod app_state;
pub mod config;
pub mod drafting;
pub mod drafts;
pub mod entities;
pub mod extractor;
pub mod fetcher;
pub mod health;
pub mod middleware;
pub mod notifications;
pub mod pipeline;
pub mod repositories;
pub mod retry;
pub mod router;

//! Turning fetched HTML into candidate links and bounded plain text.

pub mod content;
pub mod language;
pub mod links;
pub mod model;
pub mod reject;

#[cfg(test)]
mod tests;

pub use content::{extract_page, extract_text};
pub use language::{DetectedLanguage, detect_language};
pub use links::{LinkFilter, LinkFilterError, extract_links};
pub use model::PageText;

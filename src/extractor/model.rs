use serde::{Deserialize, Serialize};

/// Cleaned text of a fetched page, ready for the extraction service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageText {
    /// First non-empty `<h1>`, falling back to `<title>`. May be empty.
    pub title: String,
    /// Boilerplate-free text with whitespace collapsed, already bounded.
    pub text: String,
}

/// Collapse every run of whitespace (including newlines) to one space.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate to at most `max_chars` characters, never splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

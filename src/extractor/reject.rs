/// Below this many characters of cleaned text there is nothing worth sending
/// to the extraction service (login walls, empty frames, redirect stubs).
pub const MIN_CONTENT_CHARS: usize = 80;
const MIN_WORD_COUNT: usize = 12;

/// True when a candidate page is too thin to draft from.
pub fn should_reject(text: &str) -> bool {
    if text.chars().count() < MIN_CONTENT_CHARS {
        return true;
    }

    text.split_whitespace().count() < MIN_WORD_COUNT
}

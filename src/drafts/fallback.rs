use crate::{
    drafting::{NOT_SPECIFIED, posting_slug},
    entities::{NewPosting, PostType},
    extractor::PageText,
};
use chrono::NaiveDate;

/// Confidence recorded on drafts built without the extraction service.
pub const FALLBACK_CONFIDENCE: f64 = 0.1;

const DESCRIPTION_CHARS: usize = 200;

/// Crude draft from the page itself so a reviewer can still pick it up.
pub fn fallback_posting(
    page: &PageText,
    source_url: &str,
    post_type: PostType,
    today: NaiveDate,
) -> NewPosting {
    let title = if page.title.trim().is_empty() {
        "Untitled notice".to_string()
    } else {
        page.title.clone()
    };

    let mut description: String = page.text.chars().take(DESCRIPTION_CHARS).collect();
    if page.text.chars().count() > DESCRIPTION_CHARS {
        description.push_str("...");
    }

    let applies = |applicable: bool| applicable.then(|| NOT_SPECIFIED.to_string());
    let is_job = post_type == PostType::JobNotification;

    NewPosting {
        slug: posting_slug(&title, source_url),
        title,
        organization: NOT_SPECIFIED.to_string(),
        post_date: today.format("%Y-%m-%d").to_string(),
        total_vacancy: Some(NOT_SPECIFIED.to_string()),
        description,
        application_fee: applies(is_job),
        age_limit: applies(is_job),
        qualification: applies(is_job),
        important_dates: Vec::new(),
        important_links: Vec::new(),
        pattern_changed: None,
        pattern_change_summary: None,
        post_type,
        source_url: source_url.to_string(),
        ai_confidence: FALLBACK_CONFIDENCE,
    }
}

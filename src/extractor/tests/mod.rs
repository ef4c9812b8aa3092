use std::collections::HashSet;
use std::fs;
use url::Url;

use crate::extractor::{LinkFilter, extract_links, extract_page, reject};

fn fixture(name: &str) -> String {
    fs::read_to_string(format!("src/extractor/tests/fixtures/{}", name))
        .expect("Failed to read test fixture")
}

#[test]
fn test_notice_board_candidates() {
    let html = fixture("notice_board.html");
    let base = Url::parse("https://ssb.example.gov/notices/index.html").unwrap();

    let links = extract_links(&html, &base, &LinkFilter::new(None, 10).unwrap());
    let links: Vec<&str> = links.iter().map(Url::as_str).collect();

    assert_eq!(
        links,
        vec![
            "https://ssb.example.gov/recruitment",
            "https://ssb.example.gov/notices/uploads/Advertisement_CGL_2025.pdf",
            "https://ssb.example.gov/notices/steno-recruitment-2025",
            "https://results.example.gov/chsl/Result-2024.html",
            "https://ssb.example.gov/admit-card/mts",
        ]
    );
}

#[test]
fn test_notice_board_respects_default_cap_and_pattern() {
    let html = fixture("notice_board.html");
    let base = Url::parse("https://ssb.example.gov/notices/index.html").unwrap();

    let capped = extract_links(&html, &base, &LinkFilter::new(None, 2).unwrap());
    assert_eq!(capped.len(), 2);

    let only_notices = LinkFilter::new(Some(r"^https://ssb\.example\.gov/notices/"), 5).unwrap();
    let links = extract_links(&html, &base, &only_notices);
    let unique: HashSet<_> = links.iter().collect();
    assert_eq!(links.len(), 2);
    assert_eq!(unique.len(), 2);
}

#[test]
fn test_notice_page_text() {
    let html = fixture("notice.html");
    let page = extract_page(&html, 15_000);

    assert_eq!(page.title, "Stenographer Grade C & D Recruitment 2025");
    assert!(page.text.starts_with("Stenographer Grade C & D Recruitment 2025"));
    assert!(page.text.contains("Last Date for Apply Online: 17/08/2025"));
    assert!(!page.text.contains("Home"));
    assert!(!page.text.contains("trackPageView"));
    assert!(!page.text.contains("All rights reserved"));
    assert!(!page.text.contains("font-size"));
    assert!(!page.text.contains("  "));
    assert!(!reject::should_reject(&page.text));
}

#[test]
fn test_notice_page_text_is_bounded() {
    let html = fixture("notice.html");
    let page = extract_page(&html, 40);
    assert_eq!(page.text.chars().count(), 40);
}

#[cfg(feature = "fuzz")]
mod fuzz {
    use crate::extractor::extract_text;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_extract_never_panics_and_is_bounded(html in ".*", max in 0usize..200) {
            let text = extract_text(&html, max);
            prop_assert!(text.chars().count() <= max);
            prop_assert!(!text.contains("  "));
        }
    }
}

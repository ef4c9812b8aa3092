use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use thiserror::Error;
use url::Url;

/// Words that mark a link as a likely notice. Matched against the lowercased
/// absolute URL.
pub const RELEVANT_KEYWORDS: &[&str] = &[
    "notification",
    "advertisement",
    "vacancy",
    "recruitment",
    "result",
    "admit",
    "card",
    "hall",
    "ticket",
];

/// Substrings that disqualify a link even when it matches a keyword.
pub const JUNK_MARKERS: &[&str] = &["javascript:", "#", "archive"];

pub const DEFAULT_CANDIDATE_CAP: usize = 5;

static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid selector"));

#[derive(Debug, Error)]
pub enum LinkFilterError {
    #[error("invalid url pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Relevance rules for one source.
#[derive(Debug, Clone)]
pub struct LinkFilter {
    pattern: Option<Regex>,
    cap: usize,
}

impl LinkFilter {
    /// Build a filter from a source's optional pattern. A blank pattern is
    /// treated as absent.
    pub fn new(pattern: Option<&str>, cap: usize) -> Result<Self, LinkFilterError> {
        let pattern = match pattern.map(str::trim).filter(|p| !p.is_empty()) {
            Some(raw) => Some(Regex::new(raw).map_err(|source| {
                LinkFilterError::InvalidPattern {
                    pattern: raw.to_string(),
                    source,
                }
            })?),
            None => None,
        };
        Ok(Self { pattern, cap })
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Keyword AND pattern AND not junk.
    pub fn is_relevant(&self, url: &Url) -> bool {
        let raw = url.as_str();
        let lower = raw.to_lowercase();

        let matches_keyword = RELEVANT_KEYWORDS.iter().any(|k| lower.contains(k));
        let matches_pattern = self.pattern.as_ref().is_none_or(|p| p.is_match(raw));
        let is_junk = JUNK_MARKERS.iter().any(|j| lower.contains(j));

        matches_keyword && matches_pattern && !is_junk
    }
}

impl Default for LinkFilter {
    fn default() -> Self {
        Self {
            pattern: None,
            cap: DEFAULT_CANDIDATE_CAP,
        }
    }
}

/// Collect every anchor on the page, resolve it against `base_url`, keep the
/// relevant ones, dedup in first-seen order and stop at the filter's cap.
pub fn extract_links(html: &str, base_url: &Url, filter: &LinkFilter) -> Vec<Url> {
    let document = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    for anchor in document.select(&ANCHOR_SELECTOR) {
        if candidates.len() >= filter.cap() {
            break;
        }

        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let href = href.trim();
        if href.is_empty() {
            continue;
        }

        // Unresolvable hrefs are dropped silently.
        let Ok(absolute) = base_url.join(href) else {
            continue;
        };
        if !matches!(absolute.scheme(), "http" | "https") {
            continue;
        }

        if filter.is_relevant(&absolute) && seen.insert(absolute.as_str().to_string()) {
            candidates.push(absolute);
        }
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.gov/notices/").unwrap()
    }

    #[test]
    fn test_resolves_relative_links() {
        let html = r#"<a href="recruitment-2025.html">A</a><a href="/results/2024">B</a>"#;
        let links = extract_links(html, &base(), &LinkFilter::default());
        let links: Vec<_> = links.iter().map(Url::as_str).collect();
        assert_eq!(
            links,
            vec![
                "https://example.gov/notices/recruitment-2025.html",
                "https://example.gov/results/2024",
            ]
        );
    }

    #[test]
    fn test_keyword_filter() {
        let html = r#"
            <a href="/about-us">About</a>
            <a href="/contact">Contact</a>
            <a href="/Admit-Card/cgl">Admit</a>
            <a href="/VACANCY.pdf">Vacancy</a>
        "#;
        let links = extract_links(html, &base(), &LinkFilter::default());
        assert_eq!(links.len(), 2);
        assert!(links[0].as_str().ends_with("/Admit-Card/cgl"));
        assert!(links[1].as_str().ends_with("/VACANCY.pdf"));
    }

    #[test]
    fn test_junk_is_excluded() {
        let html = r##"
            <a href="javascript:openResult()">Result</a>
            <a href="#recruitment">Jump</a>
            <a href="/recruitment#top">Anchor</a>
            <a href="/archive/recruitment-2019">Old</a>
            <a href="/recruitment-2025">New</a>
        "##;
        let links = extract_links(html, &base(), &LinkFilter::default());
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].as_str(), "https://example.gov/recruitment-2025");
    }

    #[test]
    fn test_pattern_must_also_match() {
        let html = r#"
            <a href="/upload/recruitment-a.pdf">A</a>
            <a href="/pages/recruitment-b">B</a>
        "#;
        let filter = LinkFilter::new(Some(r"\.pdf$"), 5).unwrap();
        let links = extract_links(html, &base(), &filter);
        assert_eq!(links.len(), 1);
        assert!(links[0].as_str().ends_with("recruitment-a.pdf"));
    }

    #[test]
    fn test_blank_pattern_is_ignored() {
        let filter = LinkFilter::new(Some("  "), 5).unwrap();
        assert!(filter.is_relevant(&Url::parse("https://x.gov/result").unwrap()));
    }

    #[test]
    fn test_invalid_pattern_is_an_error() {
        let err = LinkFilter::new(Some("(unclosed"), 5).unwrap_err();
        assert!(err.to_string().contains("(unclosed"));
    }

    #[test]
    fn test_dedup_and_cap() {
        let mut html = String::new();
        for i in 0..8 {
            html.push_str(&format!(r#"<a href="/recruitment/{i}">x</a>"#));
            html.push_str(&format!(r#"<a href="/recruitment/{i}">dup</a>"#));
        }
        for i in 0..4 {
            html.push_str(&format!(r#"<a href="/gallery/{i}">noise</a>"#));
        }

        // K = 8 relevant unique links.
        let links = extract_links(&html, &base(), &LinkFilter::new(None, 5).unwrap());
        assert_eq!(links.len(), 5);
        let unique: HashSet<_> = links.iter().collect();
        assert_eq!(unique.len(), 5);

        let links = extract_links(&html, &base(), &LinkFilter::new(None, 20).unwrap());
        assert_eq!(links.len(), 8);
    }

    #[test]
    fn test_non_http_schemes_are_dropped() {
        let html = r#"<a href="mailto:recruitment@example.gov">Mail</a><a href="ftp://example.gov/result">FTP</a>"#;
        assert!(extract_links(html, &base(), &LinkFilter::default()).is_empty());
    }
}

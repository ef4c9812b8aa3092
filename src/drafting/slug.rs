const MAX_SLUG_WORDS_CHARS: usize = 80;

/// Lowercase ASCII words joined by single dashes.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            let dash = pending_dash && !slug.is_empty();
            if slug.len() + usize::from(dash) + 1 > MAX_SLUG_WORDS_CHARS {
                break;
            }
            if dash {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Slug for a posting: the title's slug plus a short digest of the origin
/// URL, so two notices with the same title never collide.
pub fn posting_slug(title: &str, source_url: &str) -> String {
    let digest = format!("{:x}", md5::compute(source_url.as_bytes()));
    let base = slugify(title);
    let base = if base.is_empty() { "posting" } else { &base };
    format!("{}-{}", base, &digest[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_collapses_punctuation() {
        assert_eq!(
            slugify("  SSC CGL (Tier-I) Recruitment 2025!! "),
            "ssc-cgl-tier-i-recruitment-2025"
        );
        assert_eq!(slugify("भर्ती 2025"), "2025");
        assert_eq!(slugify("---"), "");
    }

    #[test]
    fn test_slugify_is_bounded() {
        let long = "word ".repeat(100);
        assert!(slugify(&long).len() <= MAX_SLUG_WORDS_CHARS);
        assert!(!slugify(&long).ends_with('-'));
    }

    #[test]
    fn test_posting_slug_differs_by_url() {
        let a = posting_slug("Junior Engineer Recruitment", "https://a.example.gov/je");
        let b = posting_slug("Junior Engineer Recruitment", "https://b.example.gov/je");

        assert!(a.starts_with("junior-engineer-recruitment-"));
        assert_eq!(a.len(), "junior-engineer-recruitment-".len() + 8);
        assert_ne!(a, b);
        assert_eq!(a, posting_slug("Junior Engineer Recruitment", "https://a.example.gov/je"));
    }

    #[test]
    fn test_posting_slug_without_ascii_title() {
        assert!(posting_slug("परीक्षा", "https://x.example.gov").starts_with("posting-"));
    }
}

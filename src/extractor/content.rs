use scraper::{ElementRef, Html, Node, Selector};
use std::sync::LazyLock;

use crate::extractor::model::{PageText, normalize_whitespace, truncate_chars};

/// Elements whose whole subtree is boilerplate for our purposes.
const SKIPPED_ELEMENTS: &[&str] = &[
    "script", "style", "nav", "header", "footer", "noscript", "template",
];

/// Elements that render on their own line. Inline markup adds no whitespace.
const BLOCK_ELEMENTS: &[&str] = &[
    "p", "div", "li", "tr", "td", "th", "br", "h1", "h2", "h3", "h4", "h5", "h6", "section",
    "article", "table", "ul", "ol", "dl", "dt", "dd", "main", "aside", "blockquote", "pre",
    "form", "hr", "caption", "thead", "tbody", "tfoot",
];

static MAIN_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("main").expect("valid selector"));
static BODY_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("body").expect("valid selector"));
static H1_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1").expect("valid selector"));
static TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("valid selector"));

/// Strip boilerplate from `html` and return at most `max_chars` characters of
/// whitespace-collapsed text. Truncation happens after cleaning so the
/// budget is never spent on markup.
pub fn extract_text(html: &str, max_chars: usize) -> String {
    let document = Html::parse_document(html);
    clean_text(&document, max_chars)
}

/// Like [`extract_text`], but also pulls a page title.
pub fn extract_page(html: &str, max_chars: usize) -> PageText {
    let document = Html::parse_document(html);
    PageText {
        title: extract_title(&document),
        text: clean_text(&document, max_chars),
    }
}

fn clean_text(document: &Html, max_chars: usize) -> String {
    // Prefer <main> when the page has one with real content.
    if let Some(main) = document.select(&MAIN_SELECTOR).next() {
        let text = collect_visible_text(main);
        if !text.is_empty() {
            return truncate_chars(&text, max_chars).to_string();
        }
    }

    let root = document
        .select(&BODY_SELECTOR)
        .next()
        .unwrap_or_else(|| document.root_element());
    let text = collect_visible_text(root);
    truncate_chars(&text, max_chars).to_string()
}

fn collect_visible_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();
    push_text(element, &mut raw);
    normalize_whitespace(&raw)
}

fn push_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            let name = child_element.value().name();
            if SKIPPED_ELEMENTS.iter().any(|skip| name.eq_ignore_ascii_case(skip)) {
                continue;
            }
            let block = is_block(name);
            if block {
                out.push(' ');
            }
            push_text(child_element, out);
            if block {
                out.push(' ');
            }
        } else if let Node::Text(text) = child.value() {
            out.push_str(text);
        }
    }
}

fn is_block(name: &str) -> bool {
    BLOCK_ELEMENTS.iter().any(|block| name.eq_ignore_ascii_case(block))
}

fn extract_title(document: &Html) -> String {
    for selector in [&*H1_SELECTOR, &*TITLE_SELECTOR] {
        for element in document.select(selector) {
            let title = normalize_whitespace(&element.text().collect::<String>());
            if !title.is_empty() {
                return title;
            }
        }
    }
    String::new()
}

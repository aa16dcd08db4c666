//! HTML parser for extracting anchor references
//!
//! Extraction is deliberately raw: every `href` value of every `<a>` element is
//! returned as written, in document order. No resolution, filtering or
//! deduplication happens here; the scheduler resolves each reference and the
//! visited set suppresses repeats.

use scraper::{Html, Selector};

/// Extracts the `href` attribute of every anchor in an HTML document
///
/// The document is decoded as UTF-8, replacing invalid sequences, and parsed
/// with the error-recovering HTML5 parser, so any byte stream yields a document.
/// Anchors without an `href` and non-anchor elements are ignored.
///
/// # Example
///
/// ```
/// use prowl::crawler::extract_links;
///
/// let html = br#"<html><body><a href="/product/1">One</a><a>None</a></body></html>"#;
/// assert_eq!(extract_links(html), vec!["/product/1".to_string()]);
/// ```
pub fn extract_links(document: &[u8]) -> Vec<String> {
    let html = String::from_utf8_lossy(document);
    let document = Html::parse_document(&html);

    let mut links = Vec::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if let Some(href) = element.value().attr("href") {
                links.push(href.to_string());
            }
        }
    }

    links
}

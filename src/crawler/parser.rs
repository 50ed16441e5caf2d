//! HTML link extraction
//!
//! Pulls the raw `href` value out of every anchor in a document. Nothing is
//! resolved or filtered here; see [`resolve_link`](crate::url::resolve_link).

use scraper::{Html, Selector};

/// Extracts every `<a href="...">` value from an HTML body, in document order
///
/// The body is decoded as UTF-8, replacing invalid sequences. Malformed markup
/// is handled the way browsers handle it, so unclosed or misnested tags still
/// yield their links.
///
/// # Example
///
/// ```
/// use linkcrawl::crawler::extract_hrefs;
///
/// let html = br#"<html><body><a href="/page">Link</a></body></html>"#;
/// assert_eq!(extract_hrefs(html), vec!["/page".to_string()]);
/// ```
pub fn extract_hrefs(body: &[u8]) -> Vec<String> {
    let html = String::from_utf8_lossy(body);
    let document = Html::parse_document(&html);

    let mut hrefs = Vec::new();
    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if let Some(href) = element.value().attr("href") {
                hrefs.push(href.to_string());
            }
        }
    }
    hrefs
}

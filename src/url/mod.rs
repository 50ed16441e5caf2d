//! URL handling module for linkcrawl
//!
//! This module resolves hrefs found on a page into absolute URLs and decides
//! which of them are in scope for further crawling.

mod resolve;

// Re-export main functions
pub use resolve::resolve_link;

/// Decides whether a discovered link may be crawled
///
/// A link is in scope when external links are followed, or when its string
/// form starts with the seed URL. The comparison is a literal prefix match on
/// the strings, so `http://a/docs` also admits `http://a/docs-old/`.
///
/// # Examples
///
/// ```
/// use linkcrawl::url::is_in_scope;
///
/// assert!(is_in_scope("http://a/", "http://a/b", false));
/// assert!(!is_in_scope("http://a/", "http://external/c", false));
/// assert!(is_in_scope("http://a/", "http://external/c", true));
/// ```
pub fn is_in_scope(seed: &str, link: &str, follow_external: bool) -> bool {
    follow_external || link.starts_with(seed)
}

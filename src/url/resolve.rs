use crate::{UrlError, UrlResult};
use url::Url;

/// Resolves an href found on `base` into an absolute URL
///
/// Hrefs that already start with `http://` or `https://` are returned
/// verbatim, without being parsed. Everything else is joined onto the parsed
/// base URL, so scheme-relative (`//host/x`), root-relative (`/x`),
/// path-relative (`x`), query-only and fragment-only hrefs all resolve the
/// way a browser would resolve them.
///
/// No filtering happens here: `mailto:` and similar links resolve to
/// themselves and are left for the scope check to reject.
///
/// # Errors
///
/// * [`UrlError::InvalidBase`] - the base URL cannot be parsed
/// * [`UrlError::InvalidLink`] - the href cannot be joined onto the base
///
/// # Examples
///
/// ```
/// use linkcrawl::url::resolve_link;
///
/// assert_eq!(resolve_link("http://a/x/y", "/b").unwrap(), "http://a/b");
/// assert_eq!(resolve_link("http://a/x/y", "z").unwrap(), "http://a/x/z");
/// assert_eq!(
///     resolve_link("http://a/", "https://external/c").unwrap(),
///     "https://external/c"
/// );
/// ```
pub fn resolve_link(base: &str, href: &str) -> UrlResult<String> {
    if href.starts_with("http://") || href.starts_with("https://") {
        return Ok(href.to_string());
    }

    let base_url = Url::parse(base).map_err(|source| UrlError::InvalidBase {
        base: base.to_string(),
        source,
    })?;

    let resolved = base_url.join(href).map_err(|source| UrlError::InvalidLink {
        base: base.to_string(),
        href: href.to_string(),
        source,
    })?;

    Ok(resolved.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_http_verbatim() {
        // not normalized: the host keeps its case and the path its dot segments
        let href = "http://EXAMPLE.com/a/../b";
        assert_eq!(resolve_link("http://a/", href).unwrap(), href);
    }

    #[test]
    fn test_absolute_https_verbatim() {
        assert_eq!(
            resolve_link("not a base", "https://a/b").unwrap(),
            "https://a/b"
        );
    }

    #[test]
    fn test_root_relative() {
        assert_eq!(resolve_link("http://a/", "/b").unwrap(), "http://a/b");
        assert_eq!(resolve_link("http://a/x/y/", "/b").unwrap(), "http://a/b");
    }

    #[test]
    fn test_path_relative() {
        assert_eq!(resolve_link("http://a/x/y", "z").unwrap(), "http://a/x/z");
        assert_eq!(resolve_link("http://a/x/y/", "z").unwrap(), "http://a/x/y/z");
        assert_eq!(resolve_link("http://a/x/y/", "../z").unwrap(), "http://a/x/z");
    }

    #[test]
    fn test_scheme_relative() {
        assert_eq!(
            resolve_link("https://a/", "//b/c").unwrap(),
            "https://b/c"
        );
    }

    #[test]
    fn test_fragment_and_query() {
        assert_eq!(resolve_link("http://a/p", "#top").unwrap(), "http://a/p#top");
        assert_eq!(resolve_link("http://a/p", "?q=1").unwrap(), "http://a/p?q=1");
    }

    #[test]
    fn test_other_scheme_passes_through() {
        assert_eq!(
            resolve_link("http://a/", "mailto:someone@example.com").unwrap(),
            "mailto:someone@example.com"
        );
    }

    #[test]
    fn test_invalid_base() {
        let result = resolve_link("not a url", "/b");
        assert!(matches!(result, Err(UrlError::InvalidBase { .. })));
    }

    #[test]
    fn test_invalid_link() {
        let result = resolve_link("http://a/", "//[::1");
        assert!(matches!(result, Err(UrlError::InvalidLink { .. })));

        let result = resolve_link("http://a/", "//host:99999/");
        assert!(matches!(result, Err(UrlError::InvalidLink { .. })));
    }

    #[test]
    fn test_error_names_href() {
        let error = resolve_link("http://a/", "//[::1").unwrap_err();
        assert!(error.to_string().contains("//[::1"));
    }
}

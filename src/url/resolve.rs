use crate::UrlError;
use url::Url;

/// Returns true when `href` already carries a URL scheme (`https:`, `http:`, ...)
pub fn is_absolute(href: &str) -> bool {
    Url::parse(href.trim()).is_ok()
}

/// Parses a page address that later relative links are resolved against
///
/// Only HTTP and HTTPS are accepted.
///
/// # Examples
///
/// ```
/// use book_harvester::url::parse_base_url;
///
/// let base = parse_base_url("https://books.toscrape.com/index.html").unwrap();
/// assert_eq!(base.host_str(), Some("books.toscrape.com"));
/// assert!(parse_base_url("mailto:someone@example.com").is_err());
/// ```
pub fn parse_base_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    Ok(url)
}

/// Resolves a scraped link against the page it was found on
///
/// Absolute links are returned unchanged. Relative links are joined onto
/// `base` with standard reference resolution, which covers both the
/// `../../../catalogue/...` style and root-relative `/media/...` paths the
/// catalog uses. The function never fails: if the link cannot be joined at
/// all it is returned trimmed but otherwise untouched.
///
/// # Examples
///
/// ```
/// use book_harvester::url::resolve_url;
/// use url::Url;
///
/// let page = Url::parse("https://books.toscrape.com/catalogue/category/books/poetry_23/index.html").unwrap();
/// assert_eq!(
///     resolve_url("../../../a-light-in-the-attic_1000/index.html", &page),
///     "https://books.toscrape.com/catalogue/a-light-in-the-attic_1000/index.html"
/// );
/// assert_eq!(
///     resolve_url("https://example.com/x", &page),
///     "https://example.com/x"
/// );
/// ```
pub fn resolve_url(href: &str, base: &Url) -> String {
    let href = href.trim();

    if href.is_empty() {
        return String::new();
    }

    if is_absolute(href) {
        return href.to_string();
    }

    match base.join(href) {
        Ok(resolved) => resolved.to_string(),
        Err(e) => {
            tracing::debug!("Could not resolve '{}' against {}: {}", href, base, e);
            href.to_string()
        }
    }
}

/// Returns the final path segment of a URL (the image file name for cover URLs)
///
/// Query strings and fragments are ignored. Returns an empty string when the
/// URL has no non-empty final segment.
pub fn file_name_from_url(url: &str) -> String {
    let without_suffix = url
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim_end_matches('/');

    without_suffix
        .rsplit('/')
        .next()
        .filter(|segment| !segment.contains(':'))
        .unwrap_or_default()
        .to_string()
}

use url::Url;

/// Prepends `https://` to a URL that carries no scheme
///
/// # Examples
///
/// ```
/// use linkscan::url::ensure_scheme;
///
/// assert_eq!(ensure_scheme("example.com/docs"), "https://example.com/docs");
/// assert_eq!(ensure_scheme("http://example.com"), "http://example.com");
/// ```
pub fn ensure_scheme(url_str: &str) -> String {
    let url_str = url_str.trim();
    if url_str.contains("://") {
        url_str.to_string()
    } else {
        format!("https://{}", url_str)
    }
}

/// Removes the fragment component (everything after `#`) from a URL
///
/// Parseable URLs are returned in their serialized form, so applying this
/// twice yields the same string as applying it once. Unparseable input is cut
/// at the first `#`.
///
/// # Examples
///
/// ```
/// use linkscan::url::strip_fragment;
///
/// assert_eq!(strip_fragment("https://example.com/page#top"), "https://example.com/page");
/// assert_eq!(strip_fragment("https://example.com/page"), "https://example.com/page");
/// ```
pub fn strip_fragment(url_str: &str) -> String {
    match Url::parse(url_str) {
        Ok(mut url) => {
            url.set_fragment(None);
            url.into()
        }
        Err(_) => url_str
            .split('#')
            .next()
            .unwrap_or_default()
            .to_string(),
    }
}

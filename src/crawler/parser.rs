//! HTML parser for extracting links
//!
//! Links are collected from `<a href>` and `<img src>`, resolved against the
//! page URL, stripped of their fragment, and deduplicated.

use scraper::{Html, Selector};
use std::collections::BTreeSet;
use url::Url;

/// Link extractor collaborator used by the fetch pipeline
pub trait LinkExtractor: Send + Sync {
    /// Returns the absolute, fragment-free URLs referenced by `html`
    fn extract(&self, html: &str, base_url: &Url) -> BTreeSet<String>;
}

/// `LinkExtractor` backed by the scraper HTML parser
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlLinkExtractor;

impl LinkExtractor for HtmlLinkExtractor {
    fn extract(&self, html: &str, base_url: &Url) -> BTreeSet<String> {
        extract_links(html, base_url)
    }
}

/// Extracts every link target from an HTML document
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">`
/// - `<img src="...">`
///
/// **Exclude:**
/// - Empty attributes
/// - Targets that do not resolve to an HTTP(S) URL (`javascript:`, `mailto:`,
///   `tel:`, `data:` and unparseable values)
///
/// Malformed HTML never fails; the parser recovers and returns whatever links
/// it could find.
///
/// # Example
///
/// ```
/// use linkscan::crawler::extract_links;
/// use url::Url;
///
/// let html = r##"<a href="/page#top">Link</a><img src="logo.png">"##;
/// let base_url = Url::parse("https://example.com/docs/").unwrap();
/// let links = extract_links(html, &base_url);
/// assert!(links.contains("https://example.com/page"));
/// assert!(links.contains("https://example.com/docs/logo.png"));
/// ```
pub fn extract_links(html: &str, base_url: &Url) -> BTreeSet<String> {
    let document = Html::parse_document(html);
    let mut links = BTreeSet::new();

    collect_attribute(&document, "a[href]", "href", base_url, &mut links);
    collect_attribute(&document, "img[src]", "src", base_url, &mut links);

    links
}

fn collect_attribute(
    document: &Html,
    selector: &str,
    attribute: &str,
    base_url: &Url,
    links: &mut BTreeSet<String>,
) {
    let Ok(selector) = Selector::parse(selector) else {
        return;
    };

    for element in document.select(&selector) {
        if let Some(value) = element.value().attr(attribute) {
            if let Some(absolute_url) = resolve_link(value, base_url) {
                links.insert(absolute_url);
            }
        }
    }
}

/// Resolves a link to an absolute, fragment-free URL
///
/// Returns None if the link should be excluded:
/// - Empty values
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    let mut absolute_url = base_url.join(href).ok()?;
    if absolute_url.scheme() != "http" && absolute_url.scheme() != "https" {
        return None;
    }

    absolute_url.set_fragment(None);
    Some(absolute_url.into())
}

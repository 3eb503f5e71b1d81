use super::normalize::{ensure_scheme, strip_fragment};
use crate::{UrlError, UrlResult};
use url::Url;

/// The boundary of a crawl
///
/// A discovered URL is in scope when its string value starts with the root
/// URL. This is a literal prefix match including the path, not a same-host
/// check: with a root of `https://example.com/docs`, the page
/// `https://example.com/blog` is out of scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootScope {
    root_url: String,
    root_domain_prefix: String,
}

impl RootScope {
    /// Builds a scope from a user supplied root URL
    ///
    /// A missing scheme is replaced with `https://`, and any fragment is
    /// removed. Only HTTP and HTTPS roots are accepted.
    ///
    /// # Examples
    ///
    /// ```
    /// use linkscan::url::RootScope;
    ///
    /// let scope = RootScope::new("example.com/docs").unwrap();
    /// assert_eq!(scope.root_url(), "https://example.com/docs");
    /// assert!(scope.contains("https://example.com/docs/intro"));
    /// assert!(!scope.contains("https://example.com/blog"));
    /// ```
    pub fn new(raw: &str) -> UrlResult<Self> {
        let fixed = ensure_scheme(raw);
        let url = Url::parse(&fixed).map_err(|e| UrlError::Parse(format!("{}: {}", fixed, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(UrlError::InvalidScheme(format!(
                "Only HTTP and HTTPS schemes are supported, got: {}",
                url.scheme()
            )));
        }

        if url.host_str().is_none() {
            return Err(UrlError::MissingHost(fixed));
        }

        let root_domain_prefix = format!("{}/", url.origin().ascii_serialization());
        let root_url = strip_fragment(url.as_str());

        Ok(Self {
            root_url,
            root_domain_prefix,
        })
    }

    /// The root URL every in-scope URL must start with
    pub fn root_url(&self) -> &str {
        &self.root_url
    }

    /// Scheme, host and port of the root, with a trailing slash
    pub fn root_domain_prefix(&self) -> &str {
        &self.root_domain_prefix
    }

    /// Returns true if `url` falls under the root prefix
    pub fn contains(&self, url: &str) -> bool {
        url.starts_with(&self.root_url)
    }
}

//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - The `HttpClient` seam the pipeline fetches through
//! - Building a reqwest client with the configured user agent and timeouts
//! - Following redirects and reporting the final URL
//! - Reading the body only for successful HTML responses
//! - Error classification

use crate::config::Config;
use crate::FetchError;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;

/// Outcome of a GET that produced an HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    /// HTTP status code
    pub status: u16,

    /// Content-Type header value, if present
    pub content_type: Option<String>,

    /// Final URL after redirects
    pub final_url: String,

    /// Page body, present only for successful HTML responses
    pub body: Option<String>,

    /// Set when the status line arrived but the HTML body could not be read
    pub body_error: Option<FetchError>,
}

impl FetchResponse {
    /// Returns true for any status below 400
    pub fn is_success(&self) -> bool {
        self.status < 400
    }

    /// Returns true if the MIME type is exactly `text/html`
    pub fn is_html(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(is_html_content_type)
    }
}

/// Checks whether a Content-Type header names HTML
///
/// Parameters such as `charset` are ignored; the MIME type itself must be
/// exactly `text/html`.
pub fn is_html_content_type(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("text/html"))
}

/// HTTP client collaborator used by the fetch pipeline
///
/// Implementations are shared by every worker for the duration of a crawl.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Issues a GET request for `url`
    ///
    /// # Returns
    ///
    /// * `Ok(FetchResponse)` - A response was received, whatever its status;
    ///   a body that fails to read is reported in `body_error`
    /// * `Err(FetchError)` - Network or protocol failure before any response
    async fn get(&self, url: &str) -> Result<FetchResponse, FetchError>;

    /// Releases connection resources; called once when a crawl closes
    async fn close(&self) {}
}

/// `HttpClient` backed by a pooled reqwest client
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: Client,
}

impl ReqwestClient {
    /// Wraps an existing reqwest client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a client from the crawler configuration
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        build_http_client(config).map(Self::new)
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn get(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let wants_body = status < 400 && content_type.as_deref().is_some_and(is_html_content_type);

        let (body, body_error) = if wants_body {
            match response.text().await {
                Ok(text) => (Some(text), None),
                Err(e) => (
                    None,
                    Some(FetchError::Body {
                        url: url.to_string(),
                        message: e.to_string(),
                    }),
                ),
            }
        } else {
            (None, None)
        };

        Ok(FetchResponse {
            status,
            content_type,
            final_url,
            body,
            body_error,
        })
    }

    async fn close(&self) {
        // reqwest has no explicit shutdown; the pool goes away with the
        // crawler, which owns the last handle once the workers have exited
        tracing::debug!("Closing HTTP client");
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use linkscan::config::Config;
/// use linkscan::crawler::build_http_client;
///
/// let client = build_http_client(&Config::default()).unwrap();
/// ```
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.header_value())
        .timeout(Duration::from_secs(config.crawler.request_timeout_secs))
        .connect_timeout(Duration::from_secs(config.crawler.connect_timeout_secs))
        .redirect(Policy::limited(config.crawler.max_redirects))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Maps a reqwest error onto the fetch error taxonomy
fn classify_error(url: &str, error: reqwest::Error) -> FetchError {
    let url = url.to_string();
    if error.is_timeout() {
        FetchError::Timeout { url }
    } else if error.is_connect() {
        FetchError::Connect {
            url,
            message: error.to_string(),
        }
    } else if error.is_redirect() {
        FetchError::Redirect {
            url,
            message: error.to_string(),
        }
    } else {
        FetchError::Request {
            url,
            message: error.to_string(),
        }
    }
}

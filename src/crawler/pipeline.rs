//! Fetch-and-extract pipeline
//!
//! Processes one frontier item:
//! 1. GET the URL through the HTTP client
//! 2. Record the outcome in the succeeded, failed, or errored set
//! 3. For successful HTML pages, extract links and admit the unseen in-scope ones
//!
//! Admission is the only path by which new work enters the frontier.

use crate::crawler::fetcher::HttpClient;
use crate::crawler::parser::LinkExtractor;
use crate::state::{CrawlState, ErroredRecord, FrontierItem, LinkRecord};
use crate::url::RootScope;
use std::sync::Arc;
use url::Url;

/// What happened to one processed frontier item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Status below 400; `queued` new links were admitted to the frontier
    Succeeded { status: u16, queued: usize },

    /// Status of 400 or above
    Failed { status: u16 },

    /// No response was received
    Errored,
}

/// Runs the fetch, classify, extract, and admit steps for frontier items
pub struct Pipeline {
    scope: RootScope,
    state: Arc<CrawlState>,
    client: Arc<dyn HttpClient>,
    extractor: Arc<dyn LinkExtractor>,
}

impl Pipeline {
    pub fn new(
        scope: RootScope,
        state: Arc<CrawlState>,
        client: Arc<dyn HttpClient>,
        extractor: Arc<dyn LinkExtractor>,
    ) -> Self {
        Self {
            scope,
            state,
            client,
            extractor,
        }
    }

    /// Processes a single frontier item
    ///
    /// Never fails: network errors are logged and recorded in the errored
    /// set, and error statuses are an ordinary outcome.
    pub async fn process(&self, item: FrontierItem) -> ProcessOutcome {
        let FrontierItem { url, parent_url } = item;
        let parent = parent_label(&parent_url);

        let response = match self.client.get(&url).await {
            Ok(response) => response,
            Err(error) => {
                tracing::warn!("Get url <{}> errored: {}, parent url: <{}>", url, error, parent);
                self.state.record_errored(ErroredRecord {
                    url,
                    parent_url,
                    message: error.to_string(),
                });
                return ProcessOutcome::Errored;
            }
        };

        if !response.is_success() {
            tracing::debug!(
                "Get url <{}> failed with status {}, parent url: <{}>",
                url,
                response.status,
                parent
            );
            self.state.record_failed(LinkRecord::new(url, parent_url));
            return ProcessOutcome::Failed {
                status: response.status,
            };
        }

        tracing::debug!(
            "Get url <{}> successful with status {}, parent url: <{}>",
            url,
            response.status,
            parent
        );
        self.state
            .record_succeeded(LinkRecord::new(response.final_url.clone(), parent_url));

        if let Some(error) = &response.body_error {
            tracing::warn!("Links of <{}> not extracted: {}", response.final_url, error);
        }

        let queued = match (&response.body, response.is_html()) {
            (Some(body), true) => self.admit_links(&response.final_url, body),
            _ => 0,
        };

        ProcessOutcome::Succeeded {
            status: response.status,
            queued,
        }
    }

    /// Extracts links from a fetched page and admits the new in-scope ones
    ///
    /// Extraction resolves against `page_url` (the final URL after redirects),
    /// while the scope check applies to each discovered URL string.
    fn admit_links(&self, page_url: &str, html: &str) -> usize {
        let base_url = match Url::parse(page_url) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!("Cannot resolve links against <{}>: {}", page_url, e);
                return 0;
            }
        };

        let mut queued = 0;
        for link in self.extractor.extract(html, &base_url) {
            if !self.scope.contains(&link) {
                tracing::trace!("Skipping out-of-scope link <{}>", link);
                continue;
            }

            if self.state.admit(FrontierItem::discovered(link, page_url)) {
                queued += 1;
            }
        }

        if queued > 0 {
            tracing::debug!("Queued {} new links from <{}>", queued, page_url);
        }
        queued
    }
}

fn parent_label(parent_url: &Option<String>) -> &str {
    parent_url.as_deref().unwrap_or("none")
}

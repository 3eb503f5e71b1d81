//! Crawl supervisor - main crawl orchestration logic
//!
//! This module contains the crawl lifecycle, including:
//! - Seeding the frontier with the root URL
//! - Starting the worker pool
//! - Waiting for the frontier to drain
//! - Cancelling workers and releasing the HTTP client
//! - Handling operator interrupts
//! - Collecting the final report

use crate::config::{validate_concurrency, Config, DEFAULT_CONCURRENCY};
use crate::crawler::fetcher::{HttpClient, ReqwestClient};
use crate::crawler::parser::HtmlLinkExtractor;
use crate::crawler::pipeline::Pipeline;
use crate::crawler::worker::{spawn_workers, WorkerTally};
use crate::output::CrawlReport;
use crate::state::{CrawlPhase, CrawlState, FrontierItem};
use crate::url::RootScope;
use crate::Result;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinError;

/// Tunables for a single crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlOptions {
    /// Number of concurrent workers
    pub concurrency: usize,
}

impl CrawlOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            concurrency: config.crawler.concurrency,
        }
    }
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

/// Main crawl supervisor
///
/// Owns the shared crawl state for the duration of one crawl and drives it
/// through `Idle -> Running -> Draining -> Closed`.
pub struct Crawler {
    scope: RootScope,
    options: CrawlOptions,
    client: Arc<dyn HttpClient>,
    state: Arc<CrawlState>,
    phase: CrawlPhase,
}

impl Crawler {
    /// Creates a new crawler instance
    ///
    /// # Arguments
    ///
    /// * `scope` - The root URL and the prefix every crawled URL must match
    /// * `client` - HTTP client shared by all workers
    /// * `options` - Crawl tunables
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Crawler in the `Idle` phase
    /// * `Err(ScanError)` - The options are invalid
    pub fn new(
        scope: RootScope,
        client: Arc<dyn HttpClient>,
        options: CrawlOptions,
    ) -> Result<Self> {
        validate_concurrency(options.concurrency)?;

        Ok(Self {
            scope,
            options,
            client,
            state: Arc::new(CrawlState::new()),
            phase: CrawlPhase::Idle,
        })
    }

    /// Creates a crawler for `root_url` using a reqwest client built from `config`
    pub fn from_config(root_url: &str, config: &Config) -> Result<Self> {
        let scope = RootScope::new(root_url)?;
        let client = ReqwestClient::from_config(config)?;
        Self::new(scope, Arc::new(client), CrawlOptions::from_config(config))
    }

    pub fn scope(&self) -> &RootScope {
        &self.scope
    }

    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    /// Shared state, readable while a crawl is in progress
    pub fn state(&self) -> Arc<CrawlState> {
        Arc::clone(&self.state)
    }

    /// Runs the crawl until the frontier is exhausted
    ///
    /// # Example
    ///
    /// ```no_run
    /// use linkscan::config::Config;
    /// use linkscan::crawler::Crawler;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let crawler = Crawler::from_config("example.com", &Config::default())?;
    /// let report = crawler.crawl().await?;
    /// println!("{} broken links", report.failed.len());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn crawl(self) -> Result<CrawlReport> {
        self.crawl_until(std::future::pending::<()>()).await
    }

    /// Runs the crawl until the frontier is exhausted or `shutdown` resolves
    ///
    /// When `shutdown` wins, every worker is cancelled immediately, queued
    /// items are abandoned, and the report carries the partial results with
    /// `interrupted` set. The same happens if every worker panics. Panicked
    /// workers are counted in `worker_failures`; the report is returned
    /// either way.
    pub async fn crawl_until<F>(mut self, shutdown: F) -> Result<CrawlReport>
    where
        F: Future,
    {
        let started = Instant::now();
        tracing::info!(
            "Start crawler on {} with {} workers",
            self.scope.root_url(),
            self.options.concurrency
        );

        self.transition(CrawlPhase::Running)?;
        self.state.admit(FrontierItem::root(self.scope.root_url()));

        let pipeline = Arc::new(Pipeline::new(
            self.scope.clone(),
            Arc::clone(&self.state),
            Arc::clone(&self.client),
            Arc::new(HtmlLinkExtractor),
        ));
        let mut workers = spawn_workers(
            self.options.concurrency,
            pipeline,
            Arc::clone(&self.state),
        );

        tokio::pin!(shutdown);
        let mut worker_failures = 0;
        let interrupted = loop {
            tokio::select! {
                _ = self.state.frontier.join() => break false,
                _ = &mut shutdown => break true,
                // Before close, a worker only returns by panicking
                Some(result) = workers.join_next() => {
                    worker_failures += worker_exit(result);
                    if workers.is_empty() {
                        tracing::error!("Every worker failed, abandoning the crawl");
                        break true;
                    }
                }
            }
        };

        if interrupted {
            tracing::warn!(
                "Crawl interrupted with {} items outstanding, cancelling workers",
                self.state.frontier.outstanding()
            );
            self.state.frontier.close();
            workers.shutdown().await;
        } else {
            self.transition(CrawlPhase::Draining)?;
            self.state.frontier.close();
            while let Some(result) = workers.join_next().await {
                worker_failures += worker_exit(result);
            }
        }

        tracing::info!("Close session");
        self.client.close().await;
        self.transition(CrawlPhase::Closed)?;

        let report = CrawlReport {
            worker_failures,
            ..CrawlReport::from_state(
                self.scope.root_url(),
                &self.state,
                started.elapsed(),
                interrupted,
            )
        };
        tracing::info!(
            "Crawl finished: {} links visited in {:?}",
            report.total_links(),
            report.duration
        );
        Ok(report)
    }

    fn transition(&mut self, next: CrawlPhase) -> Result<()> {
        self.phase = self.phase.transition(next)?;
        tracing::debug!("Crawl phase: {}", self.phase);
        Ok(())
    }
}

/// Logs a finished worker and returns 1 if it panicked
fn worker_exit(result: std::result::Result<WorkerTally, JoinError>) -> usize {
    match result {
        Ok(tally) => {
            tracing::trace!("Worker exited after {} items", tally.total());
            0
        }
        Err(e) => {
            tracing::error!("Worker task failed: {}", e);
            1
        }
    }
}

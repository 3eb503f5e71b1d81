//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - The frontier queue and its join protocol
//! - HTTP fetching through a pluggable client
//! - HTML parsing and link extraction
//! - The fetch-and-extract pipeline and the worker pool that drives it
//! - Overall crawl supervision

mod fetcher;
mod frontier;
mod parser;
mod pipeline;
mod supervisor;
mod worker;

pub use fetcher::{
    build_http_client, is_html_content_type, FetchResponse, HttpClient, ReqwestClient,
};
pub use frontier::FrontierQueue;
pub use parser::{extract_links, HtmlLinkExtractor, LinkExtractor};
pub use pipeline::{Pipeline, ProcessOutcome};
pub use supervisor::{CrawlOptions, Crawler};
pub use worker::{run_worker, spawn_workers, WorkerTally};

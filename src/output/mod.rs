//! Output module for crawl results
//!
//! This module handles:
//! - Collecting the final crawl report from shared state
//! - Rendering the colored terminal summary
//! - Deriving summary statistics

mod report;
pub mod stats;

pub use report::{print_report, write_report, CrawlReport};
pub use stats::CrawlStatistics;

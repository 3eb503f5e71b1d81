//! Statistics derived from a crawl report

use crate::output::report::CrawlReport;
use std::fmt;

/// Crawl statistics summary
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrawlStatistics {
    /// Number of distinct URLs visited
    pub total_links: usize,

    /// Links with a status below 400
    pub succeeded: usize,

    /// Links with a status of 400 or above
    pub failed: usize,

    /// Links whose fetch raised an error
    pub errored: usize,

    /// Visited links that were never classified (still queued when interrupted)
    pub unresolved: usize,

    /// Crawl wall-clock time in seconds
    pub duration_secs: f64,
}

impl CrawlStatistics {
    pub fn from_report(report: &CrawlReport) -> Self {
        let total_links = report.total_links();
        let resolved = report.succeeded.len() + report.failed.len() + report.errored.len();

        Self {
            total_links,
            succeeded: report.succeeded.len(),
            failed: report.failed.len(),
            errored: report.errored.len(),
            unresolved: total_links.saturating_sub(resolved),
            duration_secs: report.duration.as_secs_f64(),
        }
    }

    /// Percentage of visited links that succeeded
    pub fn success_rate(&self) -> f64 {
        if self.total_links > 0 {
            (self.succeeded as f64 / self.total_links as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Pages fetched per second
    pub fn throughput(&self) -> f64 {
        if self.duration_secs > 0.0 {
            (self.succeeded + self.failed + self.errored) as f64 / self.duration_secs
        } else {
            0.0
        }
    }
}

impl fmt::Display for CrawlStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} links: {} ok, {} failed, {} errored, {} unresolved ({:.1}% ok, {:.2} pages/sec)",
            self.total_links,
            self.succeeded,
            self.failed,
            self.errored,
            self.unresolved,
            self.success_rate(),
            self.throughput()
        )
    }
}

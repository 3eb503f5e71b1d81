//! Crawl report and terminal rendering

use crate::state::{CrawlState, ErroredRecord, LinkRecord};
use crossterm::style::Stylize;
use std::io::{self, Write};
use std::time::Duration;

/// Final results of a crawl, complete or interrupted
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// The root URL the crawl started from
    pub root_url: String,

    /// Wall-clock time from start to close
    pub duration: Duration,

    /// True if an operator abort cut the crawl short
    pub interrupted: bool,

    /// Every URL ever enqueued, sorted
    pub visited: Vec<String>,

    /// Links that answered with a status below 400, sorted
    pub succeeded: Vec<LinkRecord>,

    /// Links that answered with a status of 400 or above, sorted
    pub failed: Vec<LinkRecord>,

    /// Links whose fetch raised a network or protocol error, sorted
    pub errored: Vec<ErroredRecord>,

    /// Worker tasks that panicked during the crawl
    pub worker_failures: usize,
}

impl CrawlReport {
    /// Snapshots the shared state once all workers have stopped
    pub fn from_state(
        root_url: impl Into<String>,
        state: &CrawlState,
        duration: Duration,
        interrupted: bool,
    ) -> Self {
        Self {
            root_url: root_url.into(),
            duration,
            interrupted,
            visited: state.visited(),
            succeeded: state.succeeded(),
            failed: state.failed(),
            errored: state.errored(),
            worker_failures: 0,
        }
    }

    /// Number of distinct URLs visited
    pub fn total_links(&self) -> usize {
        self.visited.len()
    }

    /// Returns true if any link answered with an error status
    pub fn has_broken_links(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Writes the human readable summary of a report
///
/// # Arguments
///
/// * `out` - Destination for the summary
/// * `report` - The crawl report to render
/// * `show_ok` - Also list every succeeded URL
pub fn write_report<W: Write>(out: &mut W, report: &CrawlReport, show_ok: bool) -> io::Result<()> {
    if report.interrupted {
        writeln!(out, "{}", "\nExit crawler\n".red())?;
    }

    writeln!(out, "duration: {:.3}s", report.duration.as_secs_f64())?;
    writeln!(out, "total links: {}", report.total_links())?;

    writeln!(out, "{}", format!("   - ok: {}", report.succeeded.len()).green())?;
    if show_ok {
        for record in &report.succeeded {
            writeln!(out, "{}", format!("       - {}", record.url).green())?;
        }
    }

    writeln!(out, "{}", format!("   - failed: {}", report.failed.len()).yellow())?;
    for record in &report.failed {
        writeln!(
            out,
            "{}",
            format!(
                "       - {}; parent_link: {}",
                record.url,
                parent_label(&record.parent_url)
            )
            .yellow()
        )?;
    }

    if !report.errored.is_empty() {
        writeln!(out, "{}", format!("   - errored: {}", report.errored.len()).red())?;
        for record in &report.errored {
            writeln!(
                out,
                "{}",
                format!(
                    "       - {}; parent_link: {}; error: {}",
                    record.url,
                    parent_label(&record.parent_url),
                    record.message
                )
                .red()
            )?;
        }
    }

    if report.worker_failures > 0 {
        writeln!(
            out,
            "{}",
            format!("   - worker failures: {}", report.worker_failures).red()
        )?;
    }

    Ok(())
}

/// Prints the summary of a report to stdout
pub fn print_report(report: &CrawlReport, show_ok: bool) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_report(&mut out, report, show_ok)?;
    out.flush()
}

fn parent_label(parent_url: &Option<String>) -> &str {
    parent_url.as_deref().unwrap_or("None")
}

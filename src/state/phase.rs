//! Crawl phase definitions for the supervisor state machine
//!
//! A crawl moves through `Idle -> Running -> Draining -> Closed`. An operator
//! abort may jump from any non-closed phase straight to `Closed`.

use crate::ScanError;
use std::fmt;

/// Represents the current phase of a crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// Crawler built, nothing seeded yet
    Idle,

    /// Root seeded and workers draining the frontier
    Running,

    /// Frontier reached quiescence, workers are being cancelled
    Draining,

    /// Workers stopped and the HTTP client released
    Closed,
}

impl CrawlPhase {
    /// Returns true if no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed)
    }

    /// Returns true if workers may still be processing items
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Running | Self::Draining)
    }

    /// Returns true if moving from `self` to `next` is a legal transition
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        match (self, next) {
            (Self::Idle, Self::Running)
            | (Self::Running, Self::Draining)
            | (Self::Draining, Self::Closed) => true,
            // Operator abort
            (Self::Idle | Self::Running, Self::Closed) => true,
            _ => false,
        }
    }

    /// Validates and performs a transition, returning the new phase
    pub fn transition(self, next: CrawlPhase) -> crate::Result<CrawlPhase> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(ScanError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

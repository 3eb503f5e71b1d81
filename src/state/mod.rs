//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlState`: the frontier plus the visited and result sets shared by all workers
//! - `CrawlPhase`: the supervisor state machine (idle, running, draining, closed)
//! - `FrontierItem`, `LinkRecord`, `ErroredRecord`: the values flowing through them

mod crawl_state;
mod phase;

// Re-export main types
pub use crawl_state::{CrawlState, ErroredRecord, FrontierItem, LinkRecord};
pub use phase::CrawlPhase;

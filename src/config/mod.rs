//! Configuration module for Linkscan
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file. Command line flags override values loaded here.
//!
//! # Example
//!
//! ```no_run
//! use linkscan::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("linkscan.toml")).unwrap();
//! println!("Crawler will use {} workers", config.crawler.concurrency);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, UserAgentConfig, DEFAULT_CONCURRENCY};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::{validate, validate_concurrency, MAX_CONCURRENCY};

//! URL handling module for Linkscan
//!
//! This module provides scheme fixing, fragment stripping, and the root
//! prefix scope that bounds a crawl.

mod normalize;
mod scope;

// Re-export main functions
pub use normalize::{ensure_scheme, strip_fragment};
pub use scope::RootScope;

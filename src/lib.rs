//! rankcheck library
//!
//! Resolves where a domain ranks for a keyword on Google Custom Search,
//! rotating across API keys to survive per-key quota limits.

pub mod cli;
pub mod config;
pub mod logging;
pub mod search;
pub mod sink;

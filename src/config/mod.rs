//! Configuration module for Sumi-Frontier
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use sumi_frontier::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("sumi-frontier.toml")).unwrap();
//! println!("Politeness queues: {}", config.frontier.queue_count);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, FrontierConfig, StorageConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{load_config, parse_config};

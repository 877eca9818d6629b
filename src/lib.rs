//! Sumi-Frontier: a persistent, polite URL frontier
//!
//! This crate implements the part of a web crawler that decides which URL each
//! worker fetches next. It deduplicates URLs against a durable record store,
//! filters likely crawl traps, spreads domains over politeness queues and
//! survives restarts without losing progress. A small tokio worker pool in
//! [`crawler`] drives it end to end.

pub mod config;
pub mod crawler;
pub mod frontier;
pub mod robots;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Sumi-Frontier operations
#[derive(Debug, Error)]
pub enum FrontierError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rusqlite::Error> for FrontierError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Storage(storage::StorageError::Sqlite(err))
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid domain pattern: {0}")]
    InvalidPattern(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,

    #[error("Malformed URL: {0}")]
    Malformed(String),
}

/// Result type alias for Sumi-Frontier operations
pub type Result<T> = std::result::Result<T, FrontierError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use frontier::{Admission, Completion, Frontier, FrontierStats, NextUrl, Rejection};
pub use crate::url::{extract_domain, fingerprint, is_valid, normalize_url, Fingerprint, UrlFilter};

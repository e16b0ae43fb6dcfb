//! Kumo-Swarm: a pooled frontier web crawler
//!
//! This crate coordinates a pool of concurrent workers that drain a shared
//! URL frontier, fetch pages, extract new in-domain links, and persist each
//! fetched page exactly once, terminating when the frontier is empty and no
//! worker is active.

pub mod config;
pub mod crawler;
pub mod services;
pub mod url;

use thiserror::Error;

/// Main error type for Kumo-Swarm operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Shared service error: {0}")]
    Service(#[from] services::ServiceError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Worker {worker} exited abnormally: {message}")]
    WorkerFailed { worker: usize, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
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

    #[error("Unknown charset label: {0}")]
    UnknownCharset(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Kumo-Swarm operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Controller, CrawlSummary, WorkerStatus};
pub use services::{
    content_address, ContentStore, Frontier, PageRecord, ServiceHandles, StoreOutcome, VisitedSet,
};
pub use url::normalize_url;

//! Crawler module: the coordination core
//!
//! This module contains:
//! - The retry policy wrapping the fetch path
//! - HTTP fetching and charset-preference decoding
//! - Link extraction from decoded pages
//! - The worker state machine
//! - The worker pool controller and termination detector

mod controller;
mod extractor;
mod fetcher;
mod retry;
mod worker;

pub use controller::{run_crawl, Controller, CrawlSummary};
pub use extractor::extract_links;
pub use fetcher::{build_http_client, decode_page, Charset, FetchError, Fetcher};
pub use retry::{RetryPolicy, Retryable};
pub use worker::{CrawlCounters, IdleBackoff, StatusCell, Worker, WorkerStatus};

use crate::config::Config;
use crate::CrawlError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl: it seeds the
/// frontier if empty, spawns the configured number of workers, and blocks
/// until the frontier is drained and every worker is idle.
pub async fn crawl(config: Config) -> Result<CrawlSummary, CrawlError> {
    run_crawl(config).await
}

//! Worker pool controller
//!
//! Seeds the frontier (idempotently), launches the worker pool, and runs
//! the completion-detection loop: the crawl is done when the frontier is
//! empty and no worker is in the `Working` state.

use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, Charset, Fetcher};
use crate::crawler::retry::RetryPolicy;
use crate::crawler::worker::{CrawlCounters, IdleBackoff, StatusCell, Worker};
use crate::services::{ServiceHandles, SqliteServices};
use crate::url::normalize_url;
use crate::CrawlError;
use std::path::Path;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Final counters for a completed crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlSummary {
    /// URLs claimed (each at most once, by exactly one worker)
    pub pages_claimed: u64,
    /// Pages newly written to the content store
    pub pages_stored: u64,
    /// Fetches that ended in the "no result" outcome
    pub no_results: u64,
}

/// Coordinates the worker pool over one set of shared services
pub struct Controller {
    config: Arc<Config>,
    services: ServiceHandles,
    fetcher: Arc<Fetcher>,
    cancel: CancellationToken,
}

impl Controller {
    /// Builds the pool controller: HTTP client, retry policy, and charset
    /// preference order all come from the validated configuration.
    pub fn new(config: Config, services: ServiceHandles) -> Result<Self, CrawlError> {
        let client = build_http_client(&config.fetcher)?;
        let charsets: Vec<Charset> = config
            .fetcher
            .charsets
            .iter()
            .filter_map(|label| Charset::from_label(label))
            .collect();

        let fetcher = Arc::new(Fetcher::new(
            client,
            RetryPolicy::from_config(&config.retry),
            charsets,
        ));

        Ok(Self {
            config: Arc::new(config),
            services,
            fetcher,
            cancel: CancellationToken::new(),
        })
    }

    /// Token for stopping the crawl from outside (e.g. a signal handler).
    /// Workers observe it between iterations; in-flight fetches finish.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Runs the crawl to completion
    pub async fn run(&self) -> Result<CrawlSummary, CrawlError> {
        self.seed_frontier()?;

        let counters = Arc::new(CrawlCounters::default());
        let worker_count = self.config.crawler.workers as usize;
        let idle_backoff = IdleBackoff {
            initial: Duration::from_millis(self.config.crawler.idle_backoff_ms),
            max: Duration::from_millis(self.config.crawler.max_idle_backoff_ms),
        };

        tracing::info!(workers = worker_count, "starting worker pool");

        let mut statuses = Vec::with_capacity(worker_count);
        let mut handles = Vec::with_capacity(worker_count);

        for id in 0..worker_count {
            let status = StatusCell::new();
            let worker = Worker::new(
                id,
                self.config.crawl.domain.clone(),
                self.services.clone(),
                Arc::clone(&self.fetcher),
                status.clone(),
                Arc::clone(&counters),
                self.cancel.clone(),
                idle_backoff,
            );
            statuses.push(status);
            handles.push(tokio::spawn(worker.run()));
        }

        let poll_interval = Duration::from_millis(self.config.crawler.poll_interval_ms);

        // Completion detection. Best-effort: a worker can pop the last URL
        // and flip to Working between the emptiness check and the status
        // scan; the window is one poll interval wide.
        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    tracing::info!("crawl cancelled");
                    break;
                }
                _ = tokio::time::sleep(poll_interval) => {}
            }

            // A worker exiting before cancellation means it hit a fatal
            // service error; stop the pool and let the join surface it.
            if handles.iter().any(|h| h.is_finished()) {
                tracing::error!("a worker exited early, aborting crawl");
                break;
            }

            let frontier_empty = self.services.frontier.is_empty()?;
            let any_working = statuses.iter().any(|s| s.is_working());

            tracing::debug!(
                frontier_empty,
                any_working,
                claimed = counters.claimed.load(Ordering::Relaxed),
                "completion poll"
            );

            if frontier_empty && !any_working {
                tracing::info!("frontier empty and all workers idle, crawl complete");
                break;
            }
        }

        self.cancel.cancel();

        for (id, handle) in handles.into_iter().enumerate() {
            match handle.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => return Err(e),
                Err(join_error) => {
                    return Err(CrawlError::WorkerFailed {
                        worker: id,
                        message: join_error.to_string(),
                    })
                }
            }
        }

        let summary = CrawlSummary {
            pages_claimed: counters.claimed.load(Ordering::Relaxed),
            pages_stored: counters.stored.load(Ordering::Relaxed),
            no_results: counters.no_result.load(Ordering::Relaxed),
        };

        tracing::info!(
            claimed = summary.pages_claimed,
            stored = summary.pages_stored,
            no_results = summary.no_results,
            "crawl finished"
        );

        Ok(summary)
    }

    /// Seeds the frontier with the configured URLs, only if it is empty.
    /// Repeated invocations against a non-empty frontier are no-ops, so
    /// seeding is idempotent across runs.
    fn seed_frontier(&self) -> Result<(), CrawlError> {
        if !self.services.frontier.is_empty()? {
            tracing::info!("frontier not empty, skipping seeding");
            return Ok(());
        }

        for seed in &self.config.crawl.seeds {
            let url = normalize_url(seed)?;
            tracing::info!(url = %url, "seeding frontier");
            self.services.frontier.push(url.as_str())?;
        }

        Ok(())
    }
}

/// Runs a complete crawl against the SQLite services named in the config
pub async fn run_crawl(config: Config) -> Result<CrawlSummary, CrawlError> {
    let services = Arc::new(SqliteServices::new(Path::new(
        &config.storage.database_path,
    ))?);
    let controller = Controller::new(config, ServiceHandles::from_shared(services))?;
    controller.run().await
}

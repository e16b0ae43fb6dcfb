//! Worker: the per-task crawl loop
//!
//! Each worker repeatedly pops a URL from the frontier, claims it against
//! the visited set, fetches it, persists the page, and pushes extracted
//! links back into the frontier. The loop has no natural exit; it stops
//! only through the pool's cancellation token, always between iterations,
//! never mid-fetch.

use crate::crawler::extractor::extract_links;
use crate::crawler::fetcher::Fetcher;
use crate::services::{PageRecord, ServiceHandles, StoreOutcome};
use crate::CrawlError;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Externally visible worker state
///
/// `Working` covers exactly the fetch/store/extract sequence for a claimed
/// URL; every outcome of that sequence returns the worker to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WorkerStatus {
    Idle = 0,
    Working = 1,
}

/// Thread-safe status cell, written by the owning worker and read by the
/// controller from its own task
#[derive(Debug, Clone, Default)]
pub struct StatusCell(Arc<AtomicU8>);

impl StatusCell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, status: WorkerStatus) {
        self.0.store(status as u8, Ordering::SeqCst);
    }

    pub fn get(&self) -> WorkerStatus {
        match self.0.load(Ordering::SeqCst) {
            0 => WorkerStatus::Idle,
            _ => WorkerStatus::Working,
        }
    }

    pub fn is_working(&self) -> bool {
        self.get() == WorkerStatus::Working
    }
}

/// Shared crawl counters, reported in the final summary
#[derive(Debug, Default)]
pub struct CrawlCounters {
    pub claimed: AtomicU64,
    pub stored: AtomicU64,
    pub no_result: AtomicU64,
}

/// Per-worker backoff bounds for the empty-frontier wait
#[derive(Debug, Clone, Copy)]
pub struct IdleBackoff {
    pub initial: Duration,
    pub max: Duration,
}

/// One worker in the pool
pub struct Worker {
    id: usize,
    domain: String,
    services: ServiceHandles,
    fetcher: Arc<Fetcher>,
    status: StatusCell,
    counters: Arc<CrawlCounters>,
    cancel: CancellationToken,
    idle_backoff: IdleBackoff,
}

impl Worker {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: usize,
        domain: String,
        services: ServiceHandles,
        fetcher: Arc<Fetcher>,
        status: StatusCell,
        counters: Arc<CrawlCounters>,
        cancel: CancellationToken,
        idle_backoff: IdleBackoff,
    ) -> Self {
        Self {
            id,
            domain,
            services,
            fetcher,
            status,
            counters,
            cancel,
            idle_backoff,
        }
    }

    /// Runs the worker loop until cancelled.
    ///
    /// Per iteration:
    /// 1. pop from the frontier; on empty, back off (bounded) and retry
    /// 2. try to claim the URL; claim losses are discarded silently
    /// 3. Idle → Working
    /// 4. fetch; "no result" skips storage and extraction
    /// 5. store idempotently, then push surviving extracted links
    /// 6. Working → Idle, unconditionally
    ///
    /// Shared-service failures surface as `Err` (after restoring Idle) so
    /// the controller sees the worker die instead of a silent crash.
    pub async fn run(self) -> Result<(), CrawlError> {
        tracing::debug!(worker = self.id, "worker started");
        let mut idle_wait = self.idle_backoff.initial;

        loop {
            if self.cancel.is_cancelled() {
                break;
            }

            let url = match self.services.frontier.pop()? {
                Some(url) => {
                    idle_wait = self.idle_backoff.initial;
                    url
                }
                None => {
                    // Transient emptiness is not an exit condition; wait
                    // with capped exponential backoff and look again.
                    tokio::select! {
                        _ = self.cancel.cancelled() => break,
                        _ = tokio::time::sleep(idle_wait) => {}
                    }
                    idle_wait = (idle_wait * 2).min(self.idle_backoff.max);
                    continue;
                }
            };

            // The sole dedup gate: at most one worker ever claims a URL
            if !self.services.visited.try_claim(&url)? {
                tracing::trace!(worker = self.id, url, "claim lost, discarding");
                continue;
            }

            self.status.set(WorkerStatus::Working);
            let outcome = self.process(&url).await;
            self.status.set(WorkerStatus::Idle);
            outcome?;
        }

        tracing::debug!(worker = self.id, "worker stopped");
        Ok(())
    }

    /// Fetch, store, extract, push — for one claimed URL
    async fn process(&self, url: &str) -> Result<(), CrawlError> {
        tracing::info!(worker = self.id, url, "fetching");
        self.counters.claimed.fetch_add(1, Ordering::Relaxed);

        let page = match self.fetcher.fetch(url).await {
            Ok(Some(page)) => page,
            Ok(None) => {
                self.counters.no_result.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(worker = self.id, url, "no result");
                return Ok(());
            }
            Err(e) => {
                // Non-retryable fetch failure: local to this URL, the
                // worker itself stays healthy
                self.counters.no_result.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(worker = self.id, url, error = %e, "fetch failed");
                return Ok(());
            }
        };

        let record = PageRecord::new(url, &page)?;
        match self.services.store.put_if_absent(&record)? {
            StoreOutcome::Inserted => {
                self.counters.stored.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(worker = self.id, url, id = %record.id, "page stored");
            }
            StoreOutcome::AlreadyPresent => {
                tracing::trace!(worker = self.id, url, "page already stored");
            }
        }

        for link in extract_links(&page, &self.domain) {
            // Advisory check only: it trims frontier noise, while
            // correctness rests on try_claim at the top of the loop
            if !self.services.visited.contains(&link)? {
                self.services.frontier.push(&link)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_cell_roundtrip() {
        let cell = StatusCell::new();
        assert_eq!(cell.get(), WorkerStatus::Idle);
        assert!(!cell.is_working());

        cell.set(WorkerStatus::Working);
        assert_eq!(cell.get(), WorkerStatus::Working);
        assert!(cell.is_working());

        cell.set(WorkerStatus::Idle);
        assert_eq!(cell.get(), WorkerStatus::Idle);
    }

    #[test]
    fn test_status_cell_shared_across_clones() {
        let cell = StatusCell::new();
        let observer = cell.clone();
        cell.set(WorkerStatus::Working);
        assert!(observer.is_working());
    }
}

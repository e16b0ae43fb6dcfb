//! Shared-service traits and error types
//!
//! The frontier, visited set, and content store are shared services
//! accessed concurrently by all workers. The atomicity guarantees live
//! in the implementations; the crawl core performs no client-side locking.

use crate::services::PageRecord;
use thiserror::Error;

/// Errors that can occur during shared-service operations
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Service backend error: {0}")]
    Backend(String),
}

/// Result type for shared-service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Outcome of an idempotent content-store write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOutcome {
    /// The record was written; no record with this id existed before
    Inserted,
    /// A record with this id already exists; the write was suppressed
    AlreadyPresent,
}

/// Shared FIFO queue of URLs pending fetch
///
/// Duplicates may be pushed; deduplication is enforced at claim time by
/// the [`VisitedSet`], never here.
pub trait Frontier: Send + Sync {
    /// Appends a URL to the tail. Always succeeds barring a backend failure.
    fn push(&self, url: &str) -> ServiceResult<()>;

    /// Removes and returns the head, or `None` if the queue is empty.
    /// Non-blocking; the caller decides whether to back off and retry.
    fn pop(&self) -> ServiceResult<Option<String>>;

    /// Instantaneous, possibly stale, emptiness check.
    fn is_empty(&self) -> ServiceResult<bool>;

    /// Current queue length, for progress reporting.
    fn len(&self) -> ServiceResult<usize>;
}

/// Shared set of URLs already claimed for fetching
///
/// Membership is permanent and is the single source of truth for
/// "already handled."
pub trait VisitedSet: Send + Sync {
    /// Atomic check-and-set: returns true and records membership iff the
    /// URL was not previously a member. This is the sole dedup gate.
    fn try_claim(&self, url: &str) -> ServiceResult<bool>;

    /// Advisory membership check, used only to avoid pushing obviously
    /// known URLs back into the frontier. Never load-bearing.
    fn contains(&self, url: &str) -> ServiceResult<bool>;
}

/// Persistent store of fetched pages, keyed by content address
pub trait ContentStore: Send + Sync {
    /// Writes the record iff no record with its id exists. Atomic per key:
    /// concurrent writers for the same id see exactly one `Inserted`.
    fn put_if_absent(&self, record: &PageRecord) -> ServiceResult<StoreOutcome>;

    /// Looks up a record by content address.
    fn get(&self, id: &str) -> ServiceResult<Option<PageRecord>>;

    /// Number of stored records.
    fn count(&self) -> ServiceResult<u64>;
}

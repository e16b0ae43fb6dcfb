//! Shared coordination services
//!
//! The crawl core talks to three shared services, each behind a trait:
//!
//! - [`Frontier`]: FIFO queue of URLs pending fetch
//! - [`VisitedSet`]: set of URLs already claimed (the dedup gate)
//! - [`ContentStore`]: idempotent, content-addressed page persistence
//!
//! Two backends are provided: in-process memory (tests, single runs) and
//! SQLite (durable runs). Both uphold the same atomicity contracts.

mod memory;
mod sqlite;
mod traits;

pub use memory::{MemoryContentStore, MemoryFrontier, MemoryVisitedSet};
pub use sqlite::SqliteServices;
pub use traits::{ContentStore, Frontier, ServiceError, ServiceResult, StoreOutcome, VisitedSet};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use sha2::{Digest, Sha256};
use std::io::{Read, Write};
use std::sync::Arc;

/// The set of shared-service handles injected into each worker
///
/// No module-level singletons: every worker gets its own clone of these
/// handles, and the controller holds one for seeding and the completion
/// check.
#[derive(Clone)]
pub struct ServiceHandles {
    pub frontier: Arc<dyn Frontier>,
    pub visited: Arc<dyn VisitedSet>,
    pub store: Arc<dyn ContentStore>,
}

impl ServiceHandles {
    pub fn new(
        frontier: Arc<dyn Frontier>,
        visited: Arc<dyn VisitedSet>,
        store: Arc<dyn ContentStore>,
    ) -> Self {
        Self {
            frontier,
            visited,
            store,
        }
    }

    /// Builds handles from one backend implementing all three services
    pub fn from_shared<S>(services: Arc<S>) -> Self
    where
        S: Frontier + VisitedSet + ContentStore + 'static,
    {
        Self {
            frontier: services.clone(),
            visited: services.clone(),
            store: services,
        }
    }

    /// All-in-memory handles, mainly for tests and single-process runs
    pub fn in_memory() -> Self {
        Self {
            frontier: Arc::new(MemoryFrontier::new()),
            visited: Arc::new(MemoryVisitedSet::new()),
            store: Arc::new(MemoryContentStore::new()),
        }
    }
}

/// A persisted page, keyed by the content address of its URL
///
/// Identity is `id`; two records with the same id are the same logical
/// page and the second write is suppressed by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRecord {
    /// Hex-encoded SHA-256 digest of the URL
    pub id: String,
    /// The claimed URL this page was fetched from
    pub url: String,
    /// Zlib-compressed UTF-8 page text
    pub payload: Vec<u8>,
}

impl PageRecord {
    /// Builds a record from a URL and its decoded page text
    pub fn new(url: &str, page: &str) -> std::io::Result<Self> {
        Ok(Self {
            id: content_address(url),
            url: url.to_string(),
            payload: compress_payload(page)?,
        })
    }

    /// Decompresses the payload back into page text
    pub fn page_text(&self) -> std::io::Result<String> {
        decompress_payload(&self.payload)
    }
}

/// Deterministic content address for a URL: hex-encoded SHA-256 digest
///
/// The key derives from the URL, not the page body, so re-fetches of the
/// same URL are suppressed at storage even if the content drifted.
pub fn content_address(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}

/// Compresses page text into the stored payload form (zlib)
pub fn compress_payload(page: &str) -> std::io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(page.as_bytes())?;
    encoder.finish()
}

/// Decompresses a stored payload back into page text
pub fn decompress_payload(payload: &[u8]) -> std::io::Result<String> {
    let mut decoder = ZlibDecoder::new(payload);
    let mut text = String::new();
    decoder.read_to_string(&mut text)?;
    Ok(text)
}

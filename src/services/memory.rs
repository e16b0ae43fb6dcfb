//! In-process service implementations
//!
//! Used by tests and single-process crawls. Each operation holds a single
//! mutex for its whole duration, which gives the check-and-set atomicity
//! the contracts require.

use crate::services::traits::{
    ContentStore, Frontier, ServiceResult, StoreOutcome, VisitedSet,
};
use crate::services::PageRecord;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

/// FIFO frontier backed by a mutex-guarded deque
#[derive(Debug, Default)]
pub struct MemoryFrontier {
    queue: Mutex<VecDeque<String>>,
}

impl MemoryFrontier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Frontier for MemoryFrontier {
    fn push(&self, url: &str) -> ServiceResult<()> {
        self.queue.lock().unwrap().push_back(url.to_string());
        Ok(())
    }

    fn pop(&self) -> ServiceResult<Option<String>> {
        Ok(self.queue.lock().unwrap().pop_front())
    }

    fn is_empty(&self) -> ServiceResult<bool> {
        Ok(self.queue.lock().unwrap().is_empty())
    }

    fn len(&self) -> ServiceResult<usize> {
        Ok(self.queue.lock().unwrap().len())
    }
}

/// Visited set backed by a mutex-guarded hash set
#[derive(Debug, Default)]
pub struct MemoryVisitedSet {
    set: Mutex<HashSet<String>>,
}

impl MemoryVisitedSet {
    pub fn new() -> Self {
        Self::default()
    }
}

impl VisitedSet for MemoryVisitedSet {
    fn try_claim(&self, url: &str) -> ServiceResult<bool> {
        // insert() is the check-and-set: one lock, no observable gap
        Ok(self.set.lock().unwrap().insert(url.to_string()))
    }

    fn contains(&self, url: &str) -> ServiceResult<bool> {
        Ok(self.set.lock().unwrap().contains(url))
    }
}

/// Content store backed by a mutex-guarded map keyed by content address
#[derive(Debug, Default)]
pub struct MemoryContentStore {
    pages: Mutex<HashMap<String, PageRecord>>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ContentStore for MemoryContentStore {
    fn put_if_absent(&self, record: &PageRecord) -> ServiceResult<StoreOutcome> {
        let mut pages = self.pages.lock().unwrap();
        if pages.contains_key(&record.id) {
            Ok(StoreOutcome::AlreadyPresent)
        } else {
            pages.insert(record.id.clone(), record.clone());
            Ok(StoreOutcome::Inserted)
        }
    }

    fn get(&self, id: &str) -> ServiceResult<Option<PageRecord>> {
        Ok(self.pages.lock().unwrap().get(id).cloned())
    }

    fn count(&self) -> ServiceResult<u64> {
        Ok(self.pages.lock().unwrap().len() as u64)
    }
}

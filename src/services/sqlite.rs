//! SQLite service implementation
//!
//! One database file backs all three shared services. A single connection
//! behind a mutex serializes access, so every check-and-set below executes
//! as one atomic statement against the shared state.

use crate::services::traits::{
    ContentStore, Frontier, ServiceResult, StoreOutcome, VisitedSet,
};
use crate::services::PageRecord;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

/// SQLite backend for the frontier, visited set, and content store
pub struct SqliteServices {
    conn: Mutex<Connection>,
}

impl SqliteServices {
    /// Opens (or creates) the database file and initializes the schema
    pub fn new(path: &Path) -> ServiceResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory database (for testing)
    pub fn new_in_memory() -> ServiceResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Drops all pending frontier entries, for fresh runs
    pub fn clear_frontier(&self) -> ServiceResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM frontier", [])?;
        Ok(())
    }
}

fn initialize_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS frontier (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            url TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS visited (
            url TEXT PRIMARY KEY
        ) WITHOUT ROWID;

        CREATE TABLE IF NOT EXISTS pages (
            id TEXT PRIMARY KEY,
            url TEXT NOT NULL,
            payload BLOB NOT NULL
        ) WITHOUT ROWID;
    ",
    )
}

impl Frontier for SqliteServices {
    fn push(&self, url: &str) -> ServiceResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("INSERT INTO frontier (url) VALUES (?1)", params![url])?;
        Ok(())
    }

    fn pop(&self) -> ServiceResult<Option<String>> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        let head: Option<(i64, String)> = tx
            .query_row(
                "SELECT seq, url FROM frontier ORDER BY seq LIMIT 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let url = match head {
            Some((seq, url)) => {
                tx.execute("DELETE FROM frontier WHERE seq = ?1", params![seq])?;
                Some(url)
            }
            None => None,
        };

        tx.commit()?;
        Ok(url)
    }

    fn is_empty(&self) -> ServiceResult<bool> {
        let conn = self.conn.lock().unwrap();
        let exists: bool =
            conn.query_row("SELECT EXISTS(SELECT 1 FROM frontier)", [], |row| {
                row.get(0)
            })?;
        Ok(!exists)
    }

    fn len(&self) -> ServiceResult<usize> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM frontier", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

impl VisitedSet for SqliteServices {
    fn try_claim(&self, url: &str) -> ServiceResult<bool> {
        let conn = self.conn.lock().unwrap();
        // INSERT OR IGNORE is the check-and-set; changes() reports whether
        // this call inserted the row
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO visited (url) VALUES (?1)",
            params![url],
        )?;
        Ok(inserted == 1)
    }

    fn contains(&self, url: &str) -> ServiceResult<bool> {
        let conn = self.conn.lock().unwrap();
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM visited WHERE url = ?1)",
            params![url],
            |row| row.get(0),
        )?;
        Ok(exists)
    }
}

impl ContentStore for SqliteServices {
    fn put_if_absent(&self, record: &PageRecord) -> ServiceResult<StoreOutcome> {
        let conn = self.conn.lock().unwrap();
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO pages (id, url, payload) VALUES (?1, ?2, ?3)",
            params![record.id, record.url, record.payload],
        )?;
        if inserted == 1 {
            Ok(StoreOutcome::Inserted)
        } else {
            Ok(StoreOutcome::AlreadyPresent)
        }
    }

    fn get(&self, id: &str) -> ServiceResult<Option<PageRecord>> {
        let conn = self.conn.lock().unwrap();
        let record = conn
            .query_row(
                "SELECT id, url, payload FROM pages WHERE id = ?1",
                params![id],
                |row| {
                    Ok(PageRecord {
                        id: row.get(0)?,
                        url: row.get(1)?,
                        payload: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    fn count(&self) -> ServiceResult<u64> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM pages", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frontier_fifo_order() {
        let services = SqliteServices::new_in_memory().unwrap();
        services.push("http://example.com/a").unwrap();
        services.push("http://example.com/b").unwrap();
        services.push("http://example.com/a").unwrap(); // duplicates allowed

        assert_eq!(services.len().unwrap(), 3);
        assert_eq!(
            Frontier::pop(&services).unwrap(),
            Some("http://example.com/a".to_string())
        );
        assert_eq!(
            Frontier::pop(&services).unwrap(),
            Some("http://example.com/b".to_string())
        );
        assert_eq!(
            Frontier::pop(&services).unwrap(),
            Some("http://example.com/a".to_string())
        );
        assert_eq!(Frontier::pop(&services).unwrap(), None);
        assert!(Frontier::is_empty(&services).unwrap());
    }

    #[test]
    fn test_clear_frontier() {
        let services = SqliteServices::new_in_memory().unwrap();
        services.push("http://example.com/a").unwrap();
        services.clear_frontier().unwrap();
        assert!(Frontier::is_empty(&services).unwrap());
    }

    #[test]
    fn test_try_claim_succeeds_once() {
        let services = SqliteServices::new_in_memory().unwrap();
        assert!(services.try_claim("http://example.com/a").unwrap());
        assert!(!services.try_claim("http://example.com/a").unwrap());
        assert!(services.contains("http://example.com/a").unwrap());
        assert!(!services.contains("http://example.com/b").unwrap());
    }

    #[test]
    fn test_put_if_absent_suppresses_second_write() {
        let services = SqliteServices::new_in_memory().unwrap();
        let first = PageRecord::new("http://example.com/", "original").unwrap();
        let second = PageRecord::new("http://example.com/", "changed").unwrap();

        assert_eq!(
            services.put_if_absent(&first).unwrap(),
            StoreOutcome::Inserted
        );
        assert_eq!(
            services.put_if_absent(&second).unwrap(),
            StoreOutcome::AlreadyPresent
        );

        let stored = services.get(&first.id).unwrap().unwrap();
        assert_eq!(stored.page_text().unwrap(), "original");
        assert_eq!(services.count().unwrap(), 1);
    }

    #[test]
    fn test_get_missing_record() {
        let services = SqliteServices::new_in_memory().unwrap();
        assert!(services.get("deadbeef").unwrap().is_none());
    }
}

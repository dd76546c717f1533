use anyhow::Result;
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

/// The site-wide hit counter: a single logical row, created implicitly on
/// first read or increment and never deleted.
pub struct CounterStore {
    conn: Mutex<Connection>,
}

impl CounterStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS counter (
                id      INTEGER PRIMARY KEY,
                value   INTEGER NOT NULL
            );",
        )?;

        info!("Counter store opened at {}", path.display());
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| anyhow::anyhow!("counter lock poisoned: {}", e))?;
        f(&conn)
    }

    /// Current value, 0 if never initialized. No side effect.
    pub fn read(&self) -> Result<u64> {
        self.with_conn(|conn| {
            let value: Option<i64> = conn
                .query_row("SELECT value FROM counter WHERE id = 1", [], |row| {
                    row.get(0)
                })
                .optional()?;
            Ok(value.unwrap_or(0) as u64)
        })
    }

    /// Adds `amount`, creating the row at `amount` if absent. The upsert
    /// returns the new value in the same statement, so there is no separate
    /// read-after-write window.
    pub fn increment(&self, amount: u64) -> Result<u64> {
        self.with_conn(|conn| {
            let value: i64 = conn.query_row(
                "INSERT INTO counter (id, value) VALUES (1, ?1)
                 ON CONFLICT(id) DO UPDATE SET value = value + ?1
                 RETURNING value",
                [amount as i64],
                |row| row.get(0),
            )?;
            Ok(value as u64)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn starts_at_zero() {
        let dir = tempdir().unwrap();
        let counter = CounterStore::open(&dir.path().join("counter.db")).unwrap();
        assert_eq!(counter.read().unwrap(), 0);
        // Reading does not initialize anything.
        assert_eq!(counter.read().unwrap(), 0);
    }

    #[test]
    fn increment_returns_new_value() {
        let dir = tempdir().unwrap();
        let counter = CounterStore::open(&dir.path().join("counter.db")).unwrap();
        assert_eq!(counter.increment(1).unwrap(), 1);
        assert_eq!(counter.increment(1).unwrap(), 2);
        assert_eq!(counter.increment(5).unwrap(), 7);
        assert_eq!(counter.read().unwrap(), 7);
    }

    #[test]
    fn five_sequential_increments() {
        let dir = tempdir().unwrap();
        let counter = CounterStore::open(&dir.path().join("counter.db")).unwrap();
        for _ in 0..5 {
            counter.increment(1).unwrap();
        }
        assert_eq!(counter.read().unwrap(), 5);
    }

    #[test]
    fn value_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("counter.db");
        {
            let counter = CounterStore::open(&path).unwrap();
            counter.increment(3).unwrap();
        }
        let counter = CounterStore::open(&path).unwrap();
        assert_eq!(counter.read().unwrap(), 3);
    }
}

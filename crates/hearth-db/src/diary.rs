use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

use hearth_types::models::DiaryEntry;

/// Entries keyed by calendar date. Because the primary key is the
/// zero-padded `YYYY-MM-DD` string, "get by date", "list recent", "list by
/// month" and "which years/months have content" are all plain key-range or
/// key-prefix queries — no secondary date index.
pub struct DiaryStore {
    conn: Mutex<Connection>,
}

impl DiaryStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS diaries (
                id          TEXT PRIMARY KEY,
                body        TEXT NOT NULL,
                created_at  TEXT NOT NULL,
                updated_at  TEXT NOT NULL
            );",
        )?;

        info!("Diary store opened at {}", path.display());
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
            .map_err(|e| anyhow::anyhow!("diary lock poisoned: {}", e))?;
        f(&conn)
    }

    /// Exact-key lookup.
    pub fn get(&self, date: &str) -> Result<Option<DiaryEntry>> {
        self.with_conn(|conn| query_entry(conn, date))
    }

    /// Create or update in one operation. An existing entry keeps its
    /// `created_at` and gets a fresh `updated_at`; a new one starts with the
    /// two equal. Callers that must reject duplicate creation check
    /// existence first — the store itself does not.
    pub fn save(&self, id: &str, body: &str) -> Result<DiaryEntry> {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

        self.with_conn(|conn| {
            let existing: Option<String> = conn
                .query_row("SELECT created_at FROM diaries WHERE id = ?1", [id], |row| {
                    row.get(0)
                })
                .optional()?;

            match existing {
                Some(created_at) => {
                    conn.execute(
                        "UPDATE diaries SET body = ?2, updated_at = ?3 WHERE id = ?1",
                        rusqlite::params![id, body, now],
                    )?;
                    Ok(DiaryEntry {
                        id: id.to_string(),
                        body: body.to_string(),
                        created_at,
                        updated_at: now.clone(),
                    })
                }
                None => {
                    conn.execute(
                        "INSERT INTO diaries (id, body, created_at, updated_at)
                         VALUES (?1, ?2, ?3, ?3)",
                        rusqlite::params![id, body, now],
                    )?;
                    Ok(DiaryEntry {
                        id: id.to_string(),
                        body: body.to_string(),
                        created_at: now.clone(),
                        updated_at: now.clone(),
                    })
                }
            }
        })
    }

    /// Physical removal. Returns whether a row existed.
    pub fn delete(&self, date: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let affected = conn.execute("DELETE FROM diaries WHERE id = ?1", [date])?;
            Ok(affected > 0)
        })
    }

    /// All entries by date descending, limited.
    pub fn get_recent(&self, limit: u32) -> Result<Vec<DiaryEntry>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, body, created_at, updated_at FROM diaries
                 ORDER BY id DESC LIMIT ?1",
            )?;
            let rows = stmt
                .query_map([limit], map_entry)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Entries of one month, newest first, via an inclusive range over the
    /// fixed-width keys (`YYYY-MM-01` ..= `YYYY-MM-31`). The range stands in
    /// for a LIKE prefix match and is safe exactly because the keys are
    /// zero-padded. Out-of-range year or month yields an empty vec.
    pub fn get_by_month(&self, year: i32, month: u32) -> Result<Vec<DiaryEntry>> {
        if !(1900..=2100).contains(&year) || !(1..=12).contains(&month) {
            return Ok(Vec::new());
        }

        let start = format!("{:04}-{:02}-01", year, month);
        let end = format!("{:04}-{:02}-31", year, month);

        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, body, created_at, updated_at FROM diaries
                 WHERE id >= ?1 AND id <= ?2
                 ORDER BY id DESC",
            )?;
            let rows = stmt
                .query_map([start, end], map_entry)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Distinct years that have at least one entry, newest first.
    pub fn get_years_with_entries(&self) -> Result<Vec<i32>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT DISTINCT substr(id, 1, 4) AS year FROM diaries
                 ORDER BY year DESC",
            )?;
            let years = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<std::result::Result<Vec<_>, _>>()?
                .into_iter()
                .filter_map(|y| y.parse().ok())
                .collect();
            Ok(years)
        })
    }

    /// Distinct months with entries in the given year, ascending.
    pub fn get_months_with_entries(&self, year: i32) -> Result<Vec<u32>> {
        let year_key = format!("{:04}", year);

        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT DISTINCT substr(id, 6, 2) AS month FROM diaries
                 WHERE substr(id, 1, 4) = ?1
                 ORDER BY month",
            )?;
            let months = stmt
                .query_map([year_key], |row| row.get::<_, String>(0))?
                .collect::<std::result::Result<Vec<_>, _>>()?
                .into_iter()
                .filter_map(|m| m.parse().ok())
                .collect();
            Ok(months)
        })
    }
}

fn query_entry(conn: &Connection, date: &str) -> Result<Option<DiaryEntry>> {
    let mut stmt =
        conn.prepare("SELECT id, body, created_at, updated_at FROM diaries WHERE id = ?1")?;
    let row = stmt.query_row([date], map_entry).optional()?;
    Ok(row)
}

fn map_entry(row: &rusqlite::Row<'_>) -> std::result::Result<DiaryEntry, rusqlite::Error> {
    Ok(DiaryEntry {
        id: row.get(0)?,
        body: row.get(1)?,
        created_at: row.get(2)?,
        updated_at: row.get(3)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{TempDir, tempdir};

    fn open_store() -> (TempDir, DiaryStore) {
        let dir = tempdir().unwrap();
        let store = DiaryStore::open(&dir.path().join("diary.db")).unwrap();
        (dir, store)
    }

    #[test]
    fn save_and_retrieve() {
        let (_dir, diary) = open_store();
        let entry = diary.save("2025-01-01", "Test diary entry").unwrap();
        assert_eq!(entry.id, "2025-01-01");
        assert_eq!(entry.created_at, entry.updated_at);

        let retrieved = diary.get("2025-01-01").unwrap().unwrap();
        assert_eq!(retrieved.body, "Test diary entry");
    }

    #[test]
    fn get_absent_date() {
        let (_dir, diary) = open_store();
        assert!(diary.get("2025-06-01").unwrap().is_none());
    }

    #[test]
    fn second_save_updates_in_place() {
        let (_dir, diary) = open_store();
        let original = diary.save("2025-01-02", "Original content").unwrap();
        // Make sure the clock moves past the first timestamp.
        std::thread::sleep(std::time::Duration::from_millis(5));
        let updated = diary.save("2025-01-02", "Updated content").unwrap();

        assert_eq!(updated.created_at, original.created_at);
        assert_ne!(updated.updated_at, original.updated_at);
        assert_eq!(diary.get("2025-01-02").unwrap().unwrap().body, "Updated content");
    }

    #[test]
    fn delete_is_physical() {
        let (_dir, diary) = open_store();
        diary.save("2025-01-03", "To be deleted").unwrap();

        assert!(diary.delete("2025-01-03").unwrap());
        assert!(diary.get("2025-01-03").unwrap().is_none());
        assert!(!diary.delete("2025-01-03").unwrap());
    }

    #[test]
    fn recent_entries_descend_by_date() {
        let (_dir, diary) = open_store();
        diary.save("2025-01-01", "Entry 1").unwrap();
        diary.save("2025-01-02", "Entry 2").unwrap();
        diary.save("2025-01-03", "Entry 3").unwrap();

        let recent = diary.get_recent(2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].id, "2025-01-03");
        assert_eq!(recent[1].id, "2025-01-02");
    }

    #[test]
    fn month_range_is_exact() {
        let (_dir, diary) = open_store();
        diary.save("2025-01-01", "January 1").unwrap();
        diary.save("2025-01-15", "January 15").unwrap();
        diary.save("2025-02-01", "February 1").unwrap();

        let january = diary.get_by_month(2025, 1).unwrap();
        assert_eq!(january.len(), 2);
        assert_eq!(january[0].id, "2025-01-15");
        assert_eq!(january[1].id, "2025-01-01");

        let february = diary.get_by_month(2025, 2).unwrap();
        assert_eq!(february.len(), 1);
        assert_eq!(february[0].id, "2025-02-01");
    }

    #[test]
    fn month_queries_out_of_range_are_empty() {
        let (_dir, diary) = open_store();
        diary.save("2025-01-01", "entry").unwrap();

        assert!(diary.get_by_month(2030, 1).unwrap().is_empty());
        assert!(diary.get_by_month(2025, 99).unwrap().is_empty());
        assert!(diary.get_by_month(1800, 1).unwrap().is_empty());
        assert!(diary.get_by_month(2025, 0).unwrap().is_empty());
    }

    #[test]
    fn years_with_entries_descend() {
        let (_dir, diary) = open_store();
        diary.save("2023-01-01", "2023 entry").unwrap();
        diary.save("2024-01-01", "2024 entry").unwrap();
        diary.save("2025-01-01", "2025 entry").unwrap();

        let years = diary.get_years_with_entries().unwrap();
        assert_eq!(years, vec![2025, 2024, 2023]);
    }

    #[test]
    fn months_with_entries_ascend_within_year() {
        let (_dir, diary) = open_store();
        diary.save("2025-01-01", "January").unwrap();
        diary.save("2025-03-01", "March").unwrap();
        diary.save("2025-12-01", "December").unwrap();
        diary.save("2024-07-01", "other year").unwrap();

        assert_eq!(diary.get_months_with_entries(2025).unwrap(), vec![1, 3, 12]);
        assert_eq!(diary.get_months_with_entries(2024).unwrap(), vec![7]);
        assert!(diary.get_months_with_entries(2030).unwrap().is_empty());
    }

    #[test]
    fn recent_limit_applies_across_many_entries() {
        let (_dir, diary) = open_store();
        for i in 1..=10 {
            diary
                .save(&format!("2025-01-{:02}", i), &format!("Entry {}", i))
                .unwrap();
        }

        let recent = diary.get_recent(5).unwrap();
        assert_eq!(recent.len(), 5);
        assert_eq!(recent[0].id, "2025-01-10");
        assert_eq!(recent[4].id, "2025-01-06");
    }
}

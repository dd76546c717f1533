use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use rusqlite::Connection;
use std::path::Path;
use std::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use hearth_types::models::BoardPost;

/// Marker written over name and body when a post is taken down.
pub const TOMBSTONE: &str = "(deleted)";

/// Append-only post log with logical deletion. Rows are never removed, only
/// flagged and scrubbed, which keeps pagination slots stable for readers
/// while redacting the content.
pub struct BoardStore {
    conn: Mutex<Connection>,
}

impl BoardStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS posts (
                id          TEXT PRIMARY KEY,
                name        TEXT NOT NULL,
                body        TEXT NOT NULL,
                date        TEXT NOT NULL,
                delete_key  TEXT,
                deleted     INTEGER NOT NULL DEFAULT 0,
                ip          TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_posts_date
                ON posts(date);",
        )?;

        info!("Board store opened at {}", path.display());
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
            .map_err(|e| anyhow::anyhow!("board lock poisoned: {}", e))?;
        f(&conn)
    }

    /// Stores a new post under a fresh uuid and creation timestamp and
    /// returns both. Length limits on name/body are the caller's job — the
    /// store takes what it is given.
    pub fn post(
        &self,
        name: &str,
        body: &str,
        delete_key: Option<&str>,
        ip: Option<&str>,
    ) -> Result<(String, BoardPost)> {
        let id = Uuid::new_v4().to_string();
        let date = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO posts (id, name, body, date, delete_key, ip)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![id, name, body, date, delete_key, ip],
            )?;
            Ok(())
        })?;

        let post = BoardPost {
            id: id.clone(),
            name: name.to_string(),
            body: body.to_string(),
            date,
            delete_key: delete_key.map(str::to_string),
            deleted: false,
            ip: ip.map(str::to_string),
        };
        Ok((id, post))
    }

    /// Tombstones the post if a live row matches both id and key: name and
    /// body are overwritten, the key is cleared, the deleted flag set.
    /// Missing row, wrong key and already-deleted all come back `false`;
    /// callers cannot tell which case occurred.
    pub fn delete_post(&self, id: &str, delete_key: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let affected = conn.execute(
                "UPDATE posts SET name = ?3, body = ?3, delete_key = NULL, deleted = 1
                 WHERE id = ?1 AND delete_key = ?2 AND deleted = 0",
                rusqlite::params![id, delete_key, TOMBSTONE],
            )?;
            Ok(affected > 0)
        })
    }

    /// Live posts, newest first, skipping `offset` and returning at most
    /// `limit`. Identical timestamps fall back to descending insertion order
    /// (rowid), so same-millisecond posts page deterministically.
    pub fn get_range(&self, offset: u32, limit: u32) -> Result<Vec<BoardPost>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, body, date, delete_key, ip FROM posts
                 WHERE deleted = 0
                 ORDER BY date DESC, rowid DESC
                 LIMIT ?1 OFFSET ?2",
            )?;

            let rows = stmt
                .query_map([limit, offset], |row| {
                    Ok(BoardPost {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        body: row.get(2)?,
                        date: row.get(3)?,
                        delete_key: row.get(4)?,
                        deleted: false,
                        ip: row.get(5)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// Count of live posts only.
    pub fn count(&self) -> Result<u64> {
        self.with_conn(|conn| {
            let n: i64 =
                conn.query_row("SELECT COUNT(*) FROM posts WHERE deleted = 0", [], |row| {
                    row.get(0)
                })?;
            Ok(n as u64)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{TempDir, tempdir};

    fn open_store() -> (TempDir, BoardStore) {
        let dir = tempdir().unwrap();
        let store = BoardStore::open(&dir.path().join("board.db")).unwrap();
        (dir, store)
    }

    #[test]
    fn add_and_retrieve_a_post() {
        let (_dir, bbs) = open_store();
        let (id, _post) = bbs.post("foo", "bar", None, None).unwrap();
        assert!(Uuid::parse_str(&id).is_ok());

        let posts = bbs.get_range(0, 10).unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].name, "foo");
        assert_eq!(posts[0].body, "bar");
    }

    #[test]
    fn newest_first() {
        let (_dir, bbs) = open_store();
        bbs.post("a", "1", None, None).unwrap();
        bbs.post("b", "2", None, None).unwrap();
        bbs.post("c", "3", None, None).unwrap();

        let posts = bbs.get_range(0, 2).unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].name, "c");
        assert_eq!(posts[1].name, "b");
    }

    #[test]
    fn delete_with_matching_key() {
        let (_dir, bbs) = open_store();
        let (id, _) = bbs.post("foo", "bar", Some("key"), None).unwrap();

        assert!(bbs.delete_post(&id, "key").unwrap());
        assert_eq!(bbs.get_range(0, 10).unwrap().len(), 0);
        assert_eq!(bbs.count().unwrap(), 0);

        // Second delete finds no live row.
        assert!(!bbs.delete_post(&id, "key").unwrap());
    }

    #[test]
    fn delete_with_wrong_key_leaves_post() {
        let (_dir, bbs) = open_store();
        let (id, _) = bbs.post("foo", "bar", Some("key"), None).unwrap();

        assert!(!bbs.delete_post(&id, "wrong").unwrap());
        assert_eq!(bbs.get_range(0, 10).unwrap().len(), 1);
    }

    #[test]
    fn delete_without_key_is_impossible() {
        let (_dir, bbs) = open_store();
        let (id, _) = bbs.post("foo", "bar", None, None).unwrap();

        // The row's key is NULL; no guess can match it.
        assert!(!bbs.delete_post(&id, "").unwrap());
        assert_eq!(bbs.count().unwrap(), 1);
    }

    #[test]
    fn offset_pages_through_live_posts() {
        let (_dir, bbs) = open_store();
        bbs.post("a", "1", None, None).unwrap();
        bbs.post("b", "2", None, None).unwrap();
        bbs.post("c", "3", None, None).unwrap();

        let posts = bbs.get_range(1, 2).unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].name, "b");
        assert_eq!(posts[1].name, "a");
    }

    #[test]
    fn deleted_posts_are_skipped_not_counted() {
        let (_dir, bbs) = open_store();
        let mut ids = Vec::new();
        for i in 0..10 {
            let (id, _) = bbs
                .post(&format!("user{}", i), &format!("post{}", i), Some("test"), None)
                .unwrap();
            ids.push(id);
        }
        assert!(bbs.delete_post(&ids[1], "test").unwrap());
        assert!(bbs.delete_post(&ids[2], "test").unwrap());

        // Offsets apply to live posts only.
        let posts = bbs.get_range(0, 3).unwrap();
        assert_eq!(posts.len(), 3);
        assert_eq!(posts[0].name, "user9");
        assert_eq!(posts[1].name, "user8");
        assert_eq!(posts[2].name, "user7");

        assert_eq!(bbs.count().unwrap(), 8);
    }

    #[test]
    fn pages_beyond_a_hundred_posts() {
        let (_dir, bbs) = open_store();
        for i in 0..105 {
            bbs.post(&format!("n{}", i), &format!("{}", i), None, None).unwrap();
        }

        let posts = bbs.get_range(0, 10).unwrap();
        assert_eq!(posts.len(), 10);
        assert_eq!(posts[0].body, "104");
        assert_eq!(posts[9].body, "95");

        let all = bbs.get_range(0, 105).unwrap();
        assert_eq!(all.len(), 105);
        assert_eq!(all[0].body, "104");
        assert_eq!(all[104].body, "0");
    }

    #[test]
    fn tombstone_keeps_id_and_scrubs_content() {
        let (_dir, bbs) = open_store();
        let (id, _) = bbs.post("foo", "secret text", Some("key"), Some("203.0.113.9")).unwrap();
        bbs.delete_post(&id, "key").unwrap();

        // The row still exists physically; inspect it past the live filter.
        let (name, body, delete_key, deleted): (String, String, Option<String>, i64) = bbs
            .with_conn(|conn| {
                Ok(conn.query_row(
                    "SELECT name, body, delete_key, deleted FROM posts WHERE id = ?1",
                    [&id],
                    |row| {
                        Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
                    },
                )?)
            })
            .unwrap();

        assert_eq!(name, TOMBSTONE);
        assert_eq!(body, TOMBSTONE);
        assert_eq!(delete_key, None);
        assert_eq!(deleted, 1);
    }
}

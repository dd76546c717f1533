use serde::{Deserialize, Serialize};

/// A bulletin board post as stored. Timestamps are RFC 3339 UTC strings so
/// that `date` doubles as the sort key.
///
/// `delete_key` and `ip` never leave the server raw — the API layer maps them
/// to `has_delete_key` / `ip_hash` before responding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardPost {
    pub id: String,
    pub name: String,
    pub body: String,
    pub date: String,
    pub delete_key: Option<String>,
    #[serde(default)]
    pub deleted: bool,
    pub ip: Option<String>,
}

/// A diary entry. The id is the calendar date (`YYYY-MM-DD`), which is also
/// the primary key and the sort key — no separate date index exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiaryEntry {
    pub id: String,
    pub body: String,
    pub created_at: String,
    pub updated_at: String,
}

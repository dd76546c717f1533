use serde::{Deserialize, Serialize};

// -- Counter --

#[derive(Debug, Serialize)]
pub struct CounterValue {
    pub count: u64,
    pub kiriban: bool,
}

/// Returned by the increment endpoint; carries the rendered digit image.
#[derive(Debug, Serialize)]
pub struct CounterHit {
    pub count: u64,
    pub kiriban: bool,
    pub svg: String,
}

// -- Bulletin board --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreatePostRequest {
    pub name: String,
    pub body: String,
    pub delete_key: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeletePostRequest {
    pub delete_key: String,
}

/// Public shape of a post. The raw delete key and IP address stay server-side;
/// clients only learn whether a key exists and a salted hash of the address.
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub id: String,
    pub name: String,
    pub body: String,
    pub date: String,
    pub has_delete_key: bool,
    pub ip_hash: String,
}

#[derive(Debug, Serialize)]
pub struct CreatePostResponse {
    pub id: String,
    pub post: PostView,
}

#[derive(Debug, Serialize)]
pub struct BoardPage {
    pub posts: Vec<PostView>,
    pub total: u64,
    pub limit: u32,
    pub offset: u32,
}

#[derive(Debug, Serialize)]
pub struct DeletePostResponse {
    pub deleted: bool,
}

// -- Diary --

/// Create/update payload. A missing date on create defaults to today (JST).
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SaveEntryRequest {
    pub date: Option<String>,
    pub body: String,
}

/// An entry plus the presentation fields the archive pages render from.
#[derive(Debug, Serialize)]
pub struct EntryView {
    pub id: String,
    pub body: String,
    pub body_html: String,
    pub date_display: String,
    pub created_at: String,
    pub updated_at: String,
    pub updated_display: String,
}

#[derive(Debug, Serialize)]
pub struct DiaryPage {
    pub entries: Vec<EntryView>,
    pub years: Vec<i32>,
}

#[derive(Debug, Serialize)]
pub struct YearArchive {
    pub year: i32,
    pub months: Vec<u32>,
    pub years: Vec<i32>,
}

#[derive(Debug, Serialize)]
pub struct MonthArchive {
    pub year: i32,
    pub month: u32,
    pub days_in_month: u32,
    pub entries: Vec<EntryView>,
}

#[derive(Debug, Serialize)]
pub struct DeleteEntryResponse {
    pub deleted: bool,
}

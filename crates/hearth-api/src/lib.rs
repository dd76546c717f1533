pub mod board;
pub mod counter;
pub mod dates;
pub mod diary;
pub mod error;
pub mod kiriban;
pub mod middleware;
pub mod text;

mod digits;

use std::sync::Arc;

use hearth_db::Stores;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub stores: Stores,
    pub admin_username: String,
    pub admin_password: String,
}

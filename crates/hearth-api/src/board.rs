use std::net::SocketAddr;

use axum::{
    Json,
    extract::{ConnectInfo, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use hearth_db::GLOBAL;
use hearth_types::api::{
    BoardPage, CreatePostRequest, CreatePostResponse, DeletePostRequest, DeletePostResponse,
    PostView,
};
use hearth_types::models::BoardPost;

use crate::AppState;
use crate::error::ApiError;

/// Posts per page, matching the front page layout.
const PAGE_SIZE: u32 = 4;

const MAX_NAME_LEN: usize = 32;
const MAX_BODY_LEN: usize = 1000;

const IP_HASH_SALT: &str = "bbs-ip-salt:";

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub offset: u32,
}

/// Salted digest of the poster's address, so clients can spot "same poster"
/// without the server ever exposing the address. Empty input stays empty.
fn ip_hash(ip: &str) -> String {
    if ip.is_empty() {
        return String::new();
    }
    let digest = Sha256::digest(format!("{}{}", IP_HASH_SALT, ip));
    B64.encode(digest).trim_end_matches('=').to_string()
}

fn post_view(post: BoardPost) -> PostView {
    let ip_hash = ip_hash(post.ip.as_deref().unwrap_or(""));
    PostView {
        id: post.id,
        name: post.name,
        body: post.body,
        date: post.date,
        has_delete_key: post.delete_key.is_some(),
        ip_hash,
    }
}

/// GET /bbs/posts — one page of live posts plus the total for the pager.
pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let store = state.stores.boards.get(GLOBAL)?;
    let offset = query.offset;

    let (posts, total) = tokio::task::spawn_blocking(move || -> anyhow::Result<_> {
        let posts = store.get_range(offset, PAGE_SIZE)?;
        let total = store.count()?;
        Ok((posts, total))
    })
    .await
    .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {}", e))??;

    Ok(Json(BoardPage {
        posts: posts.into_iter().map(post_view).collect(),
        total,
        limit: PAGE_SIZE,
        offset,
    }))
}

/// POST /bbs/posts — length limits are enforced here, not in the store.
pub async fn create_post(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(req): Json<CreatePostRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.name.is_empty() || req.name.chars().count() > MAX_NAME_LEN {
        return Err(ApiError::BadRequest("invalid name"));
    }
    if req.body.is_empty() || req.body.chars().count() > MAX_BODY_LEN {
        return Err(ApiError::BadRequest("invalid body"));
    }

    let store = state.stores.boards.get(GLOBAL)?;
    let ip = addr.ip().to_string();

    let (id, post) = tokio::task::spawn_blocking(move || {
        // An empty delete key means "no key", same as omitting it.
        let delete_key = req.delete_key.as_deref().filter(|k| !k.is_empty());
        store.post(&req.name, &req.body, delete_key, Some(&ip))
    })
    .await
    .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {}", e))??;

    Ok((
        StatusCode::CREATED,
        Json(CreatePostResponse {
            id,
            post: post_view(post),
        }),
    ))
}

/// DELETE /bbs/posts/{id} — the delete key is the only authorization. Every
/// failure mode is the same 400, so callers cannot probe which posts exist
/// or which keys are wrong.
pub async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<DeletePostRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.delete_key.is_empty() {
        return Err(ApiError::BadRequest("invalid input"));
    }

    let store = state.stores.boards.get(GLOBAL)?;

    let deleted =
        tokio::task::spawn_blocking(move || store.delete_post(&id.to_string(), &req.delete_key))
            .await
            .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {}", e))??;

    if !deleted {
        return Err(ApiError::BadRequest("delete failed"));
    }

    Ok(Json(DeletePostResponse { deleted }))
}

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::TypedHeader;
use axum_extra::headers::{Authorization, authorization::Basic};
use serde::Deserialize;

use hearth_db::GLOBAL;
use hearth_types::api::{
    DeleteEntryResponse, DiaryPage, EntryView, MonthArchive, SaveEntryRequest, YearArchive,
};
use hearth_types::models::DiaryEntry;

use crate::AppState;
use crate::dates::{
    days_in_month, format_date_display, format_timestamp_display, is_valid_date, today_date,
};
use crate::error::ApiError;
use crate::middleware::check_admin;
use crate::text::nl2br;

const DEFAULT_RECENT: u32 = 10;
const MAX_RECENT: u32 = 50;

const YEAR_RANGE: std::ops::RangeInclusive<i32> = 1900..=2100;

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    pub limit: Option<u32>,
}

fn entry_view(entry: DiaryEntry) -> EntryView {
    let body_html = nl2br(&entry.body);
    let date_display = format_date_display(&entry.id);
    let updated_display = format_timestamp_display(&entry.updated_at);
    EntryView {
        id: entry.id,
        body: entry.body,
        body_html,
        date_display,
        created_at: entry.created_at,
        updated_at: entry.updated_at,
        updated_display,
    }
}

/// GET /diary/entries — recent entries plus the years the archive nav links.
pub async fn list_entries(
    State(state): State<AppState>,
    Query(query): Query<RecentQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let store = state.stores.diaries.get(GLOBAL)?;
    let limit = query.limit.unwrap_or(DEFAULT_RECENT).min(MAX_RECENT);

    let (entries, years) = tokio::task::spawn_blocking(move || -> anyhow::Result<_> {
        let entries = store.get_recent(limit)?;
        let years = store.get_years_with_entries()?;
        Ok((entries, years))
    })
    .await
    .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {}", e))??;

    Ok(Json(DiaryPage {
        entries: entries.into_iter().map(entry_view).collect(),
        years,
    }))
}

/// GET /diary/entries/{date}
pub async fn get_entry(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    if !is_valid_date(&date) {
        return Err(ApiError::BadRequest("invalid date format"));
    }

    let store = state.stores.diaries.get(GLOBAL)?;
    let entry = tokio::task::spawn_blocking(move || store.get(&date))
        .await
        .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {}", e))??
        .ok_or(ApiError::NotFound("diary entry not found"))?;

    Ok(Json(entry_view(entry)))
}

/// GET /diary/archive/{year} — which months of the year have entries.
pub async fn year_archive(
    State(state): State<AppState>,
    Path(year): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    if !YEAR_RANGE.contains(&year) {
        return Err(ApiError::BadRequest("invalid year"));
    }

    let store = state.stores.diaries.get(GLOBAL)?;
    let (months, years) = tokio::task::spawn_blocking(move || -> anyhow::Result<_> {
        let months = store.get_months_with_entries(year)?;
        let years = store.get_years_with_entries()?;
        Ok((months, years))
    })
    .await
    .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {}", e))??;

    Ok(Json(YearArchive {
        year,
        months,
        years,
    }))
}

/// GET /diary/archive/{year}/{month} — one month's entries.
pub async fn month_archive(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
) -> Result<impl IntoResponse, ApiError> {
    if !YEAR_RANGE.contains(&year) || !(1..=12).contains(&month) {
        return Err(ApiError::BadRequest("invalid year or month"));
    }

    let store = state.stores.diaries.get(GLOBAL)?;
    let entries = tokio::task::spawn_blocking(move || store.get_by_month(year, month))
        .await
        .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {}", e))??;

    Ok(Json(MonthArchive {
        year,
        month,
        days_in_month: days_in_month(year, month),
        entries: entries.into_iter().map(entry_view).collect(),
    }))
}

/// POST /diary/entries (admin) — create only; an occupied date is a 409 so
/// an accidental re-post cannot silently overwrite a day. The date defaults
/// to today when omitted.
pub async fn create_entry(
    State(state): State<AppState>,
    auth: Option<TypedHeader<Authorization<Basic>>>,
    Json(req): Json<SaveEntryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    check_admin(&state, auth.as_ref())?;

    if req.body.is_empty() {
        return Err(ApiError::BadRequest("body is required"));
    }
    let date = req.date.unwrap_or_else(today_date);
    if !is_valid_date(&date) {
        return Err(ApiError::BadRequest("invalid date format"));
    }

    let store = state.stores.diaries.get(GLOBAL)?;
    let entry = tokio::task::spawn_blocking(move || -> anyhow::Result<_> {
        if store.get(&date)?.is_some() {
            return Ok(None);
        }
        Ok(Some(store.save(&date, &req.body)?))
    })
    .await
    .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {}", e))??
    .ok_or(ApiError::Conflict("an entry for this date already exists"))?;

    Ok((StatusCode::CREATED, Json(entry_view(entry))))
}

/// PUT /diary/entries/{date} (admin) — update in place, or move the entry
/// when the payload carries a different date. Moving to an occupied date is
/// a 409; a move deletes the old row and saves the new one.
pub async fn update_entry(
    State(state): State<AppState>,
    Path(date): Path<String>,
    auth: Option<TypedHeader<Authorization<Basic>>>,
    Json(req): Json<SaveEntryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    check_admin(&state, auth.as_ref())?;

    if !is_valid_date(&date) {
        return Err(ApiError::BadRequest("invalid date format"));
    }
    if req.body.is_empty() {
        return Err(ApiError::BadRequest("body is required"));
    }
    let new_date = req.date.unwrap_or_else(|| date.clone());
    if !is_valid_date(&new_date) {
        return Err(ApiError::BadRequest("invalid date format"));
    }

    let store = state.stores.diaries.get(GLOBAL)?;
    let entry = tokio::task::spawn_blocking(move || -> anyhow::Result<_> {
        if new_date != date {
            if store.get(&new_date)?.is_some() {
                return Ok(None);
            }
            store.delete(&date)?;
        }
        Ok(Some(store.save(&new_date, &req.body)?))
    })
    .await
    .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {}", e))??
    .ok_or(ApiError::Conflict("an entry for this date already exists"))?;

    Ok(Json(entry_view(entry)))
}

/// DELETE /diary/entries/{date} (admin) — physical removal.
pub async fn delete_entry(
    State(state): State<AppState>,
    Path(date): Path<String>,
    auth: Option<TypedHeader<Authorization<Basic>>>,
) -> Result<impl IntoResponse, ApiError> {
    check_admin(&state, auth.as_ref())?;

    if !is_valid_date(&date) {
        return Err(ApiError::BadRequest("invalid date format"));
    }

    let store = state.stores.diaries.get(GLOBAL)?;
    let deleted = tokio::task::spawn_blocking(move || store.delete(&date))
        .await
        .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {}", e))??;

    if !deleted {
        return Err(ApiError::NotFound("diary entry not found"));
    }

    Ok(Json(DeleteEntryResponse { deleted }))
}

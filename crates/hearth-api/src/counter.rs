use axum::{Json, extract::State, response::IntoResponse};

use hearth_db::GLOBAL;
use hearth_types::api::{CounterHit, CounterValue};

use crate::AppState;
use crate::error::ApiError;
use crate::kiriban::{is_kiriban, render_counter_svg};

/// GET /counter — current value without counting a visit.
pub async fn get_counter(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let store = state.stores.counters.get(GLOBAL)?;

    let count = tokio::task::spawn_blocking(move || store.read())
        .await
        .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {}", e))??;

    Ok(Json(CounterValue {
        count,
        kiriban: is_kiriban(count),
    }))
}

/// POST /counter/hit — one visit: increment and render the digit image for
/// the new value.
pub async fn hit_counter(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let store = state.stores.counters.get(GLOBAL)?;

    let count = tokio::task::spawn_blocking(move || store.increment(1))
        .await
        .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {}", e))??;

    Ok(Json(CounterHit {
        count,
        kiriban: is_kiriban(count),
        svg: render_counter_svg(count),
    }))
}

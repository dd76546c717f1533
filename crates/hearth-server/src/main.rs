use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{delete, get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use hearth_api::middleware::require_xhr;
use hearth_api::{AppState, AppStateInner, board, counter, diary};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hearth=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let data_dir = std::env::var("HEARTH_DATA_DIR").unwrap_or_else(|_| "data".into());
    let host = std::env::var("HEARTH_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("HEARTH_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;
    let admin_username =
        std::env::var("HEARTH_ADMIN_USERNAME").unwrap_or_else(|_| "admin".into());
    let admin_password =
        std::env::var("HEARTH_ADMIN_PASSWORD").unwrap_or_else(|_| "password".into());

    // Stores
    let stores = hearth_db::Stores::open(&PathBuf::from(&data_dir))?;

    let state: AppState = Arc::new(AppStateInner {
        stores,
        admin_username,
        admin_password,
    });

    // Routes
    let app = Router::new()
        .route("/counter", get(counter::get_counter))
        .route("/counter/hit", post(counter::hit_counter))
        .route("/bbs/posts", get(board::list_posts).post(board::create_post))
        .route("/bbs/posts/{id}", delete(board::delete_post))
        .route(
            "/diary/entries",
            get(diary::list_entries).post(diary::create_entry),
        )
        .route(
            "/diary/entries/{date}",
            get(diary::get_entry)
                .put(diary::update_entry)
                .delete(diary::delete_entry),
        )
        .route("/diary/archive/{year}", get(diary::year_archive))
        .route("/diary/archive/{year}/{month}", get(diary::month_archive))
        .with_state(state)
        .layer(middleware::from_fn(require_xhr))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("hearth listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

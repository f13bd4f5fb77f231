//! Xổ số miền Bắc backend: storage-backed statistics, analysis and crawling
//! exposed as a JSON API under `/api`.
pub mod analysis;
pub mod config;
pub mod crawler;
pub mod display;
pub mod dto;
pub mod error;
pub mod forecast;
pub mod handlers;
pub mod import;
pub mod stats;
pub mod store;

use anyhow::{Context, Result};
use axum::routing::get;
use axum::Router;
use chrono::NaiveDate;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use xoso_db::db::open_db;

use crate::config::ServerConfig;
use crate::crawler::Crawler;
use crate::store::Store;

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub crawler: Crawler,
}

impl AppState {
    pub fn new(config: &ServerConfig, store: Store) -> Result<Self> {
        let crawler = Crawler::new(config, store.clone())?;
        Ok(Self { store, crawler })
    }
}

/// Local calendar day, the reference point for every "today" window.
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/api/lottery", get(handlers::lottery))
        .route("/api/crawl/auto-update", get(handlers::auto_update))
        .route("/api/crawl/single", get(handlers::crawl_single))
        .route("/api/crawl/range", get(handlers::crawl_range))
        .route("/api/dashboard/stats", get(handlers::dashboard))
        .route("/api/analysis", get(handlers::analysis))
        .route("/api/health", get(handlers::health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(config: ServerConfig) -> Result<()> {
    let conn = open_db(&config.db_path)?;
    let store = Store::new(conn)?;
    let state = AppState::new(&config, store)?;

    let listener = TcpListener::bind(&config.addr)
        .await
        .with_context(|| format!("Không thể lắng nghe trên {}", config.addr))?;

    tracing::info!(db = %config.db_path.display(), "xoso API listening on {}", config.addr);
    serve_on(listener, state).await
}

pub async fn serve_on(listener: TcpListener, state: AppState) -> Result<()> {
    axum::serve(listener, create_app(state))
        .await
        .context("Lỗi máy chủ")
}

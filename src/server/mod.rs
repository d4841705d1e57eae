//! HTTP surface for on-demand crawls
//!
//! - `POST /scrape` runs a crawl and returns its page records
//! - `GET /health` reports liveness

mod routes;

pub use routes::{
    health_handler, scrape_handler, ErrorResponse, HealthResponse, ScrapeRequest, ScrapeResponse,
};

use crate::config::Config;
use crate::crawler::Fetcher;
use crate::HarvestError;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Shared application state
///
/// The fetcher is shared so every request reuses one connection pool.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub fetcher: Arc<Fetcher>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, HarvestError> {
        let fetcher = Fetcher::new(&config.fetch)?;
        Ok(Self::with_fetcher(config, Arc::new(fetcher)))
    }

    pub fn with_fetcher(config: Config, fetcher: Arc<Fetcher>) -> Self {
        Self {
            config: Arc::new(config),
            fetcher,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/scrape", post(scrape_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Binds `config.server.bind` and serves until the process is stopped
pub async fn serve(config: Config) -> Result<(), HarvestError> {
    let bind = config.server.bind.clone();
    let state = AppState::new(config)?;

    let listener = TcpListener::bind(&bind).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, build_router(state)).await?;
    Ok(())
}

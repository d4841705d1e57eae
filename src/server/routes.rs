//! HTTP route handlers

use super::AppState;
use crate::config::Config;
use crate::crawler::Coordinator;
use crate::extract::{PageRecord, Sections};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const SUCCESS_MESSAGE: &str = "Scraping completed successfully";

/// Body of `POST /scrape`
///
/// Omitted limits fall back to the server's `[crawler]` configuration; every
/// `scrape_*` flag defaults to false.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScrapeRequest {
    pub url: Option<String>,
    pub max_pages: Option<usize>,
    pub depth: Option<u32>,
    pub links_per_page: Option<usize>,
    pub scrape_title: bool,
    pub scrape_meta: bool,
    pub scrape_headings: bool,
    pub scrape_paragraphs: bool,
    pub scrape_tables: bool,
    pub scrape_links: bool,
    pub scrape_images: bool,
}

impl ScrapeRequest {
    /// Field selection requested by the caller
    pub fn sections(&self) -> Sections {
        Sections {
            title: self.scrape_title,
            meta_description: self.scrape_meta,
            headings: self.scrape_headings,
            paragraphs: self.scrape_paragraphs,
            tables: self.scrape_tables,
            links: self.scrape_links,
            images: self.scrape_images,
        }
    }

    /// Builds the per-request configuration on top of the server's own
    pub fn apply(&self, base: &Config) -> Config {
        let mut config = base.clone();

        if let Some(max_pages) = self.max_pages {
            config.crawler.max_pages = max_pages;
        }
        if let Some(depth) = self.depth {
            config.crawler.max_depth = depth;
        }
        if let Some(links_per_page) = self.links_per_page {
            config.crawler.links_per_page = links_per_page;
        }
        config.sections = self.sections();

        config
    }
}

#[derive(Debug, Serialize)]
pub struct ScrapeResponse {
    pub message: &'static str,
    pub count: usize,
    pub data: Vec<PageRecord>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let body = ErrorResponse {
        error: message.into(),
    };
    (status, Json(body)).into_response()
}

/// Crawls the requested site and returns the extracted records
///
/// Returns 400 when the body is malformed, the URL is missing or the seed is
/// rejected, and 500 for any other failure.
pub async fn scrape_handler(
    State(state): State<AppState>,
    payload: Result<Json<ScrapeRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            tracing::warn!("Rejected /scrape body: {}", rejection.body_text());
            return error_response(StatusCode::BAD_REQUEST, rejection.body_text());
        }
    };

    let url = match request.url.as_deref().map(str::trim) {
        Some(url) if !url.is_empty() => url.to_string(),
        _ => return error_response(StatusCode::BAD_REQUEST, "URL is required"),
    };

    let config = request.apply(&state.config);
    tracing::info!(
        "Starting scrape for {} (max pages {}, depth {}, links per page {})",
        url,
        config.crawler.max_pages,
        config.crawler.max_depth,
        config.crawler.links_per_page
    );

    let result = match Coordinator::with_fetcher(&url, &config, Arc::clone(&state.fetcher)) {
        Ok(coordinator) => coordinator.run().await,
        Err(e) => Err(e),
    };

    match result {
        Ok(report) => {
            let body = ScrapeResponse {
                message: SUCCESS_MESSAGE,
                count: report.count(),
                data: report.pages,
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) if e.is_input_error() => error_response(StatusCode::BAD_REQUEST, e.to_string()),
        Err(e) => {
            tracing::error!("Error in /scrape: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// Liveness probe
pub async fn health_handler() -> (StatusCode, Json<HealthResponse>) {
    (StatusCode::OK, Json(HealthResponse { status: "healthy" }))
}

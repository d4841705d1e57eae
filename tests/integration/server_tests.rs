//! Integration tests for the HTTP API
//!
//! Requests are driven through the router with `oneshot`, so no socket is
//! bound for the API itself; crawled sites are wiremock servers.

use crate::{create_test_config, html_page, seeded_fetcher};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use site_harvester::server::{build_router, AppState};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_router() -> Router {
    let config = create_test_config(5, 2, 5);
    let fetcher = seeded_fetcher(&config);
    build_router(AppState::with_fetcher(config, fetcher))
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.expect("Request failed");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let body = serde_json::from_slice(&bytes).expect("Body is not JSON");
    (status, body)
}

fn scrape_request(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/scrape")
        .header("content-type", "application/json")
        .body(body.into())
        .expect("Failed to build request")
}

#[tokio::test]
async fn test_health_check() {
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .expect("Failed to build request");

    let (status, body) = send(test_router(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "healthy" }));
}

#[tokio::test]
async fn test_scrape_requires_url() {
    let (status, body) = send(test_router(), scrape_request("{}")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "URL is required" }));
}

#[tokio::test]
async fn test_scrape_rejects_invalid_seed() {
    let (status, body) = send(
        test_router(),
        scrape_request(json!({ "url": "not-a-url" }).to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap_or_default().contains("not-a-url"));
}

#[tokio::test]
async fn test_scrape_rejects_malformed_body() {
    let (status, body) = send(test_router(), scrape_request("{not json")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_scrape_success() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html_page(
            "Home",
            r#"<h2>Intro</h2><a href="/next">Next</a>"#,
        )))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/next"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html_page("Next", "")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let request = scrape_request(
        json!({
            "url": format!("{}/", base_url),
            "max_pages": 3,
            "scrape_title": true,
            "scrape_headings": true
        })
        .to_string(),
    );
    let (status, body) = send(test_router(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Scraping completed successfully");
    assert_eq!(body["count"], 2);
    assert_eq!(body["data"][0]["title"], "Home");
    assert_eq!(body["data"][0]["headings"], json!(["Intro"]));
    assert_eq!(body["data"][1]["url"], format!("{}/next", base_url));
    assert!(body["data"][0].get("paragraphs").is_none());
}

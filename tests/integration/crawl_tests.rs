//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use crate::{create_coordinator, create_test_config, html_page};
use site_harvester::crawler::Coordinator;
use site_harvester::extract::{LinkContext, LinkType};
use site_harvester::{HarvestError, Sections};
use std::collections::HashSet;
use std::time::{Duration, Instant};
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_unreachable(server: &MockServer, route: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(html_page("Never", "")))
        .expect(0)
        .mount(server)
        .await;
}

fn titles(report: &site_harvester::CrawlReport) -> Vec<String> {
    report
        .pages
        .iter()
        .map(|page| page.title.clone().unwrap_or_default())
        .collect()
}

#[tokio::test]
async fn test_full_crawl_single_domain() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        html_page(
            "Home",
            r#"<a href="/page1">Page 1</a><a href="/page2">Page 2</a>"#,
        ),
    )
    .await;
    mount_page(&mock_server, "/page1", html_page("Page 1", "Content 1")).await;
    mount_page(&mock_server, "/page2", html_page("Page 2", "Content 2")).await;

    let config = create_test_config(5, 2, 5);
    let seed = format!("{}/", base_url);
    let report = create_coordinator(&seed, &config)
        .run()
        .await
        .expect("Crawl failed");

    assert_eq!(report.seed, seed);
    assert_eq!(titles(&report), vec!["Home", "Page 1", "Page 2"]);
    assert_eq!(report.pages[1].url, format!("{}/page1", base_url));
    assert_eq!(report.stats.waves, 2);
    assert_eq!(report.stats.pages_visited, 3);
    assert_eq!(report.stats.pages_extracted, 3);
    assert_eq!(report.stats.links_scheduled, 2);
    assert_eq!(report.stats.deepest_depth, 2);
    assert!(report.finished_at >= report.started_at);
}

#[tokio::test]
async fn test_crawl_with_depth_limit() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        html_page("Level 1", r#"<a href="/level2">Deeper</a>"#),
    )
    .await;
    mount_page(
        &mock_server,
        "/level2",
        html_page("Level 2", r#"<a href="/level3">Deeper still</a>"#),
    )
    .await;
    // Should never be called with max_depth=2
    mount_unreachable(&mock_server, "/level3").await;

    let config = create_test_config(10, 2, 5);
    let report = create_coordinator(&format!("{}/", base_url), &config)
        .run()
        .await
        .expect("Crawl failed");

    assert_eq!(titles(&report), vec!["Level 1", "Level 2"]);
    assert_eq!(report.stats.deepest_depth, 2);
}

#[tokio::test]
async fn test_depth_one_fetches_only_seed() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        html_page("Only", r#"<a href="/next">Next</a>"#),
    )
    .await;
    mount_unreachable(&mock_server, "/next").await;

    let config = create_test_config(10, 1, 5);
    let report = create_coordinator(&format!("{}/", mock_server.uri()), &config)
        .run()
        .await
        .expect("Crawl failed");

    assert_eq!(report.count(), 1);
    assert_eq!(report.stats.links_scheduled, 0);
}

#[tokio::test]
async fn test_page_budget_is_respected() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let links: String = (1..=8)
        .map(|n| format!(r#"<a href="/p{}">P{}</a>"#, n, n))
        .collect();
    mount_page(&mock_server, "/", html_page("Hub", &links)).await;
    for n in 1..=8 {
        mount_page(&mock_server, &format!("/p{}", n), html_page(&format!("P{}", n), "")).await;
    }

    let max_pages = 4;
    let config = create_test_config(max_pages, 2, 10);
    let report = create_coordinator(&format!("{}/", base_url), &config)
        .run()
        .await
        .expect("Crawl failed");

    assert!(report.stats.pages_visited <= max_pages);
    assert_eq!(report.count(), max_pages);
    assert_eq!(titles(&report), vec!["Hub", "P1", "P2", "P3"]);

    let requests = mock_server.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), max_pages);
}

#[tokio::test]
async fn test_links_per_page_cap() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        html_page(
            "Hub",
            r#"<a href="/a">A</a><a href="/a#dup">A</a><a href="/b">B</a><a href="/c">C</a><a href="/d">D</a>"#,
        ),
    )
    .await;
    mount_page(&mock_server, "/a", html_page("A", "")).await;
    mount_page(&mock_server, "/b", html_page("B", "")).await;
    mount_unreachable(&mock_server, "/c").await;
    mount_unreachable(&mock_server, "/d").await;

    let config = create_test_config(10, 2, 2);
    let report = create_coordinator(&format!("{}/", base_url), &config)
        .run()
        .await
        .expect("Crawl failed");

    assert_eq!(titles(&report), vec!["Hub", "A", "B"]);
}

#[tokio::test]
async fn test_no_page_is_visited_twice() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    for (route, title, body) in [
        ("/", "Root", r#"<a href="/a">A</a><a href="/b">B</a>"#),
        ("/a", "A", r#"<a href="/">Root</a><a href="/b">B</a>"#),
        ("/b", "B", r#"<a href="/a">A</a><a href="/">Root</a>"#),
    ] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_string(html_page(title, body)))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let config = create_test_config(10, 4, 5);
    let report = create_coordinator(&format!("{}/", base_url), &config)
        .run()
        .await
        .expect("Crawl failed");

    let urls: HashSet<&str> = report.pages.iter().map(|page| page.url.as_str()).collect();
    assert_eq!(urls.len(), report.count());
    assert_eq!(report.count(), 3);
}

#[tokio::test]
async fn test_other_hosts_are_not_followed() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let port = mock_server.address().port();

    // Same server, but "localhost:port" differs from "127.0.0.1:port"
    mount_page(
        &mock_server,
        "/",
        html_page(
            "Home",
            &format!(
                r#"<a href="http://localhost:{}/elsewhere">Alias</a><a href="mailto:a@b.c">Mail</a><a href="/local">Local</a>"#,
                port
            ),
        ),
    )
    .await;
    mount_page(&mock_server, "/local", html_page("Local", "")).await;
    mount_unreachable(&mock_server, "/elsewhere").await;

    let config = create_test_config(10, 2, 5);
    let report = create_coordinator(&format!("{}/", base_url), &config)
        .run()
        .await
        .expect("Crawl failed");

    assert_eq!(titles(&report), vec!["Home", "Local"]);
}

#[tokio::test]
async fn test_invalid_seed_dispatches_nothing() {
    let mock_server = MockServer::start().await;

    // Should never be called
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(5, 2, 5);
    let result = Coordinator::new("not-a-url", &config);

    assert!(matches!(result, Err(HarvestError::InvalidInput(_))));
}

#[tokio::test]
async fn test_transient_status_is_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/", html_page("Recovered", "")).await;

    let config = create_test_config(5, 2, 5);
    let report = create_coordinator(&format!("{}/", mock_server.uri()), &config)
        .run()
        .await
        .expect("Crawl failed");

    assert_eq!(titles(&report), vec!["Recovered"]);
    assert_eq!(report.stats.fetch_failures, 0);
}

#[tokio::test]
async fn test_retry_budget_exhausted() {
    let mock_server = MockServer::start().await;

    // One attempt plus max_retries (2) retries
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock_server)
        .await;

    let config = create_test_config(5, 2, 5);
    let report = create_coordinator(&format!("{}/", mock_server.uri()), &config)
        .run()
        .await
        .expect("A failed page must not abort the crawl");

    assert!(report.pages.is_empty());
    assert_eq!(report.stats.pages_visited, 1);
    assert_eq!(report.stats.fetch_failures, 1);
}

#[tokio::test]
async fn test_failed_pages_are_skipped() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        html_page(
            "Home",
            r#"<a href="/missing">Missing</a><a href="/empty">Empty</a><a href="/ok">Ok</a>"#,
        ),
    )
    .await;
    // 404 is not retryable
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/empty"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/ok", html_page("Ok", "")).await;

    let config = create_test_config(10, 2, 5);
    let report = create_coordinator(&format!("{}/", base_url), &config)
        .run()
        .await
        .expect("Crawl failed");

    assert_eq!(titles(&report), vec!["Home", "Ok"]);
    assert_eq!(report.stats.pages_visited, 4);
    assert_eq!(report.stats.fetch_failures, 1);
    assert_eq!(report.stats.parse_failures, 1);
}

#[tokio::test]
async fn test_browser_headers_are_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("user-agent", "TestAgent/1.0"))
        .and(header_exists("accept-language"))
        .and(header_exists("accept"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html_page("Headers", "")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(5, 2, 5);
    config.fetch.user_agents = vec!["TestAgent/1.0".to_string()];

    let report = create_coordinator(&format!("{}/", mock_server.uri()), &config)
        .run()
        .await
        .expect("Crawl failed");

    assert_eq!(titles(&report), vec!["Headers"]);
}

#[tokio::test]
async fn test_extraction_through_crawl() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let body = r#"
        <nav><a href="/about">About</a></nav>
        <h1>Welcome</h1>
        <p>This paragraph is comfortably longer than twenty characters.</p>
        <p>Too short</p>
        <table>
            <thead><tr><th>A</th><th>B</th></tr></thead>
            <tbody><tr><td>1</td><td>2</td></tr><tr><td>3</td><td>4</td></tr></tbody>
        </table>
        <img src="/hero.png" width="200">
        <img src="/icon.png" width="10">
        <footer><a href="mailto:hi@example.com">Mail us</a></footer>
    "#;
    mount_page(
        &mock_server,
        "/",
        format!(
            r#"<html><head><title>  Rich   Page </title><meta name="description" content="A test page"></head><body>{}</body></html>"#,
            body
        ),
    )
    .await;

    let mut config = create_test_config(1, 2, 5);
    config.sections = Sections::all();

    let report = create_coordinator(&format!("{}/", base_url), &config)
        .run()
        .await
        .expect("Crawl failed");

    assert_eq!(report.count(), 1);
    let page = &report.pages[0];

    assert_eq!(page.title.as_deref(), Some("Rich Page"));
    assert_eq!(page.meta_description.as_deref(), Some("A test page"));
    assert_eq!(page.headings.as_deref(), Some(&["Welcome".to_string()][..]));
    assert_eq!(page.paragraphs.as_ref().map(Vec::len), Some(1));

    let tables = page.tables.as_ref().expect("tables requested");
    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0].headers, vec!["A", "B"]);
    assert_eq!(tables[0].rows, vec![vec!["1", "2"], vec!["3", "4"]]);

    let images = page.images.as_ref().expect("images requested");
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].src, format!("{}/hero.png", base_url));
    assert_eq!(images[0].alt, "Image");

    let links = page.links.as_ref().expect("links requested");
    assert_eq!(links.len(), 2);
    assert_eq!(links[0].href, format!("{}/about", base_url));
    assert_eq!(links[0].link_type, LinkType::Internal);
    assert_eq!(links[0].context, LinkContext::Nav);
    assert_eq!(links[1].link_type, LinkType::Email);
    assert_eq!(links[1].context, LinkContext::Footer);
}

#[tokio::test]
async fn test_title_only_record() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        r#"<html><head><title>  Hello   World </title></head><body><h1>Ignored</h1></body></html>"#
            .to_string(),
    )
    .await;

    let config = create_test_config(1, 2, 5);
    let seed = format!("{}/", mock_server.uri());
    let report = create_coordinator(&seed, &config)
        .run()
        .await
        .expect("Crawl failed");

    let record = serde_json::to_value(&report.pages[0]).unwrap();
    assert_eq!(
        record,
        serde_json::json!({ "url": seed, "title": "Hello World" })
    );
}

#[tokio::test]
async fn test_seed_without_trailing_slash_is_fetched_once() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html_page(
            "Home",
            &format!(
                r#"<a href="/">Home</a><a href="{}">Home again</a><a href="/about">About</a>"#,
                base_url
            ),
        )))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/about", html_page("About", "")).await;

    let config = create_test_config(10, 3, 5);
    let report = create_coordinator(&base_url, &config)
        .run()
        .await
        .expect("Crawl failed");

    assert_eq!(report.seed, base_url);
    assert_eq!(titles(&report), vec!["Home", "About"]);
    assert_eq!(report.stats.pages_visited, 2);

    let requests = mock_server.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 2);
}

#[tokio::test]
async fn test_worker_pool_bounds_concurrent_fetches() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let delay = Duration::from_millis(250);

    mount_page(
        &mock_server,
        "/",
        html_page(
            "Hub",
            r#"<a href="/p1">1</a><a href="/p2">2</a><a href="/p3">3</a><a href="/p4">4</a>"#,
        ),
    )
    .await;
    for page in ["/p1", "/p2", "/p3", "/p4"] {
        Mock::given(method("GET"))
            .and(path(page))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(html_page(page, ""))
                    .set_delay(delay),
            )
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let mut config = create_test_config(5, 2, 4);
    config.crawler.workers = 2;

    let start = Instant::now();
    let report = create_coordinator(&format!("{}/", base_url), &config)
        .run()
        .await
        .expect("Crawl failed");
    let elapsed = start.elapsed();

    // Four delayed pages through two permits need at least two delay periods
    assert!(
        elapsed >= delay * 2,
        "wave finished in {:?} with only two workers",
        elapsed
    );
    assert_eq!(report.stats.pages_extracted, 5);
    assert_eq!(titles(&report), vec!["Hub", "/p1", "/p2", "/p3", "/p4"]);
}

#[tokio::test]
async fn test_redirect_keeps_dispatched_url() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        html_page("Home", r#"<a href="/old">Old</a>"#),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/new"))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/new", html_page("New", "")).await;

    let config = create_test_config(5, 2, 5);
    let report = create_coordinator(&format!("{}/", base_url), &config)
        .run()
        .await
        .expect("Crawl failed");

    assert_eq!(titles(&report), vec!["Home", "New"]);
    assert_eq!(report.pages[1].url, format!("{}/old", base_url));
    assert_eq!(report.stats.fetch_failures, 0);
}

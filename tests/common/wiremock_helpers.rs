use std::time::Duration;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

use gstfinder::config::{HttpConfig, PageScrapeConfig, SearchApiConfig};

/// HTTP client settings used by every provider under test.
pub fn http_config() -> HttpConfig {
    HttpConfig {
        user_agent: "gstfinder-tests/1.0".to_string(),
        request_timeout_secs: 5,
    }
}

pub fn search_api_config(endpoint: &str) -> SearchApiConfig {
    SearchApiConfig {
        enabled: true,
        endpoint: endpoint.to_string(),
        api_key: String::new(),
        max_results: 5,
        timeout_secs: 5,
    }
}

pub fn page_scrape_config(endpoint: &str) -> PageScrapeConfig {
    PageScrapeConfig {
        enabled: true,
        endpoint: endpoint.to_string(),
        timeout_secs: 5,
    }
}

/// Creates a mock search API server whose single organic result carries the
/// given snippet text.
pub async fn mock_search_api(snippet: &str) -> MockServer {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "organic_results": [
            {
                "title": "GST number details",
                "snippet": snippet,
                "link": "https://registry.example.com/details"
            }
        ]
    });

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(body)
                .insert_header("content-type", "application/json"),
        )
        .mount(&server)
        .await;

    server
}

/// Creates a mock search API server that returns a well-formed but empty
/// result list.
pub async fn mock_search_api_empty() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "organic_results": [] })),
        )
        .mount(&server)
        .await;

    server
}

/// Creates a mock HTTP server that serves the given HTML page.
pub async fn mock_search_page(html: &str) -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html.to_string())
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(&server)
        .await;

    server
}

/// Creates a mock HTTP server that returns the specified HTTP error status.
pub async fn mock_error_server(status_code: u16) -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(status_code))
        .mount(&server)
        .await;

    server
}

/// Creates a mock HTTP server that delays responses to simulate timeouts.
pub async fn mock_timeout_server(delay_ms: u64) -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("delayed response")
                .set_delay(Duration::from_millis(delay_ms)),
        )
        .mount(&server)
        .await;

    server
}

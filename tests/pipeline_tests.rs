mod common;

use common::wiremock_helpers::*;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

use gstfinder::lookup::{Identifier, ProviderKind};
use gstfinder::pipeline::FailoverPipeline;
use gstfinder::provider::{Provider, SearchApiProvider};
use gstfinder::rate_limit::SharedRateLimiter;

fn api_provider(endpoint: &str) -> Provider {
    Provider::SearchApi(
        SearchApiProvider::new(
            &search_api_config(endpoint),
            &http_config(),
            SharedRateLimiter::new(0),
        )
        .expect("provider should build"),
    )
}

/// A failing first provider falls through to the second, and the first is
/// actually invoked before the second succeeds.
#[tokio::test]
async fn test_failover_accepts_second_provider_after_failure() {
    let failing = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&failing)
        .await;

    let succeeding = mock_search_api("GSTIN 29ABCDE1234F1Z5 for Acme Industries").await;

    let pipeline = FailoverPipeline::new(vec![
        api_provider(&failing.uri()),
        api_provider(&succeeding.uri()),
    ]);

    let record = pipeline.resolve("Acme Industries").await;

    assert_eq!(
        record.identifier,
        Identifier::Gstin(gstfinder::Gstin::parse("29ABCDE1234F1Z5").unwrap())
    );
    assert_eq!(record.provider, Some(ProviderKind::SearchApi));
    // Dropping `failing` verifies it received exactly one request
}

/// A hit on the first provider short-circuits: later providers are never
/// contacted.
#[tokio::test]
async fn test_failover_short_circuits_on_first_hit() {
    let first = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "organic_results": [{ "snippet": "GSTIN 29ABCDE1234F1Z5" }]
        })))
        .expect(1)
        .mount(&first)
        .await;

    let second = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&second)
        .await;

    let pipeline = FailoverPipeline::new(vec![
        api_provider(&first.uri()),
        api_provider(&second.uri()),
    ]);

    let record = pipeline.resolve("Acme Industries").await;
    assert!(record.identifier.is_found());
}

/// All providers exhausted without a hit: the record carries NotFound.
#[tokio::test]
async fn test_exhausted_pipeline_returns_not_found() {
    let empty_a = mock_search_api_empty().await;
    let empty_b = mock_search_api("no identifiers in this snippet").await;

    let pipeline = FailoverPipeline::new(vec![
        api_provider(&empty_a.uri()),
        api_provider(&empty_b.uri()),
    ]);

    let record = pipeline.resolve("Acme Industries").await;
    assert_eq!(record.identifier, Identifier::NotFound);
    assert_eq!(record.provider, None);
}

/// Every provider failing outright preserves the error details for triage.
#[tokio::test]
async fn test_all_providers_failing_preserves_error_detail() {
    let failing_a = mock_error_server(500).await;
    let failing_b = mock_error_server(502).await;

    let pipeline = FailoverPipeline::new(vec![
        api_provider(&failing_a.uri()),
        api_provider(&failing_b.uri()),
    ]);

    let record = pipeline.resolve("Acme Industries").await;
    match record.identifier {
        Identifier::Error(detail) => {
            assert!(detail.contains("500"), "detail was: {}", detail);
            assert!(detail.contains("502"), "detail was: {}", detail);
        }
        other => panic!("expected Error sentinel, got {:?}", other),
    }
}

/// A mix of errors and clean misses degrades to NotFound, not Error.
#[tokio::test]
async fn test_error_plus_miss_degrades_to_not_found() {
    let failing = mock_error_server(500).await;
    let empty = mock_search_api_empty().await;

    let pipeline = FailoverPipeline::new(vec![
        api_provider(&failing.uri()),
        api_provider(&empty.uri()),
    ]);

    let record = pipeline.resolve("Acme Industries").await;
    assert_eq!(record.identifier, Identifier::NotFound);
}

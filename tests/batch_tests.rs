mod common;

use common::wiremock_helpers::*;

use gstfinder::batch::{self, BatchError, MAX_BATCH_NAMES};
use gstfinder::history::RecentSearches;
use gstfinder::lookup::Identifier;
use gstfinder::pipeline::FailoverPipeline;
use gstfinder::provider::{Provider, SearchApiProvider};
use gstfinder::rate_limit::SharedRateLimiter;

fn api_pipeline(endpoint: &str) -> FailoverPipeline {
    FailoverPipeline::new(vec![Provider::SearchApi(
        SearchApiProvider::new(
            &search_api_config(endpoint),
            &http_config(),
            SharedRateLimiter::new(0),
        )
        .expect("provider should build"),
    )])
}

#[tokio::test]
async fn test_batch_emits_one_record_per_name_in_order() {
    let server = mock_search_api("GSTIN 29ABCDE1234F1Z5").await;
    let pipeline = api_pipeline(&server.uri());
    let mut history = RecentSearches::new();

    let names = vec![
        "Acme Industries".to_string(),
        "Zenith Traders".to_string(),
        "Nimbus Logistics".to_string(),
    ];
    let records = batch::run_batch(&pipeline, names.clone(), &mut history, false)
        .await
        .expect("batch should run");

    assert_eq!(records.len(), 3);
    let record_names: Vec<&str> = records.iter().map(|r| r.input_name.as_str()).collect();
    assert_eq!(
        record_names,
        vec!["Acme Industries", "Zenith Traders", "Nimbus Logistics"]
    );
    assert!(records.iter().all(|r| r.identifier.is_found()));
}

#[tokio::test]
async fn test_batch_dedups_preserving_first_occurrence() {
    let server = mock_search_api("GSTIN 29ABCDE1234F1Z5").await;
    let pipeline = api_pipeline(&server.uri());
    let mut history = RecentSearches::new();

    let names = vec![
        "Acme Industries".to_string(),
        "Zenith Traders".to_string(),
        "Acme Industries".to_string(),
    ];
    let records = batch::run_batch(&pipeline, names, &mut history, false)
        .await
        .expect("batch should run");

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].input_name, "Acme Industries");
    assert_eq!(records[1].input_name, "Zenith Traders");
}

#[tokio::test]
async fn test_batch_updates_recent_history() {
    let server = mock_search_api("GSTIN 29ABCDE1234F1Z5").await;
    let pipeline = api_pipeline(&server.uri());
    let mut history = RecentSearches::new();

    let names = vec!["Acme Industries".to_string(), "Zenith Traders".to_string()];
    batch::run_batch(&pipeline, names, &mut history, false)
        .await
        .expect("batch should run");

    assert_eq!(
        history.most_recent_first(),
        vec!["Zenith Traders".to_string(), "Acme Industries".to_string()]
    );
}

#[tokio::test]
async fn test_batch_continues_past_per_name_failures() {
    let server = mock_error_server(500).await;
    let pipeline = api_pipeline(&server.uri());
    let mut history = RecentSearches::new();

    let names = vec!["Acme Industries".to_string(), "Zenith Traders".to_string()];
    let records = batch::run_batch(&pipeline, names, &mut history, false)
        .await
        .expect("batch should run to completion");

    assert_eq!(records.len(), 2);
    for record in &records {
        assert!(matches!(record.identifier, Identifier::Error(_)));
    }
}

#[tokio::test]
async fn test_batch_rejects_empty_input() {
    let server = mock_search_api_empty().await;
    let pipeline = api_pipeline(&server.uri());
    let mut history = RecentSearches::new();

    let result = batch::run_batch(&pipeline, vec![], &mut history, false).await;
    assert_eq!(result.unwrap_err(), BatchError::NoInput);
}

#[tokio::test]
async fn test_batch_rejects_oversize_input() {
    let server = mock_search_api_empty().await;
    let pipeline = api_pipeline(&server.uri());
    let mut history = RecentSearches::new();

    let names: Vec<String> = (0..=MAX_BATCH_NAMES).map(|i| format!("Company {}", i)).collect();
    let result = batch::run_batch(&pipeline, names, &mut history, false).await;
    assert_eq!(
        result.unwrap_err(),
        BatchError::TooManyNames(MAX_BATCH_NAMES + 1)
    );
}

#[tokio::test]
async fn test_single_dispatch_reuses_pipeline() {
    let server = mock_search_api("GSTIN 29ABCDE1234F1Z5").await;
    let pipeline = api_pipeline(&server.uri());
    let mut history = RecentSearches::new();

    let record = batch::run_single(&pipeline, "Acme Industries", &mut history)
        .await
        .expect("single lookup should run");

    assert_eq!(record.input_name, "Acme Industries");
    assert!(record.identifier.is_found());
    assert_eq!(history.most_recent_first(), vec!["Acme Industries".to_string()]);
}

#[tokio::test]
async fn test_single_dispatch_rejects_blank_name() {
    let server = mock_search_api_empty().await;
    let pipeline = api_pipeline(&server.uri());
    let mut history = RecentSearches::new();

    let result = batch::run_single(&pipeline, "   ", &mut history).await;
    assert_eq!(result.unwrap_err(), BatchError::NoInput);
}

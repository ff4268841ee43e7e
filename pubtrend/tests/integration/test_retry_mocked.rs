mod common;

use std::time::{Duration, Instant};

use pubtrend::{PubMedClient, PubMedError};
use tracing_test::traced_test;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{count_json, create_test_client, esearch_json, fast_retry, test_config};

#[tokio::test]
#[traced_test]
async fn test_transient_failures_then_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string(esearch_json(3, &["1", "2", "3"])))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let start = Instant::now();
    let result = client
        .search("glucose sensor", 0, 10)
        .await
        .expect("third attempt should succeed");

    assert_eq!(result.total_count, 3);
    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);

    // 20ms then 40ms of backoff
    assert!(start.elapsed() >= Duration::from_millis(60));
}

#[tokio::test]
#[traced_test]
async fn test_exhausted_retries_report_unavailable() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let result = client.search_count("glucose sensor").await;

    match result {
        Err(PubMedError::UpstreamUnavailable { attempts, source }) => {
            assert_eq!(attempts, 3);
            assert!(matches!(*source, PubMedError::ApiError { status: 503, .. }));
        }
        other => panic!("expected UpstreamUnavailable, got {other:?}"),
    }

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
}

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let result = client.search_count("glucose sensor").await;

    assert!(matches!(
        result,
        Err(PubMedError::ApiError { status: 404, .. })
    ));
    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
}

#[tokio::test]
async fn test_rate_limited_response_is_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string(count_json(1523)))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let count = client.search_count("glucose sensor").await.expect("retry should recover");

    assert_eq!(count, 1523);
    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
}

#[tokio::test]
async fn test_truncated_body_is_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"esearchresult": {"cou"#))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string(count_json(42)))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let count = client.search_count("glucose sensor").await.expect("second body is valid");

    assert_eq!(count, 42);
}

#[tokio::test]
async fn test_missing_envelope_exhausts_as_format_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"header": {"type": "esearch"}}"#))
        .mount(&mock_server)
        .await;

    let config = test_config(&mock_server).with_retry_config(fast_retry(2));
    let client = PubMedClient::with_config(config);

    match client.search("glucose sensor", 0, 10).await {
        Err(PubMedError::UpstreamUnavailable { attempts, source }) => {
            assert_eq!(attempts, 2);
            assert!(source.is_format_error());
        }
        other => panic!("expected UpstreamUnavailable, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_efetch_xml_is_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<PubmedArticleSet><PubmedArticle>"))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string(common::sample_articles_xml()))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let session = pubtrend::pubmed::models::HistorySession {
        webenv: "MCID_test_webenv".to_string(),
        query_key: "1".to_string(),
    };

    let records = client
        .fetch_from_history(&session, 0, 100)
        .await
        .expect("second document is well-formed");
    assert_eq!(records.len(), 2);
}

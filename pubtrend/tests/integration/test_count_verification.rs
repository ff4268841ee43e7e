mod common;

use std::time::{Duration, Instant};

use pubtrend::{ClientConfig, CompanyRegistry, PubMedClient};
use tracing_test::traced_test;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{count_json, create_test_client, fast_retry};

const MEDTRONIC_2015: &str = r#"(insulin pump) AND (("Medtronic"[Affiliation]) OR ("Medtronic"[Grant Number]) OR ("Medtronic"[Grant])) AND 2015/01/01[dp]:2015/12/31[dp]"#;

async fn mount_counts(mock_server: &MockServer, first: usize, second: usize) {
    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .and(query_param("rettype", "count"))
        .respond_with(ResponseTemplate::new(200).set_body_string(count_json(first)))
        .up_to_n_times(1)
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .and(query_param("rettype", "count"))
        .respond_with(ResponseTemplate::new(200).set_body_string(count_json(second)))
        .mount(mock_server)
        .await;
}

#[tokio::test]
#[traced_test]
async fn test_high_count_is_trusted() {
    let mock_server = MockServer::start().await;
    mount_counts(&mock_server, 1523, 0).await;

    let client = create_test_client(&mock_server);
    let count = client.verified_count("insulin pump").await.unwrap();

    assert_eq!(count, 1523);
    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
}

#[tokio::test]
#[traced_test]
async fn test_low_count_is_requeried_and_larger_wins() {
    let mock_server = MockServer::start().await;
    mount_counts(&mock_server, 0, 42).await;

    let client = create_test_client(&mock_server);
    let count = client.verified_count("insulin pump").await.unwrap();

    assert_eq!(count, 42);
    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
}

#[tokio::test]
async fn test_lower_recount_keeps_first_value() {
    let mock_server = MockServer::start().await;
    mount_counts(&mock_server, 57, 12).await;

    let client = create_test_client(&mock_server);
    assert_eq!(client.verified_count("insulin pump").await.unwrap(), 57);
}

#[tokio::test]
async fn test_failed_recount_keeps_first_value() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string(count_json(7)))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    assert_eq!(client.verified_count("insulin pump").await.unwrap(), 7);
}

#[tokio::test]
async fn test_threshold_is_configurable() {
    let mock_server = MockServer::start().await;
    mount_counts(&mock_server, 5, 50).await;

    let config = common::test_config(&mock_server).with_low_count_threshold(0);
    let client = pubtrend::PubMedClient::with_config(config);

    assert_eq!(client.verified_count("insulin pump").await.unwrap(), 5);
    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
}

#[tokio::test]
#[traced_test]
async fn test_publication_count_sends_manufacturer_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .and(query_param("term", MEDTRONIC_2015))
        .and(query_param("rettype", "count"))
        .respond_with(ResponseTemplate::new(200).set_body_string(count_json(1234)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let count = client
        .publication_count("insulin pump", 2015, "Medtronic", &CompanyRegistry::new())
        .await
        .expect("count should succeed");

    assert_eq!(count, 1234);
}

#[tokio::test]
async fn test_recount_waits_for_default_verification_delay() {
    let mock_server = MockServer::start().await;
    mount_counts(&mock_server, 5, 5).await;

    let config = ClientConfig::new()
        .with_base_url(mock_server.uri())
        .with_rate_limit(100.0)
        .with_retry_config(fast_retry(3));
    assert_eq!(config.verification_delay, Duration::from_secs(2));
    let client = PubMedClient::with_config(config);

    let started = Instant::now();
    let count = client.verified_count("insulin pump").await.unwrap();

    assert_eq!(count, 5);
    assert!(started.elapsed() >= Duration::from_secs(2));
    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
}

#[tokio::test]
async fn test_trusted_count_does_not_wait() {
    let mock_server = MockServer::start().await;
    mount_counts(&mock_server, 500, 0).await;

    let client = PubMedClient::with_config(
        ClientConfig::new()
            .with_base_url(mock_server.uri())
            .with_rate_limit(100.0)
            .with_retry_config(fast_retry(3)),
    );

    let started = Instant::now();
    assert_eq!(client.verified_count("insulin pump").await.unwrap(), 500);
    assert!(started.elapsed() < Duration::from_secs(2));
}

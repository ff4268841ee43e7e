mod common;

use pubtrend::service::NO_RESULTS_MESSAGE;
use pubtrend::{CompanyRegistry, NoticeLevel, PubMedClient, SearchFilters, SearchService, SearchType};
use tracing_test::traced_test;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{create_test_client, esearch_json, fast_retry, sample_articles_xml, test_config};

fn service(mock_server: &MockServer) -> SearchService {
    SearchService::new(create_test_client(mock_server), CompanyRegistry::new())
}

#[tokio::test]
#[traced_test]
async fn test_basic_search_with_statistics() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .and(query_param("term", "J  Smith[Author] AND 2019:2020[dp]"))
        .respond_with(ResponseTemplate::new(200).set_body_string(esearch_json(25, &["1001", "1002"])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sample_articles_xml()))
        .mount(&mock_server)
        .await;

    let filters = SearchFilters::new("J. Smith")
        .with_search_type(SearchType::Author)
        .with_year_range(Some(2019), Some(2020));
    let view = service(&mock_server).basic_search(&filters, 1).await;

    assert!(view.notices.is_empty(), "unexpected notices: {:?}", view.notices);
    assert_eq!(
        view.formatted_query.as_deref(),
        Some("J  Smith[Author] AND 2019:2020[dp]")
    );
    assert_eq!(view.page, 1);
    assert_eq!(view.page_range, vec![1, 2, 3]);
    assert_eq!(view.results.total_results, 25);
    assert_eq!(view.results.results.len(), 2);

    let statistics = view.statistics.expect("statistics are sampled");
    assert_eq!(statistics.top_journals[0], ("Diabetes Care".to_string(), 2));
    let info = view.sampling_info.expect("sampling info accompanies statistics");
    assert_eq!(info.total_results, 25);
    assert_eq!(info.sampled_results, 100);
}

#[tokio::test]
async fn test_no_results_notice() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string(esearch_json(0, &[])))
        .mount(&mock_server)
        .await;

    let view = service(&mock_server)
        .basic_search(&SearchFilters::new("zzzz unmatched topic"), 1)
        .await;

    assert_eq!(view.notices.len(), 1);
    assert_eq!(view.notices[0].level, NoticeLevel::Warning);
    assert_eq!(view.notices[0].message, NO_RESULTS_MESSAGE);
    assert!(view.statistics.is_none());
    assert!(view.page_range.is_empty());
}

#[tokio::test]
#[traced_test]
async fn test_upstream_failure_becomes_notice() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let config = test_config(&mock_server).with_retry_config(fast_retry(2));
    let service = SearchService::new(PubMedClient::with_config(config), CompanyRegistry::new());

    let view = service.basic_search(&SearchFilters::new("stent"), 1).await;
    assert_eq!(view.notices.len(), 1);
    assert_eq!(view.notices[0].level, NoticeLevel::Error);
    assert!(view.results.results.is_empty());
    assert!(view.statistics.is_none());

    let details = service.details("stent", "Medtronic", 2020, 1).await;
    assert_eq!(details.notices.len(), 1);
    assert!(details.details.results.is_empty());
}

#[tokio::test]
async fn test_statistics_can_be_disabled() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string(esearch_json(2, &["1001", "1002"])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sample_articles_xml()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let view = service(&mock_server)
        .with_statistics(false)
        .basic_search(&SearchFilters::new("insulin pump"), 1)
        .await;

    assert_eq!(view.results.results.len(), 2);
    assert!(view.statistics.is_none());
    assert!(view.notices.is_empty());
}

#[tokio::test]
async fn test_trends_failures_are_zero_cells() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&mock_server)
        .await;

    let view = service(&mock_server)
        .publication_trends("stent", &["Abbott", "Boston Scientific"], 2019, 2020)
        .await;

    let matrix = view.matrix.expect("matrix is produced");
    assert!(view.notices.is_empty());
    assert_eq!(matrix.cells(), 4);
    assert_eq!(matrix.grand_total(), 0);
}

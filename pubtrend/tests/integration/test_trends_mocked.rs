mod common;

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use pubtrend::pubmed::query::manufacturer_query;
use pubtrend::{
    ClientConfig, CompanyEntry, CompanyRegistry, NameAlias, NameVariation, PubMedClient,
};
use tracing_test::traced_test;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{count_json, esearch_json, fast_retry, test_config};

fn registry() -> CompanyRegistry {
    let mut registry = CompanyRegistry::new();
    registry
        .upsert("Abbott", CompanyEntry::new().with_display_order(2))
        .unwrap();
    registry
        .upsert(
            "Medtronic",
            CompanyEntry::new()
                .with_display_order(1)
                .with_variation(NameVariation::new("Medtronic", 1949, 2100)),
        )
        .unwrap();
    registry
}

async fn mount_count(mock_server: &MockServer, company: &str, year: i32, response: ResponseTemplate) {
    let query = manufacturer_query("stent", &[company], year);
    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .and(query_param("term", query.as_str()))
        .and(query_param("rettype", "count"))
        .respond_with(response)
        .mount(mock_server)
        .await;
}

fn count(n: usize) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_string(count_json(n))
}

#[tokio::test]
#[traced_test]
async fn test_matrix_counts_every_unit_in_display_order() {
    let mock_server = MockServer::start().await;
    mount_count(&mock_server, "Medtronic", 2020, count(120)).await;
    mount_count(&mock_server, "Abbott", 2020, count(300)).await;
    mount_count(&mock_server, "Medtronic", 2021, count(150)).await;
    mount_count(&mock_server, "Abbott", 2021, count(210)).await;

    let progress = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&progress);
    let client = PubMedClient::with_config(test_config(&mock_server)).with_progress_callback(
        move |done, total, status| {
            sink.lock().unwrap().push((done, total, status.to_string()));
        },
    );

    let matrix = client
        .publication_matrix("stent", &["Abbott", "Medtronic"], 2020, 2021, &registry())
        .await
        .expect("matrix should complete");

    assert_eq!(matrix.years, vec![2020, 2021]);
    assert_eq!(matrix.manufacturers, vec!["Medtronic", "Abbott"]);
    assert_eq!(matrix.count(2020, "Medtronic"), 120);
    assert_eq!(matrix.count(2021, "Abbott"), 210);
    assert_eq!(matrix.year_total(2020), 420);
    assert_eq!(matrix.manufacturer_total("Medtronic"), 270);
    assert_eq!(matrix.grand_total(), 780);

    let progress = progress.lock().unwrap();
    assert_eq!(
        progress.as_slice(),
        &[
            (1, 4, "Processed Medtronic (2020)".to_string()),
            (2, 4, "Processed Abbott (2020)".to_string()),
            (3, 4, "Processed Medtronic (2021)".to_string()),
            (4, 4, "Processed Abbott (2021)".to_string()),
        ]
    );

    let csv = matrix.to_csv_string().unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(
        lines,
        vec![
            "Year,Medtronic,Abbott,Total",
            "2020,120,300,420",
            "2021,150,210,360",
            "Total,270,510,780",
        ]
    );
}

#[tokio::test]
#[traced_test]
async fn test_failed_unit_counts_as_zero() {
    let mock_server = MockServer::start().await;
    mount_count(&mock_server, "Medtronic", 2020, count(120)).await;
    mount_count(&mock_server, "Abbott", 2020, ResponseTemplate::new(400)).await;

    let client = PubMedClient::with_config(test_config(&mock_server));
    let matrix = client
        .publication_matrix("stent", &["Medtronic", "Abbott"], 2020, 2020, &registry())
        .await
        .expect("a failing unit does not fail the matrix");

    assert_eq!(matrix.count(2020, "Medtronic"), 120);
    assert_eq!(matrix.count(2020, "Abbott"), 0);
    assert_eq!(matrix.grand_total(), 120);
}

#[tokio::test]
async fn test_aliases_extend_the_company_clause() {
    let mock_server = MockServer::start().await;

    let mut registry = CompanyRegistry::new();
    registry.add_alias(NameAlias::new("Becton, Dickinson", vec!["BD".to_string()]));

    let expected = manufacturer_query("catheter", &["Becton, Dickinson and Company", "BD"], 2018);
    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .and(query_param("term", expected.as_str()))
        .respond_with(count(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = PubMedClient::with_config(test_config(&mock_server));
    let n = client
        .publication_count("catheter", 2018, "Becton, Dickinson and Company", &registry)
        .await
        .unwrap();

    assert_eq!(n, 500);
}

#[tokio::test]
#[traced_test]
async fn test_detailed_results_use_esummary() {
    let mock_server = MockServer::start().await;

    let query = manufacturer_query("stent", &["Medtronic"], 2020);
    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .and(query_param("term", query.as_str()))
        .and(query_param("retstart", "100"))
        .and(query_param("retmax", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_string(esearch_json(102, &["1001", "1002"])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let summary = serde_json::json!({
        "header": {"type": "esummary", "version": "0.3"},
        "result": {
            "uids": ["1001", "1002"],
            "1001": {
                "uid": "1001",
                "pubdate": "2020 Mar",
                "source": "JACC",
                "authors": [{"name": "Smith J", "authtype": "Author"}],
                "title": "Drug-eluting stents in practice.",
                "articleids": [{"idtype": "doi", "value": "10.1016/j.jacc.2020.01.001"}]
            },
            "1002": {
                "uid": "1002",
                "pubdate": "2020",
                "source": "EuroIntervention",
                "authors": [],
                "title": "Stent thrombosis revisited.",
                "articleids": []
            }
        }
    });
    Mock::given(method("GET"))
        .and(path("/esummary.fcgi"))
        .and(query_param("id", "1001,1002"))
        .respond_with(ResponseTemplate::new(200).set_body_string(summary.to_string()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = PubMedClient::with_config(test_config(&mock_server));
    let details = client
        .detailed_results("stent", "Medtronic", 2020, 2, &registry())
        .await
        .expect("details should load");

    assert_eq!(details.count, 102);
    assert_eq!(details.results.len(), 2);
    assert_eq!(details.results[0].pmid, "1001");
    assert_eq!(details.results[0].doi, "10.1016/j.jacc.2020.01.001");
    assert_eq!(details.results[1].journal, "EuroIntervention");
    assert!(details.results[1].doi.is_empty());
}

#[tokio::test]
async fn test_detailed_results_without_hits() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string(esearch_json(0, &[])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/esummary.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = PubMedClient::with_config(test_config(&mock_server));
    let details = client
        .detailed_results("stent", "Medtronic", 2020, 1, &registry())
        .await
        .unwrap();

    assert_eq!(details.count, 0);
    assert!(details.results.is_empty());
}

fn default_pacing_client(mock_server: &MockServer) -> PubMedClient {
    let config = ClientConfig::new()
        .with_base_url(mock_server.uri())
        .with_rate_limit(100.0)
        .with_retry_config(fast_retry(3));
    assert_eq!(config.batch_unit_delay, Duration::from_secs(1));
    PubMedClient::with_config(config)
}

#[tokio::test]
async fn test_units_are_spaced_by_batch_delay() {
    let mock_server = MockServer::start().await;
    for year in [2020, 2021] {
        mount_count(&mock_server, "Medtronic", year, count(400)).await;
        mount_count(&mock_server, "Abbott", year, count(400)).await;
    }

    let client = default_pacing_client(&mock_server);
    let started = Instant::now();
    let matrix = client
        .publication_matrix("stent", &["Abbott", "Medtronic"], 2020, 2021, &registry())
        .await
        .unwrap();

    assert_eq!(matrix.grand_total(), 1600);
    assert!(started.elapsed() >= Duration::from_secs(3));
}

#[tokio::test]
async fn test_single_unit_has_no_batch_delay() {
    let mock_server = MockServer::start().await;
    mount_count(&mock_server, "Abbott", 2020, count(400)).await;

    let client = default_pacing_client(&mock_server);
    let started = Instant::now();
    let matrix = client
        .publication_matrix("stent", &["Abbott"], 2020, 2020, &registry())
        .await
        .unwrap();

    assert_eq!(matrix.grand_total(), 400);
    assert!(started.elapsed() < Duration::from_secs(1));
}

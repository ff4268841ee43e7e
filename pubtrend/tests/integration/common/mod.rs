//! Shared fixtures for the mocked E-utilities tests
#![allow(dead_code)]

use std::time::Duration;

use pubtrend::{ClientConfig, PubMedClient, RetryConfig};
use wiremock::MockServer;

/// Client pointed at the mock server with fast pacing and short backoff
pub fn create_test_client(mock_server: &MockServer) -> PubMedClient {
    PubMedClient::with_config(test_config(mock_server))
}

pub fn test_config(mock_server: &MockServer) -> ClientConfig {
    ClientConfig::new()
        .with_base_url(mock_server.uri())
        .with_rate_limit(100.0)
        .with_retry_config(fast_retry(3))
        .with_verification_delay(Duration::from_millis(10))
        .with_batch_unit_delay(Duration::ZERO)
}

pub fn fast_retry(max_attempts: u32) -> RetryConfig {
    RetryConfig::new()
        .with_max_attempts(max_attempts)
        .with_initial_delay(Duration::from_millis(20))
        .with_max_delay(Duration::from_millis(200))
}

/// ESearch JSON with a history session
pub fn esearch_json(count: usize, ids: &[&str]) -> String {
    serde_json::json!({
        "header": {"type": "esearch", "version": "0.3"},
        "esearchresult": {
            "count": count.to_string(),
            "retmax": ids.len().to_string(),
            "retstart": "0",
            "idlist": ids,
            "querykey": "1",
            "webenv": "MCID_test_webenv",
            "querytranslation": "test[All Fields]"
        }
    })
    .to_string()
}

/// ESearch JSON for `rettype=count`
pub fn count_json(count: usize) -> String {
    serde_json::json!({
        "header": {"type": "esearch", "version": "0.3"},
        "esearchresult": {"count": count.to_string()}
    })
    .to_string()
}

/// Minimal fixture article
pub struct TestArticle<'a> {
    pub pmid: &'a str,
    pub year: &'a str,
    pub authors: &'a [(&'a str, &'a str)],
    pub journal: &'a str,
    pub affiliation: &'a str,
    pub grant: Option<(&'a str, &'a str)>,
    pub mesh: &'a [&'a str],
}

impl TestArticle<'_> {
    fn to_xml(&self) -> String {
        let authors: String = self
            .authors
            .iter()
            .map(|(last, fore)| {
                format!(
                    "<Author><LastName>{last}</LastName><ForeName>{fore}</ForeName>\
                     <AffiliationInfo><Affiliation>{}</Affiliation></AffiliationInfo></Author>",
                    self.affiliation
                )
            })
            .collect();
        let grants = self
            .grant
            .map(|(id, agency)| {
                format!("<GrantList><Grant><GrantID>{id}</GrantID><Agency>{agency}</Agency></Grant></GrantList>")
            })
            .unwrap_or_default();
        let mesh: String = self
            .mesh
            .iter()
            .map(|term| {
                format!("<MeshHeading><DescriptorName UI=\"D000001\">{term}</DescriptorName></MeshHeading>")
            })
            .collect();

        format!(
            r#"<PubmedArticle>
    <MedlineCitation Status="MEDLINE" Owner="NLM">
        <PMID Version="1">{pmid}</PMID>
        <Article>
            <Journal>
                <JournalIssue><PubDate><Year>{year}</Year><Month>Jan</Month></PubDate></JournalIssue>
                <Title>{journal}</Title>
            </Journal>
            <ArticleTitle>Article {pmid}</ArticleTitle>
            <AuthorList>{authors}</AuthorList>
            {grants}
        </Article>
        <MeshHeadingList>{mesh}</MeshHeadingList>
    </MedlineCitation>
</PubmedArticle>"#,
            pmid = self.pmid,
            year = self.year,
            journal = self.journal,
        )
    }
}

pub fn article_set(articles: &[TestArticle<'_>]) -> String {
    let body: String = articles.iter().map(TestArticle::to_xml).collect();
    format!("<?xml version=\"1.0\" ?>\n<PubmedArticleSet>\n{body}\n</PubmedArticleSet>")
}

/// Two articles from 2019 and 2020 sharing an author and journal
pub fn sample_articles_xml() -> String {
    article_set(&[
        TestArticle {
            pmid: "1001",
            year: "2020",
            authors: &[("Smith", "Jane"), ("Doe", "John")],
            journal: "Diabetes Care",
            affiliation: "Mayo Clinic, Rochester, MN, USA.",
            grant: Some(("R01 DK000001", "NIDDK NIH HHS")),
            mesh: &["Diabetes Mellitus, Type 1", "Insulin Infusion Systems"],
        },
        TestArticle {
            pmid: "1002",
            year: "2019",
            authors: &[("Smith", "Jane")],
            journal: "Diabetes Care",
            affiliation: "Medtronic Diabetes, Northridge, CA, USA.",
            grant: None,
            mesh: &["Insulin Infusion Systems"],
        },
    ])
}

//! ESummary lookups for the manufacturer detail view

use tracing::{debug, info, instrument, warn};

use super::PubMedClient;
use crate::error::{PubMedError, Result};
use crate::pubmed::models::ArticleSummary;
use crate::pubmed::responses::{ESummaryDocSum, ESummaryResponse};
use crate::retry::with_retry;

impl PubMedClient {
    /// Condensed metadata for `pmids`, in the order given
    ///
    /// PMIDs missing from the response, or carrying a per-document error, are
    /// skipped.
    #[instrument(skip(self), fields(pmids_count = pmids.len()))]
    pub async fn fetch_summaries(&self, pmids: &[String]) -> Result<Vec<ArticleSummary>> {
        if pmids.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!(
            "{}/esummary.fcgi?db=pubmed&id={}&retmode=json",
            self.base_url,
            urlencoding::encode(&pmids.join(","))
        );

        debug!(batch_size = pmids.len(), "Making ESummary API request");
        let summaries = with_retry(
            || self.summaries_once(&url, pmids),
            &self.config.retry_config,
            "ESummary",
        )
        .await?;

        info!(
            requested = pmids.len(),
            parsed = summaries.len(),
            "ESummary completed"
        );
        Ok(summaries)
    }

    async fn summaries_once(&self, url: &str, pmids: &[String]) -> Result<Vec<ArticleSummary>> {
        let json_text = self.get_text(url).await?;
        parse_esummary_response(&json_text, pmids)
    }
}

pub(crate) fn parse_esummary_response(
    json_text: &str,
    pmids: &[String],
) -> Result<Vec<ArticleSummary>> {
    let response: ESummaryResponse = serde_json::from_str(json_text)?;
    let result = response.result.ok_or_else(|| {
        PubMedError::UpstreamFormat("esummary response is missing the result object".to_string())
    })?;

    let mut summaries = Vec::with_capacity(pmids.len());
    for pmid in pmids {
        let Some(doc_value) = result.get(pmid) else {
            warn!(pmid = %pmid, "PMID not found in ESummary response");
            continue;
        };

        if doc_value.get("error").is_some() {
            warn!(pmid = %pmid, "ESummary returned error for PMID");
            continue;
        }

        let doc: ESummaryDocSum = match serde_json::from_value(doc_value.clone()) {
            Ok(doc) => doc,
            Err(e) => {
                warn!(pmid = %pmid, error = %e, "Failed to parse ESummary document");
                continue;
            }
        };

        summaries.push(ArticleSummary {
            pmid: pmid.clone(),
            doi: doc.doi(),
            title: doc.title,
            authors: doc.authors.into_iter().map(|a| a.name).collect(),
            journal: doc.source,
            pubdate: doc.pubdate,
        });
    }

    Ok(summaries)
}

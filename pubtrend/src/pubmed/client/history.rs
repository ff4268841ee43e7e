//! History-server retrieval: EFetch by WebEnv/query_key and paginated search

use tracing::{debug, info, instrument};

use super::PubMedClient;
use crate::error::{PubMedError, Result};
use crate::pubmed::models::{ArticleRecord, HistorySession, SearchPage};
use crate::pubmed::parser::parse_articles_from_xml;
use crate::retry::with_retry;

impl PubMedClient {
    /// Fetch up to `max` parsed records from a stored search, starting at `start`
    ///
    /// # Errors
    ///
    /// * `PubMedError::HistorySessionError` - the WebEnv expired or was rejected
    /// * `PubMedError::XmlError` - the document was not well-formed on every attempt
    #[instrument(skip(self, session), fields(query_key = %session.query_key, start = start, max = max))]
    pub async fn fetch_from_history(
        &self,
        session: &HistorySession,
        start: usize,
        max: usize,
    ) -> Result<Vec<ArticleRecord>> {
        let url = format!(
            "{}/efetch.fcgi?db=pubmed&query_key={}&WebEnv={}&retstart={}&retmax={}&retmode=xml&rettype=abstract",
            self.base_url,
            urlencoding::encode(&session.query_key),
            urlencoding::encode(&session.webenv),
            start,
            max
        );

        debug!("Making EFetch API request from history");
        let articles = with_retry(
            || self.fetch_history_once(&url),
            &self.config.retry_config,
            "EFetch history",
        )
        .await?;

        info!(
            fetched_count = articles.len(),
            start = start,
            "Fetched articles from history"
        );
        Ok(articles)
    }

    async fn fetch_history_once(&self, url: &str) -> Result<Vec<ArticleRecord>> {
        let xml_text = self.get_text(url).await?;

        if xml_text.trim().is_empty() {
            return Ok(Vec::new());
        }

        if xml_text.contains("<ERROR>") {
            let error_msg = xml_text
                .split("<ERROR>")
                .nth(1)
                .and_then(|s| s.split("</ERROR>").next())
                .unwrap_or("Unknown error");

            return Err(PubMedError::HistorySessionError(error_msg.to_string()));
        }

        parse_articles_from_xml(&xml_text)
    }

    /// One page of parsed results for `query`, pages are 1-based
    ///
    /// `total_results` is the upstream count even when the requested page is
    /// past the end and comes back empty.
    #[instrument(skip(self), fields(query = %query, page = page, per_page = per_page))]
    pub async fn search_page(&self, query: &str, page: usize, per_page: usize) -> Result<SearchPage> {
        let per_page = per_page.max(1);
        let start = page_offset(page, per_page)?;

        let search = self.search(query, start, per_page).await?;
        let total_results = search.total_count;
        let total_pages = total_results.div_ceil(per_page);

        let results = match search.history_session() {
            Some(session) if !search.pmids.is_empty() => {
                self.fetch_from_history(&session, start, per_page).await?
            }
            Some(_) => Vec::new(),
            None if total_results == 0 || search.pmids.is_empty() => Vec::new(),
            None => {
                return Err(PubMedError::UpstreamFormat(
                    "search returned results without a history session".to_string(),
                ))
            }
        };

        Ok(SearchPage {
            results,
            total_pages,
            total_results,
        })
    }
}

/// Offset of the first record on a 1-based page
pub(super) fn page_offset(page: usize, per_page: usize) -> Result<usize> {
    page.saturating_sub(1).checked_mul(per_page).ok_or_else(|| {
        PubMedError::MalformedQuery(format!("page {page} is out of range"))
    })
}

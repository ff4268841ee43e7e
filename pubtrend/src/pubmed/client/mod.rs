mod history;
mod summary;
mod trends;

use std::sync::Arc;

use reqwest::Client;
use tracing::{debug, info, instrument, warn};

use crate::config::ClientConfig;
use crate::error::{PubMedError, Result};
use crate::pubmed::models::SearchResult;
use crate::pubmed::responses::ESearchResult;
use crate::rate_limit::RateLimiter;
use crate::retry::with_retry;

/// Observer for long-running batch operations: `(completed, total, status)`
pub type ProgressCallback = Arc<dyn Fn(usize, usize, &str) + Send + Sync>;

/// Client for the PubMed E-utilities
///
/// Every request goes through one [`RateLimiter`] shared by all clones of the
/// client and is wrapped in the retry policy of [`ClientConfig::retry_config`].
#[derive(Clone)]
pub struct PubMedClient {
    client: Client,
    pub(crate) base_url: String,
    rate_limiter: RateLimiter,
    config: ClientConfig,
    progress: Option<ProgressCallback>,
}

impl PubMedClient {
    /// Create a client with default configuration
    ///
    /// # Example
    ///
    /// ```
    /// use pubtrend::PubMedClient;
    ///
    /// let client = PubMedClient::new();
    /// ```
    pub fn new() -> Self {
        Self::with_config(ClientConfig::new())
    }

    /// Create a client with custom configuration
    ///
    /// # Example
    ///
    /// ```
    /// use pubtrend::{ClientConfig, PubMedClient};
    ///
    /// let config = ClientConfig::new()
    ///     .with_api_key("your_api_key_here")
    ///     .with_email("researcher@university.edu");
    ///
    /// let client = PubMedClient::with_config(config);
    /// ```
    pub fn with_config(config: ClientConfig) -> Self {
        let rate_limiter = config.create_rate_limiter();
        let base_url = config.effective_base_url().to_string();

        let mut builder = Client::builder().user_agent(config.effective_user_agent());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to build configured HTTP client, using defaults");
            Client::new()
        });

        Self {
            client,
            base_url,
            rate_limiter,
            config,
            progress: None,
        }
    }

    /// Attach a progress observer for batch operations
    pub fn with_progress_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(usize, usize, &str) + Send + Sync + 'static,
    {
        self.progress = Some(Arc::new(callback));
        self
    }

    pub fn set_progress_callback(&mut self, callback: Option<ProgressCallback>) {
        self.progress = callback;
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub(crate) fn report_progress(&self, completed: usize, total: usize, status: &str) {
        if let Some(callback) = &self.progress {
            callback(completed, total, status);
        }
    }

    /// Search with `usehistory=y`, returning one window of PMIDs and the session handle
    ///
    /// # Errors
    ///
    /// * `PubMedError::MalformedQuery` - the query is empty
    /// * `PubMedError::ApiError` - non-success status or an NCBI `ERROR` field
    /// * `PubMedError::UpstreamUnavailable` - retries exhausted
    ///
    /// # Example
    ///
    /// ```no_run
    /// use pubtrend::PubMedClient;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = PubMedClient::new();
    ///     let result = client.search("insulin pump", 0, 100).await?;
    ///     println!("{} matches, first page {:?}", result.total_count, result.pmids);
    ///     Ok(())
    /// }
    /// ```
    #[instrument(skip(self), fields(query = %query, start = start, count = count))]
    pub async fn search(&self, query: &str, start: usize, count: usize) -> Result<SearchResult> {
        ensure_query(query)?;

        let url = format!(
            "{}/esearch.fcgi?db=pubmed&term={}&retstart={}&retmax={}&retmode=json&usehistory=y",
            self.base_url,
            urlencoding::encode(query),
            start,
            count
        );

        let result = with_retry(|| self.search_once(&url), &self.config.retry_config, "ESearch")
            .await?;

        info!(
            total = result.total_count,
            returned = result.pmids.len(),
            "Search completed"
        );
        Ok(result)
    }

    async fn search_once(&self, url: &str) -> Result<SearchResult> {
        let body = self.get_text(url).await?;
        let parsed: ESearchResult = serde_json::from_str(&body)?;
        let data = parsed.into_data()?;
        let total_count = data.total_count()?;

        Ok(SearchResult {
            pmids: data.idlist,
            total_count,
            webenv: data.webenv,
            query_key: data.query_key,
            query_translation: data.querytranslation,
        })
    }

    /// Number of records matching `query`, as reported by one count request
    #[instrument(skip(self), fields(query = %query))]
    pub async fn search_count(&self, query: &str) -> Result<usize> {
        ensure_query(query)?;

        let url = format!(
            "{}/esearch.fcgi?db=pubmed&term={}&rettype=count&retmode=json",
            self.base_url,
            urlencoding::encode(query)
        );

        with_retry(|| self.count_once(&url), &self.config.retry_config, "ESearch count").await
    }

    async fn count_once(&self, url: &str) -> Result<usize> {
        let body = self.get_text(url).await?;
        let parsed: ESearchResult = serde_json::from_str(&body)?;
        parsed.into_data()?.total_count()
    }

    /// Count with a second look at suspiciously low results
    ///
    /// A count below [`ClientConfig::low_count_threshold`] is re-queried once
    /// after [`ClientConfig::verification_delay`] and the larger value wins.
    /// A failing re-query keeps the first count.
    #[instrument(skip(self), fields(query = %query))]
    pub async fn verified_count(&self, query: &str) -> Result<usize> {
        let first = self.search_count(query).await?;
        if first >= self.config.low_count_threshold {
            return Ok(first);
        }

        debug!(
            count = first,
            threshold = self.config.low_count_threshold,
            "Low count, verifying"
        );
        tokio::time::sleep(self.config.verification_delay).await;

        match self.search_count(query).await {
            Ok(second) => {
                if second != first {
                    warn!(first, second, "Count changed on verification, keeping the larger");
                }
                Ok(first.max(second))
            }
            Err(e) => {
                warn!(error = %e, count = first, "Verification query failed, keeping first count");
                Ok(first)
            }
        }
    }

    /// One rate-limited GET with identification parameters appended
    pub(crate) async fn get_text(&self, url: &str) -> Result<String> {
        let mut final_url = url.to_string();
        let api_params = self.config.build_api_params();

        if !api_params.is_empty() {
            let separator = if url.contains('?') { '&' } else { '?' };
            final_url.push(separator);

            let param_strings: Vec<String> = api_params
                .into_iter()
                .map(|(key, value)| format!("{}={}", key, urlencoding::encode(&value)))
                .collect();
            final_url.push_str(&param_strings.join("&"));
        }

        self.rate_limiter.acquire().await;
        debug!("Making API request to: {}", url);

        let response = self.client.get(&final_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(PubMedError::ApiError {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown error").to_string(),
            });
        }

        Ok(response.text().await?)
    }
}

impl Default for PubMedClient {
    fn default() -> Self {
        Self::new()
    }
}

fn ensure_query(query: &str) -> Result<()> {
    if query.trim().is_empty() {
        return Err(PubMedError::MalformedQuery(
            "empty query, nothing to search for".to_string(),
        ));
    }
    Ok(())
}

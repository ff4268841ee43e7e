//! Client configuration
//!
//! [`ClientConfig`] collects everything the PubMed client needs to be a polite
//! E-utilities consumer: identification (`api_key`, `email`, `tool`), pacing
//! (minimum request interval, batch delay), resilience (retry policy) and the
//! low-count verification heuristic.

use std::env;
use std::time::Duration;

use crate::rate_limit::RateLimiter;
use crate::retry::RetryConfig;

/// Default E-utilities endpoint
pub const DEFAULT_BASE_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";

/// Tool name reported to NCBI when none is configured
pub const DEFAULT_TOOL: &str = "PubMedHelper";

/// Counts below this are re-queried once before being trusted
///
/// PubMed occasionally under-reports counts for fresh queries until its
/// index catches up. The threshold is empirical.
pub const LOW_COUNT_THRESHOLD: usize = 100;

/// Configuration for [`crate::PubMedClient`]
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// NCBI API key
    pub api_key: Option<String>,
    /// Contact email sent with every request
    pub email: Option<String>,
    /// Tool name sent with every request
    pub tool: Option<String>,
    /// Override for the E-utilities base URL (used by tests)
    pub base_url: Option<String>,
    /// Override for the HTTP user agent
    pub user_agent: Option<String>,
    /// Transport timeout; `None` keeps the HTTP client's default
    pub timeout: Option<Duration>,
    /// Minimum spacing between two upstream requests
    pub min_request_interval: Duration,
    /// Retry policy for every logical request
    pub retry_config: RetryConfig,
    /// Counts below this value trigger one verification re-query
    pub low_count_threshold: usize,
    /// Pause before the verification re-query
    pub verification_delay: Duration,
    /// Extra pause between manufacturer/year units of a batch operation
    pub batch_unit_delay: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            email: None,
            tool: None,
            base_url: None,
            user_agent: None,
            timeout: None,
            min_request_interval: Duration::from_millis(340),
            retry_config: RetryConfig::default(),
            low_count_threshold: LOW_COUNT_THRESHOLD,
            verification_delay: Duration::from_secs(2),
            batch_unit_delay: Duration::from_secs(1),
        }
    }
}

impl ClientConfig {
    /// Create a configuration with NCBI-friendly defaults
    ///
    /// # Example
    ///
    /// ```
    /// use pubtrend::ClientConfig;
    ///
    /// let config = ClientConfig::new()
    ///     .with_api_key("your_api_key_here")
    ///     .with_email("researcher@university.edu");
    /// assert_eq!(config.effective_tool(), "PubMedHelper");
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `PUBMED_API_KEY` and `CONTACT_EMAIL` from the environment
    pub fn from_env() -> Self {
        let mut config = Self::new();
        if let Some(key) = non_empty_env("PUBMED_API_KEY") {
            config = config.with_api_key(key);
        }
        if let Some(email) = non_empty_env("CONTACT_EMAIL") {
            config = config.with_email(email);
        }
        config
    }

    pub fn with_api_key<S: Into<String>>(mut self, api_key: S) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_email<S: Into<String>>(mut self, email: S) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_tool<S: Into<String>>(mut self, tool: S) -> Self {
        self.tool = Some(tool.into());
        self
    }

    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the pacing as requests per second
    pub fn with_rate_limit(mut self, requests_per_second: f64) -> Self {
        self.min_request_interval = RateLimiter::per_second(requests_per_second).min_interval();
        self
    }

    pub fn with_min_request_interval(mut self, interval: Duration) -> Self {
        self.min_request_interval = interval;
        self
    }

    pub fn with_retry_config(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = retry_config;
        self
    }

    pub fn with_low_count_threshold(mut self, threshold: usize) -> Self {
        self.low_count_threshold = threshold;
        self
    }

    pub fn with_verification_delay(mut self, delay: Duration) -> Self {
        self.verification_delay = delay;
        self
    }

    pub fn with_batch_unit_delay(mut self, delay: Duration) -> Self {
        self.batch_unit_delay = delay;
        self
    }

    pub fn effective_base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .map(|url| url.trim_end_matches('/'))
            .unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn effective_tool(&self) -> &str {
        self.tool.as_deref().unwrap_or(DEFAULT_TOOL)
    }

    pub fn effective_user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| format!("pubtrend/{}", env!("CARGO_PKG_VERSION")))
    }

    pub(crate) fn create_rate_limiter(&self) -> RateLimiter {
        RateLimiter::new(self.min_request_interval)
    }

    /// Identification parameters appended to every request
    pub fn build_api_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();

        if let Some(ref api_key) = self.api_key {
            params.push(("api_key".to_string(), api_key.clone()));
        }

        if let Some(ref email) = self.email {
            params.push(("email".to_string(), email.clone()));
        }

        params.push(("tool".to_string(), self.effective_tool().to_string()));

        params
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

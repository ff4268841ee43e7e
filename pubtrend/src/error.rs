use std::result;

use crate::retry::RetryableError;
use thiserror::Error;

/// Error types for PubMed trend operations
#[derive(Error, Debug)]
pub enum PubMedError {
    /// HTTP request failed at the transport level
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("JSON parsing failed: {0}")]
    JsonError(#[from] serde_json::Error),

    /// XML parsing failed
    #[error("XML parsing failed: {0}")]
    XmlError(String),

    /// Response parsed but is missing the expected envelope or fields
    #[error("Unexpected response format: {0}")]
    UpstreamFormat(String),

    /// Empty or invalid filter combination; callers should skip the search
    #[error("Malformed query: {0}")]
    MalformedQuery(String),

    /// Non-success HTTP status, or an NCBI error reported inside a 200 body
    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    /// Every retry attempt failed; `source` is the last error seen
    #[error("PubMed unavailable after {attempts} attempts: {source}")]
    UpstreamUnavailable {
        attempts: u32,
        #[source]
        source: Box<PubMedError>,
    },

    /// WebEnv session rejected by the history server
    #[error("History session error: {0}")]
    HistorySessionError(String),

    /// Company registry could not be read, parsed or written
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// CSV serialization failed
    #[error("CSV export failed: {0}")]
    CsvError(#[from] csv::Error),

    /// IO error for file operations
    #[error("IO error: {message}")]
    IoError { message: String },
}

pub type Result<T> = result::Result<T, PubMedError>;

impl PubMedError {
    /// Whether this error came from a malformed or unparseable upstream response
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            PubMedError::JsonError(_) | PubMedError::XmlError(_) | PubMedError::UpstreamFormat(_)
        )
    }
}

impl From<std::io::Error> for PubMedError {
    fn from(err: std::io::Error) -> Self {
        PubMedError::IoError {
            message: err.to_string(),
        }
    }
}

impl RetryableError for PubMedError {
    fn is_retryable(&self) -> bool {
        match self {
            PubMedError::RequestError(err) => {
                if err.is_timeout() || err.is_connect() {
                    return true;
                }

                if let Some(status) = err.status() {
                    return status.is_server_error() || status.as_u16() == 429;
                }

                // DNS and other network errors
                !err.is_builder() && !err.is_redirect()
            }

            // Server errors (5xx) and rate limiting (429) are transient
            PubMedError::ApiError { status, .. } => (500..600).contains(status) || *status == 429,

            // A response that fails verification is re-requested
            PubMedError::JsonError(_)
            | PubMedError::XmlError(_)
            | PubMedError::UpstreamFormat(_) => true,

            PubMedError::MalformedQuery(_)
            | PubMedError::UpstreamUnavailable { .. }
            | PubMedError::HistorySessionError(_)
            | PubMedError::ConfigError { .. }
            | PubMedError::CsvError(_)
            | PubMedError::IoError { .. } => false,
        }
    }

    fn retry_reason(&self) -> &str {
        match self {
            PubMedError::RequestError(err) if err.is_timeout() => "Request timeout",
            PubMedError::RequestError(err) if err.is_connect() => "Connection error",
            PubMedError::RequestError(_) => "Network error",
            PubMedError::ApiError { status, .. } => match status {
                429 => "Rate limit exceeded",
                500..=599 => "Server error",
                _ => "Client error",
            },
            PubMedError::JsonError(_) | PubMedError::UpstreamFormat(_) => {
                "Response verification failed"
            }
            PubMedError::XmlError(_) => "Invalid XML response",
            PubMedError::MalformedQuery(_) => "Invalid query",
            PubMedError::UpstreamUnavailable { .. } => "Retries exhausted",
            PubMedError::HistorySessionError(_) => "History session rejected",
            PubMedError::ConfigError { .. } => "Invalid configuration",
            PubMedError::CsvError(_) | PubMedError::IoError { .. } => "File system error",
        }
    }
}

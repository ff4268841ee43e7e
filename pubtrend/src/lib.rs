//! # pubtrend
//!
//! Publication counts and sampled statistics from PubMed, grouped by topic,
//! medical-device manufacturer and year.
//!
//! ## Features
//!
//! - **Query building**: search-form filters and manufacturer/year count queries
//! - **Polite client**: shared rate limiter, retry with exponential backoff,
//!   re-verification of suspiciously low counts
//! - **Sampled statistics**: top authors, journals, affiliations, grants and
//!   MeSH terms estimated from evenly spread windows of the result set
//! - **Trend matrix**: counts per manufacturer and year with CSV export
//!
//! ## Quick Start
//!
//! ```no_run
//! use pubtrend::{ClientConfig, CompanyRegistry, PubMedClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = PubMedClient::with_config(ClientConfig::from_env());
//!     let registry = CompanyRegistry::load("config/manufacturer_config.json")?;
//!
//!     let matrix = client
//!         .publication_matrix("insulin pump", &["Medtronic", "Insulet"], 2015, 2020, &registry)
//!         .await?;
//!
//!     print!("{}", matrix.to_csv_string()?);
//!     Ok(())
//! }
//! ```
//!
//! ### Sampling statistics
//!
//! ```no_run
//! use pubtrend::{PubMedClient, SearchFilters, StatisticsSampler};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = PubMedClient::new();
//!     let query = SearchFilters::new("closed loop insulin")
//!         .with_year_range(Some(2015), None)
//!         .build();
//!
//!     if let Some((stats, info)) = StatisticsSampler::new(&client).sample(query.as_str()).await? {
//!         println!("Based on {}% of {} results", info.sampling_percentage, info.total_results);
//!         for (author, count) in stats.top_authors {
//!             println!("{author}: {count}");
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod companies;
pub mod config;
pub mod error;
pub mod export;
pub mod pubmed;
pub mod rate_limit;
pub mod retry;
pub mod sampling;
pub mod service;
pub mod trends;

pub use companies::{
    Acquisition, CompanyEntry, CompanyNames, CompanyRegistry, NameVariation,
};
pub use config::ClientConfig;
pub use error::{PubMedError, Result};
pub use export::{export_file_name, export_file_name_now};
pub use pubmed::{
    ArticleRecord, ArticleSummary, BuiltQuery, DetailedResults, NameAlias, PubMedClient,
    SearchFilters, SearchPage, SearchResult, SearchType,
};
pub use retry::{RetryConfig, RetryableError};
pub use sampling::{SamplingInfo, SamplingResult, StatisticsSampler};
pub use service::{BasicSearchView, Notice, NoticeLevel, SearchService};
pub use trends::PublicationMatrix;

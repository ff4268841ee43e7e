//! PubMed E-utilities access
//!
//! The client functionality is split across focused modules under [`client`]:
//! - `client/mod.rs` - client struct, ESearch and counts with verification
//! - `client/history` - EFetch from the history server and paginated search
//! - `client/summary` - ESummary lookups
//! - `client/trends` - manufacturer counts, the count matrix and detail pages

pub mod client;
pub mod models;
pub mod parser;
pub mod query;
pub(crate) mod responses;

pub use client::{ProgressCallback, PubMedClient};
pub use models::{
    ArticleRecord, ArticleSummary, DetailedResults, Grant, HistorySession, PublicationDate,
    SearchPage, SearchResult,
};
pub use parser::parse_articles_from_xml;
pub use query::{manufacturer_query, BuiltQuery, NameAlias, SearchFilters, SearchType};

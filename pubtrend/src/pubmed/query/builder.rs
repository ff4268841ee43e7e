//! Filter-to-query translation for the basic search

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which field the main query text is searched in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    Author,
    Journal,
    Affiliation,
    /// Raw text, left to PubMed's automatic term mapping
    #[default]
    General,
}

impl SearchType {
    pub(crate) fn field_tag(&self) -> Option<&'static str> {
        match self {
            SearchType::Author => Some("[Author]"),
            SearchType::Journal => Some("[Journal]"),
            SearchType::Affiliation => Some("[Affiliation]"),
            SearchType::General => None,
        }
    }
}

impl From<&str> for SearchType {
    /// Unknown names fall back to [`SearchType::General`]
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "author" => SearchType::Author,
            "journal" => SearchType::Journal,
            "affiliation" => SearchType::Affiliation,
            _ => SearchType::General,
        }
    }
}

/// User-facing search parameters
///
/// Blank strings are treated as absent by every builder method.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilters {
    pub query: String,
    pub search_type: SearchType,
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
    pub grant_number: Option<String>,
    pub publication_type: Option<String>,
    /// Comma-separated MeSH terms
    pub mesh_terms: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl SearchFilters {
    /// Filters for a free-text query
    ///
    /// # Example
    ///
    /// ```
    /// use pubtrend::{SearchFilters, SearchType};
    ///
    /// let query = SearchFilters::new("J. Smith")
    ///     .with_search_type(SearchType::Author)
    ///     .with_year_range(Some(2010), Some(2020))
    ///     .build();
    /// assert_eq!(query.as_str(), "J  Smith[Author] AND 2010:2020[dp]");
    /// ```
    pub fn new<S: Into<String>>(query: S) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn with_search_type(mut self, search_type: SearchType) -> Self {
        self.search_type = search_type;
        self
    }

    pub fn with_year_range(mut self, year_from: Option<i32>, year_to: Option<i32>) -> Self {
        self.year_from = year_from;
        self.year_to = year_to;
        self
    }

    pub fn with_grant_number<S: Into<String>>(mut self, grant_number: S) -> Self {
        self.grant_number = non_blank(Some(grant_number.into()));
        self
    }

    pub fn with_publication_type<S: Into<String>>(mut self, publication_type: S) -> Self {
        self.publication_type = non_blank(Some(publication_type.into()));
        self
    }

    pub fn with_mesh_terms<S: Into<String>>(mut self, mesh_terms: S) -> Self {
        self.mesh_terms = non_blank(Some(mesh_terms.into()));
        self
    }

    /// Whether there is no query text to search for
    pub fn is_blank(&self) -> bool {
        self.query.trim().is_empty()
    }

    pub fn build(&self) -> BuiltQuery {
        build(self)
    }
}

/// Query string in E-utilities field-tag syntax
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuiltQuery(String);

impl BuiltQuery {
    pub fn new<S: Into<String>>(query: S) -> Self {
        Self(query.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// An empty query must not be sent upstream
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for BuiltQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for BuiltQuery {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for BuiltQuery {
    fn from(query: &str) -> Self {
        Self(query.to_string())
    }
}

impl From<String> for BuiltQuery {
    fn from(query: String) -> Self {
        Self(query)
    }
}

/// Translate filters into a query string
///
/// Clause order is fixed: main text, grant number, publication type, MeSH
/// terms, date range. Clauses are joined with ` AND `.
pub fn build(filters: &SearchFilters) -> BuiltQuery {
    let mut clauses = Vec::new();

    let text = filters.query.trim();
    if !text.is_empty() {
        match filters.search_type {
            SearchType::Author => {
                // Initials: "J.R.R. Tolkien" -> "J R R  Tolkien"
                let clean = text.replace('.', " ");
                clauses.push(format!("{}[Author]", clean.trim()));
            }
            other => match other.field_tag() {
                Some(tag) => clauses.push(format!("{text}{tag}")),
                None => clauses.push(text.to_string()),
            },
        }
    }

    if let Some(grant) = non_blank(filters.grant_number.clone()) {
        clauses.push(format!("{grant}[Grant Number]"));
    }

    if let Some(publication_type) = non_blank(filters.publication_type.clone()) {
        clauses.push(format!("{publication_type}[Publication Type]"));
    }

    if let Some(mesh) = filters.mesh_terms.as_deref().and_then(mesh_clause) {
        clauses.push(mesh);
    }

    if let Some(dates) = date_range_clause(filters.year_from, filters.year_to) {
        clauses.push(dates);
    }

    BuiltQuery(clauses.join(" AND "))
}

/// Publication-date clause for an optional year range
pub fn date_range_clause(year_from: Option<i32>, year_to: Option<i32>) -> Option<String> {
    match (year_from, year_to) {
        (Some(from), Some(to)) => Some(format!("{from}:{to}[dp]")),
        (Some(from), None) => Some(format!("{from}:3000[dp]")),
        (None, Some(to)) => Some(format!("1800:{to}[dp]")),
        (None, None) => None,
    }
}

/// Parenthesized AND of comma-separated MeSH terms; `None` when no term remains
pub fn mesh_clause(mesh_terms: &str) -> Option<String> {
    let parts: Vec<String> = mesh_terms
        .split(',')
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .map(|term| format!("{term}[MeSH Terms]"))
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(format!("({})", parts.join(" AND ")))
    }
}

use serde::{Deserialize, Serialize};

/// Placeholder shown when an article has no title
pub const NO_TITLE: &str = "No Title";
/// Placeholder shown when an article has no authors
pub const NO_AUTHORS: &str = "No Authors Listed";
/// Placeholder shown when no author carries an affiliation
pub const NO_AFFILIATIONS: &str = "No Affiliations Listed";
/// Placeholder shown when the journal is missing
pub const NO_JOURNAL: &str = "No Journal";
/// Placeholder shown when the publication date is missing
pub const NO_DATE: &str = "No Date";
/// Placeholder shown when the abstract is missing
pub const NO_ABSTRACT: &str = "No Abstract";

/// Partial publication date as printed by PubMed (any component may be absent)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicationDate {
    pub year: Option<String>,
    pub month: Option<String>,
    pub day: Option<String>,
}

impl PublicationDate {
    pub fn is_empty(&self) -> bool {
        self.year.is_none() && self.month.is_none() && self.day.is_none()
    }

    /// `"2020 Sep 14"`, `"2020 Sep"`, `"2020"` or [`NO_DATE`]
    pub fn display(&self) -> String {
        let parts: Vec<&str> = [&self.year, &self.month, &self.day]
            .into_iter()
            .filter_map(|part| part.as_deref())
            .filter(|part| !part.is_empty())
            .collect();

        if parts.is_empty() {
            NO_DATE.to_string()
        } else {
            parts.join(" ")
        }
    }

    /// Year as a number when the year component is purely numeric
    pub fn numeric_year(&self) -> Option<&str> {
        self.year
            .as_deref()
            .filter(|year| !year.is_empty() && year.chars().all(|c| c.is_ascii_digit()))
    }
}

/// Funding entry from the article's GrantList
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    /// Grant number, empty when the record only names an agency
    pub id: String,
    /// Funding agency, may be empty
    pub agency: String,
}

impl Grant {
    /// Frequency-table label, `"R01 AB123 (NIH)"`
    pub fn label(&self) -> String {
        format!("{} ({})", self.id, self.agency)
    }
}

/// One PubMed article parsed from EFetch XML
///
/// Text fields are never empty: missing upstream data resolves to the
/// `NO_*` placeholders so every record is renderable as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleRecord {
    /// PubMed ID
    pub pmid: String,
    /// Article title or [`NO_TITLE`]
    pub title: String,
    /// Author display names, `"Last, Fore"`
    pub authors: Vec<String>,
    /// Distinct affiliations across all authors, first-seen order
    pub affiliations: Vec<String>,
    /// Journal title or [`NO_JOURNAL`]
    pub journal: String,
    /// Publication date components
    pub publication_date: PublicationDate,
    /// Abstract text or [`NO_ABSTRACT`]
    pub abstract_text: String,
    pub grants: Vec<Grant>,
    /// MeSH descriptor names
    pub mesh_terms: Vec<String>,
    pub keywords: Vec<String>,
    pub publication_types: Vec<String>,
}

impl ArticleRecord {
    /// Authors joined with `"; "` or [`NO_AUTHORS`]
    pub fn authors_display(&self) -> String {
        join_or(&self.authors, NO_AUTHORS)
    }

    /// Affiliations joined with `"; "` or [`NO_AFFILIATIONS`]
    pub fn affiliations_display(&self) -> String {
        join_or(&self.affiliations, NO_AFFILIATIONS)
    }

    pub fn publication_date_display(&self) -> String {
        self.publication_date.display()
    }

    pub fn has_journal(&self) -> bool {
        self.journal != NO_JOURNAL
    }
}

fn join_or(items: &[String], placeholder: &str) -> String {
    if items.is_empty() {
        placeholder.to_string()
    } else {
        items.join("; ")
    }
}

/// WebEnv/query_key pair identifying a search stored on the history server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistorySession {
    pub webenv: String,
    pub query_key: String,
}

/// ESearch result with history server information
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchResult {
    /// PMIDs in the requested window
    pub pmids: Vec<String>,
    /// Total number of matching records
    pub total_count: usize,
    pub webenv: Option<String>,
    pub query_key: Option<String>,
    /// How PubMed interpreted the query
    pub query_translation: Option<String>,
}

impl SearchResult {
    /// History session if both WebEnv and query_key were returned
    pub fn history_session(&self) -> Option<HistorySession> {
        match (&self.webenv, &self.query_key) {
            (Some(webenv), Some(query_key)) if !webenv.is_empty() && !query_key.is_empty() => {
                Some(HistorySession {
                    webenv: webenv.clone(),
                    query_key: query_key.clone(),
                })
            }
            _ => None,
        }
    }
}

/// One page of a paginated search
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchPage {
    pub results: Vec<ArticleRecord>,
    pub total_pages: usize,
    pub total_results: usize,
}

impl SearchPage {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Condensed article metadata from ESummary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleSummary {
    pub pmid: String,
    pub title: String,
    pub authors: Vec<String>,
    /// Journal source abbreviation
    pub journal: String,
    pub pubdate: String,
    pub doi: String,
}

/// Page of article summaries for one manufacturer and year
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DetailedResults {
    pub count: usize,
    pub results: Vec<ArticleSummary>,
}

use serde::{Deserialize, Serialize};

use crate::error::{PubMedError, Result};

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ESearchResult {
    /// Absent when NCBI returns an error page or a truncated body
    #[serde(default)]
    pub esearchresult: Option<ESearchData>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ESearchData {
    #[serde(default, rename = "ERROR")]
    pub error: Option<String>,
    #[serde(default)]
    pub count: Option<String>,
    #[serde(default)]
    pub idlist: Vec<String>,
    /// WebEnv session identifier for history server
    #[serde(default)]
    pub webenv: Option<String>,
    /// Query key for history server
    #[serde(default, rename = "querykey")]
    pub query_key: Option<String>,
    /// How PubMed interpreted and translated the search query
    #[serde(default)]
    pub querytranslation: Option<String>,
}

impl ESearchResult {
    /// Unwrap the `esearchresult` envelope, surfacing NCBI errors
    pub(crate) fn into_data(self) -> Result<ESearchData> {
        let data = self.esearchresult.ok_or_else(|| {
            PubMedError::UpstreamFormat("response is missing the esearchresult envelope".into())
        })?;

        if let Some(error_msg) = &data.error {
            return Err(PubMedError::ApiError {
                status: 200,
                message: format!("NCBI ESearch API error: {}", error_msg),
            });
        }

        Ok(data)
    }
}

impl ESearchData {
    /// Total hit count; a missing count reads as zero
    pub(crate) fn total_count(&self) -> Result<usize> {
        match self.count.as_deref() {
            None => Ok(0),
            Some(count) => count.trim().parse().map_err(|_| {
                PubMedError::UpstreamFormat(format!("invalid esearch count: {count:?}"))
            }),
        }
    }
}

/// ESummary returns a JSON object with "result" containing "uids" array and per-UID objects.
/// We use serde_json::Value to handle the dynamic per-UID keys, then parse each document.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ESummaryResponse {
    #[serde(default)]
    pub result: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ESummaryAuthor {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ESummaryArticleId {
    #[serde(default)]
    pub idtype: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ESummaryDocSum {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub authors: Vec<ESummaryAuthor>,
    #[serde(default)]
    pub pubdate: String,
    #[serde(default)]
    pub doi: Option<String>,
    #[serde(default)]
    pub articleids: Vec<ESummaryArticleId>,
}

impl ESummaryDocSum {
    /// Top-level DOI if present, else the `doi` entry of `articleids`
    pub(crate) fn doi(&self) -> String {
        self.doi
            .clone()
            .filter(|doi| !doi.is_empty())
            .or_else(|| {
                self.articleids
                    .iter()
                    .find(|id| id.idtype == "doi")
                    .map(|id| id.value.clone())
            })
            .unwrap_or_default()
    }
}

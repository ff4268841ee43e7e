//! PubMed EFetch XML parser
//!
//! - `preprocessing` - inline markup removal before deserialization
//! - `deserializers` - text-content deserializer for attribute-bearing elements
//! - `xml_types` - XML schema types and their conversion into [`ArticleRecord`]

mod deserializers;
mod preprocessing;
mod xml_types;

use quick_xml::de::from_str;
use tracing::{debug, instrument, warn};

use crate::error::{PubMedError, Result};
use crate::pubmed::models::ArticleRecord;
use preprocessing::strip_inline_html_tags;
use xml_types::PubmedArticleSet;

/// Parse every `<PubmedArticle>` of an EFetch response
///
/// A document that is not well-formed fails as a whole with
/// [`PubMedError::XmlError`]. Individual articles without a PMID are dropped
/// and do not abort the batch. Missing fields resolve to the `NO_*`
/// placeholders of [`crate::pubmed::models`].
#[instrument(skip(xml), fields(xml_size = xml.len()))]
pub fn parse_articles_from_xml(xml: &str) -> Result<Vec<ArticleRecord>> {
    let cleaned_xml = strip_inline_html_tags(xml);

    let article_set: PubmedArticleSet = from_str(&cleaned_xml)
        .map_err(|e| PubMedError::XmlError(format!("Failed to deserialize XML: {}", e)))?;

    let total = article_set.articles.len();
    let articles: Vec<ArticleRecord> = article_set
        .articles
        .into_iter()
        .filter_map(|article_xml| {
            let record = article_xml.into_record();
            if record.is_none() {
                warn!("Dropping article without PMID");
            }
            record
        })
        .collect();

    debug!(parsed = articles.len(), total, "Parsed article batch");
    Ok(articles)
}

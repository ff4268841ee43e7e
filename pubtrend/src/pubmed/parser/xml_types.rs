//! Internal XML schema types for EFetch `PubmedArticleSet` documents
//!
//! Only the elements the trend views need are modelled; everything else is
//! ignored by serde.

use serde::Deserialize;

use super::deserializers::{text_of, TextContent};
use crate::pubmed::models::{
    ArticleRecord, Grant, PublicationDate, NO_ABSTRACT, NO_JOURNAL, NO_TITLE,
};

#[derive(Debug, Deserialize)]
#[serde(rename = "PubmedArticleSet")]
pub(super) struct PubmedArticleSet {
    #[serde(rename = "PubmedArticle", default)]
    pub articles: Vec<PubmedArticleXml>,
}

#[derive(Debug, Deserialize)]
pub(super) struct PubmedArticleXml {
    #[serde(rename = "MedlineCitation")]
    pub medline_citation: Option<MedlineCitation>,
}

#[derive(Debug, Deserialize)]
pub(super) struct MedlineCitation {
    #[serde(rename = "PMID")]
    pub pmid: Option<TextContent>,
    #[serde(rename = "Article")]
    article: Option<ArticleXml>,
    #[serde(rename = "MeshHeadingList")]
    mesh_heading_list: Option<MeshHeadingList>,
    #[serde(rename = "KeywordList", default)]
    keyword_lists: Vec<KeywordList>,
}

#[derive(Debug, Deserialize)]
struct ArticleXml {
    #[serde(rename = "Journal")]
    journal: Option<JournalXml>,
    #[serde(rename = "ArticleTitle")]
    article_title: Option<TextContent>,
    #[serde(rename = "Abstract")]
    abstract_section: Option<AbstractSection>,
    #[serde(rename = "AuthorList")]
    author_list: Option<AuthorList>,
    #[serde(rename = "GrantList")]
    grant_list: Option<GrantList>,
    #[serde(rename = "PublicationTypeList")]
    publication_type_list: Option<PublicationTypeList>,
}

#[derive(Debug, Deserialize)]
struct JournalXml {
    #[serde(rename = "Title")]
    title: Option<TextContent>,
    #[serde(rename = "JournalIssue")]
    journal_issue: Option<JournalIssue>,
}

#[derive(Debug, Deserialize)]
struct JournalIssue {
    #[serde(rename = "PubDate")]
    pub_date: Option<PubDate>,
}

#[derive(Debug, Deserialize)]
struct PubDate {
    #[serde(rename = "Year")]
    year: Option<TextContent>,
    #[serde(rename = "Month")]
    month: Option<TextContent>,
    #[serde(rename = "Day")]
    day: Option<TextContent>,
    #[serde(rename = "MedlineDate")]
    medline_date: Option<TextContent>,
}

impl PubDate {
    fn to_publication_date(&self) -> PublicationDate {
        let year = text_of(&self.year);
        if year.is_some() {
            return PublicationDate {
                year,
                month: text_of(&self.month),
                day: text_of(&self.day),
            };
        }

        // "1998 Dec-1999 Jan", "2000 Spring": keep the tokens positionally
        match text_of(&self.medline_date) {
            Some(medline) => {
                let mut tokens = medline.splitn(3, ' ').map(str::to_string);
                PublicationDate {
                    year: tokens.next(),
                    month: tokens.next(),
                    day: tokens.next(),
                }
            }
            None => PublicationDate::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AbstractSection {
    #[serde(rename = "AbstractText", default)]
    abstract_texts: Vec<TextContent>,
}

impl AbstractSection {
    fn joined(&self) -> Option<String> {
        let sections: Vec<String> = self
            .abstract_texts
            .iter()
            .filter_map(TextContent::non_empty)
            .collect();
        (!sections.is_empty()).then(|| sections.join(" "))
    }
}

#[derive(Debug, Deserialize)]
struct AuthorList {
    #[serde(rename = "Author", default)]
    authors: Vec<AuthorXml>,
}

#[derive(Debug, Deserialize)]
struct AuthorXml {
    #[serde(rename = "LastName")]
    last_name: Option<TextContent>,
    #[serde(rename = "ForeName")]
    fore_name: Option<TextContent>,
    #[serde(rename = "CollectiveName")]
    collective_name: Option<TextContent>,
    #[serde(rename = "AffiliationInfo", default)]
    affiliation_info: Vec<AffiliationInfo>,
}

impl AuthorXml {
    /// `"Last, Fore"`, either part alone, or the collective name
    fn display_name(&self) -> Option<String> {
        let last = text_of(&self.last_name).unwrap_or_default();
        let fore = text_of(&self.fore_name).unwrap_or_default();
        let name = format!("{last}, {fore}");
        let name = name.trim_matches(|c| c == ',' || c == ' ');

        if !name.is_empty() {
            Some(name.to_string())
        } else {
            text_of(&self.collective_name)
        }
    }
}

#[derive(Debug, Deserialize)]
struct AffiliationInfo {
    #[serde(rename = "Affiliation")]
    affiliation: Option<TextContent>,
}

#[derive(Debug, Deserialize)]
struct GrantList {
    #[serde(rename = "Grant", default)]
    grants: Vec<GrantXml>,
}

#[derive(Debug, Deserialize)]
struct GrantXml {
    #[serde(rename = "GrantID")]
    grant_id: Option<TextContent>,
    #[serde(rename = "Agency")]
    agency: Option<TextContent>,
}

#[derive(Debug, Deserialize)]
struct PublicationTypeList {
    #[serde(rename = "PublicationType", default)]
    publication_types: Vec<TextContent>,
}

#[derive(Debug, Deserialize)]
struct MeshHeadingList {
    #[serde(rename = "MeshHeading", default)]
    mesh_headings: Vec<MeshHeadingXml>,
}

#[derive(Debug, Deserialize)]
struct MeshHeadingXml {
    #[serde(rename = "DescriptorName")]
    descriptor_name: Option<TextContent>,
}

#[derive(Debug, Deserialize)]
struct KeywordList {
    #[serde(rename = "Keyword", default)]
    keywords: Vec<TextContent>,
}

fn texts(items: &[TextContent]) -> Vec<String> {
    items.iter().filter_map(TextContent::non_empty).collect()
}

impl PubmedArticleXml {
    pub(super) fn pmid(&self) -> Option<String> {
        self.medline_citation
            .as_ref()
            .and_then(|citation| text_of(&citation.pmid))
    }

    /// Convert into an [`ArticleRecord`]; `None` when the PMID is missing
    pub(super) fn into_record(self) -> Option<ArticleRecord> {
        let pmid = self.pmid()?;
        let citation = self.medline_citation?;
        let article = citation.article;

        let title = article
            .as_ref()
            .and_then(|a| text_of(&a.article_title))
            .unwrap_or_else(|| NO_TITLE.to_string());

        let mut authors = Vec::new();
        let mut affiliations: Vec<String> = Vec::new();
        if let Some(list) = article.as_ref().and_then(|a| a.author_list.as_ref()) {
            for author in &list.authors {
                if let Some(name) = author.display_name() {
                    authors.push(name);
                }
                for info in &author.affiliation_info {
                    if let Some(affiliation) = text_of(&info.affiliation) {
                        if !affiliations.contains(&affiliation) {
                            affiliations.push(affiliation);
                        }
                    }
                }
            }
        }

        let journal_title = article
            .as_ref()
            .and_then(|a| a.journal.as_ref())
            .and_then(|j| text_of(&j.title))
            .unwrap_or_else(|| NO_JOURNAL.to_string());

        let publication_date = article
            .as_ref()
            .and_then(|a| a.journal.as_ref())
            .and_then(|j| j.journal_issue.as_ref())
            .and_then(|issue| issue.pub_date.as_ref())
            .map(PubDate::to_publication_date)
            .unwrap_or_default();

        let abstract_text = article
            .as_ref()
            .and_then(|a| a.abstract_section.as_ref())
            .and_then(AbstractSection::joined)
            .unwrap_or_else(|| NO_ABSTRACT.to_string());

        let grants = article
            .as_ref()
            .and_then(|a| a.grant_list.as_ref())
            .map(|list| {
                list.grants
                    .iter()
                    .filter_map(|grant| {
                        let id = text_of(&grant.grant_id).unwrap_or_default();
                        let agency = text_of(&grant.agency).unwrap_or_default();
                        (!id.is_empty() || !agency.is_empty()).then_some(Grant { id, agency })
                    })
                    .collect()
            })
            .unwrap_or_default();

        let publication_types = article
            .as_ref()
            .and_then(|a| a.publication_type_list.as_ref())
            .map(|list| texts(&list.publication_types))
            .unwrap_or_default();

        let mesh_terms = citation
            .mesh_heading_list
            .as_ref()
            .map(|list| {
                list.mesh_headings
                    .iter()
                    .filter_map(|heading| text_of(&heading.descriptor_name))
                    .collect()
            })
            .unwrap_or_default();

        let keywords = citation
            .keyword_lists
            .iter()
            .flat_map(|list| texts(&list.keywords))
            .collect();

        Some(ArticleRecord {
            pmid,
            title,
            authors,
            affiliations,
            journal: journal_title,
            publication_date,
            abstract_text,
            grants,
            mesh_terms,
            keywords,
            publication_types,
        })
    }
}

//! Manufacturer/year count queries

use serde::{Deserialize, Serialize};

use super::builder::BuiltQuery;

/// Extra search terms added for names starting with `prefix`
///
/// Long corporate names are often cited by a short form, e.g. names starting
/// with "Becton, Dickinson" also match "BD".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameAlias {
    pub prefix: String,
    pub terms: Vec<String>,
}

impl NameAlias {
    pub fn new<S: Into<String>>(prefix: S, terms: Vec<String>) -> Self {
        Self {
            prefix: prefix.into(),
            terms,
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        !self.prefix.is_empty() && name.starts_with(&self.prefix)
    }
}

/// Names plus alias terms, de-duplicated in first-seen order
pub fn expand_aliases<S: AsRef<str>>(names: &[S], aliases: &[NameAlias]) -> Vec<String> {
    let mut expanded: Vec<String> = Vec::new();
    let mut push = |term: &str| {
        let term = term.trim();
        if !term.is_empty() && !expanded.iter().any(|seen| seen == term) {
            expanded.push(term.to_string());
        }
    };

    for name in names {
        let name = name.as_ref();
        push(name);
        for alias in aliases.iter().filter(|alias| alias.matches(name)) {
            for term in &alias.terms {
                push(term);
            }
        }
    }

    expanded
}

/// `YYYY/01/01[dp]:YYYY/12/31[dp]`
pub fn year_range_clause(year: i32) -> String {
    format!("{year}/01/01[dp]:{year}/12/31[dp]")
}

/// OR of every name searched as affiliation, grant number and grant
///
/// `None` when no usable name remains.
pub fn company_clause<S: AsRef<str>>(names: &[S]) -> Option<String> {
    let names = expand_aliases(names, &[]);
    if names.is_empty() {
        return None;
    }

    let terms: Vec<String> = names
        .iter()
        .flat_map(|name| {
            [
                format!("(\"{name}\"[Affiliation])"),
                format!("(\"{name}\"[Grant Number])"),
                format!("(\"{name}\"[Grant])"),
            ]
        })
        .collect();

    Some(format!("({})", terms.join(" OR ")))
}

/// Count query for one topic, one manufacturer name set and one year
///
/// ```
/// use pubtrend::pubmed::query::manufacturer_query;
///
/// let query = manufacturer_query("insulin pump", &["Medtronic"], 2015);
/// assert_eq!(
///     query.as_str(),
///     "(insulin pump) AND ((\"Medtronic\"[Affiliation]) OR (\"Medtronic\"[Grant Number]) \
///      OR (\"Medtronic\"[Grant])) AND 2015/01/01[dp]:2015/12/31[dp]"
/// );
/// ```
pub fn manufacturer_query<S: AsRef<str>>(topic: &str, names: &[S], year: i32) -> BuiltQuery {
    let mut clauses = Vec::new();

    let topic = topic.trim();
    if !topic.is_empty() {
        clauses.push(format!("({topic})"));
    }
    if let Some(companies) = company_clause(names) {
        clauses.push(companies);
    }
    clauses.push(year_range_clause(year));

    BuiltQuery::new(clauses.join(" AND "))
}

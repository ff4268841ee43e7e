//! Manufacturer name configuration
//!
//! The registry is a JSON document keyed by company name:
//!
//! ```json
//! {
//!   "Medtronic": {
//!     "display_order": 1,
//!     "variations": [{"name": "Medtronic", "start_year": 1949, "end_year": 2100}],
//!     "acquisitions": [{"name": "Covidien", "year": 2015}]
//!   },
//!   "_aliases": [{"prefix": "Becton, Dickinson", "terms": ["BD"]}]
//! }
//! ```
//!
//! `_aliases` is reserved and never names a company.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{PubMedError, Result};
use crate::pubmed::query::NameAlias;

/// Reserved registry key holding the alias table
pub const ALIASES_KEY: &str = "_aliases";

/// Source of the names searched for a manufacturer in a given year
pub trait CompanyNames: Send + Sync {
    /// Names valid for `company` in `year`, never empty
    fn company_names(&self, company: &str, year: i32) -> Vec<String>;

    /// Position in listings, `None` sorts last
    fn display_order(&self, _company: &str) -> Option<u32> {
        None
    }

    /// Prefix aliases applied on top of the resolved names
    fn aliases(&self) -> &[NameAlias] {
        &[]
    }
}

/// A name a company traded under for a span of years (inclusive)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameVariation {
    pub name: String,
    pub start_year: i32,
    pub end_year: i32,
}

impl NameVariation {
    pub fn new<S: Into<String>>(name: S, start_year: i32, end_year: i32) -> Self {
        Self {
            name: name.into(),
            start_year,
            end_year,
        }
    }

    pub fn covers(&self, year: i32) -> bool {
        self.start_year <= year && year <= self.end_year
    }
}

/// An acquired company whose name counts from `year` onwards
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acquisition {
    pub name: String,
    pub year: i32,
}

impl Acquisition {
    pub fn new<S: Into<String>>(name: S, year: i32) -> Self {
        Self {
            name: name.into(),
            year,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_order: Option<u32>,
    #[serde(default)]
    pub variations: Vec<NameVariation>,
    #[serde(default)]
    pub acquisitions: Vec<Acquisition>,
}

impl CompanyEntry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_display_order(mut self, display_order: u32) -> Self {
        self.display_order = Some(display_order);
        self
    }

    pub fn with_variation(mut self, variation: NameVariation) -> Self {
        self.variations.push(variation);
        self
    }

    pub fn with_acquisition(mut self, acquisition: Acquisition) -> Self {
        self.acquisitions.push(acquisition);
        self
    }

    fn validate(&self) -> Result<()> {
        for variation in &self.variations {
            if variation.name.trim().is_empty() {
                return Err(config_error("variation name must not be empty"));
            }
            if variation.start_year > variation.end_year {
                return Err(config_error(format!(
                    "variation {:?} starts in {} after it ends in {}",
                    variation.name, variation.start_year, variation.end_year
                )));
            }
        }
        for acquisition in &self.acquisitions {
            if acquisition.name.trim().is_empty() {
                return Err(config_error("acquisition name must not be empty"));
            }
        }
        Ok(())
    }
}

/// Company name configuration loaded from JSON
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyRegistry {
    #[serde(rename = "_aliases", default, skip_serializing_if = "Vec::is_empty")]
    aliases: Vec<NameAlias>,
    #[serde(flatten)]
    companies: BTreeMap<String, CompanyEntry>,
}

fn config_error<S: Into<String>>(message: S) -> PubMedError {
    PubMedError::ConfigError {
        message: message.into(),
    }
}

impl CompanyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a registry file; a missing file is an empty registry
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "No company configuration, using empty registry");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        Self::from_json(&content).map_err(|e| {
            config_error(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| config_error(e.to_string()))
    }

    /// Write the registry as pretty JSON, creating parent directories
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        info!(path = %path.display(), companies = self.companies.len(), "Saved company configuration");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.companies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.companies.is_empty()
    }

    pub fn get(&self, company: &str) -> Option<&CompanyEntry> {
        self.companies.get(company)
    }

    pub fn companies(&self) -> impl Iterator<Item = (&String, &CompanyEntry)> {
        self.companies.iter()
    }

    /// Insert or replace a company; a missing display order becomes `len + 1`
    pub fn upsert<S: Into<String>>(&mut self, name: S, mut entry: CompanyEntry) -> Result<()> {
        let name = name.into();
        let name = name.trim();
        if name.is_empty() {
            return Err(config_error("company name is required"));
        }
        if name == ALIASES_KEY {
            return Err(config_error(format!("{ALIASES_KEY} is a reserved key")));
        }
        entry.validate()?;

        if entry.display_order.is_none() {
            entry.display_order = Some(self.companies.len() as u32 + 1);
        }
        self.companies.insert(name.to_string(), entry);
        Ok(())
    }

    pub fn remove(&mut self, company: &str) -> bool {
        self.companies.remove(company).is_some()
    }

    /// Assign display orders 1, 2, ... in the given order; unknown names are ignored
    pub fn reorder<S: AsRef<str>>(&mut self, order: &[S]) {
        for (index, company) in order.iter().enumerate() {
            if let Some(entry) = self.companies.get_mut(company.as_ref()) {
                entry.display_order = Some(index as u32 + 1);
            }
        }
    }

    /// `companies` ordered by display order; unconfigured names keep their relative order at the end
    pub fn sorted_by_display_order<S: AsRef<str>>(&self, companies: &[S]) -> Vec<String> {
        sort_by_display_order(self, companies)
    }

    pub fn aliases_for(&self, name: &str) -> Vec<&str> {
        self.aliases
            .iter()
            .filter(|alias| alias.matches(name))
            .flat_map(|alias| alias.terms.iter().map(String::as_str))
            .collect()
    }

    pub fn add_alias(&mut self, alias: NameAlias) {
        self.aliases.push(alias);
    }
}

/// Order manufacturers for display, stable for equal or missing orders
pub fn sort_by_display_order<S: AsRef<str>>(
    names: &dyn CompanyNames,
    companies: &[S],
) -> Vec<String> {
    let mut sorted: Vec<String> = companies.iter().map(|c| c.as_ref().to_string()).collect();
    sorted.sort_by_key(|company| names.display_order(company).unwrap_or(u32::MAX));
    sorted
}

impl CompanyNames for CompanyRegistry {
    fn company_names(&self, company: &str, year: i32) -> Vec<String> {
        let Some(entry) = self.companies.get(company) else {
            warn!(company = %company, "Company not configured, searching bare name");
            return vec![company.to_string()];
        };

        let mut names: Vec<String> = entry
            .variations
            .iter()
            .filter(|variation| variation.covers(year))
            .map(|variation| variation.name.clone())
            .collect();
        names.extend(
            entry
                .acquisitions
                .iter()
                .filter(|acquisition| acquisition.year <= year)
                .map(|acquisition| acquisition.name.clone()),
        );

        if names.is_empty() {
            debug!(company = %company, year, "No configured name applies, searching bare name");
            vec![company.to_string()]
        } else {
            names
        }
    }

    fn display_order(&self, company: &str) -> Option<u32> {
        self.companies
            .get(company)
            .and_then(|entry| entry.display_order)
    }

    fn aliases(&self) -> &[NameAlias] {
        &self.aliases
    }
}

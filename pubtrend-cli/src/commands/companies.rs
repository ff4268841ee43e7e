use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use pubtrend::{Acquisition, CompanyEntry, CompanyRegistry, NameAlias, NameVariation};

use super::load_registry;

#[derive(Args, Debug)]
pub struct Companies {
    #[command(subcommand)]
    action: CompanyAction,
}

#[derive(Subcommand, Debug)]
enum CompanyAction {
    /// List configured manufacturers in display order
    List,
    /// Add or replace a manufacturer
    Add {
        /// Manufacturer name
        name: String,
        /// Name variation as NAME:START_YEAR:END_YEAR (repeatable)
        #[arg(long = "variation", value_parser = parse_variation)]
        variations: Vec<NameVariation>,
        /// Acquired company as NAME:YEAR (repeatable)
        #[arg(long = "acquisition", value_parser = parse_acquisition)]
        acquisitions: Vec<Acquisition>,
        /// Position in listings
        #[arg(long)]
        display_order: Option<u32>,
    },
    /// Remove a manufacturer
    Remove {
        name: String,
    },
    /// Set the display order to the given sequence
    Reorder {
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Add search terms for names starting with PREFIX
    Alias {
        prefix: String,
        #[arg(required = true)]
        terms: Vec<String>,
    },
}

impl Companies {
    pub fn execute(&self, company_config: &Path) -> Result<()> {
        let mut registry = load_registry(company_config)?;

        match &self.action {
            CompanyAction::List => {
                print!("{}", render_registry(&registry));
                return Ok(());
            }
            CompanyAction::Add {
                name,
                variations,
                acquisitions,
                display_order,
            } => {
                let mut entry = CompanyEntry::new();
                for variation in variations {
                    entry = entry.with_variation(variation.clone());
                }
                for acquisition in acquisitions {
                    entry = entry.with_acquisition(acquisition.clone());
                }
                if let Some(order) = display_order {
                    entry = entry.with_display_order(*order);
                }
                registry
                    .upsert(name.as_str(), entry)
                    .with_context(|| format!("Invalid configuration for {name}"))?;
            }
            CompanyAction::Remove { name } => {
                if !registry.remove(name) {
                    bail!("{name} is not configured");
                }
            }
            CompanyAction::Reorder { names } => registry.reorder(names),
            CompanyAction::Alias { prefix, terms } => {
                registry.add_alias(NameAlias::new(prefix.as_str(), terms.clone()));
            }
        }

        registry
            .save(company_config)
            .with_context(|| format!("Failed to save {}", company_config.display()))?;
        Ok(())
    }
}

fn parse_variation(value: &str) -> std::result::Result<NameVariation, String> {
    let mut parts = value.rsplitn(3, ':');
    let (Some(end), Some(start), Some(name)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(format!("expected NAME:START_YEAR:END_YEAR, got {value:?}"));
    };
    let start_year = start
        .trim()
        .parse()
        .map_err(|_| format!("invalid start year {start:?}"))?;
    let end_year = end
        .trim()
        .parse()
        .map_err(|_| format!("invalid end year {end:?}"))?;
    Ok(NameVariation::new(name.trim(), start_year, end_year))
}

fn parse_acquisition(value: &str) -> std::result::Result<Acquisition, String> {
    let Some((name, year)) = value.rsplit_once(':') else {
        return Err(format!("expected NAME:YEAR, got {value:?}"));
    };
    let year = year
        .trim()
        .parse()
        .map_err(|_| format!("invalid year {year:?}"))?;
    Ok(Acquisition::new(name.trim(), year))
}

fn render_registry(registry: &CompanyRegistry) -> String {
    let names: Vec<&str> = registry.companies().map(|(name, _)| name.as_str()).collect();
    let mut out = String::new();

    for name in registry.sorted_by_display_order(&names) {
        let Some(entry) = registry.get(&name) else {
            continue;
        };
        let order = entry
            .display_order
            .map(|order| order.to_string())
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!("{order:>3}. {name}\n"));
        for variation in &entry.variations {
            out.push_str(&format!(
                "       {} ({}-{})\n",
                variation.name, variation.start_year, variation.end_year
            ));
        }
        for acquisition in &entry.acquisitions {
            out.push_str(&format!(
                "       + {} (acquired {})\n",
                acquisition.name, acquisition.year
            ));
        }
    }
    out
}

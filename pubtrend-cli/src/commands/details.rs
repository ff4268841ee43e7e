use std::path::Path;

use anyhow::Result;
use clap::Args;
use pubtrend::pubmed::models::DetailedResults;
use pubtrend::SearchService;

use super::search::OutputFormat;
use super::{create_pubtrend_client, load_registry, log_notices};

#[derive(Args, Debug)]
pub struct Details {
    /// Topic used for the count
    #[arg(value_name = "TOPIC")]
    topic: String,

    /// Manufacturer name as configured
    #[arg(short, long)]
    manufacturer: String,

    /// Publication year
    #[arg(short, long)]
    year: i32,

    /// Result page, 1-based (100 articles per page)
    #[arg(short, long, default_value = "1")]
    page: usize,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    format: OutputFormat,
}

impl Details {
    pub async fn execute_with_config(
        &self,
        api_key: Option<&str>,
        email: Option<&str>,
        tool: &str,
        company_config: &Path,
    ) -> Result<()> {
        let client = create_pubtrend_client(api_key, email, tool);
        let service = SearchService::new(client, load_registry(company_config)?);

        let view = service
            .details(&self.topic, &self.manufacturer, self.year, self.page)
            .await;
        log_notices(&view.notices);

        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&view.details)?),
            OutputFormat::Table => print!("{}", render_details(&view.details)),
        }
        Ok(())
    }
}

fn render_details(details: &DetailedResults) -> String {
    let mut out = format!("{} matching articles\n", details.count);
    for summary in &details.results {
        out.push_str(&format!("\n[{}] {}\n", summary.pmid, summary.title));
        if !summary.authors.is_empty() {
            out.push_str(&format!("    {}\n", summary.authors.join(", ")));
        }
        out.push_str(&format!("    {}, {}", summary.journal, summary.pubdate));
        if !summary.doi.is_empty() {
            out.push_str(&format!(", doi:{}", summary.doi));
        }
        out.push('\n');
    }
    out
}

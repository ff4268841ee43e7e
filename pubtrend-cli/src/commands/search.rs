use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use pubtrend::sampling::DEFAULT_MAX_SAMPLES;
use pubtrend::{BasicSearchView, SearchFilters, SearchService, SearchType};

use super::{create_pubtrend_client, format_frequency_table, load_registry, log_notices};

#[derive(Args, Debug)]
pub struct Search {
    /// Search query (free text)
    #[arg(value_name = "QUERY")]
    query: String,

    /// Field the query text is matched against
    #[arg(short = 't', long, value_enum, default_value = "general")]
    search_type: SearchTypeArg,

    /// Filter articles published from this year onwards
    #[arg(long)]
    from_year: Option<i32>,

    /// Filter articles published up to this year
    #[arg(long)]
    to_year: Option<i32>,

    /// Filter by grant number
    #[arg(long)]
    grant_number: Option<String>,

    /// Filter by publication type (e.g. "Review")
    #[arg(long)]
    publication_type: Option<String>,

    /// Filter by comma-separated MeSH terms, all of which must match
    #[arg(long)]
    mesh: Option<String>,

    /// Result page, 1-based
    #[arg(short, long, default_value = "1")]
    page: usize,

    /// Sample statistics over the whole result set
    #[arg(long)]
    statistics: bool,

    /// Upper bound on records fetched for statistics
    #[arg(long, default_value_t = DEFAULT_MAX_SAMPLES)]
    max_samples: usize,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    format: OutputFormat,

    /// Save output to file
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum SearchTypeArg {
    General,
    Author,
    Journal,
    Affiliation,
}

impl From<SearchTypeArg> for SearchType {
    fn from(arg: SearchTypeArg) -> Self {
        match arg {
            SearchTypeArg::General => SearchType::General,
            SearchTypeArg::Author => SearchType::Author,
            SearchTypeArg::Journal => SearchType::Journal,
            SearchTypeArg::Affiliation => SearchType::Affiliation,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl Search {
    pub async fn execute_with_config(
        &self,
        api_key: Option<&str>,
        email: Option<&str>,
        tool: &str,
        company_config: &Path,
    ) -> Result<()> {
        let client = create_pubtrend_client(api_key, email, tool);
        let registry = load_registry(company_config)?;
        let service = SearchService::new(client, registry)
            .with_statistics(self.statistics)
            .with_max_samples(self.max_samples);

        let view = service.basic_search(&self.filters(), self.page).await;
        log_notices(&view.notices);

        let output = match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&view)?,
            OutputFormat::Table => render_view(&view),
        };
        self.output_results(&output).await
    }

    fn filters(&self) -> SearchFilters {
        let mut filters = SearchFilters::new(self.query.clone())
            .with_search_type(self.search_type.into())
            .with_year_range(self.from_year, self.to_year);

        if let Some(ref grant_number) = self.grant_number {
            filters = filters.with_grant_number(grant_number.as_str());
        }
        if let Some(ref publication_type) = self.publication_type {
            filters = filters.with_publication_type(publication_type.as_str());
        }
        if let Some(ref mesh) = self.mesh {
            filters = filters.with_mesh_terms(mesh.as_str());
        }

        filters
    }

    async fn output_results(&self, content: &str) -> Result<()> {
        match &self.output {
            Some(path) => {
                tokio::fs::write(path, content)
                    .await
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                tracing::info!(path = %path.display(), "Results saved to file");
            }
            None => {
                println!("{}", content);
            }
        }
        Ok(())
    }
}

fn render_view(view: &BasicSearchView) -> String {
    let mut out = String::new();

    let Some(query) = &view.formatted_query else {
        return out;
    };
    out.push_str(&format!("Query: {query}\n"));

    let results = &view.results;
    if results.total_results == 0 {
        return out;
    }
    out.push_str(&format!(
        "Page {} of {} ({} results)\n\n",
        view.page, results.total_pages, results.total_results
    ));

    for record in &results.results {
        out.push_str(&format!("[{}] {}\n", record.pmid, record.title));
        out.push_str(&format!("    {}\n", record.authors_display()));
        out.push_str(&format!(
            "    {}, {}\n",
            record.journal,
            record.publication_date_display()
        ));
    }

    if !view.page_range.is_empty() {
        let pages: Vec<String> = view
            .page_range
            .iter()
            .map(|p| {
                if *p == view.page {
                    format!("[{p}]")
                } else {
                    p.to_string()
                }
            })
            .collect();
        out.push_str(&format!("\nPages: {}\n", pages.join(" ")));
    }

    if let (Some(stats), Some(info)) = (&view.statistics, &view.sampling_info) {
        out.push_str(&format!(
            "\nStatistics from {} of {} results ({:.2}%)\n\n",
            info.sampled_results, info.total_results, info.sampling_percentage
        ));
        out.push_str(&format_frequency_table("Publications by year", &stats.year_stats));
        out.push_str(&format_frequency_table("Top authors", &stats.top_authors));
        out.push_str(&format_frequency_table("Top journals", &stats.top_journals));
        out.push_str(&format_frequency_table("Top affiliations", &stats.top_affiliations));
        out.push_str(&format_frequency_table("Top grants", &stats.top_grants));
        out.push_str(&format_frequency_table("Top MeSH terms", &stats.top_mesh_terms));
    }

    out
}

//! Manufacturer trend queries: per-year counts, the count matrix and detail pages

use tracing::{info, instrument, warn};

use super::history::page_offset;
use super::PubMedClient;
use crate::companies::{sort_by_display_order, CompanyNames};
use crate::error::Result;
use crate::pubmed::models::DetailedResults;
use crate::pubmed::query::{expand_aliases, manufacturer_query, BuiltQuery};
use crate::trends::PublicationMatrix;

/// Page size of the manufacturer detail view
pub const DETAIL_PAGE_SIZE: usize = 100;

fn company_query(topic: &str, company: &str, year: i32, names: &dyn CompanyNames) -> BuiltQuery {
    let resolved = names.company_names(company, year);
    let expanded = expand_aliases(&resolved, names.aliases());
    manufacturer_query(topic, &expanded, year)
}

impl PubMedClient {
    /// Verified count of `topic` publications naming `company` in `year`
    #[instrument(skip(self, names), fields(topic = %topic, company = %company, year = year))]
    pub async fn publication_count(
        &self,
        topic: &str,
        year: i32,
        company: &str,
        names: &dyn CompanyNames,
    ) -> Result<usize> {
        let query = company_query(topic, company, year, names);
        self.verified_count(query.as_str()).await
    }

    /// Counts for every manufacturer and every year in `start_year..=end_year`
    ///
    /// Units run sequentially with [`crate::ClientConfig::batch_unit_delay`]
    /// between them. A unit that fails is logged and counted as 0. The progress
    /// callback, if any, sees every completed unit.
    #[instrument(skip(self, manufacturers, names), fields(topic = %topic, start_year = start_year, end_year = end_year))]
    pub async fn publication_matrix<S: AsRef<str>>(
        &self,
        topic: &str,
        manufacturers: &[S],
        start_year: i32,
        end_year: i32,
        names: &dyn CompanyNames,
    ) -> Result<PublicationMatrix> {
        let years: Vec<i32> = (start_year..=end_year).collect();
        let manufacturers = sort_by_display_order(names, manufacturers);
        let mut matrix = PublicationMatrix::new(years.clone(), manufacturers.clone());

        let total = matrix.cells();
        let mut completed = 0;

        for &year in &years {
            for manufacturer in &manufacturers {
                if completed > 0 {
                    tokio::time::sleep(self.config.batch_unit_delay).await;
                }

                let count = match self.publication_count(topic, year, manufacturer, names).await {
                    Ok(count) => count,
                    Err(e) => {
                        warn!(
                            manufacturer = %manufacturer,
                            year,
                            error = %e,
                            "Count failed, recording 0"
                        );
                        0
                    }
                };
                matrix.record(year, manufacturer, count);

                completed += 1;
                self.report_progress(
                    completed,
                    total,
                    &format!("Processed {manufacturer} ({year})"),
                );
            }
        }

        info!(
            units = total,
            grand_total = matrix.grand_total(),
            "Publication matrix completed"
        );
        Ok(matrix)
    }

    /// One page of article summaries behind a matrix cell, pages are 1-based
    #[instrument(skip(self, names), fields(topic = %topic, manufacturer = %manufacturer, year = year, page = page))]
    pub async fn detailed_results(
        &self,
        topic: &str,
        manufacturer: &str,
        year: i32,
        page: usize,
        names: &dyn CompanyNames,
    ) -> Result<DetailedResults> {
        let query = company_query(topic, manufacturer, year, names);
        let start = page_offset(page, DETAIL_PAGE_SIZE)?;

        let search = self.search(query.as_str(), start, DETAIL_PAGE_SIZE).await?;
        if search.pmids.is_empty() {
            return Ok(DetailedResults::default());
        }

        let results = self.fetch_summaries(&search.pmids).await?;
        Ok(DetailedResults {
            count: search.total_count,
            results,
        })
    }
}

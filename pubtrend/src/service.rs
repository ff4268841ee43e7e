//! Request boundary for front ends
//!
//! [`SearchService`] runs a whole user request against the core and never
//! fails: every error becomes a [`Notice`] next to an empty result, so a
//! caller can always render what it gets back.

use serde::Serialize;
use tracing::{error, warn};

use crate::companies::CompanyRegistry;
use crate::error::PubMedError;
use crate::pubmed::models::{DetailedResults, SearchPage};
use crate::pubmed::query::SearchFilters;
use crate::pubmed::PubMedClient;
use crate::sampling::{SamplingInfo, SamplingResult, StatisticsSampler, DEFAULT_MAX_SAMPLES};
use crate::trends::PublicationMatrix;

/// Results per page of the basic search
pub const RESULTS_PER_PAGE: usize = 10;

/// Message shown when a search matches nothing
pub const NO_RESULTS_MESSAGE: &str = "No results found for your query.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// Inline message for the end user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn warning<S: Into<String>>(message: S) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error<S: Into<String>>(message: S) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Everything the basic search page renders
#[derive(Debug, Clone, Default, Serialize)]
pub struct BasicSearchView {
    /// Query string sent upstream, `None` for a no-op request
    pub formatted_query: Option<String>,
    pub page: usize,
    /// Page links around the current page
    pub page_range: Vec<usize>,
    pub results: SearchPage,
    pub statistics: Option<SamplingResult>,
    pub sampling_info: Option<SamplingInfo>,
    pub notices: Vec<Notice>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TrendsView {
    pub matrix: Option<PublicationMatrix>,
    pub notices: Vec<Notice>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DetailsView {
    pub details: DetailedResults,
    pub notices: Vec<Notice>,
}

/// Pagination links: `max(1, page - 2) .. min(total_pages + 1, page + 3)`
pub fn page_range(page: usize, total_pages: usize) -> Vec<usize> {
    let start = page.saturating_sub(2).max(1);
    let end = total_pages.saturating_add(1).min(page.saturating_add(3));
    (start..end).collect()
}

fn describe(error: &PubMedError) -> String {
    match error {
        PubMedError::UpstreamUnavailable { attempts, .. } => {
            format!("PubMed is not responding (gave up after {attempts} attempts)")
        }
        PubMedError::RequestError(e) => format!("Error connecting to PubMed: {e}"),
        e if e.is_format_error() => format!("Error processing results: {e}"),
        e => format!("An error occurred while searching: {e}"),
    }
}

/// Runs user requests and turns failures into notices
pub struct SearchService {
    client: PubMedClient,
    companies: CompanyRegistry,
    results_per_page: usize,
    max_samples: usize,
    collect_statistics: bool,
}

impl SearchService {
    pub fn new(client: PubMedClient, companies: CompanyRegistry) -> Self {
        Self {
            client,
            companies,
            results_per_page: RESULTS_PER_PAGE,
            max_samples: DEFAULT_MAX_SAMPLES,
            collect_statistics: true,
        }
    }

    pub fn with_max_samples(mut self, max_samples: usize) -> Self {
        self.max_samples = max_samples;
        self
    }

    pub fn with_statistics(mut self, collect_statistics: bool) -> Self {
        self.collect_statistics = collect_statistics;
        self
    }

    pub fn client(&self) -> &PubMedClient {
        &self.client
    }

    pub fn companies(&self) -> &CompanyRegistry {
        &self.companies
    }

    /// Search one page and sample statistics for the whole result set
    ///
    /// A blank query is a no-op: nothing is sent upstream.
    pub async fn basic_search(&self, filters: &SearchFilters, page: usize) -> BasicSearchView {
        let page = page.max(1);
        let mut view = BasicSearchView {
            page,
            ..Default::default()
        };

        if filters.is_blank() {
            return view;
        }

        let query = filters.build();
        view.formatted_query = Some(query.to_string());

        match self
            .client
            .search_page(query.as_str(), page, self.results_per_page)
            .await
        {
            Ok(results) => view.results = results,
            Err(e) => {
                error!(query = %query, error = %e, "Search failed");
                view.notices.push(Notice::error(describe(&e)));
                return view;
            }
        }

        if view.results.total_results == 0 {
            view.notices.push(Notice::warning(NO_RESULTS_MESSAGE));
            return view;
        }

        view.page_range = page_range(page, view.results.total_pages);

        if self.collect_statistics {
            let sampler = StatisticsSampler::new(&self.client).with_max_samples(self.max_samples);
            match sampler.sample(query.as_str()).await {
                Ok(Some((statistics, info))) => {
                    view.statistics = Some(statistics);
                    view.sampling_info = Some(info);
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(query = %query, error = %e, "Statistics sampling failed");
                    view.notices.push(Notice::error(describe(&e)));
                }
            }
        }

        view
    }

    /// Manufacturer-by-year count matrix
    pub async fn publication_trends<S: AsRef<str>>(
        &self,
        topic: &str,
        manufacturers: &[S],
        start_year: i32,
        end_year: i32,
    ) -> TrendsView {
        let mut view = TrendsView::default();

        if manufacturers.is_empty() {
            view.notices
                .push(Notice::error("Select at least one manufacturer"));
            return view;
        }
        if start_year > end_year {
            view.notices.push(Notice::error(format!(
                "Start year {start_year} is after end year {end_year}"
            )));
            return view;
        }

        match self
            .client
            .publication_matrix(topic, manufacturers, start_year, end_year, &self.companies)
            .await
        {
            Ok(matrix) => view.matrix = Some(matrix),
            Err(e) => {
                error!(topic = %topic, error = %e, "Trend matrix failed");
                view.notices.push(Notice::error(describe(&e)));
            }
        }

        view
    }

    /// Article summaries behind one matrix cell
    pub async fn details(
        &self,
        topic: &str,
        manufacturer: &str,
        year: i32,
        page: usize,
    ) -> DetailsView {
        let mut view = DetailsView::default();

        match self
            .client
            .detailed_results(topic, manufacturer, year, page.max(1), &self.companies)
            .await
        {
            Ok(details) => view.details = details,
            Err(e) => {
                error!(manufacturer = %manufacturer, year, error = %e, "Detail lookup failed");
                view.notices.push(Notice::error(describe(&e)));
            }
        }

        view
    }
}

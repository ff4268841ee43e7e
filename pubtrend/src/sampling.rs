//! Approximate result-set statistics from evenly spread sample windows
//!
//! Instead of fetching every match, the sampler fetches up to
//! `max_samples / 100` windows of 100 records spread across the result set
//! and tallies years, authors, journals, affiliations, grants and MeSH terms.
//! The reported [`SamplingInfo`] makes the approximation explicit.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::error::{PubMedError, Result};
use crate::pubmed::models::ArticleRecord;
use crate::pubmed::PubMedClient;

/// Records per sample window, the EFetch per-call cap
pub const SAMPLE_BATCH_SIZE: usize = 100;

/// Default upper bound on sampled records
pub const DEFAULT_MAX_SAMPLES: usize = 10_000;

/// Entries kept for every dimension except years
pub const TOP_N: usize = 10;

/// Label/count pairs in presentation order
pub type FrequencyTable = Vec<(String, usize)>;

/// Aggregated statistics of one sampling run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplingResult {
    /// Every sampled year, newest first
    pub year_stats: FrequencyTable,
    pub top_authors: FrequencyTable,
    pub top_journals: FrequencyTable,
    pub top_affiliations: FrequencyTable,
    pub top_grants: FrequencyTable,
    pub top_mesh_terms: FrequencyTable,
}

/// How much of the result set the statistics are based on
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SamplingInfo {
    pub total_results: usize,
    /// Windows times window size, may exceed `total_results` slightly
    pub sampled_results: usize,
    /// `sampled_results / total_results * 100`, two decimals
    pub sampling_percentage: f64,
}

impl SamplingInfo {
    pub fn new(total_results: usize, num_samples: usize) -> Self {
        let sampled_results = num_samples * SAMPLE_BATCH_SIZE;
        let sampling_percentage = if total_results == 0 {
            0.0
        } else {
            round2(sampled_results as f64 / total_results as f64 * 100.0)
        };

        Self {
            total_results,
            sampled_results,
            sampling_percentage,
        }
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Number of 100-record windows for a result set
pub fn sample_count(total_results: usize, max_samples: usize) -> usize {
    (max_samples / SAMPLE_BATCH_SIZE).min(total_results.div_ceil(SAMPLE_BATCH_SIZE))
}

/// Start offsets of the sample windows, evenly spread
pub fn sample_offsets(total_results: usize, num_samples: usize) -> Vec<usize> {
    if num_samples == 0 {
        return Vec::new();
    }
    let stride = total_results / num_samples;
    (0..num_samples).map(|i| i * stride).collect()
}

/// Counter that remembers first-seen order for stable tie breaking
#[derive(Debug, Default)]
struct Counter {
    order: Vec<String>,
    counts: HashMap<String, usize>,
}

impl Counter {
    fn add(&mut self, label: &str) {
        match self.counts.get_mut(label) {
            Some(count) => *count += 1,
            None => {
                self.order.push(label.to_string());
                self.counts.insert(label.to_string(), 1);
            }
        }
    }

    fn entries(self) -> FrequencyTable {
        let Counter { order, mut counts } = self;
        order
            .into_iter()
            .map(|label| {
                let count = counts.remove(&label).unwrap_or(0);
                (label, count)
            })
            .collect()
    }

    /// Descending by count, ties in first-seen order
    fn top(self, n: usize) -> FrequencyTable {
        let mut entries = self.entries();
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries.truncate(n);
        entries
    }

    /// Descending by label
    fn by_label_desc(self) -> FrequencyTable {
        let mut entries = self.entries();
        entries.sort_by(|a, b| b.0.cmp(&a.0));
        entries
    }
}

/// Running tallies over sampled records
#[derive(Debug, Default)]
pub struct StatisticsAccumulator {
    years: Counter,
    authors: Counter,
    journals: Counter,
    affiliations: Counter,
    grants: Counter,
    mesh_terms: Counter,
    records: usize,
}

impl StatisticsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, record: &ArticleRecord) {
        self.records += 1;

        if let Some(year) = record.publication_date.numeric_year() {
            self.years.add(year);
        }
        for author in &record.authors {
            self.authors.add(author);
        }
        if record.has_journal() {
            self.journals.add(&record.journal);
        }
        for affiliation in &record.affiliations {
            self.affiliations.add(affiliation);
        }
        for grant in record.grants.iter().filter(|grant| !grant.id.is_empty()) {
            self.grants.add(&grant.label());
        }
        for term in &record.mesh_terms {
            self.mesh_terms.add(term);
        }
    }

    pub fn extend<'r, I: IntoIterator<Item = &'r ArticleRecord>>(&mut self, records: I) {
        for record in records {
            self.add(record);
        }
    }

    /// Number of records tallied so far
    pub fn records(&self) -> usize {
        self.records
    }

    pub fn finish(self) -> SamplingResult {
        SamplingResult {
            year_stats: self.years.by_label_desc(),
            top_authors: self.authors.top(TOP_N),
            top_journals: self.journals.top(TOP_N),
            top_affiliations: self.affiliations.top(TOP_N),
            top_grants: self.grants.top(TOP_N),
            top_mesh_terms: self.mesh_terms.top(TOP_N),
        }
    }
}

/// Estimates aggregate statistics of a query from sampled windows
pub struct StatisticsSampler<'a> {
    client: &'a PubMedClient,
    max_samples: usize,
}

impl<'a> StatisticsSampler<'a> {
    pub fn new(client: &'a PubMedClient) -> Self {
        Self {
            client,
            max_samples: DEFAULT_MAX_SAMPLES,
        }
    }

    pub fn with_max_samples(mut self, max_samples: usize) -> Self {
        self.max_samples = max_samples;
        self
    }

    /// Sample `query`; `None` when it matches nothing
    ///
    /// The query is searched once with the history server; every window is
    /// then fetched from that session. A window that fails is logged and
    /// skipped.
    #[instrument(skip(self), fields(query = %query, max_samples = self.max_samples))]
    pub async fn sample(&self, query: &str) -> Result<Option<(SamplingResult, SamplingInfo)>> {
        let search = self.client.search(query, 0, SAMPLE_BATCH_SIZE).await?;
        let total_results = search.total_count;
        if total_results == 0 {
            debug!("No results, nothing to sample");
            return Ok(None);
        }

        let session = search.history_session().ok_or_else(|| {
            PubMedError::UpstreamFormat("search returned no history session".to_string())
        })?;

        let num_samples = sample_count(total_results, self.max_samples);
        let mut accumulator = StatisticsAccumulator::new();
        let mut failed_batches = 0;

        for (batch, start) in sample_offsets(total_results, num_samples)
            .into_iter()
            .enumerate()
        {
            match self
                .client
                .fetch_from_history(&session, start, SAMPLE_BATCH_SIZE)
                .await
            {
                Ok(records) => accumulator.extend(&records),
                Err(e) => {
                    failed_batches += 1;
                    warn!(batch, start, error = %e, "Skipping failed sample batch");
                }
            }
        }

        let info = SamplingInfo::new(total_results, num_samples);
        info!(
            total_results,
            num_samples,
            failed_batches,
            records = accumulator.records(),
            sampling_percentage = info.sampling_percentage,
            "Sampling completed"
        );

        Ok(Some((accumulator.finish(), info)))
    }
}

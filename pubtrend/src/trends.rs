//! Manufacturer-by-year publication count matrix

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Publication counts for every (year, manufacturer) pair
///
/// Rows are `years` in ascending order, columns are `manufacturers` in
/// display order. Totals are kept in step with `counts` by [`record`].
///
/// [`record`]: PublicationMatrix::record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicationMatrix {
    pub years: Vec<i32>,
    pub manufacturers: Vec<String>,
    pub counts: BTreeMap<i32, BTreeMap<String, usize>>,
    pub totals_by_year: BTreeMap<i32, usize>,
    pub totals_by_manufacturer: BTreeMap<String, usize>,
}

impl PublicationMatrix {
    /// Zero-filled matrix for the given axes
    pub fn new(years: Vec<i32>, manufacturers: Vec<String>) -> Self {
        let mut counts = BTreeMap::new();
        let mut totals_by_year = BTreeMap::new();
        for &year in &years {
            let row = manufacturers
                .iter()
                .map(|manufacturer| (manufacturer.clone(), 0))
                .collect();
            counts.insert(year, row);
            totals_by_year.insert(year, 0);
        }
        let totals_by_manufacturer = manufacturers
            .iter()
            .map(|manufacturer| (manufacturer.clone(), 0))
            .collect();

        Self {
            years,
            manufacturers,
            counts,
            totals_by_year,
            totals_by_manufacturer,
        }
    }

    /// Set one cell and update both totals
    pub fn record(&mut self, year: i32, manufacturer: &str, count: usize) {
        let previous = self
            .counts
            .entry(year)
            .or_default()
            .insert(manufacturer.to_string(), count)
            .unwrap_or(0);

        let year_total = self.totals_by_year.entry(year).or_insert(0);
        *year_total = *year_total - previous + count;

        let manufacturer_total = self
            .totals_by_manufacturer
            .entry(manufacturer.to_string())
            .or_insert(0);
        *manufacturer_total = *manufacturer_total - previous + count;
    }

    pub fn count(&self, year: i32, manufacturer: &str) -> usize {
        self.counts
            .get(&year)
            .and_then(|row| row.get(manufacturer))
            .copied()
            .unwrap_or(0)
    }

    pub fn year_total(&self, year: i32) -> usize {
        self.totals_by_year.get(&year).copied().unwrap_or(0)
    }

    pub fn manufacturer_total(&self, manufacturer: &str) -> usize {
        self.totals_by_manufacturer
            .get(manufacturer)
            .copied()
            .unwrap_or(0)
    }

    pub fn grand_total(&self) -> usize {
        self.totals_by_manufacturer.values().sum()
    }

    /// Number of (year, manufacturer) units
    pub fn cells(&self) -> usize {
        self.years.len() * self.manufacturers.len()
    }
}

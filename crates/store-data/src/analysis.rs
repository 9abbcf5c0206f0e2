//! Dataset-level summary shown before the per-dimension sections.

use std::collections::BTreeMap;
use std::time::Instant;

use chrono::{DateTime, Utc};
use store_core::error::Result;
use store_core::models::{Dataset, Field};
use tracing::debug;

use crate::reader::{load_dataset, DroppedColumn, LoadOptions, LoadedDataset, Source};

/// Net totals over every record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Totals {
    pub sales: f64,
    pub profit: f64,
}

impl Totals {
    pub fn of(dataset: &Dataset) -> Result<Self> {
        Ok(Self {
            sales: dataset.total(Field::Sales)?,
            profit: dataset.total(Field::Profit)?,
        })
    }

    /// Operating profit ratio (profit / sales); `None` without sales.
    pub fn profit_ratio(&self) -> Option<f64> {
        if self.sales == 0.0 {
            None
        } else {
            Some(self.profit / self.sales)
        }
    }
}

/// What the report knows about the dataset before any grouping.
#[derive(Debug, Clone)]
pub struct DatasetOverview {
    pub generated_at: DateTime<Utc>,
    pub source: String,
    pub records: usize,
    pub columns: Vec<Field>,
    pub dropped: Vec<DroppedColumn>,
    /// Records per country, counted before any column was dropped.
    pub country_counts: BTreeMap<String, usize>,
    pub load_time_seconds: f64,
    pub totals: Totals,
}

/// Result of [`load_and_summarize`].
#[derive(Debug, Clone)]
pub struct Analysis {
    pub dataset: Dataset,
    pub overview: DatasetOverview,
}

/// Load the dataset and build its overview.
///
/// Country counts are taken from the raw records, so they are available
/// even though the constant Country column is normally dropped.
pub fn load_and_summarize(source: &Source, options: &LoadOptions) -> Result<Analysis> {
    let started = Instant::now();
    let LoadedDataset { dataset, dropped } = load_dataset(source, options)?;
    let load_time_seconds = started.elapsed().as_secs_f64();

    let overview = summarize(&dataset, dropped, source.to_string(), load_time_seconds)?;
    debug!(
        "Overview: {} records, {} active columns, {:.2}s load",
        overview.records,
        overview.columns.len(),
        overview.load_time_seconds
    );

    Ok(Analysis { dataset, overview })
}

/// Build the overview of an already loaded dataset.
pub fn summarize(
    dataset: &Dataset,
    dropped: Vec<DroppedColumn>,
    source: String,
    load_time_seconds: f64,
) -> Result<DatasetOverview> {
    let mut country_counts = BTreeMap::new();
    for record in dataset.records() {
        *country_counts.entry(record.country.clone()).or_insert(0) += 1;
    }

    Ok(DatasetOverview {
        generated_at: Utc::now(),
        source,
        records: dataset.len(),
        columns: dataset.columns().to_vec(),
        dropped,
        country_counts,
        load_time_seconds,
        totals: Totals::of(dataset)?,
    })
}

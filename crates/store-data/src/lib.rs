//! Data layer for the Superstore report.
//!
//! Loads and validates the CSV source, groups records into sum aggregates,
//! summarises the dataset and derives short commentary from aggregates.

pub mod aggregator;
pub mod analysis;
pub mod insights;
pub mod reader;

pub use store_core as core;

//! Shared building blocks for the Superstore sales report.
//!
//! Holds the typed record schema, the error type used across the workspace,
//! command-line settings and number formatting helpers.

pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;

//! Chart and table rendering for the Superstore report.
//!
//! Bar and pie charts are validated on construction and drawn to SVG with
//! `plotters`; aggregates are also printed as plain-text tables.

pub mod bar;
pub mod palette;
pub mod pie;
pub mod sink;
pub mod table;

use store_core::error::EdaError;

/// Wrap a drawing-backend failure.
pub(crate) fn render_error<E: std::fmt::Display>(err: E) -> EdaError {
    EdaError::Render(err.to_string())
}

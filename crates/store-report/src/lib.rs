//! Report orchestration for the Superstore exploratory analysis.
//!
//! Runs the fixed sequence of sections over a loaded dataset, printing
//! tables and commentary and handing charts to a [`ChartSink`](store_charts::sink::ChartSink).

pub mod driver;

pub use store_charts as charts;
pub use store_core as core;
pub use store_data as data;

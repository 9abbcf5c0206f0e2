use std::path::PathBuf;
use thiserror::Error;

/// All errors produced while loading, aggregating and charting the dataset.
#[derive(Error, Debug)]
pub enum EdaError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A remote source could not be downloaded.
    #[error("Failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// The CSV document itself is malformed (bad quoting, ragged rows, ...).
    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    /// An expected column is absent from the header row.
    #[error("Missing expected column: {0}")]
    MissingColumn(String),

    /// A required cell is empty.
    #[error("Row {row}: missing value in column '{column}'")]
    MissingValue { row: u64, column: String },

    /// A numeric cell does not parse as a number.
    #[error("Row {row}: column '{column}' is not a valid number: '{value}'")]
    InvalidNumber {
        row: u64,
        column: String,
        value: String,
    },

    /// A numeric cell parses but lies outside the column's domain.
    #[error("Row {row}: column '{column}' value {value} is out of range")]
    OutOfRange { row: u64, column: String, value: f64 },

    /// The source holds a header but no data rows.
    #[error("Dataset contains no records")]
    EmptyDataset,

    /// A grouping key or measure is not an active column of the dataset.
    #[error("Field not present in dataset: {0}")]
    UnknownField(String),

    /// A measure argument names a non-numeric column.
    #[error("Field '{0}' is not a numeric measure")]
    NotAMeasure(String),

    /// The number of grouping keys is not supported.
    #[error("Invalid grouping: {0}")]
    InvalidGrouping(String),

    /// Chart labels and a numeric series differ in length.
    #[error("Dimension mismatch: {expected} labels but series '{series}' has {found} values")]
    DimensionMismatch {
        expected: usize,
        found: usize,
        series: String,
    },

    /// A value a chart cannot represent (e.g. a negative pie slice).
    #[error("Invalid value for '{label}': {value:.2}")]
    InvalidValue { label: String, value: f64 },

    /// A chart was requested with nothing to draw.
    #[error("Nothing to draw: {0}")]
    EmptyChart(String),

    /// The drawing backend failed.
    #[error("Render error: {0}")]
    Render(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl EdaError {
    /// `true` for errors that only invalidate a single chart call.
    ///
    /// The report driver may skip the chart and carry on with the next one.
    pub fn is_chart_error(&self) -> bool {
        matches!(
            self,
            EdaError::DimensionMismatch { .. }
                | EdaError::InvalidValue { .. }
                | EdaError::EmptyChart(_)
        )
    }
}

/// Convenience alias used throughout the store crates.
pub type Result<T> = std::result::Result<T, EdaError>;

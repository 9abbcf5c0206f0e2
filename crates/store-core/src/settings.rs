use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::error::EdaError;
use crate::models::Field;

/// Public copy of the Sample Superstore dataset the report was written for.
pub const DEFAULT_SOURCE: &str =
    "https://drive.google.com/u/0/uc?id=1lV7is1B566UQPYzzY8R2ZmOritTW299S&export=download";

/// The five analytical sections of the report, in narrative order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum Section {
    /// Region, state and loss-making cities
    Geography,
    /// Category and sub-category
    Category,
    /// Customer segment
    Segment,
    /// Shipping mode
    Shipping,
    /// Discount level
    Discount,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::Geography,
        Section::Category,
        Section::Segment,
        Section::Shipping,
        Section::Discount,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Section::Geography => "Geographical Attributes",
            Section::Category => "Category of Products",
            Section::Segment => "Customer Segment",
            Section::Shipping => "Shipping Mode",
            Section::Discount => "Discounts",
        }
    }
}

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Exploratory sales and profit report for the Sample Superstore dataset
#[derive(Parser, Debug, Clone)]
#[command(
    name = "superstore-eda",
    about = "Exploratory sales and profit report for the Sample Superstore dataset",
    version
)]
pub struct Settings {
    /// CSV source: local path or http(s) URL
    #[arg(long, default_value = DEFAULT_SOURCE)]
    pub source: String,

    /// Directory the SVG charts are written to
    #[arg(long, default_value = "report")]
    pub output_dir: PathBuf,

    /// Sections to run (repeatable); all sections when omitted
    #[arg(long = "section", value_enum)]
    pub sections: Vec<Section>,

    /// Columns to drop after loading (repeatable)
    #[arg(long = "drop", default_value = "Postal Code")]
    pub drop: Vec<String>,

    /// Keep identifier columns that hold a single value across all records
    #[arg(long)]
    pub keep_constant: bool,

    /// Print tables and commentary only, without rendering charts
    #[arg(long)]
    pub tables_only: bool,

    /// Stop at the first chart that cannot be drawn
    #[arg(long)]
    pub strict: bool,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Settings {
    /// Parse the process arguments.
    pub fn load() -> Self {
        Self::resolve(Settings::parse())
    }

    /// Same as [`load`](Self::load) but from an explicit argument list.
    pub fn try_load_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Settings::try_parse_from(args).map(Self::resolve)
    }

    /// Sections to run, de-duplicated and in narrative order.
    pub fn selected_sections(&self) -> Vec<Section> {
        if self.sections.is_empty() {
            return Section::ALL.to_vec();
        }
        let mut sections = self.sections.clone();
        sections.sort();
        sections.dedup();
        sections
    }

    /// Resolve the `--drop` names into schema fields.
    pub fn drop_fields(&self) -> Result<Vec<Field>, EdaError> {
        self.drop
            .iter()
            .map(|name| {
                Field::from_header(name)
                    .ok_or_else(|| EdaError::Config(format!("unknown column to drop: {name}")))
            })
            .collect()
    }

    /// Apply the `--debug` override.
    fn resolve(mut settings: Settings) -> Settings {
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Settings {
        let mut argv = vec!["superstore-eda"];
        argv.extend_from_slice(args);
        Settings::try_load_from(argv).expect("valid args")
    }

    #[test]
    fn test_defaults() {
        let s = parse(&[]);
        assert_eq!(s.source, DEFAULT_SOURCE);
        assert_eq!(s.output_dir, PathBuf::from("report"));
        assert_eq!(s.selected_sections(), Section::ALL.to_vec());
        assert_eq!(s.drop_fields().unwrap(), vec![Field::PostalCode]);
        assert!(!s.keep_constant);
        assert!(!s.strict);
        assert!(!s.tables_only);
        assert_eq!(s.log_level, "INFO");
    }

    #[test]
    fn test_sections_sorted_and_deduplicated() {
        let s = parse(&[
            "--section",
            "discount",
            "--section",
            "geography",
            "--section",
            "discount",
        ]);
        assert_eq!(
            s.selected_sections(),
            vec![Section::Geography, Section::Discount]
        );
    }

    #[test]
    fn test_unknown_section_rejected() {
        let result = Settings::try_load_from(["superstore-eda", "--section", "weather"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_drop_overrides_default() {
        let s = parse(&["--drop", "Quantity", "--drop", "sub-category"]);
        assert_eq!(
            s.drop_fields().unwrap(),
            vec![Field::Quantity, Field::SubCategory]
        );
    }

    #[test]
    fn test_drop_unknown_column_is_config_error() {
        let s = parse(&["--drop", "Order ID"]);
        assert!(matches!(s.drop_fields(), Err(EdaError::Config(_))));
    }

    #[test]
    fn test_debug_overrides_log_level() {
        let s = parse(&["--log-level", "ERROR", "--debug"]);
        assert_eq!(s.log_level, "DEBUG");
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let result = Settings::try_load_from(["superstore-eda", "--log-level", "VERBOSE"]);
        assert!(result.is_err());
    }
}

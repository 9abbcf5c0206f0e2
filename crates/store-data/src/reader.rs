//! CSV loading and validation for the Superstore dataset.
//!
//! Reads the source file from disk or over HTTP, validates every row into a
//! typed [`Record`] and drops columns that carry no analytical value.

use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use store_core::error::{EdaError, Result};
use store_core::models::{Dataset, Field, Record};
use tracing::{debug, info};

// ── Source ────────────────────────────────────────────────────────────────────

/// Where the CSV comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Path(PathBuf),
    Url(String),
}

impl Source {
    /// `http://` and `https://` locations are URLs, anything else is a path.
    pub fn parse(location: &str) -> Self {
        let trimmed = location.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Source::Url(trimmed.to_string())
        } else {
            Source::Path(PathBuf::from(trimmed))
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Path(p) => write!(f, "{}", p.display()),
            Source::Url(u) => f.write_str(u),
        }
    }
}

// ── Options & result ──────────────────────────────────────────────────────────

/// Column-dropping behaviour applied after the records are validated.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Drop identifier columns holding one value across every record.
    pub drop_constant: bool,
    /// Columns to drop unconditionally.
    pub drop: Vec<Field>,
    /// Columns the constant rule must never drop.
    pub required: Vec<Field>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            drop_constant: true,
            drop: Vec::new(),
            required: Vec::new(),
        }
    }
}

/// Why a column left the active set.
#[derive(Debug, Clone, PartialEq)]
pub enum DropReason {
    /// Every record holds this single value.
    Constant(String),
    /// Listed in [`LoadOptions::drop`].
    Requested,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DroppedColumn {
    pub field: Field,
    pub reason: DropReason,
}

/// A validated dataset and the columns removed from it.
#[derive(Debug, Clone)]
pub struct LoadedDataset {
    pub dataset: Dataset,
    pub dropped: Vec<DroppedColumn>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Fetch, parse, validate and clean the dataset in one go.
///
/// Any malformed row aborts the load; nothing is returned partially.
pub fn load_dataset(source: &Source, options: &LoadOptions) -> Result<LoadedDataset> {
    let bytes = read_source(source)?;
    let records = parse_records(bytes.as_slice())?;
    info!("Loaded {} records from {}", records.len(), source);

    let mut dataset = Dataset::new(records);
    let dropped = apply_drops(&mut dataset, options);
    Ok(LoadedDataset { dataset, dropped })
}

/// Raw bytes of the source file.
pub fn read_source(source: &Source) -> Result<Vec<u8>> {
    match source {
        Source::Path(path) => read_file(path),
        Source::Url(url) => fetch_url(url),
    }
}

/// Parse CSV text into validated records.
///
/// Row numbers in errors count data rows from 1, excluding the header.
pub fn parse_records<R: Read>(reader: R) -> Result<Vec<Record>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    for field in Field::ALL {
        if !headers.iter().any(|h| h == field.header()) {
            return Err(EdaError::MissingColumn(field.header().to_string()));
        }
    }
    for extra in headers.iter().filter(|h| Field::ALL.iter().all(|f| f.header() != *h)) {
        debug!("Ignoring unknown column '{}'", extra);
    }

    let mut records = Vec::new();
    for (idx, result) in csv_reader.deserialize::<RawRow>().enumerate() {
        let row = idx as u64 + 1;
        records.push(result?.validate(row)?);
    }

    if records.is_empty() {
        return Err(EdaError::EmptyDataset);
    }
    Ok(records)
}

/// Drop constant identifier columns and the requested ones.
pub fn apply_drops(dataset: &mut Dataset, options: &LoadOptions) -> Vec<DroppedColumn> {
    let mut dropped = Vec::new();

    if options.drop_constant {
        for field in constant_columns(dataset) {
            if options.required.contains(&field) {
                continue;
            }
            let value = dataset
                .records()
                .first()
                .map(|r| r.key(field))
                .unwrap_or_default();
            if dataset.drop_column(field) {
                info!("Dropping constant column {} (every record is '{}')", field, value);
                dropped.push(DroppedColumn {
                    field,
                    reason: DropReason::Constant(value),
                });
            }
        }
    }

    for &field in &options.drop {
        if dataset.drop_column(field) {
            info!("Dropping column {}", field);
            dropped.push(DroppedColumn {
                field,
                reason: DropReason::Requested,
            });
        }
    }

    dropped
}

/// Active identifier columns with exactly one distinct value.
///
/// A dataset of fewer than two records has no constant columns.
pub fn constant_columns(dataset: &Dataset) -> Vec<Field> {
    let records = dataset.records();
    let Some(first) = records.first() else {
        return Vec::new();
    };
    if records.len() < 2 {
        return Vec::new();
    }

    dataset
        .columns()
        .iter()
        .copied()
        .filter(|f| !f.is_measure())
        .filter(|&f| {
            let value = first.key(f);
            records.iter().all(|r| r.key(f) == value)
        })
        .collect()
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|source| EdaError::FileRead {
        path: path.to_path_buf(),
        source,
    })
}

fn fetch_url(url: &str) -> Result<Vec<u8>> {
    info!("Downloading dataset from {}", url);
    let response = ureq::get(url).call().map_err(|err| EdaError::Fetch {
        url: url.to_string(),
        reason: err.to_string(),
    })?;
    let body = response
        .into_body()
        .read_to_vec()
        .map_err(|err| EdaError::Fetch {
            url: url.to_string(),
            reason: format!("failed reading response body: {err}"),
        })?;
    debug!("Fetched {} bytes", body.len());
    Ok(body)
}

/// One CSV row before validation; numbers are kept as text so that bad
/// cells can be reported with their row and column.
#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(rename = "Ship Mode")]
    ship_mode: String,
    #[serde(rename = "Segment")]
    segment: String,
    #[serde(rename = "Country")]
    country: String,
    #[serde(rename = "City")]
    city: String,
    #[serde(rename = "State")]
    state: String,
    #[serde(rename = "Postal Code")]
    postal_code: String,
    #[serde(rename = "Region")]
    region: String,
    #[serde(rename = "Category")]
    category: String,
    #[serde(rename = "Sub-Category")]
    sub_category: String,
    #[serde(rename = "Sales")]
    sales: String,
    #[serde(rename = "Quantity")]
    quantity: String,
    #[serde(rename = "Discount")]
    discount: String,
    #[serde(rename = "Profit")]
    profit: String,
}

impl RawRow {
    fn validate(self, row: u64) -> Result<Record> {
        let sales = parse_decimal(row, Field::Sales, &self.sales)?;
        if sales < 0.0 {
            return Err(out_of_range(row, Field::Sales, sales));
        }
        let discount = parse_decimal(row, Field::Discount, &self.discount)?;
        if !(0.0..1.0).contains(&discount) {
            return Err(out_of_range(row, Field::Discount, discount));
        }
        let quantity = non_empty(row, Field::Quantity, &self.quantity)?
            .parse::<u32>()
            .map_err(|_| invalid_number(row, Field::Quantity, &self.quantity))?;
        let profit = parse_decimal(row, Field::Profit, &self.profit)?;

        Ok(Record {
            ship_mode: non_empty(row, Field::ShipMode, &self.ship_mode)?.to_string(),
            segment: non_empty(row, Field::Segment, &self.segment)?.to_string(),
            country: non_empty(row, Field::Country, &self.country)?.to_string(),
            city: non_empty(row, Field::City, &self.city)?.to_string(),
            state: non_empty(row, Field::State, &self.state)?.to_string(),
            postal_code: non_empty(row, Field::PostalCode, &self.postal_code)?.to_string(),
            region: non_empty(row, Field::Region, &self.region)?.to_string(),
            category: non_empty(row, Field::Category, &self.category)?.to_string(),
            sub_category: non_empty(row, Field::SubCategory, &self.sub_category)?.to_string(),
            sales,
            quantity,
            discount,
            profit,
        })
    }
}

fn non_empty<'a>(row: u64, field: Field, value: &'a str) -> Result<&'a str> {
    if value.is_empty() {
        Err(EdaError::MissingValue {
            row,
            column: field.header().to_string(),
        })
    } else {
        Ok(value)
    }
}

fn parse_decimal(row: u64, field: Field, value: &str) -> Result<f64> {
    let parsed = non_empty(row, field, value)?
        .parse::<f64>()
        .map_err(|_| invalid_number(row, field, value))?;
    if parsed.is_finite() {
        Ok(parsed)
    } else {
        Err(invalid_number(row, field, value))
    }
}

fn invalid_number(row: u64, field: Field, value: &str) -> EdaError {
    EdaError::InvalidNumber {
        row,
        column: field.header().to_string(),
        value: value.to_string(),
    }
}

fn out_of_range(row: u64, field: Field, value: f64) -> EdaError {
    EdaError::OutOfRange {
        row,
        column: field.header().to_string(),
        value,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "Ship Mode,Segment,Country,City,State,Postal Code,Region,Category,Sub-Category,Sales,Quantity,Discount,Profit";

    fn csv_with(rows: &[&str]) -> String {
        let mut text = String::from(HEADER);
        for row in rows {
            text.push('\n');
            text.push_str(row);
        }
        text.push('\n');
        text
    }

    const ROW_KY: &str = "Second Class,Consumer,United States,Henderson,Kentucky,42420,South,Furniture,Bookcases,261.96,2,0,41.9136";
    const ROW_CA: &str = "Second Class,Corporate,United States,Los Angeles,California,90036,West,Office Supplies,Labels,14.62,2,0,6.8714";
    const ROW_FL: &str = "Standard Class,Consumer,United States,Fort Lauderdale,Florida,33311,South,Furniture,Tables,957.5775,5,0.45,-383.031";

    #[test]
    fn test_source_parse() {
        assert_eq!(
            Source::parse("https://example.com/data.csv"),
            Source::Url("https://example.com/data.csv".to_string())
        );
        assert_eq!(
            Source::parse("HTTP://example.com/x"),
            Source::Url("HTTP://example.com/x".to_string())
        );
        assert_eq!(
            Source::parse("data/SampleSuperstore.csv"),
            Source::Path(PathBuf::from("data/SampleSuperstore.csv"))
        );
    }

    #[test]
    fn test_parse_records_valid() {
        let text = csv_with(&[ROW_KY, ROW_CA, ROW_FL]);
        let records = parse_records(text.as_bytes()).expect("valid csv");

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].city, "Henderson");
        assert_eq!(records[0].sub_category, "Bookcases");
        assert_eq!(records[2].quantity, 5);
        assert!((records[2].discount - 0.45).abs() < 1e-12);
        assert!((records[2].profit + 383.031).abs() < 1e-9);
    }

    #[test]
    fn test_parse_records_trims_and_ignores_extra_columns() {
        let text = format!(
            "Order ID,{}\nCA-1, Second Class ,Consumer,United States,Henderson,Kentucky,42420,South,Furniture,Bookcases, 261.96 ,2,0,41.9136\n",
            HEADER
        );
        let records = parse_records(text.as_bytes()).expect("valid csv");
        assert_eq!(records[0].ship_mode, "Second Class");
        assert!((records[0].sales - 261.96).abs() < 1e-9);
    }

    #[test]
    fn test_missing_column() {
        let text = "Ship Mode,Segment\nFirst Class,Consumer\n";
        let err = parse_records(text.as_bytes()).unwrap_err();
        assert!(matches!(err, EdaError::MissingColumn(ref c) if c == "Country"));
    }

    #[test]
    fn test_invalid_number_reports_row_and_column() {
        let bad = ROW_CA.replace("14.62", "fourteen");
        let text = csv_with(&[ROW_KY, &bad]);
        let err = parse_records(text.as_bytes()).unwrap_err();
        match err {
            EdaError::InvalidNumber { row, column, value } => {
                assert_eq!(row, 2);
                assert_eq!(column, "Sales");
                assert_eq!(value, "fourteen");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_fractional_quantity_rejected() {
        let bad = ROW_KY.replace(",2,0,", ",2.5,0,");
        let err = parse_records(csv_with(&[&bad]).as_bytes()).unwrap_err();
        assert!(matches!(err, EdaError::InvalidNumber { ref column, .. } if column == "Quantity"));
    }

    #[test]
    fn test_nan_is_not_a_number() {
        let bad = ROW_KY.replace("41.9136", "NaN");
        let err = parse_records(csv_with(&[&bad]).as_bytes()).unwrap_err();
        assert!(matches!(err, EdaError::InvalidNumber { ref column, .. } if column == "Profit"));
    }

    #[test]
    fn test_negative_sales_out_of_range() {
        let bad = ROW_KY.replace("261.96", "-261.96");
        let err = parse_records(csv_with(&[&bad]).as_bytes()).unwrap_err();
        assert!(matches!(err, EdaError::OutOfRange { row: 1, ref column, .. } if column == "Sales"));
    }

    #[test]
    fn test_discount_of_one_out_of_range() {
        let bad = ROW_FL.replace("0.45", "1");
        let err = parse_records(csv_with(&[&bad]).as_bytes()).unwrap_err();
        assert!(matches!(err, EdaError::OutOfRange { ref column, .. } if column == "Discount"));
    }

    #[test]
    fn test_empty_identifier_is_missing_value() {
        let bad = ROW_CA.replace("Los Angeles", "");
        let err = parse_records(csv_with(&[ROW_KY, &bad]).as_bytes()).unwrap_err();
        assert!(matches!(err, EdaError::MissingValue { row: 2, ref column } if column == "City"));
    }

    #[test]
    fn test_ragged_row_is_csv_error() {
        let text = csv_with(&["Second Class,Consumer"]);
        let err = parse_records(text.as_bytes()).unwrap_err();
        assert!(matches!(err, EdaError::Csv(_)));
    }

    #[test]
    fn test_header_only_is_empty_dataset() {
        let err = parse_records(csv_with(&[]).as_bytes()).unwrap_err();
        assert!(matches!(err, EdaError::EmptyDataset));
    }

    #[test]
    fn test_load_dataset_from_path_drops_country_and_postal_code() {
        let mut file = NamedTempFile::new().expect("tempfile");
        file.write_all(csv_with(&[ROW_KY, ROW_CA, ROW_FL]).as_bytes())
            .expect("write csv");

        let options = LoadOptions {
            drop: vec![Field::PostalCode],
            ..LoadOptions::default()
        };
        let loaded = load_dataset(&Source::Path(file.path().to_path_buf()), &options)
            .expect("load");

        assert_eq!(loaded.dataset.len(), 3);
        assert!(!loaded.dataset.has_column(Field::Country));
        assert!(!loaded.dataset.has_column(Field::PostalCode));
        assert_eq!(
            loaded.dropped,
            vec![
                DroppedColumn {
                    field: Field::Country,
                    reason: DropReason::Constant("United States".to_string()),
                },
                DroppedColumn {
                    field: Field::PostalCode,
                    reason: DropReason::Requested,
                },
            ]
        );
    }

    #[test]
    fn test_required_columns_survive_constant_drop() {
        let records = parse_records(csv_with(&[ROW_KY, ROW_FL]).as_bytes()).unwrap();
        let mut dataset = Dataset::new(records);
        // Both rows share Region "South" and Category "Furniture".
        let options = LoadOptions {
            required: vec![Field::Region, Field::Category],
            ..LoadOptions::default()
        };
        let dropped = apply_drops(&mut dataset, &options);

        let fields: Vec<Field> = dropped.iter().map(|d| d.field).collect();
        assert_eq!(fields, vec![Field::Segment, Field::Country]);
        assert!(dataset.has_column(Field::Region));
        assert!(dataset.has_column(Field::Category));
    }

    #[test]
    fn test_single_record_has_no_constant_columns() {
        let records = parse_records(csv_with(&[ROW_KY]).as_bytes()).unwrap();
        let dataset = Dataset::new(records);
        assert!(constant_columns(&dataset).is_empty());
    }

    #[test]
    fn test_missing_file_is_file_read_error() {
        let err = read_source(&Source::Path(PathBuf::from("/definitely/not/here.csv")))
            .unwrap_err();
        assert!(matches!(err, EdaError::FileRead { .. }));
    }

    #[test]
    fn test_unreachable_url_is_fetch_error() {
        // Nothing listens on the discard port locally, so no network is needed.
        let source = Source::parse("http://127.0.0.1:9/superstore.csv");
        let err = load_dataset(&source, &LoadOptions::default()).unwrap_err();
        match err {
            EdaError::Fetch { url, .. } => {
                assert_eq!(url, "http://127.0.0.1:9/superstore.csv");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

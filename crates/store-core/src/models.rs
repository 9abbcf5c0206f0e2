use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::EdaError;

/// One column of the Superstore source schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    ShipMode,
    Segment,
    Country,
    City,
    State,
    PostalCode,
    Region,
    Category,
    SubCategory,
    Sales,
    Quantity,
    Discount,
    Profit,
}

impl Field {
    /// Every column, in source-file order.
    pub const ALL: [Field; 13] = [
        Field::ShipMode,
        Field::Segment,
        Field::Country,
        Field::City,
        Field::State,
        Field::PostalCode,
        Field::Region,
        Field::Category,
        Field::SubCategory,
        Field::Sales,
        Field::Quantity,
        Field::Discount,
        Field::Profit,
    ];

    /// Header name as it appears in the CSV file.
    pub fn header(self) -> &'static str {
        match self {
            Field::ShipMode => "Ship Mode",
            Field::Segment => "Segment",
            Field::Country => "Country",
            Field::City => "City",
            Field::State => "State",
            Field::PostalCode => "Postal Code",
            Field::Region => "Region",
            Field::Category => "Category",
            Field::SubCategory => "Sub-Category",
            Field::Sales => "Sales",
            Field::Quantity => "Quantity",
            Field::Discount => "Discount",
            Field::Profit => "Profit",
        }
    }

    /// Numeric columns that can be summed.
    pub fn is_measure(self) -> bool {
        matches!(
            self,
            Field::Sales | Field::Quantity | Field::Discount | Field::Profit
        )
    }

    /// Resolve a header name, ignoring case and `-`/`_`/space differences.
    pub fn from_header(name: &str) -> Option<Field> {
        let wanted = normalize_header(name);
        Field::ALL
            .into_iter()
            .find(|f| normalize_header(f.header()) == wanted)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

impl FromStr for Field {
    type Err = EdaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::from_header(s).ok_or_else(|| EdaError::UnknownField(s.to_string()))
    }
}

fn normalize_header(name: &str) -> String {
    name.trim()
        .chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

/// A single sales transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub ship_mode: String,
    pub segment: String,
    pub country: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub region: String,
    pub category: String,
    pub sub_category: String,
    /// Non-negative currency amount.
    pub sales: f64,
    pub quantity: u32,
    /// Fraction in `[0, 1)`.
    pub discount: f64,
    /// Signed currency amount.
    pub profit: f64,
}

impl Record {
    /// Categorical rendering of any field, used as a grouping key.
    ///
    /// Numbers use the shortest `Display` form so `0.2` stays `"0.2"`.
    pub fn key(&self, field: Field) -> String {
        match field {
            Field::ShipMode => self.ship_mode.clone(),
            Field::Segment => self.segment.clone(),
            Field::Country => self.country.clone(),
            Field::City => self.city.clone(),
            Field::State => self.state.clone(),
            Field::PostalCode => self.postal_code.clone(),
            Field::Region => self.region.clone(),
            Field::Category => self.category.clone(),
            Field::SubCategory => self.sub_category.clone(),
            Field::Sales => self.sales.to_string(),
            Field::Quantity => self.quantity.to_string(),
            Field::Discount => self.discount.to_string(),
            Field::Profit => self.profit.to_string(),
        }
    }

    /// Numeric value of a measure field; `None` for identifiers.
    pub fn measure(&self, field: Field) -> Option<f64> {
        match field {
            Field::Sales => Some(self.sales),
            Field::Quantity => Some(f64::from(self.quantity)),
            Field::Discount => Some(self.discount),
            Field::Profit => Some(self.profit),
            _ => None,
        }
    }
}

/// Loaded records plus the set of columns still available for analysis.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<Record>,
    columns: Vec<Field>,
}

impl Dataset {
    /// Wrap `records` with every schema column active.
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records,
            columns: Field::ALL.to_vec(),
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Active columns in source order.
    pub fn columns(&self) -> &[Field] {
        &self.columns
    }

    pub fn has_column(&self, field: Field) -> bool {
        self.columns.contains(&field)
    }

    /// Remove `field` from the active columns. Returns `false` if it was
    /// already gone.
    pub fn drop_column(&mut self, field: Field) -> bool {
        let before = self.columns.len();
        self.columns.retain(|c| *c != field);
        before != self.columns.len()
    }

    /// Fail with [`EdaError::UnknownField`] unless `field` is active.
    pub fn require(&self, field: Field) -> Result<(), EdaError> {
        if self.has_column(field) {
            Ok(())
        } else {
            Err(EdaError::UnknownField(field.header().to_string()))
        }
    }

    /// New dataset holding only the records matching `predicate`.
    pub fn filtered(&self, predicate: impl Fn(&Record) -> bool) -> Dataset {
        Dataset {
            records: self
                .records
                .iter()
                .filter(|r| predicate(r))
                .cloned()
                .collect(),
            columns: self.columns.clone(),
        }
    }

    /// Sorted unique values of `field`.
    pub fn distinct(&self, field: Field) -> Result<Vec<String>, EdaError> {
        Ok(self.value_counts(field)?.into_keys().collect())
    }

    /// Number of records per distinct value of `field`.
    pub fn value_counts(&self, field: Field) -> Result<BTreeMap<String, usize>, EdaError> {
        self.require(field)?;
        let mut counts = BTreeMap::new();
        for record in &self.records {
            *counts.entry(record.key(field)).or_insert(0) += 1;
        }
        Ok(counts)
    }

    /// Sum of a measure across every record.
    pub fn total(&self, field: Field) -> Result<f64, EdaError> {
        self.require(field)?;
        if !field.is_measure() {
            return Err(EdaError::NotAMeasure(field.header().to_string()));
        }
        Ok(self
            .records
            .iter()
            .filter_map(|r| r.measure(field))
            .sum())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::Record;

    /// Record with plausible defaults; callers override what they need.
    pub fn record(region: &str, sales: f64, profit: f64) -> Record {
        Record {
            ship_mode: "Standard Class".to_string(),
            segment: "Consumer".to_string(),
            country: "United States".to_string(),
            city: "Henderson".to_string(),
            state: "Kentucky".to_string(),
            postal_code: "42420".to_string(),
            region: region.to_string(),
            category: "Furniture".to_string(),
            sub_category: "Chairs".to_string(),
            sales,
            quantity: 2,
            discount: 0.0,
            profit,
        }
    }
}

//! Grouped sum aggregation over one or two categorical keys.

use std::collections::{BTreeMap, HashMap};

use store_core::error::{EdaError, Result};
use store_core::models::{Dataset, Field, Record};

/// Separator used when a composite key is shown as one label.
pub const KEY_SEPARATOR: &str = " / ";

/// Order of the groups in an [`Aggregate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyOrder {
    /// Ascending by key tuple.
    #[default]
    Lexicographic,
    /// Order in which each key was first seen.
    Insertion,
}

// ── Group ─────────────────────────────────────────────────────────────────────

/// Sums for one distinct key tuple.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    /// One component per grouping field.
    pub key: Vec<String>,
    /// One sum per measure, in the aggregate's measure order.
    pub sums: Vec<f64>,
    /// Number of records folded into this group.
    pub count: u32,
}

impl Group {
    fn new(key: Vec<String>, measures: usize) -> Self {
        Self {
            key,
            sums: vec![0.0; measures],
            count: 0,
        }
    }

    fn add_record(&mut self, record: &Record, measures: &[Field]) {
        for (sum, &field) in self.sums.iter_mut().zip(measures) {
            if let Some(value) = record.measure(field) {
                *sum += value;
            }
        }
        self.count += 1;
    }

    fn add_group(&mut self, other: &Group) {
        for (sum, value) in self.sums.iter_mut().zip(&other.sums) {
            *sum += value;
        }
        self.count += other.count;
    }

    /// Key components joined for display.
    pub fn label(&self) -> String {
        self.key.join(KEY_SEPARATOR)
    }
}

// ── Aggregate ─────────────────────────────────────────────────────────────────

/// Grouped sums of one or more measures.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    keys: Vec<Field>,
    measures: Vec<Field>,
    order: KeyOrder,
    groups: Vec<Group>,
}

impl Aggregate {
    pub fn keys(&self) -> &[Field] {
        &self.keys
    }

    pub fn measures(&self) -> &[Field] {
        &self.measures
    }

    pub fn order(&self) -> KeyOrder {
        self.order
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Display label of every group, in order.
    pub fn labels(&self) -> Vec<String> {
        self.groups.iter().map(Group::label).collect()
    }

    /// Sums of `measure` for every group, aligned with [`labels`](Self::labels).
    pub fn series(&self, measure: Field) -> Result<Vec<f64>> {
        let idx = self.measure_index(measure)?;
        Ok(self.groups.iter().map(|g| g.sums[idx]).collect())
    }

    /// Sum of `measure` across all groups.
    pub fn total(&self, measure: Field) -> Result<f64> {
        Ok(self.series(measure)?.iter().sum())
    }

    pub fn get(&self, key: &[&str]) -> Option<&Group> {
        self.groups
            .iter()
            .find(|g| g.key.iter().map(String::as_str).eq(key.iter().copied()))
    }

    /// Sum of `measure` for one key tuple.
    pub fn value(&self, key: &[&str], measure: Field) -> Result<Option<f64>> {
        let idx = self.measure_index(measure)?;
        Ok(self.get(key).map(|g| g.sums[idx]))
    }

    /// Labels of the groups whose `measure` sum is negative.
    pub fn loss_making(&self, measure: Field) -> Result<Vec<String>> {
        let idx = self.measure_index(measure)?;
        Ok(self
            .groups
            .iter()
            .filter(|g| g.sums[idx] < 0.0)
            .map(Group::label)
            .collect())
    }

    /// Collapse a two-key aggregate onto its first key.
    pub fn roll_up(&self) -> Result<Aggregate> {
        if self.keys.len() != 2 {
            return Err(EdaError::InvalidGrouping(format!(
                "roll-up needs a composite key, got {} key(s)",
                self.keys.len()
            )));
        }
        let mut builder = GroupBuilder::new(self.order);
        for group in &self.groups {
            builder
                .entry(vec![group.key[0].clone()], self.measures.len())
                .add_group(group);
        }
        Ok(Aggregate {
            keys: vec![self.keys[0]],
            measures: self.measures.clone(),
            order: self.order,
            groups: builder.finish(),
        })
    }

    /// Split a two-key aggregate into one single-key aggregate (on the
    /// second key) per value of the first key, preserving order.
    pub fn partition(&self) -> Result<Vec<(String, Aggregate)>> {
        if self.keys.len() != 2 {
            return Err(EdaError::InvalidGrouping(format!(
                "partition needs a composite key, got {} key(s)",
                self.keys.len()
            )));
        }
        let mut parts: Vec<(String, Aggregate)> = Vec::new();
        for group in &self.groups {
            let head = &group.key[0];
            let inner = Group {
                key: vec![group.key[1].clone()],
                sums: group.sums.clone(),
                count: group.count,
            };
            match parts.iter_mut().find(|(name, _)| name == head) {
                Some((_, agg)) => agg.groups.push(inner),
                None => parts.push((
                    head.clone(),
                    Aggregate {
                        keys: vec![self.keys[1]],
                        measures: self.measures.clone(),
                        order: self.order,
                        groups: vec![inner],
                    },
                )),
            }
        }
        Ok(parts)
    }

    fn measure_index(&self, measure: Field) -> Result<usize> {
        self.measures
            .iter()
            .position(|m| *m == measure)
            .ok_or_else(|| EdaError::UnknownField(measure.header().to_string()))
    }
}

// ── Aggregator ────────────────────────────────────────────────────────────────

/// Stateless helper that groups dataset records and sums their measures.
pub struct Aggregator;

impl Aggregator {
    /// Group `dataset` by one or two `keys` and sum each of `measures`.
    ///
    /// Every key and measure must be an active column; measures must be
    /// numeric. Groups only exist for key tuples that occur in the data.
    pub fn aggregate(
        dataset: &Dataset,
        keys: &[Field],
        measures: &[Field],
        order: KeyOrder,
    ) -> Result<Aggregate> {
        if keys.is_empty() || keys.len() > 2 {
            return Err(EdaError::InvalidGrouping(format!(
                "expected one or two grouping keys, got {}",
                keys.len()
            )));
        }
        for &field in keys.iter().chain(measures) {
            dataset.require(field)?;
        }
        if let Some(bad) = measures.iter().find(|m| !m.is_measure()) {
            return Err(EdaError::NotAMeasure(bad.header().to_string()));
        }

        let mut builder = GroupBuilder::new(order);
        for record in dataset.records() {
            let key: Vec<String> = keys.iter().map(|&k| record.key(k)).collect();
            builder
                .entry(key, measures.len())
                .add_record(record, measures);
        }

        Ok(Aggregate {
            keys: keys.to_vec(),
            measures: measures.to_vec(),
            order,
            groups: builder.finish(),
        })
    }

    /// [`aggregate`](Self::aggregate) with fields given by header name.
    pub fn aggregate_by_name(
        dataset: &Dataset,
        keys: &[&str],
        measures: &[&str],
        order: KeyOrder,
    ) -> Result<Aggregate> {
        let keys = resolve_fields(keys)?;
        let measures = resolve_fields(measures)?;
        Self::aggregate(dataset, &keys, &measures, order)
    }

    /// Sales and Profit sums by `keys`, sorted by key.
    pub fn sales_and_profit(dataset: &Dataset, keys: &[Field]) -> Result<Aggregate> {
        Self::aggregate(
            dataset,
            keys,
            &[Field::Sales, Field::Profit],
            KeyOrder::Lexicographic,
        )
    }
}

fn resolve_fields(names: &[&str]) -> Result<Vec<Field>> {
    names.iter().map(|name| name.parse::<Field>()).collect()
}

/// Group storage honouring the requested key order.
enum GroupBuilder {
    Sorted(BTreeMap<Vec<String>, Group>),
    Insertion {
        index: HashMap<Vec<String>, usize>,
        groups: Vec<Group>,
    },
}

impl GroupBuilder {
    fn new(order: KeyOrder) -> Self {
        match order {
            KeyOrder::Lexicographic => GroupBuilder::Sorted(BTreeMap::new()),
            KeyOrder::Insertion => GroupBuilder::Insertion {
                index: HashMap::new(),
                groups: Vec::new(),
            },
        }
    }

    fn entry(&mut self, key: Vec<String>, measures: usize) -> &mut Group {
        match self {
            GroupBuilder::Sorted(map) => map
                .entry(key.clone())
                .or_insert_with(|| Group::new(key, measures)),
            GroupBuilder::Insertion { index, groups } => {
                let idx = *index.entry(key.clone()).or_insert_with(|| {
                    groups.push(Group::new(key, measures));
                    groups.len() - 1
                });
                &mut groups[idx]
            }
        }
    }

    fn finish(self) -> Vec<Group> {
        match self {
            GroupBuilder::Sorted(map) => map.into_values().collect(),
            GroupBuilder::Insertion { groups, .. } => groups,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn make_record(region: &str, state: &str, sales: f64, profit: f64) -> Record {
        Record {
            ship_mode: "Standard Class".to_string(),
            segment: "Consumer".to_string(),
            country: "United States".to_string(),
            city: "Springfield".to_string(),
            state: state.to_string(),
            postal_code: "00000".to_string(),
            region: region.to_string(),
            category: "Technology".to_string(),
            sub_category: "Phones".to_string(),
            sales,
            quantity: 1,
            discount: 0.0,
            profit,
        }
    }

    fn sample() -> Dataset {
        let mut records = vec![
            make_record("West", "California", 100.0, 20.0),
            make_record("West", "Washington", 50.0, -5.0),
            make_record("East", "New York", 30.0, 10.0),
            make_record("Central", "Texas", 80.0, -40.0),
            make_record("West", "California", 12.5, 2.5),
            make_record("Central", "Illinois", 45.0, -1.0),
        ];
        records[1].discount = 0.2;
        records[3].discount = 0.2;
        records[5].discount = 0.5;
        Dataset::new(records)
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_region_example() {
        let ds = Dataset::new(vec![
            make_record("West", "California", 100.0, 20.0),
            make_record("West", "California", 50.0, -5.0),
            make_record("East", "New York", 30.0, 10.0),
        ]);
        let agg = Aggregator::aggregate_by_name(
            &ds,
            &["Region"],
            &["Sales", "Profit"],
            KeyOrder::Lexicographic,
        )
        .unwrap();

        assert_eq!(agg.labels(), vec!["East", "West"]);
        assert_eq!(agg.series(Field::Sales).unwrap(), vec![30.0, 150.0]);
        assert_eq!(agg.series(Field::Profit).unwrap(), vec![10.0, 15.0]);
        assert_eq!(agg.get(&["West"]).unwrap().count, 2);
    }

    #[test]
    fn test_sales_are_preserved() {
        let ds = sample();
        let total = ds.total(Field::Sales).unwrap();
        for key in [Field::Region, Field::State, Field::Discount, Field::City] {
            let agg = Aggregator::sales_and_profit(&ds, &[key]).unwrap();
            assert!(approx(agg.total(Field::Sales).unwrap(), total));
            let count: u32 = agg.groups().iter().map(|g| g.count).sum();
            assert_eq!(count as usize, ds.len());
        }
    }

    #[test]
    fn test_dropping_constant_column_does_not_change_aggregates() {
        let ds = sample();
        let mut dropped = ds.clone();
        assert!(dropped.drop_column(Field::Country));

        for key in [Field::Region, Field::State] {
            let before = Aggregator::sales_and_profit(&ds, &[key]).unwrap();
            let after = Aggregator::sales_and_profit(&dropped, &[key]).unwrap();
            assert_eq!(before, after);
        }
    }

    #[test]
    fn test_roll_up_matches_direct_grouping() {
        let ds = sample();
        let composite = Aggregator::sales_and_profit(&ds, &[Field::Region, Field::State]).unwrap();
        let rolled = composite.roll_up().unwrap();
        let direct = Aggregator::sales_and_profit(&ds, &[Field::Region]).unwrap();

        assert_eq!(rolled.keys(), direct.keys());
        assert_eq!(rolled.labels(), direct.labels());
        for (a, b) in rolled.groups().iter().zip(direct.groups()) {
            assert_eq!(a.count, b.count);
            for (x, y) in a.sums.iter().zip(&b.sums) {
                assert!(approx(*x, *y));
            }
        }
    }

    #[test]
    fn test_roll_up_requires_composite_key() {
        let agg = Aggregator::sales_and_profit(&sample(), &[Field::Region]).unwrap();
        assert!(matches!(agg.roll_up(), Err(EdaError::InvalidGrouping(_))));
    }

    #[test]
    fn test_composite_keys_sorted_and_labelled() {
        let agg =
            Aggregator::sales_and_profit(&sample(), &[Field::Region, Field::State]).unwrap();
        assert_eq!(
            agg.labels(),
            vec![
                "Central / Illinois",
                "Central / Texas",
                "East / New York",
                "West / California",
                "West / Washington",
            ]
        );
        assert_eq!(
            agg.value(&["West", "California"], Field::Sales).unwrap(),
            Some(112.5)
        );
        assert_eq!(agg.value(&["West", "Texas"], Field::Sales).unwrap(), None);
    }

    #[test]
    fn test_partition_by_first_key() {
        let agg =
            Aggregator::sales_and_profit(&sample(), &[Field::Region, Field::State]).unwrap();
        let parts = agg.partition().unwrap();

        let names: Vec<&str> = parts.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["Central", "East", "West"]);

        let (_, west) = &parts[2];
        assert_eq!(west.keys(), &[Field::State]);
        assert_eq!(west.labels(), vec!["California", "Washington"]);
        assert_eq!(west.series(Field::Profit).unwrap(), vec![22.5, -5.0]);
    }

    #[test]
    fn test_insertion_order() {
        let agg = Aggregator::aggregate(
            &sample(),
            &[Field::Region],
            &[Field::Sales],
            KeyOrder::Insertion,
        )
        .unwrap();
        assert_eq!(agg.labels(), vec!["West", "East", "Central"]);
        assert_eq!(agg.order(), KeyOrder::Insertion);
    }

    #[test]
    fn test_discount_keys() {
        let agg = Aggregator::sales_and_profit(&sample(), &[Field::Discount]).unwrap();
        assert_eq!(agg.labels(), vec!["0", "0.2", "0.5"]);
        assert!(approx(agg.value(&["0.2"], Field::Sales).unwrap().unwrap(), 130.0));
    }

    #[test]
    fn test_loss_making() {
        let agg = Aggregator::sales_and_profit(&sample(), &[Field::State]).unwrap();
        assert_eq!(
            agg.loss_making(Field::Profit).unwrap(),
            vec!["Illinois", "Texas", "Washington"]
        );
    }

    #[test]
    fn test_dropped_key_is_unknown_field() {
        let mut ds = sample();
        ds.drop_column(Field::PostalCode);
        let err = Aggregator::sales_and_profit(&ds, &[Field::PostalCode]).unwrap_err();
        assert!(matches!(err, EdaError::UnknownField(ref f) if f == "Postal Code"));
    }

    #[test]
    fn test_unknown_name_is_unknown_field() {
        let err = Aggregator::aggregate_by_name(
            &sample(),
            &["Order Date"],
            &["Sales"],
            KeyOrder::Lexicographic,
        )
        .unwrap_err();
        assert!(matches!(err, EdaError::UnknownField(ref f) if f == "Order Date"));
    }

    #[test]
    fn test_non_numeric_measure_rejected() {
        let err = Aggregator::aggregate(
            &sample(),
            &[Field::Region],
            &[Field::City],
            KeyOrder::Lexicographic,
        )
        .unwrap_err();
        assert!(matches!(err, EdaError::NotAMeasure(ref f) if f == "City"));
    }

    #[test]
    fn test_key_count_validated() {
        let ds = sample();
        assert!(matches!(
            Aggregator::sales_and_profit(&ds, &[]),
            Err(EdaError::InvalidGrouping(_))
        ));
        assert!(matches!(
            Aggregator::sales_and_profit(&ds, &[Field::Region, Field::State, Field::City]),
            Err(EdaError::InvalidGrouping(_))
        ));
    }

    #[test]
    fn test_series_for_missing_measure() {
        let agg = Aggregator::aggregate(
            &sample(),
            &[Field::Region],
            &[Field::Sales],
            KeyOrder::Lexicographic,
        )
        .unwrap();
        assert!(matches!(
            agg.series(Field::Profit),
            Err(EdaError::UnknownField(_))
        ));
    }

    #[test]
    fn test_empty_dataset_gives_empty_aggregate() {
        let agg = Aggregator::sales_and_profit(&Dataset::new(Vec::new()), &[Field::Region])
            .unwrap();
        assert!(agg.is_empty());
    }
}

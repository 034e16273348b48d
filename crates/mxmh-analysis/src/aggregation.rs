//! Grouping and summary engine
//!
//! An [`Aggregation`] groups records by one or more [`Dimension`]s and
//! computes per-group [`Aggregate`]s. Every chart table in
//! [`views`](crate::views) is a thin layer over it.
//!
//! # Null handling
//!
//! - A record with a null value in any grouping dimension is excluded.
//! - A record with a null value in a *required* measure is excluded before
//!   grouping, so it does not count towards group sizes or percentages.
//! - Other aggregates ignore nulls of their own measure. A group in which
//!   every value is null yields `None`, never a fabricated `0`.
//!
//! # Percentages
//!
//! A row's percentage is its count over the total count of the rows that
//! survived filtering, times 100. Percentages of a table sum to 100.
//!
//! # Melting
//!
//! Grouping by [`Dimension::Condition`] or asking for
//! [`Measure::MeltedScore`] turns each record into four rows, one per
//! condition, whose melted score is that condition's score. This is how the
//! genre × condition heatmap groups by (genre, condition).
//!
//! # Examples
//!
//! ```
//! use mxmh_analysis::{
//!     aggregation::{Aggregate, Aggregation, Dimension, Measure, SortOrder},
//!     record::Record,
//! };
//!
//! let records = [("Rock", 2.0), ("Rock", 4.0), ("Jazz", 1.0)]
//!     .into_iter()
//!     .map(|(genre, hours)| Record {
//!         fav_genre: Some(genre.to_owned()),
//!         hours_per_day: Some(hours),
//!         ..Record::default()
//!     })
//!     .collect::<Vec<_>>();
//!
//! let table = Aggregation::by([Dimension::FavGenre])
//!     .aggregate(Aggregate::Mean(Measure::HoursPerDay))
//!     .sort(SortOrder::CountDescending)
//!     .run(&records);
//!
//! assert_eq!(table.rows[0].key[0].to_string(), "Rock");
//! assert_eq!(table.rows[0].measures[0], Some(3.0));
//! ```

use std::{collections::BTreeMap, fmt};

use mxmh_stats::descriptive;
use serde::Serialize;

use crate::{
    dataset::{
        AGE_COLUMN, FAV_GENRE_COLUMN, FREQUENCY_PREFIX, HOURS_COLUMN, MUSIC_EFFECTS_COLUMN,
        STREAMING_SERVICE_COLUMN,
    },
    record::{Condition, ListeningFrequency, MusicEffect, Record},
};

/// A grouping dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dimension {
    Age,
    FavGenre,
    StreamingService,
    MusicEffects,
    /// Listening frequency of the given genre.
    Frequency(String),
    /// The condition of a melted row.
    Condition,
}

impl Dimension {
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Age => AGE_COLUMN.to_owned(),
            Self::FavGenre => FAV_GENRE_COLUMN.to_owned(),
            Self::StreamingService => STREAMING_SERVICE_COLUMN.to_owned(),
            Self::MusicEffects => MUSIC_EFFECTS_COLUMN.to_owned(),
            Self::Frequency(genre) => format!("{FREQUENCY_PREFIX}{genre}]"),
            Self::Condition => "Condition".to_owned(),
        }
    }

    fn value(&self, row: Row<'_>) -> Option<KeyValue> {
        let record = row.record;
        match self {
            Self::Age => record.age.map(|age| KeyValue::Int(i64::from(age))),
            Self::FavGenre => record.fav_genre.clone().map(KeyValue::Text),
            Self::StreamingService => record.primary_streaming_service.clone().map(KeyValue::Text),
            Self::MusicEffects => record.music_effects.map(KeyValue::Effect),
            Self::Frequency(genre) => record.frequency(genre).map(KeyValue::Frequency),
            Self::Condition => row.condition.map(KeyValue::Condition),
        }
    }
}

/// One component of a group key.
///
/// Within a dimension all values share a variant, so the derived order sorts
/// ages numerically, text alphabetically and frequencies by rank.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum KeyValue {
    Int(i64),
    Text(String),
    Frequency(ListeningFrequency),
    Effect(MusicEffect),
    Condition(Condition),
}

impl KeyValue {
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => fmt::Display::fmt(n, f),
            Self::Text(s) => fmt::Display::fmt(s, f),
            Self::Frequency(freq) => fmt::Display::fmt(freq, f),
            Self::Effect(effect) => fmt::Display::fmt(effect, f),
            Self::Condition(condition) => fmt::Display::fmt(condition, f),
        }
    }
}

pub type GroupKey = Vec<KeyValue>;

/// A numeric quantity read from a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    Age,
    HoursPerDay,
    Condition(Condition),
    /// Score of the condition a melted row stands for.
    MeltedScore,
}

impl Measure {
    #[must_use]
    pub fn name(self) -> String {
        match self {
            Self::Age => AGE_COLUMN.to_owned(),
            Self::HoursPerDay => HOURS_COLUMN.to_owned(),
            Self::Condition(condition) => condition.column().to_owned(),
            Self::MeltedScore => "Score".to_owned(),
        }
    }

    /// Value of the measure for a single, unmelted record.
    #[must_use]
    pub fn of_record(self, record: &Record) -> Option<f64> {
        self.value(Row {
            record,
            condition: None,
        })
    }

    fn value(self, row: Row<'_>) -> Option<f64> {
        let record = row.record;
        match self {
            Self::Age => record.age.map(f64::from),
            Self::HoursPerDay => record.hours_per_day,
            Self::Condition(condition) => record.score(condition),
            Self::MeltedScore => row.condition.and_then(|c| record.score(c)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    Mean(Measure),
    Median(Measure),
    Sum(Measure),
    /// Number of non-null values of the measure.
    NonNullCount(Measure),
}

impl Aggregate {
    #[must_use]
    pub fn measure(self) -> Measure {
        match self {
            Self::Mean(m) | Self::Median(m) | Self::Sum(m) | Self::NonNullCount(m) => m,
        }
    }

    #[must_use]
    pub fn name(self) -> String {
        let func = match self {
            Self::Mean(_) => "mean",
            Self::Median(_) => "median",
            Self::Sum(_) => "sum",
            Self::NonNullCount(_) => "count",
        };
        format!("{func}({})", self.measure().name())
    }

    #[expect(clippy::cast_precision_loss)]
    fn compute(self, values: &[f64]) -> Option<f64> {
        match self {
            Self::Mean(_) => descriptive::mean(values.iter().copied()),
            Self::Median(_) => descriptive::median(values.iter().copied()),
            Self::Sum(_) => (!values.is_empty()).then(|| values.iter().sum()),
            Self::NonNullCount(_) => Some(values.len() as f64),
        }
    }
}

/// Row order of an aggregation table.
///
/// Every order other than [`SortOrder::KeyAscending`] breaks ties by
/// ascending key. Absent measures sort last.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    KeyAscending,
    CountDescending,
    /// Ascending by the measure at the given aggregate index.
    MeasureAscending(usize),
    /// Descending by the measure at the given aggregate index.
    MeasureDescending(usize),
}

/// One group of an aggregation table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupRow {
    pub key: GroupKey,
    pub count: usize,
    pub percentage: f64,
    /// One value per requested aggregate, in request order.
    pub measures: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationTable {
    /// Names of the key dimensions.
    pub dimensions: Vec<String>,
    /// Names of the aggregates, matching [`GroupRow::measures`].
    pub aggregates: Vec<String>,
    /// Number of rows that survived filtering.
    pub total: usize,
    pub rows: Vec<GroupRow>,
}

#[derive(Debug, Clone, Copy)]
struct Row<'a> {
    record: &'a Record,
    condition: Option<Condition>,
}

/// Builder and runner of a grouping query.
#[derive(Debug, Clone)]
pub struct Aggregation {
    keys: Vec<Dimension>,
    aggregates: Vec<Aggregate>,
    required: Vec<Measure>,
    order: SortOrder,
}

impl Aggregation {
    #[must_use]
    pub fn by<I>(keys: I) -> Self
    where
        I: IntoIterator<Item = Dimension>,
    {
        Self {
            keys: keys.into_iter().collect(),
            aggregates: vec![],
            required: vec![],
            order: SortOrder::default(),
        }
    }

    #[must_use]
    pub fn aggregate(mut self, aggregate: Aggregate) -> Self {
        self.aggregates.push(aggregate);
        self
    }

    /// Excludes rows where `measure` is null before grouping.
    #[must_use]
    pub fn require(mut self, measure: Measure) -> Self {
        self.required.push(measure);
        self
    }

    #[must_use]
    pub fn sort(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    fn melts(&self) -> bool {
        self.keys.contains(&Dimension::Condition)
            || self.required.contains(&Measure::MeltedScore)
            || self
                .aggregates
                .iter()
                .any(|a| a.measure() == Measure::MeltedScore)
    }

    /// Rows that pass the dimension and required-measure filters, with their
    /// group key.
    fn keyed_rows<'r, I>(&self, records: I) -> impl Iterator<Item = (GroupKey, Row<'r>)>
    where
        I: IntoIterator<Item = &'r Record>,
    {
        let conditions = if self.melts() {
            Condition::ALL.map(Some).to_vec()
        } else {
            vec![None]
        };
        records
            .into_iter()
            .flat_map(move |record| {
                conditions
                    .clone()
                    .into_iter()
                    .map(move |condition| Row { record, condition })
            })
            .filter_map(|row| {
                if self.required.iter().any(|m| m.value(row).is_none()) {
                    return None;
                }
                let key = self
                    .keys
                    .iter()
                    .map(|dim| dim.value(row))
                    .collect::<Option<GroupKey>>()?;
                Some((key, row))
            })
    }

    /// Non-null values of `measure` per group, in key order.
    ///
    /// Groups whose every value is null are omitted.
    #[must_use]
    pub fn group_values<'r, I>(&self, records: I, measure: Measure) -> BTreeMap<GroupKey, Vec<f64>>
    where
        I: IntoIterator<Item = &'r Record>,
    {
        let mut groups = BTreeMap::<GroupKey, Vec<f64>>::new();
        for (key, row) in self.keyed_rows(records) {
            if let Some(value) = measure.value(row) {
                groups.entry(key).or_default().push(value);
            }
        }
        groups
    }

    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn run<'r, I>(&self, records: I) -> AggregationTable
    where
        I: IntoIterator<Item = &'r Record>,
    {
        let mut groups = BTreeMap::<GroupKey, (usize, Vec<Vec<f64>>)>::new();
        for (key, row) in self.keyed_rows(records) {
            let (count, values) = groups
                .entry(key)
                .or_insert_with(|| (0, vec![vec![]; self.aggregates.len()]));
            *count += 1;
            for (aggregate, values) in self.aggregates.iter().zip(values) {
                if let Some(value) = aggregate.measure().value(row) {
                    values.push(value);
                }
            }
        }

        let total = groups.values().map(|(count, _)| count).sum::<usize>();
        let mut rows = groups
            .into_iter()
            .map(|(key, (count, values))| GroupRow {
                key,
                count,
                percentage: count as f64 / total as f64 * 100.0,
                measures: self
                    .aggregates
                    .iter()
                    .zip(&values)
                    .map(|(aggregate, values)| aggregate.compute(values))
                    .collect(),
            })
            .collect::<Vec<_>>();
        sort_rows(&mut rows, self.order);

        AggregationTable {
            dimensions: self.keys.iter().map(Dimension::name).collect(),
            aggregates: self.aggregates.iter().map(|a| a.name()).collect(),
            total,
            rows,
        }
    }
}

fn cmp_measure(a: Option<f64>, b: Option<f64>) -> std::cmp::Ordering {
    use std::cmp::Ordering;
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn sort_rows(rows: &mut [GroupRow], order: SortOrder) {
    let measure = |row: &GroupRow, idx: usize| row.measures.get(idx).copied().flatten();
    match order {
        SortOrder::KeyAscending => rows.sort_by(|a, b| a.key.cmp(&b.key)),
        SortOrder::CountDescending => {
            rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
        }
        SortOrder::MeasureAscending(idx) => rows.sort_by(|a, b| {
            cmp_measure(measure(a, idx), measure(b, idx)).then_with(|| a.key.cmp(&b.key))
        }),
        SortOrder::MeasureDescending(idx) => rows.sort_by(|a, b| {
            // negate so that absent values still sort last
            let neg = |v: Option<f64>| v.map(|v| -v);
            cmp_measure(neg(measure(a, idx)), neg(measure(b, idx)))
                .then_with(|| a.key.cmp(&b.key))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genre_hours(rows: &[(&str, Option<f64>)]) -> Vec<Record> {
        rows.iter()
            .map(|(genre, hours)| Record {
                fav_genre: Some((*genre).to_owned()),
                hours_per_day: *hours,
                ..Record::default()
            })
            .collect()
    }

    fn keys(table: &AggregationTable) -> Vec<String> {
        table.rows.iter().map(|r| r.key[0].to_string()).collect()
    }

    #[test]
    fn test_percentages_sum_to_100() {
        let records = genre_hours(&[
            ("Rock", Some(1.0)),
            ("Pop", Some(2.0)),
            ("Rock", None),
            ("Jazz", Some(0.5)),
            ("Pop", Some(3.0)),
            ("Rock", Some(7.0)),
        ]);
        let table = Aggregation::by([Dimension::FavGenre]).run(&records);
        let sum = table.rows.iter().map(|r| r.percentage).sum::<f64>();
        assert!((sum - 100.0).abs() < 1e-6);
        assert_eq!(table.total, 6);
    }

    #[test]
    fn test_median_ascending_breaks_ties_alphabetically() {
        let records = genre_hours(&[
            ("A", Some(3.0)),
            ("C", Some(1.0)),
            ("B", Some(1.0)),
            ("A", Some(3.0)),
        ]);
        let table = Aggregation::by([Dimension::FavGenre])
            .aggregate(Aggregate::Median(Measure::HoursPerDay))
            .sort(SortOrder::MeasureAscending(0))
            .run(&records);
        assert_eq!(keys(&table), ["B", "C", "A"]);
    }

    #[test]
    fn test_music_effects_shares() {
        let records = [
            MusicEffect::Improve,
            MusicEffect::Improve,
            MusicEffect::NoEffect,
            MusicEffect::Worsen,
            MusicEffect::Improve,
        ]
        .into_iter()
        .map(|effect| Record {
            music_effects: Some(effect),
            ..Record::default()
        })
        .collect::<Vec<_>>();
        let table = Aggregation::by([Dimension::MusicEffects])
            .sort(SortOrder::CountDescending)
            .run(&records);
        let expected = [("Improve", 3, 60.0), ("No effect", 1, 20.0), ("Worsen", 1, 20.0)];
        assert_eq!(table.rows.len(), expected.len());
        for (row, (label, count, percentage)) in table.rows.iter().zip(expected) {
            assert_eq!(row.key[0].to_string(), label);
            assert_eq!(row.count, count);
            assert!((row.percentage - percentage).abs() < 1e-9);
        }
    }

    #[test]
    fn test_null_group_key_is_excluded() {
        let mut records = genre_hours(&[("Rock", Some(1.0)), ("Pop", Some(2.0))]);
        records.push(Record::default());
        let table = Aggregation::by([Dimension::FavGenre]).run(&records);
        assert_eq!(table.total, 2);
        assert_eq!(keys(&table), ["Pop", "Rock"]);
    }

    #[test]
    fn test_all_null_measure_is_absent() {
        let records = genre_hours(&[("Rock", None), ("Pop", Some(2.0))]);
        let table = Aggregation::by([Dimension::FavGenre])
            .aggregate(Aggregate::Mean(Measure::HoursPerDay))
            .aggregate(Aggregate::Sum(Measure::HoursPerDay))
            .sort(SortOrder::MeasureDescending(0))
            .run(&records);
        assert_eq!(keys(&table), ["Pop", "Rock"]);
        assert_eq!(table.rows[1].measures, [None, None]);
        assert_eq!(table.aggregates, ["mean(Hours per day)", "sum(Hours per day)"]);
    }

    #[test]
    fn test_required_measure_filters_before_counting() {
        let records = genre_hours(&[("Rock", None), ("Rock", Some(2.0)), ("Pop", Some(2.0))]);
        let table = Aggregation::by([Dimension::FavGenre])
            .require(Measure::HoursPerDay)
            .run(&records);
        assert_eq!(table.total, 2);
        assert!(table.rows.iter().all(|r| r.count == 1));
    }

    #[test]
    fn test_ages_sort_numerically() {
        let records = [30, 9, 100, 9]
            .into_iter()
            .map(|age| Record {
                age: Some(age),
                ..Record::default()
            })
            .collect::<Vec<_>>();
        let table = Aggregation::by([Dimension::Age]).run(&records);
        assert_eq!(keys(&table), ["9", "30", "100"]);
        assert_eq!(table.rows[0].count, 2);
    }

    #[test]
    fn test_condition_melt() {
        let mut record = Record {
            fav_genre: Some("Rock".to_owned()),
            ..Record::default()
        };
        for (c, v) in Condition::ALL.into_iter().zip([1.0, 2.0, 3.0, 4.0]) {
            record.scores.set(c, Some(v));
        }
        let records = vec![record.clone(), record];
        let table = Aggregation::by([Dimension::FavGenre, Dimension::Condition])
            .aggregate(Aggregate::Mean(Measure::MeltedScore))
            .run(&records);
        assert_eq!(table.rows.len(), 4);
        assert_eq!(table.total, 8);
        let ocd = &table.rows[3];
        assert_eq!(ocd.key[1], KeyValue::Condition(Condition::Ocd));
        assert_eq!(ocd.measures[0], Some(4.0));
    }

    #[test]
    fn test_group_values() {
        let records = genre_hours(&[("Rock", Some(1.0)), ("Rock", None), ("Rock", Some(3.0))]);
        let groups =
            Aggregation::by([Dimension::FavGenre]).group_values(&records, Measure::HoursPerDay);
        assert_eq!(groups[&vec![KeyValue::Text("Rock".to_owned())]], [1.0, 3.0]);
    }

    #[test]
    fn test_melted_score_without_condition_key() {
        let scores = [[1.0, 2.0, 3.0, 6.0], [5.0, 5.0, 5.0, 5.0], [2.0, 2.0, 2.0, 2.0]];
        let records = ["Rock", "Pop", "Jazz"]
            .into_iter()
            .zip(scores)
            .map(|(genre, values)| {
                let mut record = Record {
                    fav_genre: Some(genre.to_owned()),
                    ..Record::default()
                };
                for (c, v) in Condition::ALL.into_iter().zip(values) {
                    record.scores.set(c, Some(v));
                }
                record
            })
            .collect::<Vec<_>>();
        let table = Aggregation::by([Dimension::FavGenre])
            .aggregate(Aggregate::Mean(Measure::MeltedScore))
            .sort(SortOrder::MeasureDescending(0))
            .run(&records);
        assert_eq!(keys(&table), ["Pop", "Rock", "Jazz"]);
        assert_eq!(table.rows[1].measures[0], Some(3.0));
    }
}

//! Dataset overview
//!
//! A quick look at the cleaned table: size, collection period and the
//! distribution of every numeric column.

use chrono::NaiveDateTime;
use mxmh_stats::descriptive::DescriptiveStats;
use serde::Serialize;

use crate::{aggregation::Measure, dataset::Dataset, record::Condition};

#[derive(Debug, Clone, Serialize)]
pub struct NumericColumn {
    pub name: String,
    /// Records with a value in this column.
    pub non_null: usize,
    /// `None` when the column has no values.
    pub stats: Option<DescriptiveStats>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatasetSummary {
    pub records: usize,
    pub removed_outliers: usize,
    pub first_response: Option<NaiveDateTime>,
    pub last_response: Option<NaiveDateTime>,
    pub genres: Vec<String>,
    pub columns: Vec<NumericColumn>,
}

#[must_use]
pub fn dataset_summary(dataset: &Dataset) -> DatasetSummary {
    let measures = [Measure::Age, Measure::HoursPerDay]
        .into_iter()
        .chain(Condition::ALL.map(Measure::Condition));
    let columns = measures
        .map(|measure| {
            let values = dataset
                .records()
                .iter()
                .filter_map(|r| measure.of_record(r))
                .collect::<Vec<_>>();
            NumericColumn {
                name: measure.name(),
                non_null: values.len(),
                stats: DescriptiveStats::new(values),
            }
        })
        .collect();

    let timestamps = || dataset.records().iter().filter_map(|r| r.timestamp);
    DatasetSummary {
        records: dataset.len(),
        removed_outliers: dataset.removed_outliers(),
        first_response: timestamps().min(),
        last_response: timestamps().max(),
        genres: dataset.genres().to_vec(),
        columns,
    }
}

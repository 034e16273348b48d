//! Listening habits
//!
//! Tables behind the age histogram, the streaming platform pie chart, the
//! hours-by-genre box plot, the mean-hours-by-age line, the favorite genre
//! bar chart and the per-genre listening frequency chart.

use mxmh_stats::summary::BoxSummary;
use serde::Serialize;

use super::{Share, age_key, shares, text_key};
use crate::{
    aggregation::{Aggregate, Aggregation, Dimension, KeyValue, Measure, SortOrder},
    dataset::Dataset,
    record::ListeningFrequency,
    selection::SelectionError,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgeDistribution {
    /// Largest age included in the histogram.
    pub max_age: u32,
    /// Respondents per age up to `max_age`; percentages are relative to
    /// these bins only.
    pub bins: Vec<Share<u32>>,
    /// Respondents per age above `max_age`.
    pub excluded: Vec<AgeCount>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AgeCount {
    pub age: u32,
    pub count: usize,
}

/// Age histogram, with ages above `max_age` tabulated separately.
#[must_use]
pub fn age_distribution(dataset: &Dataset, max_age: u32) -> AgeDistribution {
    let by_age = Aggregation::by([Dimension::Age]);
    let included = dataset
        .records()
        .iter()
        .filter(|r| r.age.is_some_and(|age| age <= max_age));
    let excluded = dataset
        .records()
        .iter()
        .filter(|r| r.age.is_some_and(|age| age > max_age));

    AgeDistribution {
        max_age,
        bins: shares(by_age.run(included), age_key),
        excluded: by_age
            .run(excluded)
            .rows
            .into_iter()
            .filter_map(|row| {
                Some(AgeCount {
                    age: age_key(row.key.first()?)?,
                    count: row.count,
                })
            })
            .collect(),
    }
}

/// Respondents per primary streaming service, most used first.
#[must_use]
pub fn streaming_platforms(dataset: &Dataset) -> Vec<Share<String>> {
    let table = Aggregation::by([Dimension::StreamingService])
        .sort(SortOrder::CountDescending)
        .run(dataset.records());
    shares(table, text_key)
}

/// Respondents per favorite genre, most popular first.
#[must_use]
pub fn favorite_genres(dataset: &Dataset) -> Vec<Share<String>> {
    let table = Aggregation::by([Dimension::FavGenre])
        .sort(SortOrder::CountDescending)
        .run(dataset.records());
    shares(table, text_key)
}

#[derive(Debug, Clone, Serialize)]
pub struct GenreHours {
    pub genre: String,
    #[serde(flatten)]
    pub summary: BoxSummary,
}

/// Distribution of daily listening hours per favorite genre.
///
/// Ordered by median ascending; genres with equal medians are ordered
/// alphabetically.
#[must_use]
pub fn genre_hours(dataset: &Dataset) -> Vec<GenreHours> {
    let groups = Aggregation::by([Dimension::FavGenre])
        .group_values(dataset.records(), Measure::HoursPerDay);
    let mut rows = groups
        .into_iter()
        .filter_map(|(key, values)| {
            Some(GenreHours {
                genre: text_key(key.first()?)?,
                summary: BoxSummary::new(values)?,
            })
        })
        .collect::<Vec<_>>();
    rows.sort_by(|a, b| {
        a.summary
            .median
            .total_cmp(&b.summary.median)
            .then_with(|| a.genre.cmp(&b.genre))
    });
    rows
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AgeHours {
    pub age: u32,
    pub mean_hours: f64,
    /// Respondents of this age with a known hours value.
    pub count: usize,
}

/// Mean daily listening hours per age, youngest first.
#[must_use]
pub fn mean_hours_by_age(dataset: &Dataset) -> Vec<AgeHours> {
    Aggregation::by([Dimension::Age])
        .require(Measure::HoursPerDay)
        .aggregate(Aggregate::Mean(Measure::HoursPerDay))
        .run(dataset.records())
        .rows
        .into_iter()
        .filter_map(|row| {
            Some(AgeHours {
                age: age_key(row.key.first()?)?,
                mean_hours: row.measures.first().copied().flatten()?,
                count: row.count,
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreFrequency {
    pub genre: String,
    /// One entry per answered level, `Never` first.
    pub levels: Vec<Share<ListeningFrequency>>,
}

/// Distribution of listening frequency answers for one genre.
pub fn genre_frequency(dataset: &Dataset, genre: &str) -> Result<GenreFrequency, SelectionError> {
    let genre = dataset.frequency_genre(genre)?.to_owned();
    let table = Aggregation::by([Dimension::Frequency(genre.clone())]).run(dataset.records());
    let levels = shares(table, |key| match key {
        KeyValue::Frequency(freq) => Some(*freq),
        _ => None,
    });
    tracing::debug!(%genre, levels = levels.len(), "computed genre frequency");
    Ok(GenreFrequency { genre, levels })
}

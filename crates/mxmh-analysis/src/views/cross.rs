//! Cross analyses
//!
//! Music effects, the condition correlation matrix, the genre × condition
//! heatmap and the condition regression on age and listening hours.

use mxmh_stats::{
    correlation::{CorrelationError, CorrelationMatrix},
    grid,
    regression::{FitError, PlaneFit},
};
use serde::Serialize;

use super::{Share, shares, text_key};
use crate::{
    aggregation::{Aggregate, Aggregation, Dimension, KeyValue, Measure, SortOrder},
    dataset::Dataset,
    record::{Condition, MusicEffect, Record},
};

/// Respondents per perceived effect of music, most common first.
#[must_use]
pub fn music_effects(dataset: &Dataset) -> Vec<Share<MusicEffect>> {
    let table = Aggregation::by([Dimension::MusicEffects])
        .sort(SortOrder::CountDescending)
        .run(dataset.records());
    shares(table, |key| match key {
        KeyValue::Effect(effect) => Some(*effect),
        _ => None,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CorrelationCell {
    pub row: Condition,
    pub column: Condition,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionCorrelation {
    /// Respondents with all four scores, the rows the matrix is computed on.
    pub rows: usize,
    /// All `N²` cells, row-major in [`Condition::ALL`] order.
    pub cells: Vec<CorrelationCell>,
}

/// Pearson correlation between every pair of condition scores.
///
/// Respondents missing any of the four scores are left out entirely, so
/// every cell is computed on the same rows.
pub fn condition_correlation(dataset: &Dataset) -> Result<ConditionCorrelation, CorrelationError> {
    let complete = dataset
        .records()
        .iter()
        .filter_map(|r| r.scores.complete())
        .collect::<Vec<_>>();
    let columns = (0..Condition::ALL.len())
        .map(|i| complete.iter().map(|scores| scores[i]).collect::<Vec<_>>())
        .collect::<Vec<_>>();
    let matrix = CorrelationMatrix::from_columns(&columns)?;
    let cells = matrix
        .iter()
        .map(|(i, j, value)| CorrelationCell {
            row: Condition::ALL[i],
            column: Condition::ALL[j],
            value,
        })
        .collect();
    Ok(ConditionCorrelation {
        rows: complete.len(),
        cells,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapCell {
    pub genre: String,
    pub condition: Condition,
    pub mean: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreHeatmap {
    /// Column order: highest overall mean score first, ties alphabetical.
    pub genres: Vec<String>,
    /// One cell per (genre, condition), in `genres` then condition order.
    pub cells: Vec<HeatmapCell>,
}

/// Mean condition scores per favorite genre.
///
/// Only respondents with a favorite genre and all four scores take part.
#[must_use]
pub fn genre_condition_heatmap(dataset: &Dataset) -> GenreHeatmap {
    let complete = || {
        dataset
            .records()
            .iter()
            .filter(|r| r.fav_genre.is_some() && r.scores.complete().is_some())
    };

    let genres = Aggregation::by([Dimension::FavGenre])
        .aggregate(Aggregate::Mean(Measure::MeltedScore))
        .sort(SortOrder::MeasureDescending(0))
        .run(complete())
        .rows
        .into_iter()
        .filter_map(|row| text_key(row.key.first()?))
        .collect::<Vec<_>>();

    let table = Aggregation::by([Dimension::FavGenre, Dimension::Condition])
        .aggregate(Aggregate::Mean(Measure::MeltedScore))
        .run(complete());
    let mut cells = table
        .rows
        .into_iter()
        .filter_map(|row| match (row.key.as_slice(), row.measures.first()) {
            ([KeyValue::Text(genre), KeyValue::Condition(condition)], Some(Some(mean))) => {
                Some(HeatmapCell {
                    genre: genre.clone(),
                    condition: *condition,
                    mean: *mean,
                })
            }
            _ => None,
        })
        .collect::<Vec<_>>();
    cells.sort_by_key(|cell| {
        (
            genres.iter().position(|g| *g == cell.genre),
            cell.condition,
        )
    });

    GenreHeatmap { genres, cells }
}

/// A least-squares model `score = intercept + coef_age·age + coef_hours·hours`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegressionModel {
    pub response: Condition,
    pub intercept: f64,
    pub coef_age: f64,
    pub coef_hours: f64,
    pub rows: usize,
    pub r_squared: Option<f64>,
}

impl RegressionModel {
    #[must_use]
    pub fn predict(&self, age: f64, hours: f64) -> f64 {
        self.intercept + self.coef_age * age + self.coef_hours * hours
    }
}

/// Model predictions on a regular grid.
///
/// `predictions[h][a]` is the prediction at `(ages[a], hours[h])`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegressionSurface {
    pub ages: Vec<f64>,
    pub hours: Vec<f64>,
    pub predictions: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ObservedPoint {
    pub age: f64,
    pub hours: f64,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Regression {
    pub model: RegressionModel,
    pub surface: RegressionSurface,
    /// The rows the model was fitted on.
    pub points: Vec<ObservedPoint>,
}

fn observed_point(record: &Record, response: Condition) -> Option<ObservedPoint> {
    Some(ObservedPoint {
        age: f64::from(record.age?),
        hours: record.hours_per_day?,
        score: record.score(response)?,
    })
}

/// Fits `response` on age and daily listening hours and samples the fitted
/// plane on a `grid_size × grid_size` grid spanning the observed ranges.
///
/// Refits from scratch on every call. A `grid_size` below
/// [`MIN_GRID`](mxmh_stats::regression::MIN_GRID) fails with
/// [`FitError::GridTooSmall`].
pub fn regression(
    dataset: &Dataset,
    response: Condition,
    grid_size: usize,
) -> Result<Regression, FitError> {
    let points = dataset
        .records()
        .iter()
        .filter_map(|r| observed_point(r, response))
        .collect::<Vec<_>>();
    let x = points.iter().map(|p| [p.age, p.hours]).collect::<Vec<_>>();
    let y = points.iter().map(|p| p.score).collect::<Vec<_>>();

    let fit = PlaneFit::fit(&x, &y)?;
    tracing::info!(
        %response,
        rows = fit.rows,
        intercept = fit.intercept,
        coef_age = fit.coefficients[0],
        coef_hours = fit.coefficients[1],
        "fitted regression plane"
    );

    let insufficient = || FitError::InsufficientData { rows: points.len() };
    let age_range = grid::extent(points.iter().map(|p| p.age)).ok_or_else(insufficient)?;
    let hours_range = grid::extent(points.iter().map(|p| p.hours)).ok_or_else(insufficient)?;
    let plane = fit.surface(age_range, hours_range, grid_size)?;

    Ok(Regression {
        model: RegressionModel {
            response,
            intercept: fit.intercept,
            coef_age: fit.coefficients[0],
            coef_hours: fit.coefficients[1],
            rows: fit.rows,
            r_squared: fit.r_squared,
        },
        surface: RegressionSurface {
            ages: plane.x1,
            hours: plane.x2,
            predictions: plane.z,
        },
        points,
    })
}

//! Condition scores
//!
//! Density curves of the four condition scores (line chart and violin plot)
//! and the per-age mean score behind the bubble chart.

use mxmh_stats::density::{DensityCurve, DensityDomain, DensityEstimator};
use serde::Serialize;

use super::age_key;
use crate::{
    aggregation::{Aggregate, Aggregation, Dimension, Measure},
    config::AnalysisConfig,
    dataset::Dataset,
    record::Condition,
};

/// Density of one category, or the reason there is none.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DensitySeries {
    Curve(DensityCurve),
    /// Too few observations to estimate a density.
    Empty { observations: usize },
}

impl DensitySeries {
    #[must_use]
    pub fn curve(&self) -> Option<&DensityCurve> {
        match self {
            Self::Curve(curve) => Some(curve),
            Self::Empty { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConditionDensity {
    pub condition: Condition,
    pub series: DensitySeries,
}

/// Density curves of the selected conditions, in the requested order.
///
/// Null and non-finite scores are dropped per condition. An empty selection
/// yields an empty list.
#[must_use]
pub fn condition_densities(
    dataset: &Dataset,
    conditions: &[Condition],
    domain: DensityDomain,
    steps: usize,
) -> Vec<ConditionDensity> {
    let estimator = DensityEstimator::new(domain, steps);
    conditions
        .iter()
        .map(|&condition| {
            let scores = dataset
                .records()
                .iter()
                .filter_map(|r| r.score(condition))
                .filter(|score| score.is_finite())
                .collect::<Vec<_>>();
            let series = match estimator.estimate(&scores) {
                Ok(curve) => DensitySeries::Curve(curve),
                Err(err) => {
                    tracing::debug!(%condition, %err, "no density for condition");
                    DensitySeries::Empty {
                        observations: scores.len(),
                    }
                }
            };
            ConditionDensity { condition, series }
        })
        .collect()
}

/// Densities for the violin plot: the configured padded domain, so the
/// tails of the kernels are not cut at the scale limits.
#[must_use]
pub fn condition_violins(
    dataset: &Dataset,
    conditions: &[Condition],
    config: &AnalysisConfig,
) -> Vec<ConditionDensity> {
    condition_densities(
        dataset,
        conditions,
        config.violin_domain,
        config.density_steps,
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AgeScore {
    pub age: u32,
    pub mean_score: f64,
    /// Respondents of this age with a known score (bubble size).
    pub count: usize,
}

/// Mean score of `condition` per age, youngest first.
#[must_use]
pub fn condition_by_age(dataset: &Dataset, condition: Condition) -> Vec<AgeScore> {
    let measure = Measure::Condition(condition);
    Aggregation::by([Dimension::Age])
        .require(measure)
        .aggregate(Aggregate::Mean(measure))
        .run(dataset.records())
        .rows
        .into_iter()
        .filter_map(|row| {
            Some(AgeScore {
                age: age_key(row.key.first()?)?,
                mean_score: row.measures.first().copied().flatten()?,
                count: row.count,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;

    fn scored(age: Option<u32>, anxiety: Option<f64>, ocd: Option<f64>) -> Record {
        let mut record = Record {
            age,
            ..Record::default()
        };
        record.scores.set(Condition::Anxiety, anxiety);
        record.scores.set(Condition::Ocd, ocd);
        record
    }

    fn dataset() -> Dataset {
        let records = vec![
            scored(Some(18), Some(7.0), None),
            scored(Some(18), Some(3.0), Some(1.0)),
            scored(Some(25), Some(5.0), None),
            scored(None, Some(9.0), None),
            scored(Some(25), None, None),
        ];
        Dataset::from_records(records, 89)
    }

    #[test]
    fn test_densities_follow_selection_order() {
        let dataset = dataset();
        let densities = condition_densities(
            &dataset,
            &[Condition::Ocd, Condition::Anxiety, Condition::Depression],
            DensityDomain::new(0.0, 10.0),
            200,
        );
        let order = densities.iter().map(|d| d.condition).collect::<Vec<_>>();
        assert_eq!(order, [Condition::Ocd, Condition::Anxiety, Condition::Depression]);

        assert!(matches!(
            densities[0].series,
            DensitySeries::Empty { observations: 1 }
        ));
        assert!(matches!(
            densities[2].series,
            DensitySeries::Empty { observations: 0 }
        ));

        let anxiety = densities[1].series.curve().unwrap();
        assert_eq!(anxiety.observations, 4);
        assert_eq!(anxiety.samples.len(), 200);
        assert_eq!(anxiety.samples[0].value, 0.0);
        assert_eq!(anxiety.samples[199].value, 10.0);
        assert!(anxiety.samples.iter().all(|s| s.density >= 0.0));
    }

    #[test]
    fn test_identical_scores_give_a_curve() {
        let records = vec![
            scored(Some(20), Some(0.7), Some(f64::NAN)),
            scored(Some(21), Some(0.7), Some(2.0)),
            scored(Some(22), Some(0.7), None),
        ];
        let densities = condition_densities(
            &Dataset::from_records(records, 89),
            &[Condition::Anxiety, Condition::Ocd],
            DensityDomain::new(0.0, 10.0),
            200,
        );
        let anxiety = densities[0].series.curve().unwrap();
        assert!(anxiety.samples.iter().any(|s| s.density > 0.1));
        assert!(matches!(
            densities[1].series,
            DensitySeries::Empty { observations: 1 }
        ));
    }

    #[test]
    fn test_empty_selection() {
        let densities = condition_densities(&dataset(), &[], DensityDomain::new(0.0, 10.0), 200);
        assert!(densities.is_empty());
    }

    #[test]
    fn test_violins_use_padded_domain() {
        let config = AnalysisConfig::default();
        let violins = condition_violins(&dataset(), &[Condition::Anxiety], &config);
        let curve = violins[0].series.curve().unwrap();
        assert_eq!(curve.samples.len(), config.density_steps);
        assert_eq!(curve.samples[0].value, -3.0);
        assert_eq!(curve.samples.last().unwrap().value, 14.0);
        assert!((curve.integral() - 1.0).abs() < 0.05);
    }

    #[test]
    fn test_empty_series_serializes_with_status() {
        let series = DensitySeries::Empty { observations: 1 };
        assert_eq!(
            serde_json::to_value(&series).unwrap(),
            serde_json::json!({ "status": "empty", "observations": 1 })
        );
    }

    #[test]
    fn test_condition_by_age() {
        let rows = condition_by_age(&dataset(), Condition::Anxiety);
        assert_eq!(
            rows,
            [
                AgeScore {
                    age: 18,
                    mean_score: 5.0,
                    count: 2
                },
                AgeScore {
                    age: 25,
                    mean_score: 5.0,
                    count: 1
                },
            ]
        );
    }
}

//! Analysis configuration
//!
//! All knobs have defaults matching the survey dashboard, so an empty JSON
//! object (or no file at all) is a valid configuration:
//!
//! ```json
//! {
//!   "outlier_age": 89,
//!   "max_histogram_age": 70,
//!   "density_steps": 200,
//!   "score_domain": { "start": 0.0, "end": 10.0 },
//!   "violin_domain": { "start": -3.0, "end": 14.0 },
//!   "regression_grid": 10
//! }
//! ```

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use mxmh_stats::{density::DensityDomain, regression::MIN_GRID};
use serde::{Deserialize, Serialize};

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("failed to read config {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[display("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[display("invalid config: {reason}")]
    Invalid {
        #[error(not(source))]
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Age value of the known outlier record removed at load time.
    pub outlier_age: u32,
    /// Ages above this are listed separately from the age histogram.
    pub max_histogram_age: u32,
    /// Number of points each density curve is sampled at.
    pub density_steps: usize,
    /// Evaluation domain of condition-score density curves.
    pub score_domain: DensityDomain,
    /// Padded evaluation domain of violin densities.
    pub violin_domain: DensityDomain,
    /// Points per axis of the regression surface grid.
    pub regression_grid: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            outlier_age: 89,
            max_histogram_age: 70,
            density_steps: 200,
            score_domain: DensityDomain::new(0.0, 10.0),
            violin_domain: DensityDomain::new(-3.0, 14.0),
            regression_grid: 10,
        }
    }
}

impl AnalysisConfig {
    /// Reads and validates a JSON configuration file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: String| Err(ConfigError::Invalid { reason });
        if self.density_steps < 2 {
            return invalid(format!(
                "density_steps must be at least 2, got {}",
                self.density_steps
            ));
        }
        if self.regression_grid < MIN_GRID {
            return invalid(format!(
                "regression_grid must be at least {MIN_GRID}, got {}",
                self.regression_grid
            ));
        }
        for (name, domain) in [
            ("score_domain", self.score_domain),
            ("violin_domain", self.violin_domain),
        ] {
            if !domain.is_valid() {
                return invalid(format!(
                    "{name} must satisfy start < end, got [{}, {}]",
                    domain.start, domain.end
                ));
            }
        }
        Ok(())
    }
}

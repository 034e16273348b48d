use std::path::PathBuf;

use anyhow::Context as _;
use clap::{ArgAction, Parser, Subcommand};
use mxmh_analysis::{config::AnalysisConfig, dataset::Dataset};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use self::{
    conditions::{ConditionArg, DensityArg},
    cross::RegressionArg,
    habits::{AgeDistributionArg, GenreFrequencyArg},
};
use crate::{
    table::Table,
    util::{Output, OutputFormat},
};

mod conditions;
mod cross;
mod habits;
mod summary;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Survey CSV file
    #[arg(long, global = true, default_value = "mxmh_survey_results.csv")]
    data: PathBuf,

    /// JSON analysis configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t)]
    format: OutputFormat,

    /// Write output to this file instead of stdout
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// Increase log verbosity (-v: info, -vv: debug); RUST_LOG overrides
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Which derived table to compute
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Dataset size, collection period and numeric column statistics
    Summary,
    /// Respondents per age, with old ages listed separately
    AgeDistribution(#[clap(flatten)] AgeDistributionArg),
    /// Respondents per primary streaming service
    Platforms,
    /// Box-plot summary of daily listening hours per favorite genre
    GenreHours,
    /// Mean daily listening hours per age
    HoursByAge,
    /// Respondents per favorite genre
    FavoriteGenres,
    /// Listening frequency distribution of one genre
    GenreFrequency(#[clap(flatten)] GenreFrequencyArg),
    /// Perceived effect of music on mental health
    MusicEffects,
    /// Density curves of condition scores
    Density(#[clap(flatten)] DensityArg),
    /// Mean condition score and respondent count per age
    ConditionByAge(#[clap(flatten)] ConditionArg),
    /// Pearson correlation between the four condition scores
    Correlation,
    /// Mean condition scores per favorite genre
    GenreHeatmap,
    /// Regression of a condition score on age and listening hours
    Regression(#[clap(flatten)] RegressionArg),
}

/// Everything a subcommand needs: the loaded dataset, the effective
/// configuration and where to write the result.
pub(crate) struct Runner {
    dataset: Dataset,
    config: AnalysisConfig,
    format: OutputFormat,
    output: Option<PathBuf>,
}

impl Runner {
    fn new(args: &CommandArgs) -> anyhow::Result<Self> {
        let config = match &args.config {
            Some(path) => AnalysisConfig::from_path(path)?,
            None => AnalysisConfig::default(),
        };
        let dataset = Dataset::load(&args.data, &config)
            .with_context(|| format!("Failed to load survey data: {}", args.data.display()))?;
        Ok(Self {
            dataset,
            config,
            format: args.format,
            output: args.output.clone(),
        })
    }

    /// Writes `value` as JSON, or as the tables built by `tables`.
    fn emit<T, F>(&self, value: &T, tables: F) -> anyhow::Result<()>
    where
        T: Serialize,
        F: FnOnce(&T) -> Vec<Table>,
    {
        let mut output = Output::from_output_path(self.output.clone())?;
        match self.format {
            OutputFormat::Json => output.write_json(value),
            OutputFormat::Table => output.write_tables(&tables(value)),
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    init_tracing(args.verbose);
    let runner = Runner::new(&args)?;
    match &args.mode {
        Mode::Summary => summary::run(&runner)?,
        Mode::AgeDistribution(arg) => habits::run_age_distribution(&runner, arg)?,
        Mode::Platforms => habits::run_platforms(&runner)?,
        Mode::GenreHours => habits::run_genre_hours(&runner)?,
        Mode::HoursByAge => habits::run_hours_by_age(&runner)?,
        Mode::FavoriteGenres => habits::run_favorite_genres(&runner)?,
        Mode::GenreFrequency(arg) => habits::run_genre_frequency(&runner, arg)?,
        Mode::MusicEffects => cross::run_music_effects(&runner)?,
        Mode::Density(arg) => conditions::run_density(&runner, arg)?,
        Mode::ConditionByAge(arg) => conditions::run_condition_by_age(&runner, arg)?,
        Mode::Correlation => cross::run_correlation(&runner)?,
        Mode::GenreHeatmap => cross::run_genre_heatmap(&runner)?,
        Mode::Regression(arg) => cross::run_regression(&runner, arg)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory as _;

    use super::*;

    #[test]
    fn test_command_definition() {
        CommandArgs::command().debug_assert();
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let args = CommandArgs::try_parse_from([
            "mxmh",
            "regression",
            "--condition",
            "ocd",
            "--format",
            "table",
            "-vv",
        ])
        .unwrap();
        assert_eq!(args.format, OutputFormat::Table);
        assert_eq!(args.verbose, 2);
        assert!(matches!(args.mode, Mode::Regression(_)));
    }

    #[test]
    fn test_unknown_condition_is_rejected() {
        assert!(
            CommandArgs::try_parse_from(["mxmh", "condition-by-age", "--condition", "stress"])
                .is_err()
        );
    }
}

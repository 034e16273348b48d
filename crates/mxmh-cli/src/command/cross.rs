use clap::Args;
use mxmh_analysis::{
    record::Condition,
    views::cross::{self, ConditionCorrelation, GenreHeatmap, Regression},
};

use super::Runner;
use crate::{table::Table, util::fmt_opt};

#[derive(Debug, Clone, Args)]
pub(crate) struct RegressionArg {
    /// Response condition: Anxiety, Depression, Insomnia or OCD
    #[arg(long)]
    condition: Condition,

    /// Points per axis of the prediction grid [default: from config]
    #[arg(long)]
    grid: Option<usize>,
}

pub(crate) fn run_music_effects(runner: &Runner) -> anyhow::Result<()> {
    let effects = cross::music_effects(&runner.dataset);
    runner.emit(&effects, |shares| {
        let mut table = Table::new(["Effect", "Count", "Percentage"]).titled("Music effects");
        for share in shares {
            table.push_row([
                share.key.to_string(),
                share.count.to_string(),
                format!("{:.2}%", share.percentage),
            ]);
        }
        vec![table]
    })
}

pub(crate) fn run_correlation(runner: &Runner) -> anyhow::Result<()> {
    let correlation = cross::condition_correlation(&runner.dataset)?;
    runner.emit(&correlation, |corr: &ConditionCorrelation| {
        let mut table = Table::new(
            std::iter::once(String::new()).chain(Condition::ALL.iter().map(ToString::to_string)),
        )
        .titled(format!("Pearson correlation ({} complete rows)", corr.rows));
        for row in Condition::ALL {
            let values = corr
                .cells
                .iter()
                .filter(|cell| cell.row == row)
                .map(|cell| format!("{:.3}", cell.value));
            table.push_row(std::iter::once(row.to_string()).chain(values));
        }
        vec![table]
    })
}

pub(crate) fn run_genre_heatmap(runner: &Runner) -> anyhow::Result<()> {
    let heatmap = cross::genre_condition_heatmap(&runner.dataset);
    runner.emit(&heatmap, |heatmap: &GenreHeatmap| {
        let mut table = Table::new(
            std::iter::once("Genre".to_string())
                .chain(Condition::ALL.iter().map(ToString::to_string)),
        )
        .titled("Mean condition score by favorite genre");
        for genre in &heatmap.genres {
            let values = Condition::ALL.map(|condition| {
                fmt_opt(
                    heatmap
                        .cells
                        .iter()
                        .find(|c| c.genre == *genre && c.condition == condition)
                        .map(|c| c.mean),
                )
            });
            table.push_row(std::iter::once(genre.clone()).chain(values));
        }
        vec![table]
    })
}

pub(crate) fn run_regression(runner: &Runner, arg: &RegressionArg) -> anyhow::Result<()> {
    let mut config = runner.config.clone();
    if let Some(grid) = arg.grid {
        config.regression_grid = grid;
    }
    config.validate()?;

    let regression = cross::regression(&runner.dataset, arg.condition, config.regression_grid)?;
    runner.emit(&regression, |reg: &Regression| {
        let model = &reg.model;
        let mut coefficients = Table::new(["Term", "Value"])
            .titled(format!("{} ~ Age + Hours per day", model.response));
        coefficients.push_row(["Intercept".to_string(), fmt_opt(Some(model.intercept))]);
        coefficients.push_row(["Age".to_string(), fmt_opt(Some(model.coef_age))]);
        coefficients.push_row(["Hours per day".to_string(), fmt_opt(Some(model.coef_hours))]);
        coefficients.push_row(["Rows".to_string(), model.rows.to_string()]);
        coefficients.push_row(["R²".to_string(), fmt_opt(model.r_squared)]);

        let surface = &reg.surface;
        let mut grid = Table::new(
            std::iter::once("Hours \\ Age".to_string())
                .chain(surface.ages.iter().map(|a| format!("{a:.1}"))),
        )
        .titled("Predicted score");
        for (hours, predictions) in surface.hours.iter().zip(&surface.predictions) {
            grid.push_row(
                std::iter::once(format!("{hours:.2}"))
                    .chain(predictions.iter().map(|p| format!("{p:.2}"))),
            );
        }
        vec![coefficients, grid]
    })
}

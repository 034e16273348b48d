use clap::Args;
use mxmh_analysis::{
    record::Condition,
    selection,
    views::conditions::{self, AgeScore, ConditionDensity, DensitySeries},
};

use super::Runner;
use crate::{table::Table, util::fmt_opt};

#[derive(Debug, Clone, Args)]
pub(crate) struct DensityArg {
    /// Conditions to estimate (comma-separated)
    #[arg(
        long,
        value_delimiter = ',',
        default_values = ["Anxiety", "Depression", "Insomnia", "OCD"]
    )]
    conditions: Vec<String>,

    /// Use the padded violin domain instead of the score scale
    #[arg(long)]
    violin: bool,

    /// Number of evaluation points per curve [default: from config]
    #[arg(long)]
    steps: Option<usize>,
}

#[derive(Debug, Clone, Args)]
pub(crate) struct ConditionArg {
    /// Anxiety, Depression, Insomnia or OCD (case-insensitive)
    #[arg(long)]
    condition: Condition,
}

pub(crate) fn run_density(runner: &Runner, arg: &DensityArg) -> anyhow::Result<()> {
    let selected = selection::parse_conditions(&arg.conditions)?;
    let mut config = runner.config.clone();
    if let Some(steps) = arg.steps {
        config.density_steps = steps;
    }
    config.validate()?;

    let densities = if arg.violin {
        conditions::condition_violins(&runner.dataset, &selected, &config)
    } else {
        conditions::condition_densities(
            &runner.dataset,
            &selected,
            config.score_domain,
            config.density_steps,
        )
    };
    runner.emit(&densities, |densities: &Vec<ConditionDensity>| {
        let mut summary = Table::new(["Condition", "Observations", "Bandwidth", "Peak at", "Peak"])
            .titled("Density curves");
        for density in densities {
            match &density.series {
                DensitySeries::Curve(curve) => {
                    let peak = curve
                        .samples
                        .iter()
                        .max_by(|a, b| a.density.total_cmp(&b.density));
                    summary.push_row([
                        density.condition.to_string(),
                        curve.observations.to_string(),
                        fmt_opt(Some(curve.bandwidth)),
                        fmt_opt(peak.map(|s| s.value)),
                        fmt_opt(peak.map(|s| s.density)),
                    ]);
                }
                DensitySeries::Empty { observations } => {
                    summary.push_row([
                        density.condition.to_string(),
                        observations.to_string(),
                        "N/A".to_string(),
                        "N/A".to_string(),
                        "N/A".to_string(),
                    ]);
                }
            }
        }
        vec![summary]
    })
}

pub(crate) fn run_condition_by_age(runner: &Runner, arg: &ConditionArg) -> anyhow::Result<()> {
    let rows = conditions::condition_by_age(&runner.dataset, arg.condition);
    runner.emit(&rows, |rows: &Vec<AgeScore>| {
        let mut table = Table::new(["Age", "Mean score", "Count"])
            .titled(format!("{} by age", arg.condition));
        for row in rows {
            table.push_row([
                row.age.to_string(),
                fmt_opt(Some(row.mean_score)),
                row.count.to_string(),
            ]);
        }
        vec![table]
    })
}

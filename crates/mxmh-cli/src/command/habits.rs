use clap::Args;
use mxmh_analysis::views::{
    Share,
    habits::{self, AgeDistribution, AgeHours, GenreFrequency, GenreHours},
};

use super::Runner;
use crate::{table::Table, util::fmt_opt};

#[derive(Debug, Clone, Args)]
pub(crate) struct AgeDistributionArg {
    /// Largest age shown in the histogram [default: from config]
    #[arg(long)]
    max_age: Option<u32>,
}

#[derive(Debug, Clone, Args)]
pub(crate) struct GenreFrequencyArg {
    /// Genre name, e.g. "Rock" or "Frequency [Rock]"
    #[arg(long)]
    genre: String,
}

/// Table of category shares, in the order given.
fn share_table<K>(title: &str, key_label: &str, shares: &[Share<K>]) -> Table
where
    K: ToString,
{
    let mut table = Table::new([key_label, "Count", "Percentage"]).titled(title);
    for share in shares {
        table.push_row([
            share.key.to_string(),
            share.count.to_string(),
            format!("{:.2}%", share.percentage),
        ]);
    }
    table
}

pub(crate) fn run_age_distribution(
    runner: &Runner,
    arg: &AgeDistributionArg,
) -> anyhow::Result<()> {
    let max_age = arg.max_age.unwrap_or(runner.config.max_histogram_age);
    let distribution = habits::age_distribution(&runner.dataset, max_age);
    runner.emit(&distribution, |dist: &AgeDistribution| {
        let mut excluded = Table::new(["Age", "Count"])
            .titled(format!("Ages above {} (not in histogram)", dist.max_age));
        for row in &dist.excluded {
            excluded.push_row([row.age.to_string(), row.count.to_string()]);
        }
        vec![
            share_table("Respondents per age", "Age", &dist.bins),
            excluded,
        ]
    })
}

pub(crate) fn run_platforms(runner: &Runner) -> anyhow::Result<()> {
    let platforms = habits::streaming_platforms(&runner.dataset);
    runner.emit(&platforms, |shares| {
        vec![share_table("Streaming platforms", "Platform", shares)]
    })
}

pub(crate) fn run_favorite_genres(runner: &Runner) -> anyhow::Result<()> {
    let genres = habits::favorite_genres(&runner.dataset);
    runner.emit(&genres, |shares| {
        vec![share_table("Favorite genres", "Genre", shares)]
    })
}

pub(crate) fn run_genre_hours(runner: &Runner) -> anyhow::Result<()> {
    let rows = habits::genre_hours(&runner.dataset);
    runner.emit(&rows, |rows: &Vec<GenreHours>| {
        let mut table = Table::new(["Genre", "Count", "Min", "Q1", "Median", "Q3", "Max", "Mean"])
            .titled("Hours per day by favorite genre");
        for row in rows {
            let s = &row.summary;
            table.push_row([
                row.genre.clone(),
                s.count.to_string(),
                fmt_opt(Some(s.min)),
                fmt_opt(Some(s.q1)),
                fmt_opt(Some(s.median)),
                fmt_opt(Some(s.q3)),
                fmt_opt(Some(s.max)),
                fmt_opt(Some(s.mean)),
            ]);
        }
        vec![table]
    })
}

pub(crate) fn run_hours_by_age(runner: &Runner) -> anyhow::Result<()> {
    let rows = habits::mean_hours_by_age(&runner.dataset);
    runner.emit(&rows, |rows: &Vec<AgeHours>| {
        let mut table =
            Table::new(["Age", "Mean hours", "Count"]).titled("Mean hours per day by age");
        for row in rows {
            table.push_row([
                row.age.to_string(),
                fmt_opt(Some(row.mean_hours)),
                row.count.to_string(),
            ]);
        }
        vec![table]
    })
}

pub(crate) fn run_genre_frequency(runner: &Runner, arg: &GenreFrequencyArg) -> anyhow::Result<()> {
    let frequency = habits::genre_frequency(&runner.dataset, &arg.genre)?;
    runner.emit(&frequency, |freq: &GenreFrequency| {
        vec![share_table(
            &format!("Listening frequency of {}", freq.genre),
            "Frequency",
            &freq.levels,
        )]
    })
}

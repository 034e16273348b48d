use mxmh_analysis::views::overview::{self, DatasetSummary};
use mxmh_stats::descriptive::DescriptiveStats;

use super::Runner;
use crate::{table::Table, util::fmt_opt};

pub(crate) fn run(runner: &Runner) -> anyhow::Result<()> {
    let summary = overview::dataset_summary(&runner.dataset);
    runner.emit(&summary, tables)
}

fn tables(summary: &DatasetSummary) -> Vec<Table> {
    let mut info = Table::new(["Property", "Value"]).titled("Dataset");
    info.push_row(["Records".to_string(), summary.records.to_string()]);
    info.push_row([
        "Removed outliers".to_string(),
        summary.removed_outliers.to_string(),
    ]);
    for (label, time) in [
        ("First response", summary.first_response),
        ("Last response", summary.last_response),
    ] {
        info.push_row([label.to_string(), time.map_or("N/A".to_string(), |t| t.to_string())]);
    }
    info.push_row(["Genres".to_string(), summary.genres.join(", ")]);

    let mut columns = Table::new(["Column", "Non-null", "Min", "Mean", "Median", "Max", "Std"])
        .titled("Numeric columns");
    for column in &summary.columns {
        let stat = |f: fn(&DescriptiveStats) -> f64| {
            fmt_opt(column.stats.as_ref().map(f))
        };
        columns.push_row([
            column.name.clone(),
            column.non_null.to_string(),
            stat(|s| s.min),
            stat(|s| s.mean),
            stat(|s| s.median),
            stat(|s| s.max),
            stat(|s| s.std_dev),
        ]);
    }
    vec![info, columns]
}

//! Chart-ready derived tables
//!
//! Each function here is a pure computation over a borrowed
//! [`Dataset`](crate::dataset::Dataset) plus a few parameters, returning a
//! serializable table for one chart of the dashboard. Nothing is cached;
//! every call recomputes from the dataset.
//!
//! - [`overview`]: dataset summary
//! - [`habits`]: listening habits (ages, platforms, genres, hours, frequencies)
//! - [`conditions`]: condition score densities and per-age means
//! - [`cross`]: music effects, correlation, genre × condition heatmap and the
//!   regression surface

use serde::Serialize;

use crate::aggregation::{AggregationTable, KeyValue};

pub mod conditions;
pub mod cross;
pub mod habits;
pub mod overview;

/// Count and percentage of one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Share<K> {
    pub key: K,
    pub count: usize,
    pub percentage: f64,
}

/// Converts a single-key aggregation table into shares, keeping its row order.
fn shares<K>(table: AggregationTable, key: impl Fn(&KeyValue) -> Option<K>) -> Vec<Share<K>> {
    table
        .rows
        .into_iter()
        .filter_map(|row| {
            Some(Share {
                key: key(row.key.first()?)?,
                count: row.count,
                percentage: row.percentage,
            })
        })
        .collect()
}

fn text_key(key: &KeyValue) -> Option<String> {
    key.as_text().map(str::to_owned)
}

fn age_key(key: &KeyValue) -> Option<u32> {
    key.as_int().and_then(|n| u32::try_from(n).ok())
}

//! Validation of user selections
//!
//! Every parameter that comes from the presentation layer (a condition name,
//! a genre name) is checked against the known schema before any computation
//! runs. A failed check rejects only that request.

use crate::record::Condition;

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum SelectionError {
    #[display("unknown condition '{value}', expected one of: {}", condition_names())]
    UnknownCondition { value: String },
    #[display("unknown genre '{value}', expected one of: {}", known.join(", "))]
    UnknownGenre { value: String, known: Vec<String> },
}

fn condition_names() -> String {
    Condition::ALL
        .iter()
        .map(|c| c.column())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parses a list of condition names, dropping duplicates but keeping the
/// requested order.
pub fn parse_conditions<I, S>(names: I) -> Result<Vec<Condition>, SelectionError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut conditions = Vec::new();
    for name in names {
        let condition = name.as_ref().parse::<Condition>()?;
        if !conditions.contains(&condition) {
            conditions.push(condition);
        }
    }
    Ok(conditions)
}

/// Strips the `Frequency [...]` wrapper from a genre selection, if present.
pub(crate) fn bare_genre_name(selection: &str) -> &str {
    let selection = selection.trim();
    selection
        .strip_prefix(crate::dataset::FREQUENCY_PREFIX)
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or(selection)
}

//! Survey record model
//!
//! One [`Record`] per respondent, with typed categorical fields. Category
//! labels follow the survey file exactly (`"No effect"`, `"Very frequently"`,
//! `"OCD"`), both when parsing and when serializing.

use std::{collections::BTreeMap, fmt, str::FromStr};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::selection::SelectionError;

/// Lowest value of the self-reported condition scale.
pub const SCORE_MIN: f64 = 0.0;
/// Highest value of the self-reported condition scale.
pub const SCORE_MAX: f64 = 10.0;

/// Psychological condition with a self-reported 0-10 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Condition {
    Anxiety,
    Depression,
    Insomnia,
    #[serde(rename = "OCD")]
    Ocd,
}

impl Condition {
    pub const ALL: [Self; 4] = [
        Self::Anxiety,
        Self::Depression,
        Self::Insomnia,
        Self::Ocd,
    ];

    /// Column header of this condition in the survey file.
    #[must_use]
    pub fn column(self) -> &'static str {
        match self {
            Self::Anxiety => "Anxiety",
            Self::Depression => "Depression",
            Self::Insomnia => "Insomnia",
            Self::Ocd => "OCD",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.column(), f)
    }
}

impl FromStr for Condition {
    type Err = SelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.column().eq_ignore_ascii_case(s))
            .ok_or_else(|| SelectionError::UnknownCondition {
                value: s.to_owned(),
            })
    }
}

/// Self-reported effect of music on the respondent's mental health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MusicEffect {
    Improve,
    #[serde(rename = "No effect")]
    NoEffect,
    Worsen,
}

impl MusicEffect {
    pub const ALL: [Self; 3] = [Self::Improve, Self::NoEffect, Self::Worsen];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Improve => "Improve",
            Self::NoEffect => "No effect",
            Self::Worsen => "Worsen",
        }
    }
}

impl fmt::Display for MusicEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.label(), f)
    }
}

impl FromStr for MusicEffect {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|e| e.label() == s.trim())
            .ok_or_else(|| UnknownLabel(s.to_owned()))
    }
}

/// How often a respondent listens to a genre. Ordered from `Never` upwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ListeningFrequency {
    Never,
    Rarely,
    Sometimes,
    #[serde(rename = "Very frequently")]
    VeryFrequently,
}

impl ListeningFrequency {
    pub const ALL: [Self; 4] = [
        Self::Never,
        Self::Rarely,
        Self::Sometimes,
        Self::VeryFrequently,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Never => "Never",
            Self::Rarely => "Rarely",
            Self::Sometimes => "Sometimes",
            Self::VeryFrequently => "Very frequently",
        }
    }
}

impl fmt::Display for ListeningFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.label(), f)
    }
}

impl FromStr for ListeningFrequency {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.label() == s.trim())
            .ok_or_else(|| UnknownLabel(s.to_owned()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unknown category label '{_0}'")]
pub struct UnknownLabel(#[error(not(source))] pub String);

/// The four condition scores of a respondent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ConditionScores {
    pub anxiety: Option<f64>,
    pub depression: Option<f64>,
    pub insomnia: Option<f64>,
    pub ocd: Option<f64>,
}

impl ConditionScores {
    #[must_use]
    pub fn get(&self, condition: Condition) -> Option<f64> {
        match condition {
            Condition::Anxiety => self.anxiety,
            Condition::Depression => self.depression,
            Condition::Insomnia => self.insomnia,
            Condition::Ocd => self.ocd,
        }
    }

    pub fn set(&mut self, condition: Condition, score: Option<f64>) {
        let slot = match condition {
            Condition::Anxiety => &mut self.anxiety,
            Condition::Depression => &mut self.depression,
            Condition::Insomnia => &mut self.insomnia,
            Condition::Ocd => &mut self.ocd,
        };
        *slot = score;
    }

    /// All four scores, or `None` if any of them is missing.
    #[must_use]
    pub fn complete(&self) -> Option<[f64; 4]> {
        Some([self.anxiety?, self.depression?, self.insomnia?, self.ocd?])
    }
}

/// One survey respondent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Record {
    pub timestamp: Option<NaiveDateTime>,
    pub age: Option<u32>,
    pub primary_streaming_service: Option<String>,
    pub hours_per_day: Option<f64>,
    pub fav_genre: Option<String>,
    /// Listening frequency per genre; genres without an answer are absent.
    pub genre_frequencies: BTreeMap<String, ListeningFrequency>,
    pub music_effects: Option<MusicEffect>,
    pub scores: ConditionScores,
}

impl Record {
    #[must_use]
    pub fn score(&self, condition: Condition) -> Option<f64> {
        self.scores.get(condition)
    }

    #[must_use]
    pub fn frequency(&self, genre: &str) -> Option<ListeningFrequency> {
        self.genre_frequencies.get(genre).copied()
    }
}

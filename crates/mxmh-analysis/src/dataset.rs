//! Dataset loading and cleaning
//!
//! The survey file is read with polars, every column as text, and each cell
//! is then parsed into the typed [`Record`] model. Reading as text keeps the
//! column types fixed by this module instead of by schema inference, and
//! lets a bad cell be reported with its row and column.
//!
//! After parsing, every record whose age equals the configured outlier is
//! removed. Records with no age at all are kept; consumers that need an age
//! skip them.
//!
//! # Examples
//!
//! ```no_run
//! use std::path::Path;
//!
//! use mxmh_analysis::{config::AnalysisConfig, dataset::Dataset};
//!
//! let dataset = Dataset::load(Path::new("mxmh_survey_results.csv"), &AnalysisConfig::default())?;
//! println!("{} respondents, {} genres", dataset.len(), dataset.genres().len());
//! # Ok::<(), mxmh_analysis::dataset::LoadError>(())
//! ```

use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
    str::FromStr,
};

use chrono::NaiveDateTime;
use polars::prelude::{
    CsvReadOptions, DataFrame, PolarsError, PolarsResult, SerReader as _, StringChunked,
};

use crate::{
    config::AnalysisConfig,
    record::{Condition, ListeningFrequency, MusicEffect, Record, SCORE_MAX, SCORE_MIN},
    selection::{self, SelectionError},
};

/// Header prefix of the per-genre listening frequency columns.
pub const FREQUENCY_PREFIX: &str = "Frequency [";

pub const TIMESTAMP_COLUMN: &str = "Timestamp";
pub const AGE_COLUMN: &str = "Age";
pub const HOURS_COLUMN: &str = "Hours per day";
pub const FAV_GENRE_COLUMN: &str = "Fav genre";
pub const STREAMING_SERVICE_COLUMN: &str = "Primary streaming service";
pub const MUSIC_EFFECTS_COLUMN: &str = "Music effects";

/// Format of the `Timestamp` column.
pub const TIMESTAMP_FORMAT: &str = "%m/%d/%Y %H:%M:%S";

/// Columns every survey file must have.
pub const REQUIRED_COLUMNS: [&str; 9] = [
    AGE_COLUMN,
    HOURS_COLUMN,
    FAV_GENRE_COLUMN,
    STREAMING_SERVICE_COLUMN,
    MUSIC_EFFECTS_COLUMN,
    "Anxiety",
    "Depression",
    "Insomnia",
    "OCD",
];

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum LoadError {
    #[display("survey file {} does not exist", path.display())]
    NotFound {
        #[error(not(source))]
        path: PathBuf,
    },
    #[display("failed to read survey file {}: {source}", path.display())]
    Read { path: PathBuf, source: PolarsError },
    #[display("survey file is missing required column '{column}'")]
    MissingColumn {
        #[error(not(source))]
        column: String,
    },
    #[display("row {row}, column '{column}': {reason}")]
    InvalidValue {
        row: usize,
        column: String,
        reason: String,
    },
}

/// The cleaned survey table.
///
/// Immutable once built; every derived table borrows it.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<Record>,
    genres: Vec<String>,
    removed_outliers: usize,
}

impl Dataset {
    /// Loads and cleans a survey CSV file.
    pub fn load(path: &Path, config: &AnalysisConfig) -> Result<Self, LoadError> {
        if !path.exists() {
            return Err(LoadError::NotFound {
                path: path.to_owned(),
            });
        }
        let read_error = |source| LoadError::Read {
            path: path.to_owned(),
            source,
        };
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .try_into_reader_with_file_path(Some(path.to_owned()))
            .and_then(|reader| reader.finish())
            .map_err(read_error)?;

        let header = df
            .get_column_names()
            .into_iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        for column in REQUIRED_COLUMNS {
            if !header.iter().any(|h| h == column) {
                return Err(LoadError::MissingColumn {
                    column: column.to_owned(),
                });
            }
        }
        let genres = header
            .iter()
            .filter_map(|h| h.strip_prefix(FREQUENCY_PREFIX)?.strip_suffix(']'))
            .map(str::to_owned)
            .collect::<Vec<_>>();
        tracing::debug!(?genres, "discovered genre frequency columns");

        let table = TextTable::new(&df, &header).map_err(read_error)?;
        let mut records = Vec::with_capacity(df.height());
        for row in 0..df.height() {
            records.push(table.parse_record(row, &genres)?);
        }

        let dataset = Self::with_genres(records, genres, config.outlier_age);
        tracing::info!(
            path = %path.display(),
            records = dataset.len(),
            removed_outliers = dataset.removed_outliers,
            "loaded survey dataset"
        );
        Ok(dataset)
    }

    /// Builds a dataset from in-memory records, removing records whose age
    /// equals `outlier_age`.
    ///
    /// The genre list is the sorted union of the genres the records answered.
    #[must_use]
    pub fn from_records(records: Vec<Record>, outlier_age: u32) -> Self {
        let genres = records
            .iter()
            .flat_map(|r| r.genre_frequencies.keys().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        Self::with_genres(records, genres, outlier_age)
    }

    fn with_genres(mut records: Vec<Record>, genres: Vec<String>, outlier_age: u32) -> Self {
        let before = records.len();
        records.retain(|r| r.age != Some(outlier_age));
        Self {
            removed_outliers: before - records.len(),
            records,
            genres,
        }
    }

    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Genres with a listening frequency column, in file order.
    #[must_use]
    pub fn genres(&self) -> &[String] {
        &self.genres
    }

    /// Number of outlier records removed while building the dataset.
    #[must_use]
    pub fn removed_outliers(&self) -> usize {
        self.removed_outliers
    }

    /// Resolves a user-supplied genre name to a known frequency genre.
    ///
    /// Accepts the bare genre (`"Rock"`) or the column header
    /// (`"Frequency [Rock]"`); an exact match wins over a case-insensitive one.
    pub fn frequency_genre(&self, name: &str) -> Result<&str, SelectionError> {
        let bare = selection::bare_genre_name(name);
        self.genres
            .iter()
            .find(|g| *g == bare)
            .or_else(|| self.genres.iter().find(|g| g.eq_ignore_ascii_case(bare)))
            .map(String::as_str)
            .ok_or_else(|| SelectionError::UnknownGenre {
                value: name.to_owned(),
                known: self.genres.clone(),
            })
    }
}

/// The survey columns as text, indexed by header.
struct TextTable<'a> {
    columns: Vec<(&'a str, &'a StringChunked)>,
}

impl<'a> TextTable<'a> {
    fn new(df: &'a DataFrame, header: &'a [String]) -> PolarsResult<Self> {
        let columns = header
            .iter()
            .map(|name| {
                let column = df.column(name)?.as_materialized_series().str()?;
                Ok((name.as_str(), column))
            })
            .collect::<PolarsResult<_>>()?;
        Ok(Self { columns })
    }

    /// Trimmed cell text, `None` for a missing or blank cell.
    fn cell(&self, row: usize, column: &str) -> Option<&'a str> {
        let (_, values) = self.columns.iter().find(|(name, _)| *name == column)?;
        values
            .get(row)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    fn parse_record(&self, row: usize, genres: &[String]) -> Result<Record, LoadError> {
        let parser = CellParser { table: self, row };
        let mut record = Record {
            timestamp: parser.timestamp()?,
            age: parser.age()?,
            primary_streaming_service: parser.text(STREAMING_SERVICE_COLUMN),
            hours_per_day: parser.hours()?,
            fav_genre: parser.text(FAV_GENRE_COLUMN),
            music_effects: parser.label::<MusicEffect>(MUSIC_EFFECTS_COLUMN)?,
            ..Record::default()
        };
        for condition in Condition::ALL {
            record.scores.set(condition, parser.score(condition)?);
        }
        for genre in genres {
            let column = format!("{FREQUENCY_PREFIX}{genre}]");
            if let Some(frequency) = parser.label::<ListeningFrequency>(&column)? {
                record.genre_frequencies.insert(genre.clone(), frequency);
            }
        }
        Ok(record)
    }
}

struct CellParser<'t, 'a> {
    table: &'t TextTable<'a>,
    row: usize,
}

impl CellParser<'_, '_> {
    fn invalid(&self, column: &str, reason: String) -> LoadError {
        LoadError::InvalidValue {
            row: self.row + 1,
            column: column.to_owned(),
            reason,
        }
    }

    fn text(&self, column: &str) -> Option<String> {
        self.table.cell(self.row, column).map(str::to_owned)
    }

    fn number(&self, column: &str) -> Result<Option<f64>, LoadError> {
        let Some(cell) = self.table.cell(self.row, column) else {
            return Ok(None);
        };
        match cell.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(Some(value)),
            _ => Err(self.invalid(column, format!("'{cell}' is not a number"))),
        }
    }

    fn score(&self, condition: Condition) -> Result<Option<f64>, LoadError> {
        let column = condition.column();
        let score = self.number(column)?;
        match score {
            Some(value) if !(SCORE_MIN..=SCORE_MAX).contains(&value) => Err(self.invalid(
                column,
                format!("score {value} is outside [{SCORE_MIN}, {SCORE_MAX}]"),
            )),
            _ => Ok(score),
        }
    }

    fn hours(&self) -> Result<Option<f64>, LoadError> {
        let hours = self.number(HOURS_COLUMN)?;
        match hours {
            Some(value) if value < 0.0 => {
                Err(self.invalid(HOURS_COLUMN, format!("negative hours {value}")))
            }
            _ => Ok(hours),
        }
    }

    fn age(&self) -> Result<Option<u32>, LoadError> {
        let Some(cell) = self.table.cell(self.row, AGE_COLUMN) else {
            return Ok(None);
        };
        let age = cell
            .parse::<i64>()
            .map_err(|_| self.invalid(AGE_COLUMN, format!("'{cell}' is not an integer")))?;
        match u32::try_from(age) {
            Ok(age) if age > 0 => Ok(Some(age)),
            _ => Err(self.invalid(AGE_COLUMN, format!("age {age} is not positive"))),
        }
    }

    fn timestamp(&self) -> Result<Option<NaiveDateTime>, LoadError> {
        let Some(cell) = self.table.cell(self.row, TIMESTAMP_COLUMN) else {
            return Ok(None);
        };
        NaiveDateTime::parse_from_str(cell, TIMESTAMP_FORMAT)
            .map(Some)
            .map_err(|e| self.invalid(TIMESTAMP_COLUMN, format!("'{cell}': {e}")))
    }

    fn label<T>(&self, column: &str) -> Result<Option<T>, LoadError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.table
            .cell(self.row, column)
            .map(|cell| cell.parse::<T>())
            .transpose()
            .map_err(|e| self.invalid(column, e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use tempfile::NamedTempFile;

    use super::*;

    const HEADER: &str = "Timestamp,Age,Primary streaming service,Hours per day,\
        Fav genre,Frequency [Rock],Frequency [Jazz],Anxiety,Depression,Insomnia,OCD,\
        Music effects,Permissions";

    fn write_csv(rows: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{HEADER}").unwrap();
        for row in rows {
            writeln!(file, "{row}").unwrap();
        }
        file.flush().unwrap();
        file
    }

    fn load(file: &NamedTempFile) -> Result<Dataset, LoadError> {
        Dataset::load(file.path(), &AnalysisConfig::default())
    }

    const TEN_ROWS: [&str; 10] = [
        "8/27/2022 19:29:02,18,Spotify,3,Latin,Never,Rarely,3,0,1,0,,I understand.",
        "8/27/2022 19:57:31,63,Pandora,1.5,Rock,Very frequently,Sometimes,7,2,2,1,,I understand.",
        "8/27/2022 21:28:18,18,Spotify,4,Video game music,Rarely,Never,7,7,10,2,No effect,I understand.",
        "8/27/2022 21:40:40,61,YouTube Music,2.5,Jazz,Never,Very frequently,9,7,3,3,Improve,I understand.",
        "8/27/2022 21:54:47,18,Spotify,4,R&B,Never,Rarely,7,2,5,9,Improve,I understand.",
        "8/27/2022 21:56:50,18,Spotify,5,Jazz,Very frequently,Very frequently,8,8,7,7,Improve,I understand.",
        "8/27/2022 22:00:29,18,YouTube Music,3,Video game music,Never,Never,4,8,6,0,Improve,I understand.",
        "8/27/2022 22:18:59,21,Spotify,1,K pop,Sometimes,Rarely,5,3,5,3,Improve,I understand.",
        "8/27/2022 22:33:05,89,Spotify,24,Rock,Very frequently,Never,10,10,10,10,Worsen,I understand.",
        "8/27/2022 22:44:03,,Apple Music,6,Rock,Sometimes,Never,6,3,0,0,Worsen,I understand.",
    ];

    #[test]
    fn test_load_removes_outlier() {
        let file = write_csv(&TEN_ROWS);
        let dataset = load(&file).unwrap();
        assert_eq!(dataset.len(), 9);
        assert_eq!(dataset.removed_outliers(), 1);
        assert!(dataset.records().iter().all(|r| r.age != Some(89)));
        // null age is kept
        assert_eq!(dataset.records()[8].age, None);
    }

    #[test]
    fn test_load_parses_typed_fields() {
        let file = write_csv(&TEN_ROWS);
        let dataset = load(&file).unwrap();
        assert_eq!(dataset.genres(), ["Rock", "Jazz"]);

        let record = &dataset.records()[1];
        assert_eq!(record.age, Some(63));
        assert_eq!(record.hours_per_day, Some(1.5));
        assert_eq!(record.primary_streaming_service.as_deref(), Some("Pandora"));
        assert_eq!(record.fav_genre.as_deref(), Some("Rock"));
        assert_eq!(record.music_effects, None);
        assert_eq!(record.score(Condition::Anxiety), Some(7.0));
        assert_eq!(record.score(Condition::Ocd), Some(1.0));
        assert_eq!(
            record.frequency("Rock"),
            Some(ListeningFrequency::VeryFrequently)
        );
        assert_eq!(
            record.timestamp.unwrap().to_string(),
            "2022-08-27 19:57:31"
        );
    }

    #[test]
    fn test_missing_file() {
        let err = Dataset::load(Path::new("/nonexistent/mxmh.csv"), &AnalysisConfig::default())
            .unwrap_err();
        assert!(matches!(err, LoadError::NotFound { .. }));
    }

    #[test]
    fn test_missing_required_column() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Age,Hours per day\n18,3").unwrap();
        let err = load(&file).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn { column } if column == "Fav genre"));
    }

    #[test]
    fn test_invalid_numeric_cell() {
        let file = write_csv(&[
            "8/27/2022 19:29:02,18,Spotify,three,Latin,Never,Rarely,3,0,1,0,,I understand.",
        ]);
        let err = load(&file).unwrap_err();
        assert!(matches!(
            err,
            LoadError::InvalidValue { row: 1, ref column, .. } if column == HOURS_COLUMN
        ));
    }

    #[test]
    fn test_score_out_of_range() {
        let file = write_csv(&[
            "8/27/2022 19:29:02,18,Spotify,3,Latin,Never,Rarely,11,0,1,0,,I understand.",
        ]);
        let err = load(&file).unwrap_err();
        assert!(matches!(
            err,
            LoadError::InvalidValue { ref column, .. } if column == "Anxiety"
        ));
    }

    #[test]
    fn test_unknown_category_label() {
        let file = write_csv(&[
            "8/27/2022 19:29:02,18,Spotify,3,Latin,Always,Rarely,3,0,1,0,,I understand.",
        ]);
        let err = load(&file).unwrap_err();
        assert!(matches!(
            err,
            LoadError::InvalidValue { ref column, .. } if column == "Frequency [Rock]"
        ));
    }

    #[test]
    fn test_from_records_applies_outlier_rule() {
        let records = [Some(20), Some(89), None, Some(30)]
            .into_iter()
            .map(|age| Record {
                age,
                ..Record::default()
            })
            .collect();
        let dataset = Dataset::from_records(records, 89);
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.removed_outliers(), 1);
    }

    #[test]
    fn test_frequency_genre_lookup() {
        let file = write_csv(&TEN_ROWS);
        let dataset = load(&file).unwrap();
        assert_eq!(dataset.frequency_genre("Rock").unwrap(), "Rock");
        assert_eq!(dataset.frequency_genre("jazz").unwrap(), "Jazz");
        assert_eq!(dataset.frequency_genre("Frequency [Jazz]").unwrap(), "Jazz");
        assert!(matches!(
            dataset.frequency_genre("Polka"),
            Err(SelectionError::UnknownGenre { .. })
        ));
    }
}

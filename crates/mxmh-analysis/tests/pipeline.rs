use std::io::Write as _;

use mxmh_analysis::{
    config::AnalysisConfig,
    dataset::Dataset,
    record::{Condition, ListeningFrequency, MusicEffect},
    selection::{self, SelectionError},
    views::{conditions, cross, habits, overview},
};
use mxmh_stats::regression::FitError;
use tempfile::NamedTempFile;

const SURVEY: &str = "\
Timestamp,Age,Primary streaming service,Hours per day,While working,Fav genre,Frequency [Classical],Frequency [Pop],Frequency [Rock],Anxiety,Depression,Insomnia,OCD,Music effects,Permissions
8/27/2022 19:29:02,18,Spotify,3,Yes,Latin,Rarely,Very frequently,Never,3,0,1,0,,I understand.
8/27/2022 19:57:31,63,Pandora,1.5,Yes,Rock,Sometimes,Sometimes,Very frequently,7,2,2,1,,I understand.
8/27/2022 21:28:18,18,Spotify,4,No,Video game music,Never,Rarely,Rarely,7,7,10,2,No effect,I understand.
8/27/2022 21:40:40,61,YouTube Music,2.5,Yes,Jazz,Sometimes,Sometimes,Never,9,7,3,3,Improve,I understand.
8/27/2022 21:54:47,18,Spotify,4,Yes,R&B,Never,Very frequently,Never,7,2,5,9,Improve,I understand.
8/27/2022 21:56:50,18,Spotify,5,Yes,Jazz,Rarely,Very frequently,Very frequently,8,8,7,7,Improve,I understand.
8/27/2022 22:00:29,18,YouTube Music,3,Yes,Video game music,Never,Rarely,Never,4,8,6,0,Improve,I understand.
8/27/2022 22:18:59,21,Spotify,1,Yes,K pop,Rarely,Very frequently,Rarely,5,3,5,3,Improve,I understand.
8/27/2022 22:33:05,89,Spotify,24,Yes,Rock,Never,Never,Very frequently,10,10,10,10,Worsen,I understand.
8/27/2022 22:44:03,80,Apple Music,6,Yes,Rock,Sometimes,Never,Very frequently,6,3,0,0,Worsen,I understand.
8/27/2022 23:00:00,,Other streaming service,2,Yes,Pop,Never,Very frequently,Never,2,1,1,1,Improve,I understand.
";

fn load() -> Dataset {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(SURVEY.as_bytes()).unwrap();
    file.flush().unwrap();
    Dataset::load(file.path(), &AnalysisConfig::default()).unwrap()
}

#[test]
fn loads_and_cleans_survey() {
    let dataset = load();
    assert_eq!(dataset.len(), 10);
    assert_eq!(dataset.removed_outliers(), 1);
    assert_eq!(dataset.genres(), ["Classical", "Pop", "Rock"]);

    let summary = overview::dataset_summary(&dataset);
    assert_eq!(summary.records, 10);
    assert_eq!(summary.columns[0].non_null, 9);
}

#[test]
fn habit_tables() {
    let dataset = load();

    let ages = habits::age_distribution(&dataset, 70);
    let total = ages.bins.iter().map(|b| b.percentage).sum::<f64>();
    assert!((total - 100.0).abs() < 1e-6);
    assert_eq!(ages.bins[0].key, 18);
    assert_eq!(ages.bins[0].count, 5);
    assert_eq!(ages.excluded.len(), 1);
    assert_eq!(ages.excluded[0].age, 80);

    let platforms = habits::streaming_platforms(&dataset);
    assert_eq!(platforms[0].key, "Spotify");
    assert_eq!(platforms[0].count, 5);

    let genres = habits::genre_hours(&dataset);
    let medians = genres.iter().map(|g| g.summary.median).collect::<Vec<_>>();
    assert!(medians.windows(2).all(|w| w[0] <= w[1]));

    let frequency = habits::genre_frequency(&dataset, "Frequency [Pop]").unwrap();
    assert_eq!(frequency.genre, "Pop");
    assert_eq!(
        frequency.levels.first().map(|l| l.key),
        Some(ListeningFrequency::Never)
    );
    assert_eq!(
        frequency.levels.last().map(|l| (l.key, l.count)),
        Some((ListeningFrequency::VeryFrequently, 5))
    );

    assert!(matches!(
        habits::genre_frequency(&dataset, "Polka"),
        Err(SelectionError::UnknownGenre { .. })
    ));
}

#[test]
fn condition_tables() {
    let dataset = load();
    let selected = selection::parse_conditions(["depression", "OCD"]).unwrap();
    let densities = conditions::condition_densities(
        &dataset,
        &selected,
        AnalysisConfig::default().score_domain,
        50,
    );
    assert_eq!(densities.len(), 2);
    for density in &densities {
        let curve = density.series.curve().unwrap();
        assert_eq!(curve.observations, 10);
        assert!(curve.samples.iter().all(|s| s.density >= 0.0));
    }

    let by_age = conditions::condition_by_age(&dataset, Condition::Anxiety);
    assert_eq!(by_age.first().map(|r| (r.age, r.count)), Some((18, 5)));
    assert!(by_age.iter().all(|r| r.age != 89));

    assert!(selection::parse_conditions(["Anxiety", "Stress"]).is_err());
}

#[test]
fn cross_tables() {
    let dataset = load();

    let effects = cross::music_effects(&dataset);
    assert_eq!(effects[0].key, MusicEffect::Improve);
    assert_eq!(effects[0].count, 6);

    let correlation = cross::condition_correlation(&dataset).unwrap();
    assert_eq!(correlation.rows, 10);
    assert_eq!(correlation.cells.len(), 16);

    let heatmap = cross::genre_condition_heatmap(&dataset);
    assert_eq!(heatmap.cells.len(), heatmap.genres.len() * 4);

    let regression = cross::regression(&dataset, Condition::Insomnia, 10).unwrap();
    assert_eq!(regression.model.rows, 9);
    assert_eq!(regression.surface.ages.len(), 10);
    assert_eq!(regression.surface.hours.len(), 10);
}

#[test]
fn regression_on_too_few_rows() {
    let mut file = NamedTempFile::new().unwrap();
    let mut lines = SURVEY.lines();
    writeln!(file, "{}", lines.next().unwrap()).unwrap();
    for line in lines.take(2) {
        writeln!(file, "{line}").unwrap();
    }
    file.flush().unwrap();
    let dataset = Dataset::load(file.path(), &AnalysisConfig::default()).unwrap();
    assert_eq!(
        cross::regression(&dataset, Condition::Anxiety, 10).unwrap_err(),
        FitError::InsufficientData { rows: 2 }
    );
}

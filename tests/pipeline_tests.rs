// Integration tests for the payroll analysis pipeline.
//
// These drive the library end to end: file loading, cleaning, derived
// metrics, aggregate statistics, ranking queries and the summary export.

use std::fs;
use std::path::{Path, PathBuf};

use payroll_efficiency::config::Config;
use payroll_efficiency::data::{ExclusionReason, LoaderError, MetricColumn, PipelineError, Table};
use payroll_efficiency::export::{SummaryExporter, AGGREGATE_FILE, SUMMARY_FILE};
use payroll_efficiency::report::ReportPrinter;
use payroll_efficiency::{load_table, AnalysisError};

// ===========================================================================
// Test helpers
// ===========================================================================

/// Fixture directory path (relative to project root, which is the cwd for
/// `cargo test`).
const FIXTURES: &str = "tests/fixtures";

const HEADER: &str = "Team,Total Payroll,Active,Injured,Retained,Buried,Record\n";

fn fixture() -> PathBuf {
    Path::new(FIXTURES).join("mlb_payroll.csv")
}

fn load_fixture() -> Table {
    load_table(&fixture(), &Config::default()).expect("fixture should load")
}

/// Write `body` under the standard header into a temp file and load it.
fn load_body(body: &str) -> Result<Table, AnalysisError> {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("input.csv");
    fs::write(&path, format!("{HEADER}{body}")).unwrap();
    load_table(&path, &Config::default())
}

fn teams(rows: &[&payroll_efficiency::data::TeamSeason]) -> Vec<String> {
    rows.iter().map(|r| r.team.clone()).collect()
}

// ===========================================================================
// Loading and exclusion accounting
// ===========================================================================

#[test]
fn fixture_excludes_malformed_records() {
    let table = load_fixture();

    assert_eq!(table.len(), 8);
    assert_eq!(table.excluded_count(), 2);

    let excluded: Vec<(&str, &ExclusionReason)> = table
        .exclusions()
        .iter()
        .map(|e| (e.team.as_str(), &e.reason))
        .collect();
    assert_eq!(excluded[0], ("Tampa Bay Rays", &ExclusionReason::MissingRecord));
    assert_eq!(
        excluded[1],
        (
            "Chicago White Sox",
            &ExclusionReason::MalformedRecord("41to121".into())
        )
    );
    assert_eq!(table.exclusions()[0].line, 10);
    assert_eq!(table.exclusions()[1].line, 11);
}

#[test]
fn fixture_preserves_source_order() {
    let table = load_fixture();
    let first_three: Vec<&str> = table.rows()[..3].iter().map(|r| r.team.as_str()).collect();
    assert_eq!(
        first_three,
        ["Los Angeles Dodgers", "New York Mets", "New York Yankees"]
    );
    assert_eq!(table.rows().last().unwrap().team, "Oakland Athletics");
}

#[test]
fn fixture_currency_columns_are_parsed() {
    let table = load_fixture();
    let dodgers = &table.rows()[0];
    assert_eq!(dodgers.total_payroll, Some(310_000_000.0));
    assert_eq!(dodgers.active_payroll_millions, Some(255.0));
    assert_eq!(dodgers.buried_payroll, Some(0.0));

    let guardians = table
        .rows()
        .iter()
        .find(|r| r.team == "Cleveland Guardians")
        .unwrap();
    // "-" is missing, not zero
    assert_eq!(guardians.retained_payroll, None);
    assert_eq!(guardians.efficiency, Some(0.92));
}

#[test]
fn rows_are_restartable() {
    let table = load_fixture();
    let first: Vec<String> = table.rows().iter().map(|r| r.team.clone()).collect();
    let second: Vec<String> = table.rows().iter().map(|r| r.team.clone()).collect();
    assert_eq!(first, second);
}

// ===========================================================================
// Derived metrics
// ===========================================================================

#[test]
fn balanced_record_example() {
    let table = load_body("A,\"$100,000,000\",,,,,81-81\n").unwrap();
    let row = &table.rows()[0];
    assert_eq!(row.total_payroll_millions, Some(100.0));
    assert_eq!((row.wins, row.losses), (81, 81));
    assert_eq!(row.win_percentage, Some(0.5));
    assert_eq!(row.efficiency, Some(0.81));
}

#[test]
fn zero_payroll_example() {
    let table = load_body("B,$0,,,,,50-112\nC,\"$90,000,000\",,,,,81-81\n").unwrap();
    assert_eq!(table.len(), 2);
    let b = &table.rows()[0];
    assert_eq!(b.team, "B");
    assert_eq!(b.efficiency, None);
    assert_eq!(table.aggregate().mean_efficiency, Some(0.9));
}

#[test]
fn efficiency_is_always_finite() {
    let table = load_fixture();
    for row in table.rows() {
        if let Some(e) = row.efficiency {
            assert!(e.is_finite(), "{} has non-finite efficiency", row.team);
        }
        if row.win_percentage.is_some() {
            assert!(row.wins + row.losses > 0);
        }
    }
}

// ===========================================================================
// Aggregates and rankings
// ===========================================================================

#[test]
fn fixture_aggregates() {
    let table = load_fixture();
    let stats = table.aggregate();

    assert_eq!(stats.team_count, 8);
    assert!((stats.mean_payroll.unwrap() - 208.125).abs() < 1e-9);
    assert!((stats.median_payroll.unwrap() - 245.0).abs() < 1e-9);

    let r = stats.correlation().unwrap();
    assert!((-1.0..=1.0).contains(&r));
    assert!(stats.payroll_wins_trend.is_some());
}

#[test]
fn identical_payrolls_have_undefined_correlation() {
    let table = load_body(concat!(
        "A,\"$100,000,000\",,,,,81-81\n",
        "B,\"$100,000,000\",,,,,90-72\n",
        "C,\"$100,000,000\",,,,,70-92\n",
    ))
    .unwrap();
    assert_eq!(table.aggregate().correlation(), None);
}

#[test]
fn fixture_rankings() {
    let table = load_fixture();

    assert_eq!(
        teams(&table.top_k(MetricColumn::Efficiency, 3)),
        ["Oakland Athletics", "Cleveland Guardians", "Milwaukee Brewers"]
    );
    assert_eq!(
        teams(&table.bottom_k(MetricColumn::Efficiency, 3)),
        ["New York Mets", "Los Angeles Dodgers", "New York Yankees"]
    );
    assert_eq!(
        teams(&table.top_k(MetricColumn::TotalPayrollMillions, 2)),
        ["Los Angeles Dodgers", "New York Mets"]
    );
}

#[test]
fn ranking_ties_keep_table_order() {
    let table = load_body(concat!(
        "A,$100,,,,,80-82\n",
        "B,$100,,,,,80-82\n",
        "C,$100,,,,,80-82\n",
    ))
    .unwrap();
    assert_eq!(teams(&table.top_k(MetricColumn::Wins, 3)), ["A", "B", "C"]);
    assert_eq!(teams(&table.bottom_k(MetricColumn::Wins, 3)), ["A", "B", "C"]);
}

// ===========================================================================
// Structural failures
// ===========================================================================

#[test]
fn missing_source_is_reported() {
    let err = load_table(Path::new("tests/fixtures/absent.csv"), &Config::default()).unwrap_err();
    assert!(matches!(
        err,
        AnalysisError::Load(LoaderError::SourceNotFound { .. })
    ));
    assert!(err.to_string().contains("absent.csv"));
}

#[test]
fn missing_required_column_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("input.csv");
    fs::write(&path, "Team,Record\nA,81-81\n").unwrap();

    let err = load_table(&path, &Config::default()).unwrap_err();
    assert!(matches!(
        err,
        AnalysisError::Pipeline(PipelineError::MissingColumn { .. })
    ));
    assert!(err.to_string().contains("Total Payroll"));
}

#[test]
fn ragged_rows_are_malformed() {
    let err = load_body("A,$1,,,,,1-1\nB,$1\n").unwrap_err();
    assert!(matches!(
        err,
        AnalysisError::Load(LoaderError::MalformedTable(_))
    ));
}

#[test]
fn all_rows_excluded_is_fatal() {
    let err = load_body("A,$1,,,,,\nB,$1,,,,,oops\n").unwrap_err();
    assert!(matches!(
        err,
        AnalysisError::Pipeline(PipelineError::NoParsableRows { excluded: 2 })
    ));
}

// ===========================================================================
// Configuration
// ===========================================================================

#[test]
fn configured_columns_and_delimiter() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("settings.toml");
    fs::write(
        &config_path,
        r#"
[input]
delimiter = ";"

[columns]
team = "Club"
total_payroll = "Payroll"
record = "W-L"
"#,
    )
    .unwrap();
    let input = dir.path().join("input.csv");
    fs::write(&input, "Club;Payroll;W-L\nX;$50,000,000;40-10\n").unwrap();

    let config = Config::load(&config_path).unwrap();
    let table = load_table(&input, &config).unwrap();
    assert_eq!(table.rows()[0].efficiency, Some(0.8));
}

// ===========================================================================
// Exports and report
// ===========================================================================

#[test]
fn exports_are_idempotent() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();

    SummaryExporter::export_all(&load_fixture(), first.path()).unwrap();
    SummaryExporter::export_all(&load_fixture(), second.path()).unwrap();

    for file in [SUMMARY_FILE, AGGREGATE_FILE] {
        let a = fs::read(first.path().join(file)).unwrap();
        let b = fs::read(second.path().join(file)).unwrap();
        assert_eq!(a, b, "{file} differs between runs");
    }
}

#[test]
fn summary_csv_is_sorted_by_wins() {
    let dir = tempfile::tempdir().unwrap();
    SummaryExporter::export_all(&load_fixture(), dir.path()).unwrap();

    let text = fs::read_to_string(dir.path().join(SUMMARY_FILE)).unwrap();
    let order: Vec<&str> = text
        .lines()
        .skip(1)
        .map(|l| l.split(',').next().unwrap())
        .collect();
    assert_eq!(
        order,
        [
            "Los Angeles Dodgers",
            "Philadelphia Phillies",
            "New York Yankees",
            "Milwaukee Brewers",
            "Cleveland Guardians",
            "New York Mets",
            "Houston Astros",
            "Oakland Athletics",
        ]
    );
}

#[test]
fn report_mentions_leaders_and_exclusions() {
    let table = load_fixture();
    let mut buf = Vec::new();
    ReportPrinter::new("2024 Season", 5)
        .write_report(&table, &mut buf)
        .unwrap();
    let text = String::from_utf8(buf).unwrap();

    assert!(text.contains("Dataset Shape: 8 teams"));
    assert!(text.contains("Average Total Payroll: $208.1"));
    assert!(text.contains("Median Total Payroll: $245.00M"));
    assert!(text.contains("Excluded Rows: 2"));
    assert!(text.contains("Oakland Athletics"));
}

//! Finalized team-season table and its ranking queries.

use crate::stats::{AggregateStats, StatsCalculator};
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// One team's season after cleaning and derivation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamSeason {
    pub team: String,
    pub record: String,
    pub total_payroll: Option<f64>,
    pub active_payroll: Option<f64>,
    pub injured_payroll: Option<f64>,
    pub retained_payroll: Option<f64>,
    pub buried_payroll: Option<f64>,
    pub wins: u32,
    pub losses: u32,
    pub win_percentage: Option<f64>,
    pub total_payroll_millions: Option<f64>,
    pub active_payroll_millions: Option<f64>,
    pub efficiency: Option<f64>,
}

/// Number of fields a [`TeamSeason`] carries, reported as the dataset width.
pub const FEATURE_COUNT: usize = 13;

/// Numeric columns that ranking queries can order by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricColumn {
    TotalPayroll,
    ActivePayroll,
    InjuredPayroll,
    RetainedPayroll,
    BuriedPayroll,
    Wins,
    Losses,
    WinPercentage,
    TotalPayrollMillions,
    ActivePayrollMillions,
    Efficiency,
}

impl MetricColumn {
    pub fn value(self, row: &TeamSeason) -> Option<f64> {
        match self {
            MetricColumn::TotalPayroll => row.total_payroll,
            MetricColumn::ActivePayroll => row.active_payroll,
            MetricColumn::InjuredPayroll => row.injured_payroll,
            MetricColumn::RetainedPayroll => row.retained_payroll,
            MetricColumn::BuriedPayroll => row.buried_payroll,
            MetricColumn::Wins => Some(f64::from(row.wins)),
            MetricColumn::Losses => Some(f64::from(row.losses)),
            MetricColumn::WinPercentage => row.win_percentage,
            MetricColumn::TotalPayrollMillions => row.total_payroll_millions,
            MetricColumn::ActivePayrollMillions => row.active_payroll_millions,
            MetricColumn::Efficiency => row.efficiency,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            MetricColumn::TotalPayroll => "total_payroll",
            MetricColumn::ActivePayroll => "active_payroll",
            MetricColumn::InjuredPayroll => "injured_payroll",
            MetricColumn::RetainedPayroll => "retained_payroll",
            MetricColumn::BuriedPayroll => "buried_payroll",
            MetricColumn::Wins => "wins",
            MetricColumn::Losses => "losses",
            MetricColumn::WinPercentage => "win_percentage",
            MetricColumn::TotalPayrollMillions => "total_payroll_millions",
            MetricColumn::ActivePayrollMillions => "active_payroll_millions",
            MetricColumn::Efficiency => "efficiency",
        }
    }
}

impl fmt::Display for MetricColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Why a source row was dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ExclusionReason {
    MissingRecord,
    MalformedRecord(String),
    EmptyTeam,
    DuplicateTeam,
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExclusionReason::MissingRecord => f.write_str("missing record"),
            ExclusionReason::MalformedRecord(raw) => write!(f, "malformed record `{raw}`"),
            ExclusionReason::EmptyTeam => f.write_str("empty team name"),
            ExclusionReason::DuplicateTeam => f.write_str("duplicate team"),
        }
    }
}

/// A dropped source row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Exclusion {
    pub line: u64,
    pub team: String,
    pub reason: ExclusionReason,
}

/// Ordered, immutable table of team seasons with its aggregate snapshot.
#[derive(Debug, Clone)]
pub struct Table {
    rows: Vec<TeamSeason>,
    exclusions: Vec<Exclusion>,
    stats: AggregateStats,
}

impl Table {
    /// Finalize rows; aggregate statistics are computed once here.
    pub fn new(rows: Vec<TeamSeason>, exclusions: Vec<Exclusion>) -> Self {
        let stats = StatsCalculator::compute_aggregate(&rows);
        Self {
            rows,
            exclusions,
            stats,
        }
    }

    pub fn rows(&self) -> &[TeamSeason] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn aggregate(&self) -> &AggregateStats {
        &self.stats
    }

    pub fn exclusions(&self) -> &[Exclusion] {
        &self.exclusions
    }

    pub fn excluded_count(&self) -> usize {
        self.exclusions.len()
    }

    /// Values of `column` in row order, skipping missing cells.
    pub fn column_values(&self, column: MetricColumn) -> Vec<f64> {
        self.rows.iter().filter_map(|r| column.value(r)).collect()
    }

    /// Rows with a value in `column`, ordered descending. Ties keep table order.
    pub fn sorted_desc(&self, column: MetricColumn) -> Vec<&TeamSeason> {
        self.sorted_by(column, |a, b| b.total_cmp(a))
    }

    /// Rows with a value in `column`, ordered ascending. Ties keep table order.
    pub fn sorted_asc(&self, column: MetricColumn) -> Vec<&TeamSeason> {
        self.sorted_by(column, |a, b| a.total_cmp(b))
    }

    /// The `k` largest rows by `column`; missing values never rank.
    pub fn top_k(&self, column: MetricColumn, k: usize) -> Vec<&TeamSeason> {
        let mut ranked = self.sorted_desc(column);
        ranked.truncate(k);
        ranked
    }

    /// The `k` smallest rows by `column`; missing values never rank.
    pub fn bottom_k(&self, column: MetricColumn, k: usize) -> Vec<&TeamSeason> {
        let mut ranked = self.sorted_asc(column);
        ranked.truncate(k);
        ranked
    }

    fn sorted_by<F>(&self, column: MetricColumn, cmp: F) -> Vec<&TeamSeason>
    where
        F: Fn(&f64, &f64) -> Ordering,
    {
        let mut keyed: Vec<(f64, &TeamSeason)> = self
            .rows
            .iter()
            .filter_map(|row| column.value(row).map(|v| (v, row)))
            .collect();
        // sort_by is stable
        keyed.sort_by(|(a, _), (b, _)| cmp(a, b));
        keyed.into_iter().map(|(_, row)| row).collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn season(team: &str, payroll_m: Option<f64>, wins: u32, losses: u32) -> TeamSeason {
        let total_payroll = payroll_m.map(|m| m * 1_000_000.0);
        let efficiency = payroll_m.filter(|m| *m > 0.0).map(|m| f64::from(wins) / m);
        let decided = wins + losses;
        TeamSeason {
            team: team.to_string(),
            record: format!("{wins}-{losses}"),
            total_payroll,
            active_payroll: None,
            injured_payroll: None,
            retained_payroll: None,
            buried_payroll: None,
            wins,
            losses,
            win_percentage: (decided > 0).then(|| f64::from(wins) / f64::from(decided)),
            total_payroll_millions: payroll_m,
            active_payroll_millions: None,
            efficiency,
        }
    }

    fn teams(rows: &[&TeamSeason]) -> Vec<String> {
        rows.iter().map(|r| r.team.clone()).collect()
    }

    #[test]
    fn test_top_and_bottom_k_are_stable_for_ties() {
        let table = Table::new(
            vec![
                season("A", Some(100.0), 80, 82),
                season("B", Some(150.0), 90, 72),
                season("C", Some(120.0), 80, 82),
                season("D", Some(90.0), 80, 82),
                season("E", Some(60.0), 70, 92),
            ],
            Vec::new(),
        );

        assert_eq!(teams(&table.top_k(MetricColumn::Wins, 4)), ["B", "A", "C", "D"]);
        assert_eq!(teams(&table.bottom_k(MetricColumn::Wins, 4)), ["E", "A", "C", "D"]);
    }

    #[test]
    fn test_ranking_skips_missing_values() {
        let table = Table::new(
            vec![
                season("A", None, 80, 82),
                season("B", Some(0.0), 50, 112),
                season("C", Some(100.0), 81, 81),
            ],
            Vec::new(),
        );

        assert_eq!(teams(&table.top_k(MetricColumn::Efficiency, 5)), ["C"]);
        assert_eq!(
            teams(&table.bottom_k(MetricColumn::TotalPayrollMillions, 5)),
            ["B", "C"]
        );
    }

    #[test]
    fn test_k_larger_than_table() {
        let table = Table::new(vec![season("A", Some(1.0), 1, 1)], Vec::new());
        assert_eq!(table.top_k(MetricColumn::Wins, 10).len(), 1);
        assert!(table.top_k(MetricColumn::Wins, 0).is_empty());
    }

    #[test]
    fn test_feature_count_matches_row_fields() {
        let value = serde_json::to_value(season("A", Some(1.0), 1, 1)).unwrap();
        assert_eq!(value.as_object().unwrap().len(), FEATURE_COUNT);
    }

    #[test]
    fn test_accessors() {
        let exclusion = Exclusion {
            line: 4,
            team: "Z".into(),
            reason: ExclusionReason::MissingRecord,
        };
        let table = Table::new(vec![season("A", Some(1.0), 1, 1)], vec![exclusion]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.excluded_count(), 1);
        assert_eq!(table.exclusions()[0].reason.to_string(), "missing record");
        assert_eq!(table.aggregate().team_count, 1);
    }
}

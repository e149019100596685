//! Metrics Pipeline Module
//! Cleans raw rows into typed team seasons and derives payroll metrics.
//!
//! Stages run in order and each returns a new sequence:
//! 1. column resolution (structural errors abort here)
//! 2. currency normalization and record parsing (bad rows are excluded)
//! 3. derived metrics (zero denominators become missing values)

use crate::config::ColumnNames;
use crate::data::loader::{RawRow, RawTable};
use crate::data::table::{Exclusion, ExclusionReason, Table, TeamSeason};
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, info, warn};

const DOLLARS_PER_MILLION: f64 = 1_000_000.0;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("malformed table: required column `{column}` is absent from the header")]
    MissingColumn { column: String },
    #[error("no parsable rows: all {excluded} data rows were excluded")]
    NoParsableRows { excluded: usize },
}

/// Header positions of the columns the pipeline reads.
#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    team: usize,
    record: usize,
    total_payroll: usize,
    active_payroll: Option<usize>,
    injured_payroll: Option<usize>,
    retained_payroll: Option<usize>,
    buried_payroll: Option<usize>,
}

/// A row that passed record parsing, before metrics are derived.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRow {
    pub team: String,
    pub record: String,
    pub total_payroll: Option<f64>,
    pub active_payroll: Option<f64>,
    pub injured_payroll: Option<f64>,
    pub retained_payroll: Option<f64>,
    pub buried_payroll: Option<f64>,
    pub wins: u32,
    pub losses: u32,
}

/// Normalize a decorated currency cell such as `"$123,456"`.
///
/// Everything except digits, `.` and `-` is stripped before parsing. Residue
/// that does not parse, or parses to a negative or non-finite number, is
/// missing rather than zero.
pub fn normalize_currency(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
        // "-0" parses; keep it as plain zero
        .map(|v| v + 0.0)
}

/// Split a `"W-L"` record into wins and losses.
pub fn parse_record(raw: Option<&str>) -> Result<(u32, u32), ExclusionReason> {
    let raw = match raw.map(str::trim) {
        Some(r) if !r.is_empty() => r,
        _ => return Err(ExclusionReason::MissingRecord),
    };

    let tokens: Vec<&str> = raw.split('-').collect();
    let &[wins, losses] = tokens.as_slice() else {
        return Err(ExclusionReason::MalformedRecord(raw.to_string()));
    };

    let parse = |token: &str| token.trim().parse::<u32>().ok();
    match (parse(wins), parse(losses)) {
        (Some(w), Some(l)) => Ok((w, l)),
        _ => Err(ExclusionReason::MalformedRecord(raw.to_string())),
    }
}

/// Turns raw rows into a finalized [`Table`].
#[derive(Debug, Clone, Default)]
pub struct MetricsPipeline {
    columns: ColumnNames,
}

impl MetricsPipeline {
    pub fn new(columns: ColumnNames) -> Self {
        Self { columns }
    }

    /// Run every stage over `raw`.
    pub fn run(&self, raw: &RawTable) -> Result<Table, PipelineError> {
        let index = self.resolve_columns(raw)?;
        let (parsed, exclusions) = Self::parse_rows(raw, &index);

        if parsed.is_empty() {
            return Err(PipelineError::NoParsableRows {
                excluded: exclusions.len(),
            });
        }

        let rows = Self::derive_metrics(&parsed);
        info!(
            rows = rows.len(),
            excluded = exclusions.len(),
            "metrics pipeline finished"
        );
        Ok(Table::new(rows, exclusions))
    }

    fn resolve_columns(&self, raw: &RawTable) -> Result<ColumnIndex, PipelineError> {
        let required = |name: &str| {
            raw.column_index(name)
                .ok_or_else(|| PipelineError::MissingColumn {
                    column: name.to_string(),
                })
        };
        let optional = |name: &str| {
            let idx = raw.column_index(name);
            if idx.is_none() {
                warn!(column = name, "optional payroll column absent; values will be missing");
            }
            idx
        };

        Ok(ColumnIndex {
            team: required(&self.columns.team)?,
            record: required(&self.columns.record)?,
            total_payroll: required(&self.columns.total_payroll)?,
            active_payroll: optional(&self.columns.active_payroll),
            injured_payroll: optional(&self.columns.injured_payroll),
            retained_payroll: optional(&self.columns.retained_payroll),
            buried_payroll: optional(&self.columns.buried_payroll),
        })
    }

    /// Parse currency and record cells; rows that cannot be kept are excluded.
    fn parse_rows(raw: &RawTable, index: &ColumnIndex) -> (Vec<ParsedRow>, Vec<Exclusion>) {
        let mut parsed = Vec::with_capacity(raw.get_row_count());
        let mut exclusions = Vec::new();
        let mut seen_teams: HashSet<String> = HashSet::new();

        for row in raw.rows() {
            let team = row.get_index(index.team).unwrap_or_default().trim().to_string();
            let outcome = if team.is_empty() {
                Err(ExclusionReason::EmptyTeam)
            } else if seen_teams.contains(&team) {
                Err(ExclusionReason::DuplicateTeam)
            } else {
                parse_record(row.get_index(index.record))
            };

            let (wins, losses) = match outcome {
                Ok(wl) => wl,
                Err(reason) => {
                    debug!(line = row.line(), team = %team, %reason, "row excluded");
                    exclusions.push(Exclusion {
                        line: row.line(),
                        team,
                        reason,
                    });
                    continue;
                }
            };

            let currency = |idx: Option<usize>| currency_cell(&row, idx, &team);
            let record = row.get_index(index.record).unwrap_or_default().trim().to_string();
            parsed.push(ParsedRow {
                total_payroll: currency(Some(index.total_payroll)),
                active_payroll: currency(index.active_payroll),
                injured_payroll: currency(index.injured_payroll),
                retained_payroll: currency(index.retained_payroll),
                buried_payroll: currency(index.buried_payroll),
                team: team.clone(),
                record,
                wins,
                losses,
            });
            seen_teams.insert(team);
        }

        (parsed, exclusions)
    }

    /// Compute win percentage, scaled payrolls and efficiency for each row.
    pub fn derive_metrics(rows: &[ParsedRow]) -> Vec<TeamSeason> {
        rows.iter()
            .map(|row| {
                let decided = u64::from(row.wins) + u64::from(row.losses);
                let win_percentage = (decided > 0).then(|| f64::from(row.wins) / decided as f64);

                let total_payroll_millions = row.total_payroll.map(|p| p / DOLLARS_PER_MILLION);
                let active_payroll_millions = row.active_payroll.map(|p| p / DOLLARS_PER_MILLION);

                let efficiency = total_payroll_millions
                    .filter(|m| *m > 0.0)
                    .map(|m| f64::from(row.wins) / m)
                    .filter(|e| e.is_finite());

                TeamSeason {
                    team: row.team.clone(),
                    record: row.record.clone(),
                    total_payroll: row.total_payroll,
                    active_payroll: row.active_payroll,
                    injured_payroll: row.injured_payroll,
                    retained_payroll: row.retained_payroll,
                    buried_payroll: row.buried_payroll,
                    wins: row.wins,
                    losses: row.losses,
                    win_percentage,
                    total_payroll_millions,
                    active_payroll_millions,
                    efficiency,
                }
            })
            .collect()
    }
}

fn currency_cell(row: &RawRow<'_>, idx: Option<usize>, team: &str) -> Option<f64> {
    let raw = row.get_index(idx?)?;
    let value = normalize_currency(raw);
    if value.is_none() && !raw.trim().is_empty() {
        debug!(line = row.line(), team, raw, "unparseable currency marked missing");
    }
    value
}

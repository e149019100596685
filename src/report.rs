//! Console Report Module
//! Prints the textual analysis: dataset shape, payroll averages, correlation
//! and the spending/efficiency leaderboards.

use crate::data::{MetricColumn, Table, TeamSeason, FEATURE_COUNT};
use crate::stats::SIGNIFICANCE_THRESHOLD;
use std::io::{self, Write};
use std::path::PathBuf;

/// Textual report writer.
pub struct ReportPrinter {
    season_label: String,
    top_n: usize,
}

/// A rendered column in a leaderboard.
enum Field {
    Team,
    Payroll,
    Wins,
    Record,
    Efficiency,
}

impl Field {
    fn header(&self) -> &'static str {
        match self {
            Field::Team => "Team",
            Field::Payroll => "Payroll ($M)",
            Field::Wins => "Wins",
            Field::Record => "Record",
            Field::Efficiency => "Efficiency",
        }
    }

    fn cell(&self, row: &TeamSeason) -> String {
        match self {
            Field::Team => row.team.clone(),
            Field::Payroll => fmt_opt(row.total_payroll_millions, 2),
            Field::Wins => row.wins.to_string(),
            Field::Record => row.record.clone(),
            Field::Efficiency => fmt_opt(row.efficiency, 4),
        }
    }
}

fn fmt_opt(value: Option<f64>, decimals: usize) -> String {
    value
        .map(|v| format!("{v:.decimals$}"))
        .unwrap_or_else(|| "-".to_string())
}

fn fmt_money(value: Option<f64>) -> String {
    value
        .map(|v| format!("${v:.2}M"))
        .unwrap_or_else(|| "n/a".to_string())
}

impl ReportPrinter {
    pub fn new(season_label: impl Into<String>, top_n: usize) -> Self {
        Self {
            season_label: season_label.into(),
            top_n,
        }
    }

    /// Write the full analysis report.
    pub fn write_report<W: Write>(&self, table: &Table, out: &mut W) -> io::Result<()> {
        let stats = table.aggregate();

        writeln!(out, "MLB PAYROLL ANALYSIS - {}", self.season_label)?;
        writeln!(
            out,
            "\nDataset Shape: {} teams, {} features",
            table.len(),
            FEATURE_COUNT
        )?;
        writeln!(out, "\nAverage Total Payroll: {}", fmt_money(stats.mean_payroll))?;
        writeln!(out, "Median Total Payroll: {}", fmt_money(stats.median_payroll))?;

        writeln!(out, "\n\nKEY FINDINGS")?;
        match stats.payroll_wins_correlation {
            Some(corr) => {
                write!(out, "\nCorrelation between Total Payroll and Wins: {:.3}", corr.r)?;
                match corr.p_value {
                    Some(p) => writeln!(
                        out,
                        " (p = {p:.4}, {})",
                        if corr.is_significant {
                            format!("significant at {SIGNIFICANCE_THRESHOLD}")
                        } else {
                            "not significant".to_string()
                        }
                    )?,
                    None => writeln!(out)?,
                }
            }
            None => writeln!(
                out,
                "\nCorrelation between Total Payroll and Wins: undefined"
            )?,
        }
        if let Some(mean) = stats.mean_efficiency {
            writeln!(out, "League Average Efficiency: {mean:.4} wins per $M")?;
        }

        let k = self.top_n;
        self.write_leaderboard(
            out,
            &format!("Top {k} Spending Teams"),
            &table.top_k(MetricColumn::TotalPayrollMillions, k),
            &[Field::Team, Field::Payroll, Field::Wins, Field::Record],
        )?;
        self.write_leaderboard(
            out,
            "Most Efficient Teams (Wins per $M)",
            &table.top_k(MetricColumn::Efficiency, k),
            &[Field::Team, Field::Payroll, Field::Wins, Field::Efficiency],
        )?;
        self.write_leaderboard(
            out,
            "Least Efficient Teams (Wins per $M)",
            &table.bottom_k(MetricColumn::Efficiency, k),
            &[Field::Team, Field::Payroll, Field::Wins, Field::Efficiency],
        )?;

        if table.excluded_count() > 0 {
            writeln!(out, "\nExcluded Rows: {}", table.excluded_count())?;
            for exclusion in table.exclusions() {
                let team = if exclusion.team.is_empty() {
                    "<no team>"
                } else {
                    exclusion.team.as_str()
                };
                writeln!(out, "  line {}: {} ({})", exclusion.line, team, exclusion.reason)?;
            }
        }

        Ok(())
    }

    fn write_leaderboard<W: Write>(
        &self,
        out: &mut W,
        title: &str,
        rows: &[&TeamSeason],
        fields: &[Field],
    ) -> io::Result<()> {
        writeln!(out, "\n--- {title} ---")?;
        if rows.is_empty() {
            return writeln!(out, "(no teams with data)");
        }

        let cells: Vec<Vec<String>> = rows
            .iter()
            .map(|row| fields.iter().map(|f| f.cell(row)).collect())
            .collect();
        let widths: Vec<usize> = fields
            .iter()
            .enumerate()
            .map(|(i, f)| {
                cells
                    .iter()
                    .map(|c| c[i].chars().count())
                    .chain(std::iter::once(f.header().len()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let header: Vec<String> = fields
            .iter()
            .zip(&widths)
            .map(|(f, w)| format!("{:>w$}", f.header(), w = *w))
            .collect();
        writeln!(out, "{}", header.join("  "))?;

        for row in &cells {
            let line: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(c, w)| format!("{c:>w$}", w = *w))
                .collect();
            writeln!(out, "{}", line.join("  "))?;
        }
        Ok(())
    }

    /// List the artifacts created by this run.
    pub fn write_artifacts<W: Write>(
        &self,
        out: &mut W,
        artifacts: &[(PathBuf, &str)],
    ) -> io::Result<()> {
        writeln!(out, "\nFiles created:")?;
        for (i, (path, description)) in artifacts.iter().enumerate() {
            writeln!(out, "  {}. {} - {}", i + 1, path.display(), description)?;
        }
        Ok(())
    }
}

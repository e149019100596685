//! Statistics Calculator Module
//! Handles descriptive statistics, payroll/wins correlation and the trend line.

use crate::data::{MetricColumn, TeamSeason};
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Significance threshold for the correlation t-test
pub const SIGNIFICANCE_THRESHOLD: f64 = 0.05;

/// Descriptive statistics for one numeric series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DescriptiveStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub q1: f64,
    pub q3: f64,
}

/// Least-squares line `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Pearson correlation with its two-tailed significance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Correlation {
    pub r: f64,
    pub p_value: Option<f64>,
    pub is_significant: bool,
}

/// Snapshot of table-wide statistics. Each entry skips rows missing its own
/// inputs; `None` means the statistic is undefined for this table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateStats {
    pub team_count: usize,
    pub mean_payroll: Option<f64>,
    pub median_payroll: Option<f64>,
    pub payroll: Option<DescriptiveStats>,
    pub mean_efficiency: Option<f64>,
    pub median_efficiency: Option<f64>,
    pub mean_win_percentage: Option<f64>,
    pub payroll_wins_correlation: Option<Correlation>,
    pub payroll_wins_trend: Option<LinearFit>,
}

impl AggregateStats {
    /// Correlation coefficient, if defined.
    pub fn correlation(&self) -> Option<f64> {
        self.payroll_wins_correlation.map(|c| c.r)
    }
}

/// Handles statistical calculations.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Compute the aggregate snapshot for a finalized set of rows.
    pub fn compute_aggregate(rows: &[TeamSeason]) -> AggregateStats {
        let values = |column: MetricColumn| -> Vec<f64> {
            rows.iter().filter_map(|r| column.value(r)).collect()
        };

        let payroll = Self::compute_descriptive_stats(&values(MetricColumn::TotalPayrollMillions));
        let efficiency = Self::compute_descriptive_stats(&values(MetricColumn::Efficiency));
        let win_pct = Self::compute_descriptive_stats(&values(MetricColumn::WinPercentage));

        let (payrolls, wins): (Vec<f64>, Vec<f64>) = rows
            .iter()
            .filter_map(|r| r.total_payroll_millions.map(|p| (p, f64::from(r.wins))))
            .unzip();

        AggregateStats {
            team_count: rows.len(),
            mean_payroll: payroll.map(|s| s.mean),
            median_payroll: payroll.map(|s| s.median),
            payroll,
            mean_efficiency: efficiency.map(|s| s.mean),
            median_efficiency: efficiency.map(|s| s.median),
            mean_win_percentage: win_pct.map(|s| s.mean),
            payroll_wins_correlation: Self::pearson(&payrolls, &wins).map(|r| {
                let p_value = Self::correlation_p_value(r, payrolls.len());
                Correlation {
                    r,
                    p_value,
                    is_significant: p_value.is_some_and(|p| p <= SIGNIFICANCE_THRESHOLD),
                }
            }),
            payroll_wins_trend: Self::linear_fit(&payrolls, &wins),
        }
    }

    /// Compute descriptive statistics for an array of values.
    pub fn compute_descriptive_stats(values: &[f64]) -> Option<DescriptiveStats> {
        let n = values.len();
        if n == 0 {
            return None;
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let mean = values.iter().sum::<f64>() / n as f64;
        let median = if n % 2 == 0 {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        } else {
            sorted[n / 2]
        };

        let variance = if n > 1 {
            values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64
        } else {
            0.0
        };

        Some(DescriptiveStats {
            count: n,
            mean,
            median,
            std: variance.sqrt(),
            min: sorted[0],
            max: sorted[n - 1],
            q1: Self::percentile(&sorted, 25.0),
            q3: Self::percentile(&sorted, 75.0),
        })
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    pub fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }

    /// Pearson correlation coefficient of paired samples.
    ///
    /// Undefined with fewer than two pairs or when either series is constant.
    pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
        let n = xs.len();
        if n < 2 || n != ys.len() {
            return None;
        }

        let mean_x = xs.iter().sum::<f64>() / n as f64;
        let mean_y = ys.iter().sum::<f64>() / n as f64;

        let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
        for (x, y) in xs.iter().zip(ys) {
            let dx = x - mean_x;
            let dy = y - mean_y;
            cov += dx * dy;
            var_x += dx * dx;
            var_y += dy * dy;
        }

        if var_x == 0.0 || var_y == 0.0 {
            return None;
        }

        let r = cov / (var_x.sqrt() * var_y.sqrt());
        r.is_finite().then(|| r.clamp(-1.0, 1.0))
    }

    /// Two-tailed p-value for H0: no correlation, using t with n-2 df.
    pub fn correlation_p_value(r: f64, n: usize) -> Option<f64> {
        if n < 3 {
            return None;
        }
        if r.abs() >= 1.0 {
            return Some(0.0);
        }

        let df = (n - 2) as f64;
        let t = r * (df / (1.0 - r * r)).sqrt();

        let dist = StudentsT::new(0.0, 1.0, df).ok()?;
        Some(2.0 * (1.0 - dist.cdf(t.abs())))
    }

    /// Ordinary least squares fit of `ys` on `xs`.
    pub fn linear_fit(xs: &[f64], ys: &[f64]) -> Option<LinearFit> {
        let n = xs.len();
        if n < 2 || n != ys.len() {
            return None;
        }

        let mean_x = xs.iter().sum::<f64>() / n as f64;
        let mean_y = ys.iter().sum::<f64>() / n as f64;

        let sxx: f64 = xs.iter().map(|x| (x - mean_x).powi(2)).sum();
        if sxx == 0.0 {
            return None;
        }
        let sxy: f64 = xs
            .iter()
            .zip(ys)
            .map(|(x, y)| (x - mean_x) * (y - mean_y))
            .sum();

        let slope = sxy / sxx;
        Some(LinearFit {
            slope,
            intercept: mean_y - slope * mean_x,
        })
    }
}

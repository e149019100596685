//! Chart Plotter Module
//! Turns the finalized table into chart geometry: bars, colored points,
//! histogram bins and box-plot summaries. Drawing lives in the renderer.

use crate::config::ChartConfig;
use crate::data::{MetricColumn, Table};
use crate::stats::StatsCalculator;
use plotters::style::RGBColor;

/// Color palette (matplotlib "tab" colors)
pub const BLUE: RGBColor = RGBColor(31, 119, 180);
pub const GREEN: RGBColor = RGBColor(44, 160, 44);
pub const RED: RGBColor = RGBColor(214, 39, 40);
pub const ORANGE: RGBColor = RGBColor(255, 127, 14);
pub const SKY_BLUE: RGBColor = RGBColor(135, 206, 235);
pub const GRAY: RGBColor = RGBColor(150, 150, 150);

// Red-yellow-green diverging scale stops
const SCALE_LOW: RGBColor = RGBColor(215, 48, 39);
const SCALE_MID: RGBColor = RGBColor(255, 255, 191);
const SCALE_HIGH: RGBColor = RGBColor(26, 152, 80);

/// One labelled bar.
#[derive(Debug, Clone)]
pub struct Bar {
    pub label: String,
    pub value: f64,
    pub color: RGBColor,
}

/// One team on the payroll vs wins scatter.
#[derive(Debug, Clone)]
pub struct ScatterPoint {
    pub team: String,
    pub payroll: f64,
    pub wins: f64,
    pub color: RGBColor,
    /// Set for efficiency outliers only.
    pub label: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Box-plot geometry with 1.5 x IQR whiskers.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxSummary {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub whisker_low: f64,
    pub whisker_high: f64,
    pub outliers: Vec<f64>,
}

/// Creates chart geometry from a table.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Contenders (wins at or above the threshold) are highlighted.
    pub fn payroll_bar_color(wins: u32, contender_wins: u32) -> RGBColor {
        if wins < contender_wins {
            BLUE
        } else {
            GREEN
        }
    }

    pub fn efficiency_color(efficiency: f64, config: &ChartConfig) -> RGBColor {
        if efficiency < config.efficiency_low {
            RED
        } else if efficiency > config.efficiency_high {
            GREEN
        } else {
            ORANGE
        }
    }

    /// Map `value` within `[min, max]` onto the red-yellow-green scale.
    pub fn scale_color(value: f64, min: f64, max: f64) -> RGBColor {
        let t = if max > min {
            ((value - min) / (max - min)).clamp(0.0, 1.0)
        } else {
            0.5
        };

        if t < 0.5 {
            Self::lerp(SCALE_LOW, SCALE_MID, t * 2.0)
        } else {
            Self::lerp(SCALE_MID, SCALE_HIGH, (t - 0.5) * 2.0)
        }
    }

    fn lerp(a: RGBColor, b: RGBColor, t: f64) -> RGBColor {
        let channel = |x: u8, y: u8| (f64::from(x) + (f64::from(y) - f64::from(x)) * t).round() as u8;
        RGBColor(channel(a.0, b.0), channel(a.1, b.1), channel(a.2, b.2))
    }

    /// The highest payrolls, descending.
    pub fn top_payroll_bars(table: &Table, config: &ChartConfig) -> Vec<Bar> {
        table
            .top_k(MetricColumn::TotalPayrollMillions, config.top_payrolls)
            .into_iter()
            .filter_map(|row| {
                Some(Bar {
                    label: row.team.clone(),
                    value: row.total_payroll_millions?,
                    color: Self::payroll_bar_color(row.wins, config.contender_wins),
                })
            })
            .collect()
    }

    /// Every team with a defined efficiency, ascending.
    pub fn efficiency_bars(table: &Table, config: &ChartConfig) -> Vec<Bar> {
        table
            .sorted_asc(MetricColumn::Efficiency)
            .into_iter()
            .filter_map(|row| {
                let value = row.efficiency?;
                Some(Bar {
                    label: row.team.clone(),
                    value,
                    color: Self::efficiency_color(value, config),
                })
            })
            .collect()
    }

    /// Teams with a known payroll, colored by win percentage.
    pub fn scatter_points(table: &Table, config: &ChartConfig) -> Vec<ScatterPoint> {
        let win_pcts = table.column_values(MetricColumn::WinPercentage);
        let min = win_pcts.iter().copied().fold(f64::INFINITY, f64::min);
        let max = win_pcts.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        table
            .rows()
            .iter()
            .filter_map(|row| {
                let payroll = row.total_payroll_millions?;
                let color = row
                    .win_percentage
                    .map(|p| Self::scale_color(p, min, max))
                    .unwrap_or(GRAY);
                let label = row
                    .efficiency
                    .filter(|e| *e > config.outlier_high || *e < config.outlier_low)
                    .map(|_| row.team.clone());

                Some(ScatterPoint {
                    team: row.team.clone(),
                    payroll,
                    wins: f64::from(row.wins),
                    color,
                    label,
                })
            })
            .collect()
    }

    /// Equal-width bins over `[min, max]`; the last bin includes its right edge.
    pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
        if values.is_empty() || bins == 0 {
            return Vec::new();
        }

        let mut min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let mut max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if min == max {
            min -= 0.5;
            max += 0.5;
        }

        let width = (max - min) / bins as f64;
        let mut counts = vec![0usize; bins];
        for &v in values {
            let idx = (((v - min) / width).floor() as usize).min(bins - 1);
            counts[idx] += 1;
        }

        counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| HistogramBin {
                start: min + i as f64 * width,
                end: min + (i + 1) as f64 * width,
                count,
            })
            .collect()
    }

    pub fn box_summary(values: &[f64]) -> Option<BoxSummary> {
        if values.is_empty() {
            return None;
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let q1 = StatsCalculator::percentile(&sorted, 25.0);
        let median = StatsCalculator::percentile(&sorted, 50.0);
        let q3 = StatsCalculator::percentile(&sorted, 75.0);
        let iqr = q3 - q1;
        let (low_fence, high_fence) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);

        let whisker_low = sorted
            .iter()
            .copied()
            .find(|&v| v >= low_fence)
            .unwrap_or(q1);
        let whisker_high = sorted
            .iter()
            .rev()
            .copied()
            .find(|&v| v <= high_fence)
            .unwrap_or(q3);
        let outliers = sorted
            .iter()
            .copied()
            .filter(|&v| v < low_fence || v > high_fence)
            .collect();

        Some(BoxSummary {
            q1,
            median,
            q3,
            whisker_low,
            whisker_high,
            outliers,
        })
    }
}

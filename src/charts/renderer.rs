//! Static Chart Renderer
//! Draws the PNG charts with plotters' bitmap backend.
//!
//! Charts:
//! 1. Top payrolls: bar chart, contenders highlighted, league-average line
//! 2. Payroll vs wins: scatter colored by win percentage, trend line, outlier labels
//! 3. Payroll efficiency: horizontal bars ranked ascending, league-average line
//! 4. Payroll distribution: histogram (mean/median markers) beside a box plot

use crate::charts::plotter::{
    Bar, BoxSummary, ChartPlotter, HistogramBin, ScatterPoint, BLUE, GREEN, ORANGE, RED, SKY_BLUE,
};
use crate::config::ChartConfig;
use crate::data::{MetricColumn, Table};
use crate::stats::{AggregateStats, DescriptiveStats};
use plotters::prelude::*;
use rayon::prelude::*;
use std::error::Error as StdError;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

const FONT: &str = "sans-serif";

type DrawResult = Result<(), Box<dyn StdError>>;

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("failed to create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to draw {chart}: {message}")]
    Drawing { chart: &'static str, message: String },
    #[error("cannot draw {chart}: no team has the required values")]
    NoData { chart: &'static str },
}

/// The static chart artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    TopPayrolls,
    PayrollVsWins,
    Efficiency,
    Distribution,
}

impl ChartKind {
    pub const ALL: [ChartKind; 4] = [
        ChartKind::TopPayrolls,
        ChartKind::PayrollVsWins,
        ChartKind::Efficiency,
        ChartKind::Distribution,
    ];

    /// Artifact file name. Fixed regardless of `charts.top_payrolls`; the
    /// chart title carries the actual count.
    pub fn file_name(self) -> &'static str {
        match self {
            ChartKind::TopPayrolls => "top_10_payrolls.png",
            ChartKind::PayrollVsWins => "payroll_vs_wins.png",
            ChartKind::Efficiency => "payroll_efficiency.png",
            ChartKind::Distribution => "payroll_distribution.png",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ChartKind::TopPayrolls => "Bar chart of highest spending teams",
            ChartKind::PayrollVsWins => "Scatter plot showing payroll-performance relationship",
            ChartKind::Efficiency => "Teams ranked by cost efficiency",
            ChartKind::Distribution => "Statistical distribution of payrolls",
        }
    }
}

pub struct StaticChartRenderer {
    config: ChartConfig,
    season_label: String,
}

impl StaticChartRenderer {
    pub fn new(config: ChartConfig, season_label: impl Into<String>) -> Self {
        Self {
            config,
            season_label: season_label.into(),
        }
    }

    /// Render every chart into `out_dir`. Charts are independent and drawn in parallel.
    ///
    /// A chart with nothing to plot is skipped with a warning; only the charts
    /// actually written are returned, in `ChartKind::ALL` order.
    pub fn render_all(
        &self,
        table: &Table,
        out_dir: &Path,
    ) -> Result<Vec<(ChartKind, PathBuf)>, ChartError> {
        std::fs::create_dir_all(out_dir).map_err(|source| ChartError::OutputDir {
            path: out_dir.to_path_buf(),
            source,
        })?;

        let rendered: Vec<Option<(ChartKind, PathBuf)>> = ChartKind::ALL
            .par_iter()
            .map(|&kind| -> Result<Option<(ChartKind, PathBuf)>, ChartError> {
                let path = out_dir.join(kind.file_name());
                match self.render(kind, table, &path) {
                    Ok(()) => {
                        info!(chart = kind.file_name(), "saved chart");
                        Ok(Some((kind, path)))
                    }
                    Err(ChartError::NoData { chart }) => {
                        warn!(chart, "skipped chart: no team has the required values");
                        Ok(None)
                    }
                    Err(e) => Err(e),
                }
            })
            .collect::<Result<_, _>>()?;

        Ok(rendered.into_iter().flatten().collect())
    }

    pub fn render(&self, kind: ChartKind, table: &Table, path: &Path) -> Result<(), ChartError> {
        let chart = kind.file_name();
        let stats = table.aggregate();

        let result = match kind {
            ChartKind::TopPayrolls => {
                let bars = ChartPlotter::top_payroll_bars(table, &self.config);
                if bars.is_empty() {
                    return Err(ChartError::NoData { chart });
                }
                self.draw_top_payrolls(&bars, stats.mean_payroll, path)
            }
            ChartKind::PayrollVsWins => {
                let points = ChartPlotter::scatter_points(table, &self.config);
                if points.is_empty() {
                    return Err(ChartError::NoData { chart });
                }
                self.draw_payroll_vs_wins(&points, stats, path)
            }
            ChartKind::Efficiency => {
                let bars = ChartPlotter::efficiency_bars(table, &self.config);
                if bars.is_empty() {
                    return Err(ChartError::NoData { chart });
                }
                self.draw_efficiency(&bars, stats.mean_efficiency, path)
            }
            ChartKind::Distribution => {
                let payrolls = table.column_values(MetricColumn::TotalPayrollMillions);
                let bins = ChartPlotter::histogram(&payrolls, self.config.histogram_bins);
                let (Some(summary), Some(payroll)) =
                    (ChartPlotter::box_summary(&payrolls), stats.payroll)
                else {
                    return Err(ChartError::NoData { chart });
                };
                self.draw_distribution(&bins, &summary, &payroll, path)
            }
        };

        result.map_err(|e| ChartError::Drawing {
            chart,
            message: e.to_string(),
        })
    }

    fn title(&self, text: &str) -> String {
        format!("{text} - {}", self.season_label)
    }

    fn draw_top_payrolls(&self, bars: &[Bar], mean: Option<f64>, path: &Path) -> DrawResult {
        let n = bars.len() as f64;
        let y_max = bars.iter().map(|b| b.value).fold(0.0, f64::max) * 1.1 + 1.0;
        let title = self.title(&format!("Top {} Teams by Total Payroll", bars.len()));

        let root =
            BitMapBackend::new(path, (self.config.width, self.config.height)).into_drawing_area();
        root.fill(&WHITE)?;

        let mut ctx = ChartBuilder::on(&root)
            .caption(title, (FONT, 26).into_font().style(FontStyle::Bold))
            .margin(20)
            .x_label_area_size(140)
            .y_label_area_size(70)
            .build_cartesian_2d(-0.5f64..(n - 0.5), 0f64..y_max)?;

        let label_at = |x: &f64| team_label(bars, *x);
        ctx.configure_mesh()
            .disable_x_mesh()
            .x_labels(bars.len())
            .x_label_formatter(&label_at)
            .x_label_style((FONT, 14).into_font().transform(FontTransform::Rotate90))
            .x_desc("Team")
            .y_desc("Total Payroll (Millions $)")
            .draw()?;

        ctx.draw_series(bars.iter().enumerate().map(|(i, bar)| {
            let x = i as f64;
            Rectangle::new([(x - 0.4, 0.0), (x + 0.4, bar.value)], bar.color.filled())
        }))?;

        if let Some(mean) = mean {
            ctx.draw_series(LineSeries::new(
                vec![(-0.5, mean), (n - 0.5, mean)],
                RED.stroke_width(2),
            ))?
            .label(format!("League Avg: ${mean:.1}M"))
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.stroke_width(2)));

            ctx.configure_series_labels()
                .background_style(&WHITE.mix(0.8))
                .border_style(&BLACK)
                .draw()?;
        }

        root.present()?;
        Ok(())
    }

    fn draw_payroll_vs_wins(
        &self,
        points: &[ScatterPoint],
        stats: &AggregateStats,
        path: &Path,
    ) -> DrawResult {
        let (x_min, x_max) = padded_range(points.iter().map(|p| p.payroll));
        let (y_min, y_max) = padded_range(points.iter().map(|p| p.wins));

        let root =
            BitMapBackend::new(path, (self.config.width, self.config.height)).into_drawing_area();
        root.fill(&WHITE)?;

        let mut ctx = ChartBuilder::on(&root)
            .caption(
                self.title("Team Payroll vs Performance"),
                (FONT, 26).into_font().style(FontStyle::Bold),
            )
            .margin(20)
            .x_label_area_size(60)
            .y_label_area_size(70)
            .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

        ctx.configure_mesh()
            .light_line_style(BLACK.mix(0.08).stroke_width(1))
            .x_desc("Total Payroll (Millions $)")
            .y_desc("Wins (color: win percentage)")
            .draw()?;

        ctx.draw_series(
            points
                .iter()
                .map(|p| Circle::new((p.payroll, p.wins), 7, p.color.mix(0.8).filled())),
        )?;

        ctx.draw_series(points.iter().filter_map(|p| {
            let label = p.label.clone()?;
            Some(
                EmptyElement::at((p.payroll, p.wins))
                    + Text::new(label, (8, -16), (FONT, 13).into_font().color(&BLACK.mix(0.7))),
            )
        }))?;

        if let Some(trend) = stats.payroll_wins_trend {
            let r = stats.correlation().unwrap_or(0.0);
            ctx.draw_series(LineSeries::new(
                vec![(x_min, trend.predict(x_min)), (x_max, trend.predict(x_max))],
                RED.mix(0.8).stroke_width(2),
            ))?
            .label(format!("Trend Line (R={r:.3})"))
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.stroke_width(2)));

            ctx.configure_series_labels()
                .background_style(&WHITE.mix(0.8))
                .border_style(&BLACK)
                .draw()?;
        }

        root.present()?;
        Ok(())
    }

    fn draw_efficiency(&self, bars: &[Bar], mean: Option<f64>, path: &Path) -> DrawResult {
        let n = bars.len() as f64;
        let x_max = bars.iter().map(|b| b.value).fold(0.0, f64::max) * 1.1;
        let x_max = if x_max > 0.0 { x_max } else { 1.0 };
        // one readable label per team
        let height = self.config.height.max(bars.len() as u32 * 22 + 160);

        let root = BitMapBackend::new(path, (self.config.width, height)).into_drawing_area();
        root.fill(&WHITE)?;

        let mut ctx = ChartBuilder::on(&root)
            .caption(
                self.title("Team Payroll Efficiency"),
                (FONT, 26).into_font().style(FontStyle::Bold),
            )
            .margin(20)
            .x_label_area_size(60)
            .y_label_area_size(200)
            .build_cartesian_2d(0f64..x_max, -0.5f64..(n - 0.5))?;

        let label_at = |y: &f64| team_label(bars, *y);
        ctx.configure_mesh()
            .disable_y_mesh()
            .y_labels(bars.len())
            .y_label_formatter(&label_at)
            .y_label_style((FONT, 13))
            .x_desc("Wins per Million Dollars Spent")
            .draw()?;

        ctx.draw_series(bars.iter().enumerate().map(|(i, bar)| {
            let y = i as f64;
            Rectangle::new([(0.0, y - 0.4), (bar.value, y + 0.4)], bar.color.filled())
        }))?;

        if let Some(mean) = mean {
            ctx.draw_series(LineSeries::new(
                vec![(mean, -0.5), (mean, n - 0.5)],
                BLUE.stroke_width(2),
            ))?
            .label(format!("League Avg: {mean:.3}"))
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE.stroke_width(2)));

            ctx.configure_series_labels()
                .position(SeriesLabelPosition::LowerRight)
                .background_style(&WHITE.mix(0.8))
                .border_style(&BLACK)
                .draw()?;
        }

        root.present()?;
        Ok(())
    }

    fn draw_distribution(
        &self,
        bins: &[HistogramBin],
        summary: &BoxSummary,
        stats: &DescriptiveStats,
        path: &Path,
    ) -> DrawResult {
        let root =
            BitMapBackend::new(path, (self.config.width, self.config.height)).into_drawing_area();
        root.fill(&WHITE)?;
        let (left, right) = root.split_horizontally(self.config.width / 2);

        // Histogram
        let x_min = bins.first().map(|b| b.start).unwrap_or(stats.min);
        let x_max = bins.last().map(|b| b.end).unwrap_or(stats.max);
        let y_max = bins.iter().map(|b| b.count).max().unwrap_or(0) as f64 + 1.0;

        let mut hist = ChartBuilder::on(&left)
            .caption(
                "Distribution of Team Payrolls",
                (FONT, 20).into_font().style(FontStyle::Bold),
            )
            .margin(15)
            .x_label_area_size(50)
            .y_label_area_size(60)
            .build_cartesian_2d(x_min..x_max, 0f64..y_max)?;

        hist.configure_mesh()
            .disable_x_mesh()
            .x_desc("Total Payroll (Millions $)")
            .y_desc("Number of Teams")
            .draw()?;

        hist.draw_series(bins.iter().map(|b| {
            Rectangle::new([(b.start, 0.0), (b.end, b.count as f64)], SKY_BLUE.filled())
        }))?;
        hist.draw_series(bins.iter().map(|b| {
            Rectangle::new([(b.start, 0.0), (b.end, b.count as f64)], BLACK.stroke_width(1))
        }))?;

        for (value, color, label) in [
            (stats.mean, RED, format!("Mean: ${:.1}M", stats.mean)),
            (stats.median, GREEN, format!("Median: ${:.1}M", stats.median)),
        ] {
            hist.draw_series(LineSeries::new(
                vec![(value, 0.0), (value, y_max)],
                color.stroke_width(2),
            ))?
            .label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
        }
        hist.configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;

        // Box plot
        let spread = (stats.max - stats.min).max(1.0);
        let (y_low, y_high) = (stats.min - spread * 0.1, stats.max + spread * 0.1);
        let mut boxplot = ChartBuilder::on(&right)
            .caption(
                "Payroll Distribution Box Plot",
                (FONT, 20).into_font().style(FontStyle::Bold),
            )
            .margin(15)
            .x_label_area_size(50)
            .y_label_area_size(60)
            .build_cartesian_2d(0f64..2f64, y_low..y_high)?;

        boxplot
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(0)
            .light_line_style(BLACK.mix(0.1).stroke_width(1))
            .y_desc("Total Payroll (Millions $)")
            .draw()?;

        let (left_x, center, right_x) = (0.7, 1.0, 1.3);
        let box_corners = [(left_x, summary.q1), (right_x, summary.q3)];
        boxplot.draw_series(std::iter::once(Rectangle::new(
            box_corners,
            SKY_BLUE.mix(0.5).filled(),
        )))?;
        boxplot.draw_series(std::iter::once(Rectangle::new(
            box_corners,
            BLACK.stroke_width(2),
        )))?;

        let segments = [
            ((left_x, summary.median), (right_x, summary.median), ORANGE),
            ((center, summary.q3), (center, summary.whisker_high), BLACK),
            ((center, summary.q1), (center, summary.whisker_low), BLACK),
            ((0.85, summary.whisker_high), (1.15, summary.whisker_high), BLACK),
            ((0.85, summary.whisker_low), (1.15, summary.whisker_low), BLACK),
        ];
        boxplot.draw_series(
            segments
                .iter()
                .map(|&(a, b, color)| PathElement::new(vec![a, b], color.stroke_width(2))),
        )?;
        boxplot.draw_series(
            summary
                .outliers
                .iter()
                .map(|&v| Circle::new((center, v), 5, BLACK.stroke_width(1))),
        )?;

        root.present()?;
        Ok(())
    }
}

/// Label for an integer position on a categorical axis.
fn team_label(bars: &[Bar], pos: f64) -> String {
    let idx = pos.round();
    if (pos - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    bars.get(idx as usize)
        .map(|b| b.label.clone())
        .unwrap_or_default()
}

/// Data range with 10% padding on each side; never empty.
fn padded_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !min.is_finite() {
        return (0.0, 1.0);
    }
    let pad = ((max - min) * 0.1).max(1.0);
    (min - pad, max + pad)
}

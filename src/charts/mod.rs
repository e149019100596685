//! Charts module - Chart geometry and static rendering

mod plotter;
mod renderer;

pub use plotter::{Bar, BoxSummary, ChartPlotter, HistogramBin, ScatterPoint};
pub use renderer::{ChartError, ChartKind, StaticChartRenderer};

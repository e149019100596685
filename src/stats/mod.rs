//! Stats module - aggregate statistics over the finalized table

mod calculator;

pub use calculator::{
    AggregateStats, Correlation, DescriptiveStats, LinearFit, StatsCalculator,
    SIGNIFICANCE_THRESHOLD,
};

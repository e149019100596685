//! Payroll Efficiency - team payroll vs. performance analysis
//!
//! Loads a per-team season table, cleans the currency and win-loss columns,
//! derives win percentage and payroll efficiency, and feeds the finalized
//! table to the console report, the static charts and the summary export.

pub mod charts;
pub mod config;
pub mod data;
pub mod export;
pub mod report;
pub mod stats;

use config::{Config, ConfigError};
use data::{LoaderError, MetricsPipeline, PipelineError, Table, TableLoader};
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Load(#[from] LoaderError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// Load `path` and run the metrics pipeline with the configured columns.
pub fn load_table(path: &Path, config: &Config) -> Result<Table, AnalysisError> {
    let raw = TableLoader::new(config.delimiter()?).load_csv(path)?;
    info!(
        path = %path.display(),
        rows = raw.get_row_count(),
        "loaded input table"
    );

    let table = MetricsPipeline::new(config.columns.clone()).run(&raw)?;
    Ok(table)
}

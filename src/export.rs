//! Summary Export Module
//! Writes the cleaned summary table (CSV, via a Polars DataFrame) and the
//! aggregate statistics (JSON).

use crate::data::{Exclusion, MetricColumn, Table};
use crate::stats::AggregateStats;
use polars::prelude::*;
use serde::Serialize;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

pub const SUMMARY_FILE: &str = "mlb_payroll_summary.csv";
pub const AGGREGATE_FILE: &str = "aggregate_stats.json";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct AggregateDocument<'a> {
    rows: usize,
    excluded: usize,
    exclusions: &'a [Exclusion],
    stats: &'a AggregateStats,
}

/// Writes the summary CSV and the aggregate JSON.
pub struct SummaryExporter;

impl SummaryExporter {
    /// Summary columns, sorted by wins descending; ties keep table order.
    pub fn summary_frame(table: &Table) -> Result<DataFrame, ExportError> {
        let rows = table.sorted_desc(MetricColumn::Wins);

        let teams: Vec<String> = rows.iter().map(|r| r.team.clone()).collect();
        let records: Vec<String> = rows.iter().map(|r| r.record.clone()).collect();
        let payroll: Vec<Option<f64>> = rows.iter().map(|r| r.total_payroll_millions).collect();
        let wins: Vec<u32> = rows.iter().map(|r| r.wins).collect();
        let win_pct: Vec<Option<f64>> = rows.iter().map(|r| r.win_percentage).collect();
        let efficiency: Vec<Option<f64>> = rows.iter().map(|r| r.efficiency).collect();

        let df = DataFrame::new(vec![
            Column::new("team".into(), teams),
            Column::new("record".into(), records),
            Column::new("total_payroll_millions".into(), payroll),
            Column::new("wins".into(), wins),
            Column::new("win_percentage".into(), win_pct),
            Column::new("efficiency".into(), efficiency),
        ])?;

        Ok(df)
    }

    pub fn write_summary_csv(table: &Table, path: &Path) -> Result<(), ExportError> {
        let mut df = Self::summary_frame(table)?;
        let file = File::create(path).map_err(|source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut writer = BufWriter::new(file);

        CsvWriter::new(&mut writer)
            .include_header(true)
            .finish(&mut df)?;
        Ok(())
    }

    pub fn write_aggregate_json(table: &Table, path: &Path) -> Result<(), ExportError> {
        let file = File::create(path).map_err(|source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let doc = AggregateDocument {
            rows: table.len(),
            excluded: table.excluded_count(),
            exclusions: table.exclusions(),
            stats: table.aggregate(),
        };
        serde_json::to_writer_pretty(BufWriter::new(file), &doc)?;
        Ok(())
    }

    /// Write both files into `out_dir`, creating it if needed.
    pub fn export_all(table: &Table, out_dir: &Path) -> Result<Vec<PathBuf>, ExportError> {
        fs::create_dir_all(out_dir).map_err(|source| ExportError::Io {
            path: out_dir.to_path_buf(),
            source,
        })?;

        let summary = out_dir.join(SUMMARY_FILE);
        Self::write_summary_csv(table, &summary)?;
        info!(path = %summary.display(), "saved summary table");

        let aggregate = out_dir.join(AGGREGATE_FILE);
        Self::write_aggregate_json(table, &aggregate)?;
        info!(path = %aggregate.display(), "saved aggregate statistics");

        Ok(vec![summary, aggregate])
    }
}

//! Configuration Module
//! Optional TOML settings file; every key falls back to a default.

use serde::Deserialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    Validation { field: String, message: String },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub input: InputConfig,
    pub columns: ColumnNames,
    pub report: ReportConfig,
    pub charts: ChartConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Single ASCII field separator.
    pub delimiter: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            delimiter: ",".into(),
        }
    }
}

/// Header names of the source columns. Matched exactly.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub team: String,
    pub record: String,
    pub total_payroll: String,
    pub active_payroll: String,
    pub injured_payroll: String,
    pub retained_payroll: String,
    pub buried_payroll: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            team: "Team".into(),
            record: "Record".into(),
            total_payroll: "Total Payroll".into(),
            active_payroll: "Active".into(),
            injured_payroll: "Injured".into(),
            retained_payroll: "Retained".into(),
            buried_payroll: "Buried".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub season_label: String,
    pub top_n: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            season_label: "2024 Season".into(),
            top_n: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
    pub top_payrolls: usize,
    pub contender_wins: u32,
    pub histogram_bins: usize,
    pub efficiency_low: f64,
    pub efficiency_high: f64,
    pub outlier_low: f64,
    pub outlier_high: f64,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 1400,
            height: 700,
            top_payrolls: 10,
            contender_wins: 90,
            histogram_bins: 15,
            efficiency_low: 0.30,
            efficiency_high: 0.40,
            outlier_low: 0.25,
            outlier_high: 0.45,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("output"),
        }
    }
}

impl Config {
    /// Load and validate a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| {
            let path = path.to_path_buf();
            match source.kind() {
                ErrorKind::NotFound => ConfigError::FileNotFound { path, source },
                _ => ConfigError::Read { path, source },
            }
        })?;
        let config: Config = toml::from_str(&text).map_err(|source| ConfigError::ParseError {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// The configured delimiter as a byte.
    pub fn delimiter(&self) -> Result<u8, ConfigError> {
        match self.input.delimiter.as_bytes() {
            [b] => Ok(*b),
            _ => Err(validation(
                "input.delimiter",
                "must be exactly one ASCII character",
            )),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.delimiter()?;

        let columns = [
            ("columns.team", &self.columns.team),
            ("columns.record", &self.columns.record),
            ("columns.total_payroll", &self.columns.total_payroll),
        ];
        for (field, name) in columns {
            if name.is_empty() {
                return Err(validation(field, "column name must not be empty"));
            }
        }

        if self.report.top_n == 0 {
            return Err(validation("report.top_n", "must be at least 1"));
        }

        let charts = &self.charts;
        if charts.width == 0 || charts.height == 0 {
            return Err(validation("charts.width", "chart size must be non-zero"));
        }
        if charts.top_payrolls == 0 {
            return Err(validation("charts.top_payrolls", "must be at least 1"));
        }
        if charts.histogram_bins == 0 {
            return Err(validation("charts.histogram_bins", "must be at least 1"));
        }
        if charts.efficiency_low > charts.efficiency_high {
            return Err(validation(
                "charts.efficiency_low",
                "must not exceed charts.efficiency_high",
            ));
        }
        if charts.outlier_low > charts.outlier_high {
            return Err(validation(
                "charts.outlier_low",
                "must not exceed charts.outlier_high",
            ));
        }

        Ok(())
    }
}

fn validation(field: &str, message: &str) -> ConfigError {
    ConfigError::Validation {
        field: field.to_string(),
        message: message.to_string(),
    }
}

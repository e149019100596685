//! Data module - CSV loading, cleaning and the finalized table

mod loader;
mod processor;
mod table;

pub use loader::{LoaderError, RawRow, RawTable, TableLoader};
pub use processor::{normalize_currency, parse_record, MetricsPipeline, ParsedRow, PipelineError};
pub use table::{Exclusion, ExclusionReason, MetricColumn, Table, TeamSeason, FEATURE_COUNT};

#[cfg(test)]
pub(crate) use table::tests::season;

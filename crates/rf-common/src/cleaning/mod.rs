pub mod lifecycle;
pub mod reconcile;

pub use lifecycle::{
    drop_early_stage, drop_non_progressing, EarlyStageReport, OutcomeConfig, OutcomeReport,
};
pub use reconcile::{reconcile, ReconcileReport};

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CleaningError {
    #[error("invariant_columns must name at least one column")]
    NoInvariantColumns,
    #[error("unknown column: {0}")]
    UnknownColumn(String),
}

pub(crate) fn require_column(
    table: &crate::table::Table,
    name: &str,
) -> Result<usize, CleaningError> {
    table
        .column_index(name)
        .ok_or_else(|| CleaningError::UnknownColumn(name.to_string()))
}

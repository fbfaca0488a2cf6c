use thiserror::Error;
use tracing::info;

use crate::cleaning::{
    drop_early_stage, drop_non_progressing, reconcile, CleaningError, EarlyStageReport,
    OutcomeConfig, OutcomeReport, ReconcileReport,
};
use crate::features::{FeatureBuilder, FeatureConfig, ScoringContext};
use crate::normalize::sanitize_headers;
use crate::table::{Table, TableError};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Cleaning(#[from] CleaningError),
    #[error(transparent)]
    Table(#[from] TableError),
}

/// Full batch configuration: which columns pin an identity, how terminal
/// events are ordered, and how the feature columns are assembled.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub invariant_columns: Vec<String>,
    pub outcome: OutcomeConfig,
    pub features: FeatureConfig,
}

#[derive(Debug, Clone, Copy)]
pub struct PipelineSummary {
    pub reconcile: ReconcileReport,
    pub early_stage: EarlyStageReport,
    pub outcome: OutcomeReport,
    pub rows_scored: usize,
}

/// Run the whole batch in stage order: header sanitation, identifier
/// reconciliation, the two lifecycle passes, then the feature columns.
///
/// Each stage consumes the full table before the next begins; the two
/// filter passes are independent and their order does not change the
/// surviving row set (covered by the integration tests), early-stage
/// simply runs first because it is the cheaper of the two.
pub fn run(
    table: &mut Table,
    config: &PipelineConfig,
    ctx: &mut ScoringContext,
) -> Result<PipelineSummary, PipelineError> {
    sanitize_headers(table)?;

    let invariant_columns: Vec<&str> = config
        .invariant_columns
        .iter()
        .map(String::as_str)
        .collect();
    let reconcile_report = reconcile(table, &invariant_columns)?;
    let early_stage = drop_early_stage(table)?;
    let outcome = drop_non_progressing(table, &config.outcome)?;

    let mut builder = FeatureBuilder::new(ctx, config.features.clone());
    builder.append_all(table)?;

    let summary = PipelineSummary {
        reconcile: reconcile_report,
        early_stage,
        outcome,
        rows_scored: table.len(),
    };
    info!(
        unique_ids_before = summary.reconcile.unique_ids_before,
        unique_ids_after = summary.reconcile.unique_ids_after,
        early_stage_removed = summary.early_stage.ids_removed,
        non_progressing_removed = summary.outcome.ids_removed,
        rows_scored = summary.rows_scored,
        "pipeline finished"
    );
    Ok(summary)
}

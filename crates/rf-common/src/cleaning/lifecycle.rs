use std::collections::HashSet;

use tracing::info;

use super::{require_column, CleaningError};
use crate::normalize::{normalize_event_type, normalize_feedback, normalize_state};
use crate::schema;
use crate::table::{Table, Value};

/// States a candidate can sit in without ever having been worked on.
const EARLY_STATES: &[&str] = &["imported", "first contact", "in selection"];

/// Terminal event types that mean the process stopped at the company's last
/// word: an offer or a notification that was never followed by a hire.
const NON_PROGRESS_EVENTS: &[&str] = &["economic proposal", "candidate notification"];

const HIRED_STATE: &str = "hired";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EarlyStageReport {
    pub rows_before: usize,
    pub rows_after: usize,
    pub ids_removed: usize,
}

/// Drop identifiers whose entire presence is a single uninformative row.
///
/// An identifier is removed only when all three hold: exactly one row, a
/// normalized state inside [`EARLY_STATES`], and no `Sector` information.
/// Any further event, a known sector, or a later state exempts the
/// candidate unconditionally.
pub fn drop_early_stage(table: &mut Table) -> Result<EarlyStageReport, CleaningError> {
    let id_col = require_column(table, schema::ID)?;
    let state_col = require_column(table, schema::CANDIDATE_STATE)?;
    let sector_col = require_column(table, schema::SECTOR)?;

    normalize_column(table, state_col, normalize_state);

    let rows_before = table.len();
    let mut ids_to_drop: HashSet<String> = HashSet::new();
    let groups = table
        .group_rows_by(schema::ID)
        .expect("ID column checked above");
    for (id, rows) in groups {
        if rows.len() != 1 {
            continue;
        }
        let row = &table.rows()[rows[0]];
        let early_state = row.values()[state_col]
            .as_text()
            .is_some_and(|s| EARLY_STATES.contains(&s));
        if early_state && row.values()[sector_col].is_missing() {
            ids_to_drop.insert(id);
        }
    }

    retain_ids_not_in(table, id_col, &ids_to_drop);
    let report = EarlyStageReport {
        rows_before,
        rows_after: table.len(),
        ids_removed: ids_to_drop.len(),
    };
    info!(
        ids_removed = report.ids_removed,
        "removed initial-stage-only candidates"
    );
    Ok(report)
}

/// Operator-supplied precedence for the outcome pass.
///
/// The orders let the caller encode domain precedence ("hired" must sort
/// after any rejection-adjacent state) instead of trusting string order or
/// source timestamps, which the export frequently lacks. Values absent from
/// an order list rank before every listed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutcomeConfig {
    pub state_order: Vec<String>,
    pub event_order: Vec<String>,
    pub feedbacks_to_remove: Vec<String>,
}

impl Default for OutcomeConfig {
    fn default() -> Self {
        Self {
            state_order: vec![
                "imported".into(),
                "first contact".into(),
                "in selection".into(),
                HIRED_STATE.into(),
            ],
            event_order: vec![
                "candidate notification".into(),
                "interview".into(),
                "economic proposal".into(),
            ],
            feedbacks_to_remove: vec![
                "rejected".into(),
                "declined".into(),
                "withdrawn".into(),
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutcomeReport {
    pub rows_before: usize,
    pub rows_after: usize,
    pub ids_removed: usize,
}

/// Drop identifiers whose terminal event indicates the process ended
/// without progress, unless the candidate was hired at any point.
///
/// Per identifier, rows are stable-sorted by (state rank, event rank) under
/// the configured orders; the last row after sorting is the terminal event.
/// The identifier is marked for removal when the group holds no `hired` row
/// and the terminal row either carries a feedback from
/// `feedbacks_to_remove` or one of [`NON_PROGRESS_EVENTS`]. All rows of a
/// marked identifier are dropped, not just the terminal one.
pub fn drop_non_progressing(
    table: &mut Table,
    config: &OutcomeConfig,
) -> Result<OutcomeReport, CleaningError> {
    let id_col = require_column(table, schema::ID)?;
    let state_col = require_column(table, schema::CANDIDATE_STATE)?;
    let event_col = require_column(table, schema::EVENT_TYPE)?;
    let feedback_col = require_column(table, schema::EVENT_FEEDBACK)?;

    normalize_column(table, state_col, normalize_state);
    normalize_column(table, event_col, normalize_event_type);
    normalize_column(table, feedback_col, normalize_feedback);

    let rows_before = table.len();
    let mut ids_to_drop: HashSet<String> = HashSet::new();
    let groups = table
        .group_rows_by(schema::ID)
        .expect("ID column checked above");
    for (id, mut rows) in groups {
        let hired = rows.iter().any(|&r| {
            table.rows()[r].values()[state_col].as_text() == Some(HIRED_STATE)
        });
        if hired {
            continue;
        }

        rows.sort_by_key(|&r| {
            let values = table.rows()[r].values();
            (
                rank_of(&values[state_col], &config.state_order),
                rank_of(&values[event_col], &config.event_order),
            )
        });
        let terminal = table.rows()[*rows.last().expect("groups are non-empty")].values();

        let bad_feedback = terminal[feedback_col]
            .as_text()
            .is_some_and(|f| config.feedbacks_to_remove.iter().any(|r| r == f));
        let bad_event = terminal[event_col]
            .as_text()
            .is_some_and(|e| NON_PROGRESS_EVENTS.contains(&e));
        if bad_feedback || bad_event {
            ids_to_drop.insert(id);
        }
    }

    retain_ids_not_in(table, id_col, &ids_to_drop);
    let report = OutcomeReport {
        rows_before,
        rows_after: table.len(),
        ids_removed: ids_to_drop.len(),
    };
    info!(
        rows_before = report.rows_before,
        rows_after = report.rows_after,
        ids_removed = report.ids_removed,
        "removed non-progressing candidates"
    );
    Ok(report)
}

fn rank_of(value: &Value, order: &[String]) -> i64 {
    value
        .as_text()
        .and_then(|v| order.iter().position(|o| o == v))
        .map(|p| p as i64)
        .unwrap_or(-1)
}

fn normalize_column(table: &mut Table, col: usize, f: impl Fn(&str) -> String) {
    let column_name = table.columns()[col].clone();
    for row in 0..table.len() {
        if let Some(text) = table.rows()[row].values()[col].as_text() {
            let normalized = f(text);
            table
                .set(row, &column_name, Value::text(normalized))
                .expect("column index came from this table");
        }
    }
}

fn retain_ids_not_in(table: &mut Table, id_col: usize, ids: &HashSet<String>) {
    if ids.is_empty() {
        return;
    }
    let keep: Vec<bool> = table
        .rows()
        .iter()
        .map(|row| {
            row.values()[id_col]
                .to_display()
                .map_or(true, |id| !ids.contains(&id))
        })
        .collect();
    table.retain_rows(|i| keep[i]);
}

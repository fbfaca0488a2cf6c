use std::collections::HashSet;

use tracing::info;

use super::{require_column, CleaningError};
use crate::schema;
use crate::table::{Table, Value};

/// Outcome of one reconciliation run, logged for auditability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileReport {
    pub unique_ids_before: usize,
    pub unique_ids_after: usize,
    pub groups_split: usize,
}

impl ReconcileReport {
    pub fn new_ids_created(&self) -> usize {
        self.unique_ids_after.saturating_sub(self.unique_ids_before)
    }
}

/// Split identifiers whose row group disagrees on the invariant columns.
///
/// Rows sharing an `ID` must hold one consistent value combination across
/// `invariant_columns`; a group with several combinations is really several
/// people behind one misassigned identifier. Each divergent combination gets
/// `"{original}_{n}"` with `n` starting at 1, assigned in missing-aware
/// sorted order of the combinations. No row is created or dropped.
pub fn reconcile(
    table: &mut Table,
    invariant_columns: &[&str],
) -> Result<ReconcileReport, CleaningError> {
    if invariant_columns.is_empty() {
        return Err(CleaningError::NoInvariantColumns);
    }
    require_column(table, schema::ID)?;
    let invariant_indexes = invariant_columns
        .iter()
        .map(|name| require_column(table, name))
        .collect::<Result<Vec<_>, _>>()?;

    let unique_ids_before = count_unique_ids(table);
    let groups = table
        .group_rows_by(schema::ID)
        .expect("ID column checked above");

    let mut groups_split = 0;
    for (original_id, rows) in groups {
        // Size-1 groups trivially hold one combination.
        if rows.len() < 2 {
            continue;
        }

        // Partition the group by its invariant-value combination, keyed so
        // that a missing cell is a distinguishable value, not a wildcard.
        let mut combos: Vec<(Vec<(bool, String)>, Vec<usize>)> = Vec::new();
        for &row in &rows {
            let key: Vec<(bool, String)> = invariant_indexes
                .iter()
                .map(|&col| table.rows()[row].values()[col].sort_key())
                .collect();
            match combos.iter_mut().find(|(k, _)| *k == key) {
                Some((_, members)) => members.push(row),
                None => combos.push((key, vec![row])),
            }
        }
        if combos.len() < 2 {
            continue;
        }

        groups_split += 1;
        combos.sort_by(|a, b| a.0.cmp(&b.0));
        for (n, (_, members)) in combos.iter().enumerate() {
            let new_id = format!("{}_{}", original_id, n + 1);
            for &row in members {
                table
                    .set(row, schema::ID, Value::text(new_id.clone()))
                    .expect("ID column checked above");
            }
        }
    }

    let unique_ids_after = count_unique_ids(table);
    let report = ReconcileReport {
        unique_ids_before,
        unique_ids_after,
        groups_split,
    };
    info!(
        unique_ids_before = report.unique_ids_before,
        unique_ids_after = report.unique_ids_after,
        new_ids_created = report.new_ids_created(),
        "identifier reconciliation finished"
    );
    Ok(report)
}

fn count_unique_ids(table: &Table) -> usize {
    let Some(col) = table.column_index(schema::ID) else {
        return 0;
    };
    table
        .rows()
        .iter()
        .filter_map(|row| row.values()[col].to_display())
        .collect::<HashSet<_>>()
        .len()
}

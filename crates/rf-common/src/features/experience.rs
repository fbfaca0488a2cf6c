//! Experience parsing and the dataset-scaled experience-match score.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::table::{Table, Value};

static RANGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+(?:\.\d+)?)\s*-\s*(\d+(?:\.\d+)?)$").unwrap());
static PLUS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+\s*(\d+(?:\.\d+)?)$").unwrap());
static NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+(?:\.\d+)?$").unwrap());

/// Parse the export's experience notation into years.
///
/// Accepts `"[0-1]"`, `"[+10]"`, `"[3-5] | [1-3]"` and bare numbers. A
/// bracketed range counts as its midpoint, `+N` as `N`, and when several
/// `|`-separated parts are given the maximum wins. Unparseable parts are
/// skipped; `None` only when nothing parses at all.
pub fn parse_experience(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let mut values = Vec::new();
    for part in raw.split('|') {
        let part = part.trim().replace(['[', ']'], "");
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        if let Some(caps) = RANGE_RE.captures(part) {
            let low: f64 = caps[1].parse().ok()?;
            let high: f64 = caps[2].parse().ok()?;
            values.push((low + high) / 2.0);
        } else if let Some(caps) = PLUS_RE.captures(part) {
            values.push(caps[1].parse().ok()?);
        } else if NUMBER_RE.is_match(part) {
            values.push(part.parse().ok()?);
        }
    }

    values.into_iter().reduce(f64::max)
}

/// Parse one experience column into row-parallel years.
pub fn parsed_experience_column(table: &Table, column: &str) -> Vec<Option<f64>> {
    (0..table.len())
        .map(|row| match table.value(row, column) {
            Value::Number(n) => Some(*n),
            Value::Text(s) => parse_experience(s),
            Value::Missing => None,
        })
        .collect()
}

/// What a missing required-experience value should score. The two source
/// variants disagree, so the choice is the operator's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingRequirementPolicy {
    /// Treat "no requirement stated" as a neutral zero score.
    #[default]
    Zero,
    /// Propagate the missing marker.
    NoScore,
}

/// Experience gap scaled by the observed global range.
///
/// The range spans both the candidate and requirement columns so the score
/// is relative to the dataset at hand, with a floor of 1 to avoid division
/// by zero on degenerate data. Missing candidate years always yield no
/// score; missing required years follow `policy`.
pub fn experience_match_scores(
    candidate_years: &[Option<f64>],
    required_years: &[Option<f64>],
    policy: MissingRequirementPolicy,
) -> Vec<Option<f64>> {
    let observed = candidate_years
        .iter()
        .chain(required_years.iter())
        .filter_map(|v| *v);
    let global_min = observed.clone().fold(f64::INFINITY, f64::min);
    let global_max = observed.fold(f64::NEG_INFINITY, f64::max);
    let range = if global_max > global_min {
        global_max - global_min
    } else {
        1.0
    };

    candidate_years
        .iter()
        .zip(required_years.iter())
        .map(|(candidate, required)| match (candidate, required) {
            (_, None) => match policy {
                MissingRequirementPolicy::Zero => Some(0.0),
                MissingRequirementPolicy::NoScore => None,
            },
            (None, Some(_)) => None,
            (Some(c), Some(r)) => Some((c - r) / range),
        })
        .collect()
}

//! Education-level distance between a candidate's attained title and the
//! posting's required level.

/// The attainment ladder, lowest first. Values are matched verbatim against
/// the export's vocabulary; anything off the ladder scores as unknown.
pub const ORDERED_LEVELS: [&str; 7] = [
    "Middle school diploma",
    "High school graduation",
    "Professional qualification",
    "Three-year degree",
    "Five-year degree",
    "master's degree",
    "Doctorate",
];

const MAX_DISTANCE: f64 = (ORDERED_LEVELS.len() - 1) as f64;

pub fn level_rank(level: &str) -> Option<usize> {
    ORDERED_LEVELS.iter().position(|&l| l == level)
}

/// Signed, normalized rank distance in [-1, 1]; positive means the
/// candidate is overqualified. `None` when either side is absent or not on
/// the ladder.
pub fn education_score(candidate_level: Option<&str>, required_level: Option<&str>) -> Option<f64> {
    let candidate = level_rank(candidate_level?)?;
    let required = level_rank(required_level?)?;
    Some((candidate as f64 - required as f64) / MAX_DISTANCE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_levels_score_zero() {
        let score = education_score(Some("Five-year degree"), Some("Five-year degree"));
        assert_eq!(score, Some(0.0));
    }

    #[test]
    fn two_ranks_above_scores_a_third() {
        let score = education_score(Some("master's degree"), Some("Three-year degree"));
        assert!((score.unwrap() - 2.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn underqualified_scores_negative() {
        let score = education_score(Some("Middle school diploma"), Some("Doctorate"));
        assert_eq!(score, Some(-1.0));
    }

    #[test]
    fn missing_or_unrecognized_levels_yield_no_score() {
        assert_eq!(education_score(None, Some("Doctorate")), None);
        assert_eq!(education_score(Some("Doctorate"), None), None);
        assert_eq!(education_score(Some("Bootcamp"), Some("Doctorate")), None);
        // Matching is verbatim; a case drift is off the ladder.
        assert_eq!(education_score(Some("doctorate"), Some("Doctorate")), None);
    }
}

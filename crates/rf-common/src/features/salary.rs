//! Salary fit against the posting's RAL band.

/// Fallback scale when the band is degenerate and its minimum is unusable.
const DEFAULT_SCALE: f64 = 1000.0;

/// 1.0 inside `[min_ral, max_ral]`; outside, the signed distance from the
/// nearer bound divided by the band size (below the minimum scores
/// negative, above the maximum positive). A zero-width band scales by its
/// minimum instead, and by [`DEFAULT_SCALE`] when even that is
/// non-positive. `None` when any of the three inputs is absent.
pub fn salary_fit_score(
    amount: Option<f64>,
    min_ral: Option<f64>,
    max_ral: Option<f64>,
) -> Option<f64> {
    let amount = amount?;
    let min_ral = min_ral?;
    let max_ral = max_ral?;

    if amount >= min_ral && amount <= max_ral {
        return Some(1.0);
    }

    let distance = if amount < min_ral {
        amount - min_ral
    } else {
        amount - max_ral
    };

    let range_size = max_ral - min_ral;
    let mut scale = if range_size > 0.0 { range_size } else { min_ral };
    if scale <= 0.0 {
        scale = DEFAULT_SCALE;
    }

    Some(distance / scale)
}

use tracing::warn;

use crate::simulation::economy::WaveResult;

/// Denominator magnitudes below this are treated as degenerate.
const DENOMINATOR_EPSILON: f64 = 1e-9;

/// Solve for the starting money that makes the balance ratio identical
/// across the first two waves.
///
/// Setting `g_1 = g_2` and expanding the ratio formula gives the closed
/// form `S = (B_1^2 * T_2) / (T_1 * B_2 - T_2 * B_1)`. Money is a discrete
/// unit, so the result is rounded to the nearest integer. Returns `None`
/// (with a warning) when fewer than two results are available or the
/// denominator is numerically degenerate.
pub fn solve_flat_start_money(results: &[WaveResult]) -> Option<i64> {
    let [first, second, ..] = results else {
        warn!(
            results = results.len(),
            "Flat-start solve needs the first two wave results"
        );
        return None;
    };

    let b1 = first.total_bounty;
    let t1 = first.duration_ms;
    let b2 = second.total_bounty;
    let t2 = second.duration_ms;

    let denominator = t1 * b2 - t2 * b1;
    if denominator.abs() < DENOMINATOR_EPSILON {
        warn!(
            b1,
            t1,
            b2,
            t2,
            denominator,
            "Flat-start solve is degenerate; no stable solution"
        );
        return None;
    }

    Some((b1 * b1 * t2 / denominator).round() as i64)
}

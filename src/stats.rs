//! Small statistics helpers for checking simulated frequencies.

/// Confidence interval for how often a weighting profile was used.
///
/// The simulation report puts one around each profile's observed usage so a
/// reader can see whether the expected share (12.5% / 12.5% / 25% / 50% for
/// fair context coins) is plausible given the trial count. Uses the Wilson
/// score interval, which stays inside `[0,1]` for shares near 0 or 1 and for
/// short runs.
///
/// Returns `(lower, upper, half_width)`. Zero trials give the uninformative
/// `(0, 1, 0.5)`. A non-finite or non-positive `z` falls back to 1.96.
pub fn wilson_bounds(successes: u64, trials: u64, z: f64) -> (f64, f64, f64) {
    if trials == 0 {
        return (0.0, 1.0, 0.5);
    }
    let n = trials as f64;
    let k = successes.min(trials) as f64;
    let p_hat = k / n;
    let z = if z.is_finite() && z > 0.0 { z } else { 1.96 };
    let z2 = z * z;

    // center = (p + z^2/(2n)) / (1 + z^2/n)
    // radius = z * sqrt(p(1-p)/n + z^2/(4n^2)) / (1 + z^2/n)
    let denom = 1.0 + z2 / n;
    let center = (p_hat + z2 / (2.0 * n)) / denom;
    let rad = (z * ((p_hat * (1.0 - p_hat) / n) + (z2 / (4.0 * n * n))).sqrt()) / denom;
    let lo = (center - rad).clamp(0.0, 1.0);
    let hi = (center + rad).clamp(0.0, 1.0);
    (lo, hi, (hi - lo) / 2.0)
}

/// `count / total`, or 0 when `total == 0`.
pub fn fraction(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

/// Elevation gain and loss totals.
///
/// Two policies: naive sums every positive (negative) step, threshold-gated
/// only credits climbs that exceed a minimum height above a running baseline.

use crate::error::{check_series, Result};
use crate::params::check_positive;

/// Sum of all positive steps between consecutive samples.
pub fn gain_naive(elevations: &[f64]) -> Result<f64> {
    check_series("elevations", elevations)?;
    Ok(elevations
        .windows(2)
        .map(|w| (w[1] - w[0]).max(0.0))
        .sum())
}

/// Sum of all negative steps, as a positive number. Equal to the naive gain
/// of the negated series.
pub fn loss_naive(elevations: &[f64]) -> Result<f64> {
    check_series("elevations", elevations)?;
    Ok(elevations
        .windows(2)
        .map(|w| (w[0] - w[1]).max(0.0))
        .sum())
}

/// Naive gain and loss in one pass.
pub fn gain_loss_naive(elevations: &[f64]) -> Result<(f64, f64)> {
    check_series("elevations", elevations)?;
    let mut gain = 0.0;
    let mut loss = 0.0;

    for w in elevations.windows(2) {
        let delta = w[1] - w[0];
        if delta > 0.0 {
            gain += delta;
        } else {
            loss += -delta;
        }
    }

    Ok((gain, loss))
}

/// Conservative gain: a rise is only credited once it exceeds `threshold`
/// above the baseline, and the whole rise is credited at that point.
///
/// The baseline starts at the first sample, moves up to each credited sample
/// and follows every drop immediately, so the climb back from a dip is
/// measured from the bottom of the dip, not from the earlier high.
pub fn gain_threshold(elevations: &[f64], threshold: f64) -> Result<f64> {
    check_series("elevations", elevations)?;
    check_positive("threshold", threshold)?;

    let mut baseline = elevations[0];
    let mut gain = 0.0;

    for &elev in &elevations[1..] {
        let rise = elev - baseline;
        if rise > threshold {
            gain += rise;
            baseline = elev;
        } else if rise < 0.0 {
            baseline = elev;
        }
    }

    Ok(gain)
}

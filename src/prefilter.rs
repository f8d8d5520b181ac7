/// Pre-filters applied to raw elevations before smoothing.

use crate::error::{check_series, Result};
use crate::params::check_positive;

/// Step-quantizes `elevations`: the output holds a reference level that only
/// jumps to the current sample once it deviates from that level by more than
/// `threshold`.
///
/// The reference starts at the first sample and is carried forward, so the
/// result depends on processing order. Running the filter over the reversed
/// series generally gives a different profile; this is intrinsic to the
/// method, not an artifact of the implementation.
pub fn threshold_filter(elevations: &[f64], threshold: f64) -> Result<Vec<f64>> {
    check_series("elevations", elevations)?;
    check_positive("threshold", threshold)?;

    let mut reference = elevations[0];
    let out = elevations
        .iter()
        .map(|&elev| {
            if (elev - reference).abs() > threshold {
                reference = elev;
            }
            reference
        })
        .collect();

    Ok(out)
}

/// Flat profile at the mean elevation; a baseline with zero gain and loss.
pub fn flatten(elevations: &[f64]) -> Result<Vec<f64>> {
    check_series("elevations", elevations)?;
    let mean = elevations.iter().sum::<f64>() / elevations.len() as f64;
    Ok(vec![mean; elevations.len()])
}

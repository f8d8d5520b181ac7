/// Time-domain smoothing of elevations recorded at a fixed 1 s rate.
///
/// Uniform sampling is assumed, not checked: sample `i` is taken to be
/// recorded `i` seconds after the first.

use tracing::debug;

use crate::distance_smoother::distance_smooth;
use crate::error::{check_series, ElevationError, Result};
use crate::params::check_window;
use crate::savitzky_golay::smooth;

/// Savitzky-Golay filter applied directly to a 1 Hz elevation series.
pub fn time_smooth(elevations: &[f64], window_len: usize, poly_order: usize) -> Result<Vec<f64>> {
    check_window(window_len, poly_order)?;
    check_series("elevations", elevations)?;
    debug!(points = elevations.len(), window_len, poly_order, "time smoothing");
    smooth(elevations, window_len, poly_order)
}

/// Like [`time_smooth`], but the filter runs on a series downsampled to one
/// point every `sample_len` seconds; the window then spans
/// `window_len * sample_len` seconds. Smoothed values are interpolated back
/// to every original second.
pub fn time_smooth_resampled(
    elevations: &[f64],
    sample_len: u32,
    window_len: usize,
    poly_order: usize,
) -> Result<Vec<f64>> {
    if sample_len == 0 {
        return Err(ElevationError::invalid("sample_len must be at least 1 second"));
    }
    if sample_len == 1 {
        return time_smooth(elevations, window_len, poly_order);
    }

    let seconds: Vec<f64> = (0..elevations.len()).map(|i| i as f64).collect();
    distance_smooth(&seconds, elevations, sample_len as f64, window_len, poly_order)
}

/// Distance-domain smoothing.
///
/// A fixed window only has a physical meaning in metres when samples are
/// evenly spaced in distance. GPS tracks sampled over time are not (stops,
/// drift, speed changes), so elevations are first resampled onto a uniform
/// distance grid, smoothed there, and finally interpolated back to the
/// original distance coordinates.

use tracing::debug;

use crate::error::{check_series, ElevationError, Result};
use crate::interpolation::{interp_linear, interp_quadratic};
use crate::params::FilterParams;
use crate::savitzky_golay::smooth;

/// Smooths `elevations` sampled at cumulative `distances`.
///
/// Output is aligned one-to-one with `distances`.
pub fn distance_smooth(
    distances: &[f64],
    elevations: &[f64],
    sample_len: f64,
    window_len: usize,
    poly_order: usize,
) -> Result<Vec<f64>> {
    FilterParams { window_len, poly_order, sample_len }.validate()?;
    check_series("distances", distances)?;
    check_series("elevations", elevations)?;
    if distances.len() != elevations.len() {
        return Err(ElevationError::invalid(format!(
            "distances has {} points but elevations has {}",
            distances.len(),
            elevations.len()
        )));
    }
    if let Some(i) = distances.windows(2).position(|w| w[1] < w[0]) {
        return Err(ElevationError::invalid(format!(
            "distances decrease at index {} ({} -> {})",
            i + 1,
            distances[i],
            distances[i + 1]
        )));
    }

    let (axis, values) = collapse_duplicates(distances, elevations);
    let grid = uniform_grid(axis[0], axis[axis.len() - 1], sample_len)?;
    if grid.len() < window_len {
        return Err(ElevationError::SeriesTooShort { len: grid.len(), window_len });
    }
    debug!(
        points = distances.len(),
        grid_points = grid.len(),
        sample_len,
        window_len,
        "resampling onto uniform distance grid"
    );

    let resampled = interp_linear(&axis, &values, &grid)?;
    let smoothed = smooth(&resampled, window_len, poly_order)?;
    interp_quadratic(&grid, &smoothed, distances)
}

/// Upper bound on resampled grid points.
pub const MAX_GRID_POINTS: usize = 50_000_000;

/// `n + 1` evenly spaced points spanning `[first, last]` inclusive, where
/// `n = ceil((last - first) / sample_len)`. The end points are exact.
///
/// Fails when the grid would exceed [`MAX_GRID_POINTS`] or when `sample_len`
/// is too fine to separate neighbouring points at this magnitude.
pub(crate) fn uniform_grid(first: f64, last: f64, sample_len: f64) -> Result<Vec<f64>> {
    let span = last - first;
    let intervals = (span / sample_len).ceil();
    if !intervals.is_finite() || intervals >= MAX_GRID_POINTS as f64 {
        return Err(ElevationError::invalid(format!(
            "sample_len {} over a {} m span needs more than {} grid points",
            sample_len, span, MAX_GRID_POINTS
        )));
    }
    let n = intervals as usize;
    if n == 0 {
        return Ok(vec![first]);
    }

    let step = span / n as f64;
    let mut grid: Vec<f64> = (0..n).map(|i| first + i as f64 * step).collect();
    grid.push(last);

    if let Some(i) = grid.windows(2).position(|w| w[1] <= w[0]) {
        return Err(ElevationError::invalid(format!(
            "sample_len {} is below the float resolution of distances near {} (grid index {})",
            sample_len,
            grid[i],
            i + 1
        )));
    }
    Ok(grid)
}

/// Merges runs of equal distance (the rider standing still) into one node
/// carrying the mean elevation of the run, leaving a strictly increasing axis.
fn collapse_duplicates(distances: &[f64], elevations: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let mut axis = Vec::with_capacity(distances.len());
    let mut values = Vec::with_capacity(elevations.len());

    let mut i = 0;
    while i < distances.len() {
        let mut j = i + 1;
        while j < distances.len() && distances[j] == distances[i] {
            j += 1;
        }
        let run = &elevations[i..j];
        axis.push(distances[i]);
        values.push(run.iter().sum::<f64>() / run.len() as f64);
        i = j;
    }

    (axis, values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_grid_matches_linspace() {
        let grid = uniform_grid(0.0, 12.0, 5.0).unwrap();
        assert_eq!(grid, vec![0.0, 4.0, 8.0, 12.0]);
        assert_eq!(uniform_grid(3.0, 3.0, 5.0).unwrap(), vec![3.0]);
        assert_eq!(uniform_grid(0.0, 10.0, 5.0).unwrap(), vec![0.0, 5.0, 10.0]);
    }

    #[test]
    fn test_oversized_grid_rejected() {
        let err = distance_smooth(&[0.0, 1e300], &[1.0, 2.0], 1e-300, 3, 1).unwrap_err();
        assert!(matches!(err, ElevationError::InvalidInput(_)));
        assert!(err.to_string().contains("sample_len"));

        let err = distance_smooth(&[0.0, 1e9], &[1.0, 2.0], 1e-3, 3, 1).unwrap_err();
        assert!(err.to_string().contains("grid points"));
    }

    #[test]
    fn test_sub_resolution_spacing_rejected() {
        // ulp at 1e16 is 2 m, so a 1.5 m grid collapses onto itself
        let distances: Vec<f64> = (0..10).map(|i| 1e16 + 4.0 * i as f64).collect();
        let elevations = vec![100.0; 10];
        let err = distance_smooth(&distances, &elevations, 1.5, 5, 2).unwrap_err();
        assert!(matches!(err, ElevationError::InvalidInput(_)));
        assert!(err.to_string().contains("sample_len"));
    }

    #[test]
    fn test_collapse_duplicates() {
        let (axis, values) = collapse_duplicates(&[0.0, 1.0, 1.0, 1.0, 2.0], &[5.0, 6.0, 8.0, 10.0, 9.0]);
        assert_eq!(axis, vec![0.0, 1.0, 2.0]);
        assert_eq!(values, vec![5.0, 8.0, 9.0]);
    }

    #[test]
    fn test_linear_climb_is_preserved() {
        // constant 5% grade on an irregular distance axis
        let mut d = 0.0;
        let distances: Vec<f64> = (0..300)
            .map(|i| {
                d += if i % 3 == 0 { 2.0 } else { 4.5 };
                d
            })
            .collect();
        let elevations: Vec<f64> = distances.iter().map(|x| 200.0 + 0.05 * x).collect();

        let out = distance_smooth(&distances, &elevations, 5.0, 21, 2).unwrap();
        assert_eq!(out.len(), distances.len());
        for (a, b) in out.iter().zip(elevations.iter()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_handles_stationary_samples() {
        let mut distances: Vec<f64> = (0..200).map(|i| i as f64 * 3.0).collect();
        for _ in 0..3 {
            distances.insert(100, 300.0);
        }
        let elevations: Vec<f64> = distances.iter().map(|x| x * 0.01).collect();

        let out = distance_smooth(&distances, &elevations, 5.0, 21, 2).unwrap();
        assert_eq!(out.len(), 203);
        assert_abs_diff_eq!(out[101], 3.0, epsilon = 1e-6);
    }

    #[test]
    fn test_rejects_decreasing_distance() {
        let distances: Vec<f64> = vec![0.0, 10.0, 5.0, 20.0];
        let err = distance_smooth(&distances, &[1.0, 2.0, 3.0, 4.0], 1.0, 3, 1).unwrap_err();
        assert!(matches!(err, ElevationError::InvalidInput(_)));
    }

    #[test]
    fn test_rejects_mismatched_lengths() {
        let err = distance_smooth(&[0.0, 1.0], &[1.0], 1.0, 1, 0).unwrap_err();
        assert!(err.to_string().contains("distances has 2 points"));
    }

    #[test]
    fn test_short_grid() {
        let distances: Vec<f64> = (0..50).map(|i| i as f64).collect();
        let elevations = vec![10.0; 50];
        // 49 m at 5 m spacing -> 11 grid points
        assert_eq!(
            distance_smooth(&distances, &elevations, 5.0, 21, 2),
            Err(ElevationError::SeriesTooShort { len: 11, window_len: 21 })
        );
    }
}

/// Piecewise interpolation over a strictly increasing axis.
///
/// `interp_linear` is used to resample raw elevations onto a uniform grid,
/// `interp_quadratic` to back-fill smoothed grid values at the original
/// coordinates. Only the quadratic variant extrapolates.

use crate::error::{check_series, ElevationError, Result};

/// Checks that `xs`/`ys` form a usable interpolation table.
fn check_table(xs: &[f64], ys: &[f64]) -> Result<()> {
    check_series("interpolation axis", xs)?;
    check_series("interpolation values", ys)?;
    if xs.len() != ys.len() {
        return Err(ElevationError::invalid(format!(
            "interpolation axis has {} points but values have {}",
            xs.len(),
            ys.len()
        )));
    }
    if let Some(i) = xs.windows(2).position(|w| w[1] <= w[0]) {
        return Err(ElevationError::invalid(format!(
            "interpolation axis not strictly increasing at index {} ({} -> {})",
            i + 1,
            xs[i],
            xs[i + 1]
        )));
    }
    Ok(())
}

/// Index `k` of the segment `[xs[k], xs[k + 1]]` holding `x`, clamped to the
/// first/last segment for out-of-range targets. Needs `xs.len() >= 2`.
fn segment_index(xs: &[f64], x: f64) -> usize {
    let upper = xs.partition_point(|&v| v <= x);
    upper.saturating_sub(1).min(xs.len() - 2)
}

/// Linear interpolation of `ys(xs)` at every target.
///
/// Targets outside `[xs[0], xs[last]]` are rejected; there is no extrapolation.
pub fn interp_linear(xs: &[f64], ys: &[f64], targets: &[f64]) -> Result<Vec<f64>> {
    check_table(xs, ys)?;
    let first = xs[0];
    let last = xs[xs.len() - 1];

    let mut out = Vec::with_capacity(targets.len());
    for &t in targets {
        if !(first..=last).contains(&t) {
            return Err(ElevationError::invalid(format!(
                "target {} outside interpolation range [{}, {}]",
                t, first, last
            )));
        }
        if xs.len() == 1 {
            out.push(ys[0]);
            continue;
        }

        let k = segment_index(xs, t);
        let (x1, x2) = (xs[k], xs[k + 1]);
        let (y1, y2) = (ys[k], ys[k + 1]);
        let frac = (t - x1) / (x2 - x1);
        out.push(y1 + frac * (y2 - y1));
    }

    Ok(out)
}

/// Quadratic interpolation of `ys(xs)` at every target, extrapolating beyond
/// both ends.
///
/// Each target is evaluated on the parabola through three neighbouring nodes:
/// its bracketing segment plus whichever adjacent node lies closer. Outside
/// the table the first or last three nodes are used. Tables of two points
/// degrade to a straight line, a single point to a constant.
pub fn interp_quadratic(xs: &[f64], ys: &[f64], targets: &[f64]) -> Result<Vec<f64>> {
    check_table(xs, ys)?;
    if let Some(t) = targets.iter().find(|t| !t.is_finite()) {
        return Err(ElevationError::invalid(format!("non-finite target {}", t)));
    }

    let n = xs.len();
    let out = match n {
        1 => vec![ys[0]; targets.len()],
        2 => targets
            .iter()
            .map(|&t| ys[0] + (t - xs[0]) * (ys[1] - ys[0]) / (xs[1] - xs[0]))
            .collect(),
        _ => targets
            .iter()
            .map(|&t| {
                let start = stencil_start(xs, t);
                lagrange3(&xs[start..start + 3], &ys[start..start + 3], t)
            })
            .collect(),
    };

    Ok(out)
}

/// First node of the 3-point stencil used for `t`. Needs `xs.len() >= 3`.
fn stencil_start(xs: &[f64], t: f64) -> usize {
    let n = xs.len();
    let k = segment_index(xs, t);
    if k == 0 {
        0
    } else if k + 2 >= n {
        n - 3
    } else if (t - xs[k - 1]) <= (xs[k + 2] - t) {
        k - 1
    } else {
        k
    }
}

#[inline]
fn lagrange3(x: &[f64], y: &[f64], t: f64) -> f64 {
    let l0 = (t - x[1]) * (t - x[2]) / ((x[0] - x[1]) * (x[0] - x[2]));
    let l1 = (t - x[0]) * (t - x[2]) / ((x[1] - x[0]) * (x[1] - x[2]));
    let l2 = (t - x[0]) * (t - x[1]) / ((x[2] - x[0]) * (x[2] - x[1]));
    y[0] * l0 + y[1] * l1 + y[2] * l2
}

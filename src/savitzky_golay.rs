/// Savitzky-Golay smoothing: a least-squares polynomial fitted to a sliding
/// window, evaluated at the window centre.
///
/// Edge policy: the first and last `window_len / 2` outputs come from a single
/// fit over the first (last) full window, evaluated at the edge position.
/// Nothing is padded or wrapped, so edge values are extrapolations of the
/// local trend rather than copies of the raw samples.

use crate::error::{check_series, ElevationError, Result};
use crate::params::check_window;

/// Smooths `sequence` with a `window_len`-point, order-`poly_order` filter.
///
/// Output length equals input length.
pub fn smooth(sequence: &[f64], window_len: usize, poly_order: usize) -> Result<Vec<f64>> {
    check_window(window_len, poly_order)?;
    check_series("sequence", sequence)?;
    let n = sequence.len();
    if n < window_len {
        return Err(ElevationError::SeriesTooShort { len: n, window_len });
    }

    let half = window_len / 2;
    let mut out = vec![0.0; n];

    // interior: one set of convolution weights for every centred window
    let centre = fit_weights(window_len, poly_order, half);
    for i in half..n - half {
        let window = &sequence[i - half..=i + half];
        out[i] = dot(&centre, window);
    }

    // edges: re-fit the outermost full window and evaluate off-centre
    let head = &sequence[..window_len];
    let tail = &sequence[n - window_len..];
    for pos in 0..half {
        out[pos] = dot(&fit_weights(window_len, poly_order, pos), head);

        let tail_pos = window_len - 1 - pos;
        out[n - 1 - pos] = dot(&fit_weights(window_len, poly_order, tail_pos), tail);
    }

    Ok(out)
}

#[inline]
fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Weights `w` such that `w · window` is the value at index `pos` of the
/// order-`poly_order` least-squares polynomial through the window.
///
/// Sample positions are rescaled to [-1, 1] and the design matrix uses the
/// Chebyshev basis, factored with Householder QR. For `V = QR` the fitted value
/// at `t` is `p(t)ᵀ R⁻¹ Qᵀ y`, so the weights are `Q (R⁻ᵀ p(t))`.
fn fit_weights(window_len: usize, poly_order: usize, pos: usize) -> Vec<f64> {
    let half = (window_len / 2) as f64;
    let scale = if half > 0.0 { half } else { 1.0 };
    let m = poly_order + 1;
    let t = (pos as f64 - half) / scale;

    let mut design: Vec<Vec<f64>> = (0..window_len)
        .map(|j| chebyshev((j as f64 - half) / scale, m))
        .collect();
    let reflectors = householder(&mut design, m);

    // forward substitution Rᵀ u = p(t); R sits in the upper triangle of `design`
    let p = chebyshev(t, m);
    let mut u = vec![0.0; m];
    for i in 0..m {
        let acc: f64 = (0..i).map(|j| design[j][i] * u[j]).sum();
        u[i] = (p[i] - acc) / design[i][i];
    }

    let mut w = u;
    w.resize(window_len, 0.0);
    for (k, v) in reflectors.iter().enumerate().rev() {
        reflect(v, &mut w[k..]);
    }
    w
}

/// `T_0(z) .. T_{m-1}(z)`.
fn chebyshev(z: f64, m: usize) -> Vec<f64> {
    let mut out = Vec::with_capacity(m);
    out.push(1.0);
    if m > 1 {
        out.push(z);
    }
    while out.len() < m {
        let k = out.len();
        out.push(2.0 * z * out[k - 1] - out[k - 2]);
    }
    out
}

/// In-place Householder QR of the first `m` columns of `a` (rows × m, rows ≥ m).
/// Leaves R in the upper triangle and returns the unit reflector of each step.
///
/// The window positions are distinct and `m <= rows`, so the Chebyshev design
/// matrix has full column rank and every diagonal entry of R is non-zero.
fn householder(a: &mut [Vec<f64>], m: usize) -> Vec<Vec<f64>> {
    let rows = a.len();
    let mut reflectors = Vec::with_capacity(m);

    for k in 0..m {
        let norm = (k..rows).map(|i| a[i][k] * a[i][k]).sum::<f64>().sqrt();
        let alpha = if a[k][k] >= 0.0 { -norm } else { norm };

        let mut v: Vec<f64> = (k..rows).map(|i| a[i][k]).collect();
        v[0] -= alpha;
        let v_norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
        if v_norm > 0.0 {
            v.iter_mut().for_each(|x| *x /= v_norm);
        }

        for col in k..m {
            let d: f64 = v.iter().zip(&a[k..]).map(|(vi, row)| vi * row[col]).sum();
            for (vi, row) in v.iter().zip(a[k..].iter_mut()) {
                row[col] -= 2.0 * vi * d;
            }
        }
        reflectors.push(v);
    }

    reflectors
}

/// `x <- (I - 2 v vᵀ) x`
fn reflect(v: &[f64], x: &mut [f64]) {
    let d = dot(v, x);
    for (xi, vi) in x.iter_mut().zip(v) {
        *xi -= 2.0 * vi * d;
    }
}

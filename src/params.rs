/// Filter parameters shared by the time and distance smoothers.

use serde::{Deserialize, Serialize};

use crate::error::{ElevationError, Result};

pub const DEFAULT_WINDOW_LEN: usize = 21;
pub const DEFAULT_POLY_ORDER: usize = 2;
/// Resampling interval for distance smoothing, in distance units (metres).
pub const DEFAULT_SAMPLE_LEN: f64 = 5.0;
/// Step size for the threshold filter and threshold-gated gain, in metres.
pub const DEFAULT_THRESHOLD: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterParams {
    /// Savitzky-Golay window length, positive and odd.
    pub window_len: usize,
    /// Degree of the fitted polynomial, below `window_len`.
    pub poly_order: usize,
    /// Spacing of the resampling grid (seconds in time domain, metres in
    /// distance domain).
    pub sample_len: f64,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            window_len: DEFAULT_WINDOW_LEN,
            poly_order: DEFAULT_POLY_ORDER,
            sample_len: DEFAULT_SAMPLE_LEN,
        }
    }
}

impl FilterParams {
    pub fn new(window_len: usize, poly_order: usize, sample_len: f64) -> Result<Self> {
        let params = Self { window_len, poly_order, sample_len };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        check_window(self.window_len, self.poly_order)?;
        check_positive("sample_len", self.sample_len)
    }
}

pub(crate) fn check_window(window_len: usize, poly_order: usize) -> Result<()> {
    if window_len == 0 || window_len % 2 == 0 {
        return Err(ElevationError::invalid(format!(
            "window_len must be a positive odd integer, got {}",
            window_len
        )));
    }
    if poly_order >= window_len {
        return Err(ElevationError::invalid(format!(
            "poly_order {} must be less than window_len {}",
            poly_order, window_len
        )));
    }
    Ok(())
}

pub(crate) fn check_positive(name: &str, value: f64) -> Result<()> {
    if !(value.is_finite() && value > 0.0) {
        return Err(ElevationError::invalid(format!(
            "{} must be positive and finite, got {}",
            name, value
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let p = FilterParams::default();
        assert_eq!((p.window_len, p.poly_order), (21, 2));
        assert_eq!(p.sample_len, 5.0);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_params() {
        assert!(FilterParams::new(20, 2, 5.0).is_err());
        assert!(FilterParams::new(5, 5, 5.0).is_err());
        assert!(FilterParams::new(5, 2, 0.0).is_err());
        assert!(FilterParams::new(5, 2, f64::NAN).is_err());
        assert!(FilterParams::new(1, 0, 1.0).is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let p: FilterParams = serde_json::from_str(r#"{"window_len": 11}"#).unwrap();
        assert_eq!(p.window_len, 11);
        assert_eq!(p.poly_order, DEFAULT_POLY_ORDER);
    }
}

/// Error taxonomy for elevation smoothing and gain/loss accounting.
///
/// Every operation validates its inputs before doing any work, so an error
/// always means nothing was computed.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ElevationError {
    /// Empty series, mismatched lengths, non-monotonic distances,
    /// non-finite values or out-of-range filter parameters.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The series handed to the polynomial filter is shorter than its window.
    #[error("series too short to smooth: {len} samples, window needs {window_len}")]
    SeriesTooShort { len: usize, window_len: usize },
}

pub type Result<T> = std::result::Result<T, ElevationError>;

impl ElevationError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        ElevationError::InvalidInput(msg.into())
    }
}

/// Rejects empty series and series holding NaN or infinite values.
pub(crate) fn check_series(name: &str, series: &[f64]) -> Result<()> {
    if series.is_empty() {
        return Err(ElevationError::invalid(format!("{} is empty", name)));
    }
    if let Some(idx) = series.iter().position(|v| !v.is_finite()) {
        return Err(ElevationError::invalid(format!(
            "{} has a non-finite value at index {}",
            name, idx
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let e = ElevationError::SeriesTooShort { len: 5, window_len: 21 };
        assert_eq!(
            e.to_string(),
            "series too short to smooth: 5 samples, window needs 21"
        );
        let e = ElevationError::invalid("elevations is empty");
        assert_eq!(e.to_string(), "invalid input: elevations is empty");
    }

    #[test]
    fn test_check_series() {
        assert!(check_series("s", &[1.0, 2.0]).is_ok());
        assert!(matches!(check_series("s", &[]), Err(ElevationError::InvalidInput(_))));
        let err = check_series("s", &[1.0, f64::NAN]).unwrap_err();
        assert!(err.to_string().contains("index 1"));
    }
}

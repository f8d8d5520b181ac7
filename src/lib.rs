//! Elevation profile smoothing for grade and energy-expenditure analysis.
//!
//! Raw GPS or DEM elevations are too noisy to differentiate into grade. This
//! crate smooths them with a Savitzky-Golay filter, either directly on a 1 Hz
//! time series or on a uniform distance grid, and reduces profiles to
//! elevation gain/loss totals.
//!
//! Every operation is a pure function over slices: inputs are never modified
//! and each call returns freshly allocated output.
//!
//! ```
//! use elevation_smoother::{distance_smooth, gain_naive, loss_naive};
//!
//! let distances: Vec<f64> = (0..1000).map(|i| 3.0 * i as f64).collect();
//! let elevations: Vec<f64> = (0..1000).map(|i| i as f64).collect();
//! let smoothed = distance_smooth(&distances, &elevations, 5.0, 21, 2).unwrap();
//! let gain = gain_naive(&smoothed).unwrap();
//! let loss = loss_naive(&smoothed).unwrap();
//! assert!((gain - loss - 999.0).abs() < 1e-6);
//! ```

pub mod distance_smoother;
pub mod error;
pub mod gain_loss;
pub mod grade;
pub mod interpolation;
pub mod params;
pub mod pipeline;
pub mod prefilter;
pub mod savitzky_golay;
pub mod time_smoother;

pub use distance_smoother::distance_smooth;
pub use error::{ElevationError, Result};
pub use gain_loss::{gain_loss_naive, gain_naive, gain_threshold, loss_naive};
pub use grade::grade;
pub use interpolation::{interp_linear, interp_quadratic};
pub use params::{
    FilterParams, DEFAULT_POLY_ORDER, DEFAULT_SAMPLE_LEN, DEFAULT_THRESHOLD, DEFAULT_WINDOW_LEN,
};
pub use pipeline::{ConfigError, GainPolicy, PipelineConfig, Prefilter, ProfileSummary, Smoother};
pub use prefilter::{flatten, threshold_filter};
pub use savitzky_golay::smooth;
pub use time_smoother::{time_smooth, time_smooth_resampled};

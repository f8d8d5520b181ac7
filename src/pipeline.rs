/// Configurable processing chain:
/// raw elevations -> optional pre-filter -> smoother -> gain/loss totals.
///
/// The chain is described by a serde-friendly [`PipelineConfig`] that can be
/// kept on disk as JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::distance_smoother::distance_smooth;
use crate::error::{check_series, ElevationError, Result};
use crate::gain_loss::{gain_naive, gain_threshold, loss_naive};
use crate::params::{check_positive, check_window, FilterParams, DEFAULT_POLY_ORDER, DEFAULT_WINDOW_LEN};
use crate::prefilter::{flatten, threshold_filter};
use crate::time_smoother::time_smooth_resampled;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Prefilter {
    #[default]
    None,
    Threshold { threshold: f64 },
    Flatten,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Smoother {
    None,
    /// 1 Hz series, optionally downsampled to one point every `sample_len` seconds.
    Time {
        #[serde(default = "default_window_len")]
        window_len: usize,
        #[serde(default = "default_poly_order")]
        poly_order: usize,
        #[serde(default = "default_time_sample_len")]
        sample_len: u32,
    },
    Distance(FilterParams),
}

impl Default for Smoother {
    fn default() -> Self {
        Smoother::Distance(FilterParams::default())
    }
}

fn default_window_len() -> usize {
    DEFAULT_WINDOW_LEN
}

fn default_poly_order() -> usize {
    DEFAULT_POLY_ORDER
}

fn default_time_sample_len() -> u32 {
    1
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GainPolicy {
    #[default]
    Naive,
    Threshold { threshold: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub prefilter: Prefilter,
    pub smoother: Smoother,
    pub gain: GainPolicy,
}

/// Smoothed profile plus the totals derived from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileSummary {
    pub smoothed: Vec<f64>,
    pub gain: f64,
    pub loss: f64,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to access config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed config: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Invalid(#[from] ElevationError),
}

impl PipelineConfig {
    /// Reads a JSON config, falling back to the defaults when `path` does not exist.
    pub fn load(path: &Path) -> std::result::Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "no pipeline config found, using defaults");
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        debug!(path = %path.display(), ?config, "pipeline config loaded");
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> std::result::Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Checks every stage's parameters without touching any data.
    pub fn validate(&self) -> Result<()> {
        if let Prefilter::Threshold { threshold } = self.prefilter {
            check_positive("prefilter threshold", threshold)?;
        }
        match self.smoother {
            Smoother::None => {}
            Smoother::Time { window_len, poly_order, sample_len } => {
                check_window(window_len, poly_order)?;
                if sample_len == 0 {
                    return Err(ElevationError::invalid("sample_len must be at least 1 second"));
                }
            }
            Smoother::Distance(params) => params.validate()?,
        }
        if let GainPolicy::Threshold { threshold } = self.gain {
            check_positive("gain threshold", threshold)?;
        }
        Ok(())
    }

    /// Runs the chain over one track. `distances` is required by the distance
    /// smoother and ignored otherwise.
    pub fn run(&self, distances: Option<&[f64]>, elevations: &[f64]) -> Result<ProfileSummary> {
        self.validate()?;
        check_series("elevations", elevations)?;

        let filtered = match self.prefilter {
            Prefilter::None => elevations.to_vec(),
            Prefilter::Threshold { threshold } => threshold_filter(elevations, threshold)?,
            Prefilter::Flatten => flatten(elevations)?,
        };

        let smoothed = match self.smoother {
            Smoother::None => filtered,
            Smoother::Time { window_len, poly_order, sample_len } => {
                time_smooth_resampled(&filtered, sample_len, window_len, poly_order)?
            }
            Smoother::Distance(params) => {
                let distances = distances.ok_or_else(|| {
                    ElevationError::invalid("distance smoothing needs a distance series")
                })?;
                distance_smooth(
                    distances,
                    &filtered,
                    params.sample_len,
                    params.window_len,
                    params.poly_order,
                )?
            }
        };

        let gain = match self.gain {
            GainPolicy::Naive => gain_naive(&smoothed)?,
            GainPolicy::Threshold { threshold } => gain_threshold(&smoothed, threshold)?,
        };
        let loss = loss_naive(&smoothed)?;

        Ok(ProfileSummary { smoothed, gain, loss })
    }
}

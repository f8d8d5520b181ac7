/// CSV output for batch runs: one summary row per track, optional per-track
/// profiles, and the reference gains used to score accuracy.

use std::collections::HashMap;
use std::fs::{self, File};
use std::path::Path;

use anyhow::{Context, Result};
use csv::{Reader, Writer};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use elevation_smoother::grade;

use crate::track::Track;

#[derive(Debug, Deserialize)]
struct ReferenceRecord {
    filename: String,
    official_elevation_gain_m: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrackReport {
    pub filename: String,
    pub points: usize,
    pub distance_km: f64,
    pub mean_interval_s: Option<f64>,
    pub raw_gain_m: f64,
    pub raw_loss_m: f64,
    pub smoothed_gain_m: f64,
    pub smoothed_loss_m: f64,
    pub reference_gain_m: Option<f64>,
    pub accuracy_percent: Option<f64>,
    pub status: String,
}

impl TrackReport {
    /// Row for a file that could not be processed.
    pub fn failed(filename: String, err: &anyhow::Error) -> Self {
        Self {
            filename,
            points: 0,
            distance_km: 0.0,
            mean_interval_s: None,
            raw_gain_m: 0.0,
            raw_loss_m: 0.0,
            smoothed_gain_m: 0.0,
            smoothed_loss_m: 0.0,
            reference_gain_m: None,
            accuracy_percent: None,
            status: format!("ERROR: {:#}", err),
        }
    }
}

#[derive(Debug, Serialize)]
struct ProfileRow {
    distance_m: f64,
    raw_elevation_m: f64,
    smoothed_elevation_m: f64,
    grade_percent: f64,
}

/// Reads a `filename,official_elevation_gain_m` CSV, keyed by lower-case
/// file name.
pub fn load_reference_gains(path: &Path) -> Result<HashMap<String, f64>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut rdr = Reader::from_reader(file);
    let mut gains = HashMap::new();

    for result in rdr.deserialize::<ReferenceRecord>() {
        match result {
            Ok(record) => {
                gains.insert(record.filename.to_lowercase(), record.official_elevation_gain_m);
            }
            Err(e) => warn!("skipping malformed reference record: {}", e),
        }
    }

    info!(records = gains.len(), path = %path.display(), "reference gains loaded");
    Ok(gains)
}

/// Smoothed gain as a percentage of the reference gain.
pub fn accuracy_percent(smoothed_gain: f64, reference_gain: Option<f64>) -> Option<f64> {
    match reference_gain {
        Some(reference) if reference > 0.0 => Some(smoothed_gain / reference * 100.0),
        _ => None,
    }
}

pub fn write_reports(reports: &[TrackReport], path: &Path) -> Result<()> {
    let mut wtr = Writer::from_path(path).with_context(|| format!("failed to create {}", path.display()))?;
    for report in reports {
        wtr.serialize(report)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes `<dir>/<track stem>_profile.csv` with distance, raw and smoothed
/// elevation and the grade of the smoothed profile.
pub fn write_profile(dir: &Path, track: &Track, smoothed: &[f64]) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    let stem = Path::new(&track.filename)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| track.filename.clone());
    let path = dir.join(format!("{}_profile.csv", stem));

    let grades = grade(&track.distances, smoothed)?;
    let mut wtr = Writer::from_path(&path).with_context(|| format!("failed to create {}", path.display()))?;
    for i in 0..smoothed.len() {
        wtr.serialize(ProfileRow {
            distance_m: track.distances[i],
            raw_elevation_m: track.elevations[i],
            smoothed_elevation_m: smoothed[i],
            grade_percent: grades[i],
        })?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn log_summary(reports: &[TrackReport]) {
    let ok: Vec<&TrackReport> = reports.iter().filter(|r| r.status == "OK").collect();
    info!(processed = ok.len(), failed = reports.len() - ok.len(), "batch complete");
    if ok.is_empty() {
        return;
    }

    let raw: f64 = ok.iter().map(|r| r.raw_gain_m).sum();
    let smoothed: f64 = ok.iter().map(|r| r.smoothed_gain_m).sum();
    info!(
        raw_gain_m = raw.round(),
        smoothed_gain_m = smoothed.round(),
        "total elevation gain"
    );

    let mut accuracies: Vec<f64> = ok.iter().filter_map(|r| r.accuracy_percent).collect();
    if !accuracies.is_empty() {
        let median_accuracy = median(&mut accuracies);
        let within_10 = accuracies.iter().filter(|a| (**a - 100.0).abs() <= 10.0).count();
        info!(
            files = accuracies.len(),
            median_accuracy_percent = (median_accuracy * 10.0).round() / 10.0,
            within_10_percent = within_10,
            "accuracy against reference gains"
        );
    }
}

/// Median of a non-empty slice; the mean of the two middle values when the
/// length is even.
fn median(values: &mut [f64]) -> f64 {
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

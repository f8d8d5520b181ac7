/// GPX track loading: elevations, cumulative haversine distance and the mean
/// sampling interval of each file.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use geo::{point, HaversineDistance};
use gpx::{read, Gpx};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct Track {
    pub filename: String,
    pub distances: Vec<f64>,
    pub elevations: Vec<f64>,
    /// Mean seconds between timestamped points, when the file has timestamps.
    pub mean_interval_s: Option<f64>,
}

impl Track {
    pub fn distance_km(&self) -> f64 {
        self.distances.last().copied().unwrap_or(0.0) / 1000.0
    }
}

/// All `*.gpx` files below `folder`, sorted for stable output.
pub fn find_gpx_files(folder: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(folder) {
        let entry = entry.with_context(|| format!("failed to walk {}", folder.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let is_gpx = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("gpx"))
            .unwrap_or(false);
        if is_gpx {
            files.push(entry.path().to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

pub fn read_track(path: &Path) -> Result<Track> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "unknown".to_string());
    parse_track(filename, BufReader::new(file))
}

pub fn parse_track<R: BufRead>(filename: String, reader: R) -> Result<Track> {
    let gpx = read(reader).with_context(|| format!("failed to parse GPX {}", filename))?;
    track_from_gpx(filename, &gpx)
}

/// Flattens every track segment into one series, keeping only points that
/// carry an elevation.
fn track_from_gpx(filename: String, gpx: &Gpx) -> Result<Track> {
    let mut coords: Vec<(f64, f64)> = Vec::new();
    let mut elevations = Vec::new();
    let mut timestamps = Vec::new();

    for track in &gpx.tracks {
        for segment in &track.segments {
            for pt in &segment.points {
                if let Some(ele) = pt.elevation {
                    coords.push((pt.point().y(), pt.point().x()));
                    elevations.push(ele);
                    if let Some(time) = &pt.time {
                        if let Ok(time_str) = time.format() {
                            timestamps.push(time_str);
                        }
                    }
                }
            }
        }
    }

    if elevations.is_empty() {
        bail!("no trackpoints with elevation data in {}", filename);
    }

    Ok(Track {
        filename,
        distances: cumulative_distances(&coords),
        elevations,
        mean_interval_s: mean_interval(&timestamps),
    })
}

/// Running haversine distance in metres over `(lat, lon)` pairs.
fn cumulative_distances(coords: &[(f64, f64)]) -> Vec<f64> {
    let mut distances = Vec::with_capacity(coords.len());
    let mut total = 0.0;
    for (i, &(lat, lon)) in coords.iter().enumerate() {
        if i > 0 {
            let (prev_lat, prev_lon) = coords[i - 1];
            let a = point!(x: prev_lon, y: prev_lat);
            let b = point!(x: lon, y: lat);
            total += a.haversine_distance(&b);
        }
        distances.push(total);
    }
    distances
}

fn mean_interval(timestamps: &[String]) -> Option<f64> {
    let times: Vec<DateTime<Utc>> = timestamps
        .iter()
        .filter_map(|t| t.parse::<DateTime<Utc>>().ok())
        .collect();
    if times.len() < 2 {
        return None;
    }
    let span = times[times.len() - 1].signed_duration_since(times[0]);
    Some(span.num_milliseconds() as f64 / 1000.0 / (times.len() - 1) as f64)
}

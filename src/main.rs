use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, ValueEnum, ValueHint};
use rayon::prelude::*;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use elevation_smoother::{
    gain_loss_naive, FilterParams, GainPolicy, PipelineConfig, Prefilter, Smoother,
    DEFAULT_THRESHOLD,
};

mod report;
mod track;

use report::{accuracy_percent, load_reference_gains, log_summary, write_profile, write_reports, TrackReport};
use track::{find_gpx_files, read_track};

#[derive(Parser, Debug)]
#[command(author, version, about = "Smooth GPX elevation profiles and report elevation gain/loss", long_about = None)]
struct Cli {
    /// Folder searched recursively for .gpx files
    #[arg(value_hint = ValueHint::DirPath)]
    input: PathBuf,

    /// Summary CSV (one row per track)
    #[arg(short, long, default_value = "elevation_summary.csv", value_hint = ValueHint::FilePath)]
    output: PathBuf,

    /// JSON pipeline config; flags below override its values
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Smoothing domain
    #[arg(long, value_enum)]
    domain: Option<Domain>,

    /// Savitzky-Golay window length (odd)
    #[arg(long)]
    window_len: Option<usize>,

    /// Savitzky-Golay polynomial order
    #[arg(long)]
    poly_order: Option<usize>,

    /// Resampling interval: metres for distance, whole seconds for time
    #[arg(long)]
    sample_len: Option<f64>,

    /// Pre-filter applied before smoothing
    #[arg(long, value_enum)]
    prefilter: Option<PrefilterKind>,

    /// Step size of the threshold pre-filter (m); needs a threshold pre-filter
    /// from --prefilter or the config
    #[arg(long)]
    threshold: Option<f64>,

    /// Gain accounting policy
    #[arg(long, value_enum)]
    gain: Option<GainKind>,

    /// Minimum credited climb for threshold gain (m); needs a threshold gain
    /// policy from --gain or the config
    #[arg(long)]
    gain_threshold: Option<f64>,

    /// CSV of `filename,official_elevation_gain_m` to score accuracy against
    #[arg(long, value_hint = ValueHint::FilePath)]
    reference: Option<PathBuf>,

    /// Also write a smoothed profile CSV per track into this folder
    #[arg(long, value_hint = ValueHint::DirPath)]
    profiles: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Domain {
    Time,
    Distance,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PrefilterKind {
    None,
    Threshold,
    Flatten,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum GainKind {
    Naive,
    Threshold,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = build_config(&cli)?;
    info!(started = %Utc::now().to_rfc3339(), ?config, "elevation smoothing run");

    let reference = match &cli.reference {
        Some(path) => load_reference_gains(path)?,
        None => HashMap::new(),
    };

    let files = find_gpx_files(&cli.input)?;
    if files.is_empty() {
        warn!(folder = %cli.input.display(), "no GPX files found");
        return Ok(());
    }
    info!(files = files.len(), cores = num_cpus::get(), "processing GPX files in parallel");

    let start = Instant::now();
    let reports: Vec<TrackReport> = files
        .par_iter()
        .map(|path| {
            process_file(path, &config, &reference, cli.profiles.as_deref()).unwrap_or_else(|e| {
                warn!(file = %path.display(), "{:#}", e);
                TrackReport::failed(file_name(path), &e)
            })
        })
        .collect();

    write_reports(&reports, &cli.output)?;
    log_summary(&reports);
    info!(
        elapsed_s = start.elapsed().as_secs_f64(),
        output = %cli.output.display(),
        "results saved"
    );

    Ok(())
}

/// Config file (or defaults) with command-line overrides applied.
fn build_config(cli: &Cli) -> Result<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    if let Some(kind) = cli.prefilter {
        config.prefilter = match kind {
            PrefilterKind::None => Prefilter::None,
            PrefilterKind::Threshold => Prefilter::Threshold { threshold: DEFAULT_THRESHOLD },
            PrefilterKind::Flatten => Prefilter::Flatten,
        };
    }
    if let Some(value) = cli.threshold {
        match &mut config.prefilter {
            Prefilter::Threshold { threshold } => *threshold = value,
            _ => bail!("--threshold needs a threshold pre-filter (--prefilter threshold or the config)"),
        }
    }

    if let Some(kind) = cli.gain {
        config.gain = match kind {
            GainKind::Naive => GainPolicy::Naive,
            GainKind::Threshold => GainPolicy::Threshold { threshold: DEFAULT_THRESHOLD },
        };
    }
    if let Some(value) = cli.gain_threshold {
        match &mut config.gain {
            GainPolicy::Threshold { threshold } => *threshold = value,
            _ => bail!("--gain-threshold needs a threshold gain policy (--gain threshold or the config)"),
        }
    }

    // start from whatever window the config carries, whichever domain it was for
    let (window_len, poly_order) = match config.smoother {
        Smoother::Time { window_len, poly_order, .. } => (window_len, poly_order),
        Smoother::Distance(params) => (params.window_len, params.poly_order),
        Smoother::None => {
            let params = FilterParams::default();
            (params.window_len, params.poly_order)
        }
    };
    let window_len = cli.window_len.unwrap_or(window_len);
    let poly_order = cli.poly_order.unwrap_or(poly_order);

    let domain = cli.domain.unwrap_or(match config.smoother {
        Smoother::Time { .. } => Domain::Time,
        Smoother::Distance(_) => Domain::Distance,
        Smoother::None => Domain::None,
    });
    config.smoother = match domain {
        Domain::None => Smoother::None,
        Domain::Time => {
            let sample_len = match (cli.sample_len, config.smoother) {
                (Some(s), _) => whole_seconds(s)?,
                (None, Smoother::Time { sample_len, .. }) => sample_len,
                (None, _) => 1,
            };
            Smoother::Time { window_len, poly_order, sample_len }
        }
        Domain::Distance => {
            let sample_len = match (cli.sample_len, config.smoother) {
                (Some(s), _) => s,
                (None, Smoother::Distance(params)) => params.sample_len,
                (None, _) => FilterParams::default().sample_len,
            };
            Smoother::Distance(FilterParams { window_len, poly_order, sample_len })
        }
    };

    config.validate()?;
    Ok(config)
}

fn whole_seconds(sample_len: f64) -> Result<u32> {
    if sample_len < 1.0 || sample_len.fract() != 0.0 || sample_len > u32::MAX as f64 {
        bail!("time-domain sample_len must be a whole number of seconds >= 1, got {}", sample_len);
    }
    Ok(sample_len as u32)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn process_file(
    path: &Path,
    config: &PipelineConfig,
    reference: &HashMap<String, f64>,
    profiles: Option<&Path>,
) -> Result<TrackReport> {
    let track = read_track(path)?;

    if let (Smoother::Time { .. }, Some(interval)) = (config.smoother, track.mean_interval_s) {
        if (interval - 1.0).abs() > 0.25 {
            warn!(
                file = %track.filename,
                mean_interval_s = interval,
                "time smoothing assumes 1 s sampling"
            );
        }
    }

    let (raw_gain, raw_loss) = gain_loss_naive(&track.elevations)?;
    let summary = config
        .run(Some(&track.distances), &track.elevations)
        .with_context(|| format!("smoothing failed for {}", track.filename))?;

    if let Some(dir) = profiles {
        write_profile(dir, &track, &summary.smoothed)?;
    }

    let reference_gain = reference.get(&track.filename.to_lowercase()).copied();
    info!(
        file = %track.filename,
        distance_km = track.distance_km(),
        raw_gain_m = raw_gain.round(),
        smoothed_gain_m = summary.gain.round(),
        "processed"
    );

    Ok(TrackReport {
        points: track.elevations.len(),
        distance_km: track.distance_km(),
        mean_interval_s: track.mean_interval_s,
        raw_gain_m: raw_gain,
        raw_loss_m: raw_loss,
        smoothed_gain_m: summary.gain,
        smoothed_loss_m: summary.loss,
        reference_gain_m: reference_gain,
        accuracy_percent: accuracy_percent(summary.gain, reference_gain),
        status: "OK".to_string(),
        filename: track.filename,
    })
}

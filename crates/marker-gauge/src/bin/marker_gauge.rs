//! marker-gauge CLI: replay recorded marker detections through the pipeline.

use clap::{Args, Parser, Subcommand};
use log::LevelFilter;
use marker_gauge::core::{FrameSize, MarkerObservation};
use marker_gauge::temporal::TemporalFilter;
use marker_gauge::{
    DetectionConfig, DetectionProfile, GaugeConfig, MeasureResponse, MeasurementPipeline,
    ServiceReply,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "marker-gauge")]
#[command(about = "Measure the distance between two fiducial markers from recorded detections")]
#[command(version)]
struct Cli {
    /// Log level (off, error, warn, info, debug, trace). Defaults to
    /// `MARKER_GAUGE_LOG`, then `warn`.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a recording and print one JSON reply per frame.
    Measure(MeasureArgs),

    /// Print both detection presets as JSON.
    Profiles,

    /// Write a default configuration file.
    InitConfig {
        /// Destination path.
        path: PathBuf,
    },
}

#[derive(Debug, Clone, Args)]
struct MeasureArgs {
    /// Recording with timestamped marker observations (JSON).
    frames: PathBuf,

    /// Real marker side length in meters.
    #[arg(long)]
    side: Option<f64>,

    /// Detection profile (fast or precise).
    #[arg(long)]
    profile: Option<DetectionProfile>,

    /// Frame width in pixels; requires --height.
    #[arg(long, requires = "height")]
    width: Option<u32>,

    /// Frame height in pixels; requires --width.
    #[arg(long, requires = "width")]
    height: Option<u32>,

    /// Service configuration (JSON).
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct RecordedFrame {
    timestamp: f64,
    markers: Vec<MarkerObservation>,
}

#[derive(Debug, Deserialize)]
struct Recording {
    #[serde(default)]
    frame: Option<FrameSize>,
    #[serde(default)]
    side_length_m: Option<f64>,
    frames: Vec<RecordedFrame>,
}

fn init_logging(level: Option<LevelFilter>) -> CliResult<()> {
    #[cfg(feature = "tracing")]
    {
        let _ = level;
        marker_gauge::core::init_tracing(false);
        Ok(())
    }
    #[cfg(not(feature = "tracing"))]
    {
        match level {
            Some(level) => marker_gauge::core::init_with_level(level),
            None => marker_gauge::core::init_from_env(LevelFilter::Warn),
        }
        .map_err(|e| e.to_string())?;
        Ok(())
    }
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    let level = match &cli.log_level {
        Some(raw) => Some(
            raw.parse::<LevelFilter>()
                .map_err(|_| format!("invalid log level '{raw}'"))?,
        ),
        None => None,
    };
    init_logging(level)?;

    match cli.command {
        Commands::Measure(args) => run_measure(&args),
        Commands::Profiles => run_profiles(),
        Commands::InitConfig { path } => run_init_config(&path),
    }
}

fn run_measure(args: &MeasureArgs) -> CliResult<()> {
    let mut config = match &args.config {
        Some(path) => GaugeConfig::load_json(path)?,
        None => GaugeConfig::default(),
    };
    if let Some(profile) = args.profile {
        config.profile = profile;
    }

    let raw = std::fs::read_to_string(&args.frames)?;
    let recording: Recording = serde_json::from_str(&raw)?;

    let side = args
        .side
        .or(recording.side_length_m)
        .unwrap_or(config.side_length_m);
    let frame = match (args.width, args.height) {
        (Some(w), Some(h)) => FrameSize::new(w, h),
        _ => recording.frame.unwrap_or_else(|| {
            let detection = DetectionConfig::for_profile(config.profile);
            FrameSize::new(detection.max_width, detection.max_height)
        }),
    };
    log::info!(
        "replaying {} frames from {} ({}x{}, side {side} m, profile {})",
        recording.frames.len(),
        args.frames.display(),
        frame.width,
        frame.height,
        config.profile
    );

    let pipeline = MeasurementPipeline::from_config(&config);
    let mut session = TemporalFilter::new(config.temporal.clone());
    for recorded in &recording.frames {
        let result = pipeline
            .measure(&recorded.markers, side, frame, &mut session, recorded.timestamp)
            .map(|m| MeasureResponse::from_measurement(&m, None));
        let reply = ServiceReply::from_result(result);
        println!("{}", serde_json::to_string(&reply)?);
    }
    Ok(())
}

fn run_profiles() -> CliResult<()> {
    let presets: Vec<DetectionConfig> = DetectionProfile::ALL
        .into_iter()
        .map(DetectionConfig::for_profile)
        .collect();
    println!("{}", serde_json::to_string_pretty(&presets)?);
    Ok(())
}

fn run_init_config(path: &Path) -> CliResult<()> {
    GaugeConfig::default().write_json(path)?;
    log::info!("wrote default configuration to {}", path.display());
    Ok(())
}

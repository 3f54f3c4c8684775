//! # Vehmocap
//!
//! Command line converter from MTA:SA vehicle motion capture files to keyframe
//! animation curves.
//!
//! The conversion itself lives in [`vehmocap_core`]. This crate adds the
//! parts that touch the file system:
//!
//! - reading capture files (`.json` / `.vmc`)
//! - a JSON scene description standing in for the target model, used to
//!   measure the wheels
//! - writing the reconstructed curves as JSON or CSV
//!
//! ## Command-Line Interface
//!
//! See [`Cli`] for all available options. Key options:
//!
//! - `-n, --vehicle` - Vehicle to convert, 1-based (default: 1)
//! - `--fps` - Output frame rate (default: 24)
//! - `--scene` - Scene description used to measure wheel radius
//! - `--info` - Print the capture summary and exit
//! - `-v` / `-q` - Increase or decrease verbosity

use std::fs::File;
use std::io::{BufReader, Write};
use std::path::PathBuf;

use clap::Parser;
use log::info;
use serde::Serialize;
use vehmocap_core::{
    resolve_wheel_geometry, CaptureFile, CaptureRecord, FrameSequencer, KeyframeBuffer,
    RunSummary, WheelGeometry,
};

pub mod config;
pub mod error;
pub mod export;
pub mod scene;

use config::{clamp_vehicle_index, ConvertConfig};
use error::CliError;
use export::{export_csv, export_json, CurveExport, CurveMetadata};
use scene::SceneDescription;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(clap::ValueEnum, Clone, Copy, Default, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
}

#[derive(Parser, Clone, Debug)]
#[command(version, about)]
pub struct Cli {
    #[clap(flatten)]
    pub verbose: clap_verbosity_flag::Verbosity<clap_verbosity_flag::InfoLevel>,

    /// Capture file written by the recorder (.json or .vmc)
    pub capture: PathBuf,

    /// Vehicle to convert, 1-based; out of range selects the nearest one
    #[arg(short = 'n', long, default_value_t = 1, allow_negative_numbers = true)]
    pub vehicle: i64,

    /// Output frames per second
    #[arg(long, default_value_t = 24.0)]
    pub fps: f64,

    /// Output frame of the first sample
    #[arg(long, default_value_t = 1.0)]
    pub start_frame: f64,

    /// Scene description used to measure wheel radius
    #[arg(short, long)]
    pub scene: Option<PathBuf>,

    /// Name of the vehicle object in the scene
    #[arg(long, default_value = "vehicle")]
    pub vehicle_object: String,

    /// Left front wheel dummy
    #[arg(long, default_value = "wheel_lf_dummy")]
    pub wheel_lf: String,

    /// Right front wheel dummy
    #[arg(long, default_value = "wheel_rf_dummy")]
    pub wheel_rf: String,

    /// Left back wheel dummy
    #[arg(long, default_value = "wheel_lb_dummy")]
    pub wheel_lb: String,

    /// Right back wheel dummy
    #[arg(long, default_value = "wheel_rb_dummy")]
    pub wheel_rb: String,

    /// Front wheel radius, overrides the scene
    #[arg(long)]
    pub front_radius: Option<f64>,

    /// Back wheel radius, overrides the scene
    #[arg(long)]
    pub back_radius: Option<f64>,

    /// Output format
    #[arg(short, long, default_value_t, value_enum)]
    pub format: OutputFormat,

    /// Output file, standard output when absent
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print the capture summary and exit
    #[arg(long, default_value_t = false)]
    pub info: bool,
}

/// Result of converting one vehicle
#[derive(Debug, Clone)]
pub struct Conversion {
    pub metadata: CurveMetadata,
    pub summary: RunSummary,
    pub keyframes: KeyframeBuffer,
}

pub fn load_capture(config: &ConvertConfig) -> Result<CaptureFile, CliError> {
    let file = File::open(&config.capture).map_err(|e| CliError::io(&config.capture, e))?;
    let capture = CaptureFile::from_reader(BufReader::new(file))?;
    info!(
        "Loaded {} vehicle(s) from {}",
        capture.len(),
        config.capture.display()
    );
    Ok(capture)
}

/// Wheel radius from the scene description, then the command line overrides
pub fn wheel_geometry(config: &ConvertConfig) -> Result<WheelGeometry, CliError> {
    let mut geometry = match &config.scene {
        Some(path) => {
            let scene = SceneDescription::load(path)?;
            let vehicle = scene
                .find(&config.names.vehicle)
                .ok_or_else(|| CliError::MissingVehicleObject(config.names.vehicle.clone()))?;
            let mounts = scene.wheel_mounts(vehicle, &config.names);
            resolve_wheel_geometry(&scene, &mounts)
        }
        None => {
            info!("No scene description, using the default wheel radius");
            WheelGeometry::default()
        }
    };

    if let Some(front) = config.front_radius {
        geometry.front = front;
    }
    if let Some(back) = config.back_radius {
        geometry.back = back;
    }
    geometry.validate()?;
    Ok(geometry)
}

/// Convert the selected vehicle of an already loaded capture
pub fn convert_record(
    config: &ConvertConfig,
    record: &CaptureRecord,
    geometry: &WheelGeometry,
) -> Result<Conversion, CliError> {
    let mut keyframes = KeyframeBuffer::new();
    let summary = FrameSequencer::new(config.sequencer).run(record, geometry, &mut keyframes)?;
    info!(
        "Converted {}: {} frames into {} keyframes, frames {} to {:.3}",
        record.info.name, summary.frames, summary.keyframes, summary.start_time, summary.end_time
    );

    Ok(Conversion {
        metadata: CurveMetadata::new(
            &record.info,
            config.sequencer.output_rate,
            &summary,
            geometry,
        ),
        summary,
        keyframes,
    })
}

pub fn convert(config: &ConvertConfig) -> Result<Conversion, CliError> {
    let capture = load_capture(config)?;
    let number = clamp_vehicle_index(config.vehicle, capture.len());
    let record = capture.vehicle(number)?;
    let geometry = wheel_geometry(config)?;
    convert_record(config, record, &geometry)
}

/// Summary of every vehicle in the capture
pub fn describe(capture: &CaptureFile) -> String {
    capture
        .records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            format!(
                "[{}/{}]\n{}",
                i + 1,
                capture.len(),
                record.info.summary()
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn render(config: &ConvertConfig, conversion: &Conversion) -> Result<String, CliError> {
    let text = match config.format {
        OutputFormat::Json => {
            let export = CurveExport::new(
                conversion.metadata.clone(),
                &conversion.keyframes,
                &config.names,
            );
            export_json(&export)?
        }
        OutputFormat::Csv => export_csv(&conversion.keyframes, &config.names)?,
    };
    Ok(text)
}

fn write_output(config: &ConvertConfig, text: &str) -> Result<(), CliError> {
    match &config.output {
        Some(path) => {
            std::fs::write(path, text).map_err(|e| CliError::io(path, e))?;
            info!("Wrote {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(text.as_bytes())
                .and_then(|_| stdout.write_all(b"\n"))
                .map_err(|e| CliError::io("<stdout>", e))?;
        }
    }
    Ok(())
}

pub fn run(cli: Cli) -> Result<(), CliError> {
    let config = ConvertConfig::from_cli(&cli)?;

    if config.info_only {
        let capture = load_capture(&config)?;
        return write_output(&config, &describe(&capture));
    }

    let conversion = convert(&config)?;
    let text = render(&config, &conversion)?;
    write_output(&config, &text)
}

//! Conversion settings derived from the command line

use std::path::{Path, PathBuf};

use log::warn;
use vehmocap_core::{EntityId, SequencerConfig, WheelPosition};

use crate::error::CliError;
use crate::{Cli, OutputFormat};

/// File extensions the recorder writes
pub const CAPTURE_EXTENSIONS: [&str; 2] = ["json", "vmc"];

/// Names of the scene objects that receive keyframes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectNames {
    pub vehicle: String,
    /// In [`WheelPosition::ALL`] order
    pub wheels: [String; 4],
    pub camera_holder: String,
    pub camera_target: String,
    pub camera: String,
}

impl Default for ObjectNames {
    fn default() -> Self {
        Self {
            vehicle: EntityId::Vehicle.default_name().to_string(),
            wheels: WheelPosition::ALL.map(|p| p.dummy_name().to_string()),
            camera_holder: EntityId::CameraHolder.default_name().to_string(),
            camera_target: EntityId::CameraTarget.default_name().to_string(),
            camera: EntityId::Camera.default_name().to_string(),
        }
    }
}

impl ObjectNames {
    pub fn wheel(&self, position: WheelPosition) -> &str {
        match position {
            WheelPosition::LeftFront => &self.wheels[0],
            WheelPosition::RightFront => &self.wheels[1],
            WheelPosition::LeftBack => &self.wheels[2],
            WheelPosition::RightBack => &self.wheels[3],
        }
    }

    pub fn entity(&self, entity: EntityId) -> &str {
        match entity {
            EntityId::Vehicle => &self.vehicle,
            EntityId::Wheel(position) => self.wheel(position),
            EntityId::CameraHolder => &self.camera_holder,
            EntityId::CameraTarget => &self.camera_target,
            EntityId::Camera => &self.camera,
        }
    }
}

/// Everything a conversion run needs, validated
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    pub capture: PathBuf,
    /// Requested vehicle, 1-based and not yet clamped
    pub vehicle: i64,
    pub sequencer: SequencerConfig,
    pub scene: Option<PathBuf>,
    pub names: ObjectNames,
    pub front_radius: Option<f64>,
    pub back_radius: Option<f64>,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
    pub info_only: bool,
}

impl ConvertConfig {
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        validate_capture_path(&cli.capture)?;

        Ok(Self {
            capture: cli.capture.clone(),
            vehicle: cli.vehicle,
            sequencer: SequencerConfig {
                base_time: cli.start_frame,
                output_rate: cli.fps,
            },
            scene: cli.scene.clone(),
            names: ObjectNames {
                vehicle: cli.vehicle_object.clone(),
                wheels: [
                    cli.wheel_lf.clone(),
                    cli.wheel_rf.clone(),
                    cli.wheel_lb.clone(),
                    cli.wheel_rb.clone(),
                ],
                ..ObjectNames::default()
            },
            front_radius: cli.front_radius,
            back_radius: cli.back_radius,
            format: cli.format,
            output: cli.output.clone(),
            info_only: cli.info,
        })
    }
}

/// Accept only the extensions the recorder writes
pub fn validate_capture_path(path: &Path) -> Result<(), CliError> {
    let accepted = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            CAPTURE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false);

    if accepted {
        Ok(())
    } else {
        Err(CliError::UnsupportedFileType {
            path: path.to_path_buf(),
        })
    }
}

/// Map a requested 1-based vehicle number onto the vehicles in the file
///
/// Zero or negative selects the first vehicle, anything past the end the
/// last. `count` must be at least one.
pub fn clamp_vehicle_index(requested: i64, count: usize) -> usize {
    let last = count.max(1);
    let clamped = if requested < 1 {
        1
    } else if requested as u64 > last as u64 {
        last
    } else {
        requested as usize
    };
    if clamped as i64 != requested {
        warn!(
            "Vehicle {} not in capture, using vehicle {} of {}",
            requested, clamped, count
        );
    }
    clamped
}

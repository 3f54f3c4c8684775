//! Capture data model
//!
//! A capture file holds one [`CaptureRecord`] per recorded vehicle. Each
//! record is a fixed-length sequence of [`FrameSample`]s taken at an
//! irregular rate; every sample carries its own elapsed time.
//!
//! Parsing of the JSON layout written by the recorder lives in [`wire`].

use std::io::Read;

use nalgebra::Vector3;

use crate::error::MocapError;
use crate::wheel::WheelPosition;

mod wire;

/// Position and Euler rotation (degrees) of one rigid body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformSample {
    pub position: Vector3<f64>,
    /// Raw Euler angles in degrees, may alias modulo 360
    pub rotation: Vector3<f64>,
}

impl TransformSample {
    pub fn new(position: Vector3<f64>, rotation: Vector3<f64>) -> Self {
        Self { position, rotation }
    }
}

/// Wheel transform plus the speed used to integrate its spin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelSample {
    pub transform: TransformSample,
    /// Distance units per 0.02s, negative when reversing
    pub speed: f64,
}

/// Camera rig state, taken as-is
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraSample {
    pub holder: Vector3<f64>,
    pub target: Vector3<f64>,
    /// Roll in degrees
    pub roll: f64,
    /// Field of view in degrees
    pub fov: f64,
}

/// One observation of the vehicle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSample {
    /// 1-based frame index as written in the capture
    pub index: u32,
    /// Milliseconds elapsed since the previous sample
    pub frame_time_ms: f64,
    pub body: TransformSample,
    /// Wheels in [`WheelPosition::ALL`] order
    pub wheels: [WheelSample; 4],
    pub camera: CameraSample,
}

impl FrameSample {
    pub fn wheel(&self, position: WheelPosition) -> &WheelSample {
        match position {
            WheelPosition::LeftFront => &self.wheels[0],
            WheelPosition::RightFront => &self.wheels[1],
            WheelPosition::LeftBack => &self.wheels[2],
            WheelPosition::RightBack => &self.wheels[3],
        }
    }
}

/// Recorded vehicle type
///
/// Only automobiles are converted; every other tag the recorder may write is
/// kept verbatim so it can be reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VehicleKind {
    Automobile,
    Unsupported(String),
}

impl VehicleKind {
    pub fn as_str(&self) -> &str {
        match self {
            VehicleKind::Automobile => "Automobile",
            VehicleKind::Unsupported(tag) => tag,
        }
    }

    pub fn is_supported(&self) -> bool {
        matches!(self, VehicleKind::Automobile)
    }
}

impl From<&str> for VehicleKind {
    fn from(s: &str) -> Self {
        match s {
            "Automobile" => VehicleKind::Automobile,
            other => VehicleKind::Unsupported(other.to_string()),
        }
    }
}

impl std::fmt::Display for VehicleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Header of a capture record
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureInfo {
    pub name: String,
    pub kind: VehicleKind,
    /// Nominal samples per second
    pub sample_rate: u32,
    /// Seconds
    pub duration: f64,
    pub frame_count: u32,
}

impl CaptureInfo {
    /// Human readable description, one field per line
    pub fn summary(&self) -> String {
        format!(
            "Vehicle: {}\nKeyframes Per Second: {}\nDuration: {}\nNumber of Keyframes: {}",
            self.name,
            self.sample_rate,
            format_duration(self.duration),
            self.frame_count
        )
    }
}

/// Format seconds as `{h}h {mm}m {ss}s`, keeping up to microsecond fractions
pub fn format_duration(seconds: f64) -> String {
    let micros = (seconds.max(0.0) * 1_000_000.0).round() as u64;
    let hours = micros / 3_600_000_000;
    let minutes = (micros / 60_000_000) % 60;
    let whole_seconds = (micros / 1_000_000) % 60;
    let fraction = micros % 1_000_000;

    let mut out = format!("{}h {:02}m {:02}", hours, minutes, whole_seconds);
    if fraction > 0 {
        let digits = format!("{:06}", fraction);
        out.push('.');
        out.push_str(digits.trim_end_matches('0'));
    }
    out.push('s');
    out
}

/// One vehicle's recorded session
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureRecord {
    pub info: CaptureInfo,
    /// Samples ordered by index; the sequencer checks continuity
    pub frames: Vec<FrameSample>,
}

/// All vehicles recorded together
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CaptureFile {
    pub records: Vec<CaptureRecord>,
}

impl CaptureFile {
    pub fn from_json_str(json: &str) -> Result<Self, MocapError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        wire::parse_capture(value)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, MocapError> {
        let value: serde_json::Value = serde_json::from_reader(reader)?;
        wire::parse_capture(value)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Select a vehicle by 1-based number
    pub fn vehicle(&self, number: usize) -> Result<&CaptureRecord, MocapError> {
        number
            .checked_sub(1)
            .and_then(|i| self.records.get(i))
            .ok_or(MocapError::VehicleNotFound {
                index: number,
                count: self.records.len(),
            })
    }
}

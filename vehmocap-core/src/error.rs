//! Error types for capture parsing and curve reconstruction

use thiserror::Error;

/// Errors that can abort a conversion run
///
/// None of these are retried: capture data is static, so a second attempt
/// cannot change the outcome.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MocapError {
    /// Capture data is structurally invalid or misses a required field
    #[error("Malformed capture{}: {reason}", frame_suffix(.frame))]
    MalformedCapture { frame: Option<u32>, reason: String },

    /// Vehicle kind other than a four-wheeled automobile
    #[error("Unsupported vehicle kind: {0}")]
    UnsupportedVehicleKind(String),

    /// Wheel radius is not strictly positive
    #[error("Invalid wheel geometry: {axle} radius is {radius}, must be greater than zero")]
    InvalidGeometry { axle: &'static str, radius: f64 },

    /// Samples out of order, missing, or disagreeing with the frame count
    #[error("Sequence violation: {0}")]
    SequenceViolation(String),

    /// Selected vehicle is not in the capture file
    #[error("Vehicle {index} not found, capture holds {count} vehicle(s)")]
    VehicleNotFound { index: usize, count: usize },

    /// Output frame rate is not strictly positive
    #[error("Invalid output frame rate: {0}")]
    InvalidOutputRate(f64),
}

fn frame_suffix(frame: &Option<u32>) -> String {
    match frame {
        Some(f) => format!(" (frame {})", f),
        None => String::new(),
    }
}

impl MocapError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        MocapError::MalformedCapture {
            frame: None,
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed_frame(frame: u32, reason: impl Into<String>) -> Self {
        MocapError::MalformedCapture {
            frame: Some(frame),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for MocapError {
    fn from(e: serde_json::Error) -> Self {
        MocapError::malformed(e.to_string())
    }
}

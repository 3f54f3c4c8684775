//! # Vehmocap Core
//!
//! Reconstruction of continuous vehicle animation curves from MTA:SA motion
//! capture samples.
//!
//! This crate contains the pure conversion logic with **no file system or
//! scene dependencies**. The host animation system is reached through two
//! traits: [`SceneGraph`] to measure the wheel geometry and [`KeyframeSink`] to
//! receive the keyframes.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  vehmocap-core                                               │
//! │  ├── capture/    (capture file model and JSON parsing)       │
//! │  ├── continuity  (angle unwrapping per Euler axis)           │
//! │  ├── wheel       (wheel spin integration from speed)         │
//! │  ├── geometry    (wheel radius from scene bounding boxes)    │
//! │  ├── sequencer   (per-frame driver, emits keyframes)         │
//! │  └── sink        (KeyframeSink and an in-memory buffer)      │
//! └──────────────────────────────────────────────────────────────┘
//!                 ▲
//!    ┌────────────┴────────────┐
//!    │  vehmocap (CLI)         │
//!    │  JSON scene, curve/CSV  │
//!    └─────────────────────────┘
//! ```
//!
//! ## Key Modules
//!
//! - [`capture`] - Capture records, frame samples and the recorder's JSON layout
//! - [`continuity`] - Continuity tracker removing ±360° jumps
//! - [`wheel`] - Wheel roll integrator
//! - [`geometry`] - Wheel geometry resolver over a [`SceneGraph`]
//! - [`sequencer`] - Frame sequencer
//! - [`sink`] - Keyframe events and sinks
//!
//! ## Example: Converting a Capture
//!
//! ```rust,no_run
//! use vehmocap_core::{
//!     CaptureFile, FrameSequencer, KeyframeBuffer, SequencerConfig, WheelGeometry,
//! };
//!
//! let json = std::fs::read_to_string("race.json").unwrap();
//! let capture = CaptureFile::from_json_str(&json).unwrap();
//! let record = capture.vehicle(1).unwrap();
//! println!("{}", record.info.summary());
//!
//! let mut sink = KeyframeBuffer::new();
//! let mut sequencer = FrameSequencer::new(SequencerConfig::default());
//! sequencer
//!     .run(record, &WheelGeometry::default(), &mut sink)
//!     .unwrap();
//! ```
//!
//! ## Example: Angle Continuity
//!
//! ```rust
//! use vehmocap_core::{AxisPolicy, ContinuityState};
//!
//! let mut heading = ContinuityState::new(AxisPolicy::Wide);
//! assert_eq!(heading.step(179.0), 179.0);
//! assert_eq!(heading.step(-179.0), 181.0);
//! ```

pub mod capture;
pub mod continuity;
pub mod error;
pub mod geometry;
pub mod sequencer;
pub mod sink;
pub mod wheel;

// Re-export commonly used types
pub use capture::{
    CameraSample, CaptureFile, CaptureInfo, CaptureRecord, FrameSample, TransformSample,
    VehicleKind, WheelSample,
};
pub use continuity::{AxisPolicy, ContinuityState, EulerContinuity};
pub use error::MocapError;
pub use geometry::{
    resolve_wheel_geometry, SceneGraph, WheelGeometry, WheelMounts, DEFAULT_WHEEL_RADIUS,
};
pub use sequencer::{
    convert_vehicle, FrameSequencer, RunSummary, SequencerConfig, SequencerState,
};
pub use sink::{EntityId, FieldOfView, Keyframe, KeyframeBuffer, KeyframeSink};
pub use wheel::{Axle, WheelPosition, WheelRollState, WheelSide};

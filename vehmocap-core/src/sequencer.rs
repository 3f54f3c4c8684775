//! Frame Sequencer
//!
//! Walks a [`CaptureRecord`] once, in index order, feeding every rotation axis
//! through its continuity tracker and every wheel through its roll
//! integrator, and emits one keyframe per entity per sample.
//!
//! ```text
//!   Idle ──run()──► Running ──last sample──► Done
//!     ▲                │
//!     └──── error ─────┘
//! ```
//!
//! All tracker state is created when a run starts and dropped when it ends,
//! so converting the same record twice gives the same keyframes.

use log::{debug, trace};
use nalgebra::Vector3;

use crate::capture::{CaptureFile, CaptureRecord, FrameSample};
use crate::continuity::{AxisPolicy, ContinuityState, EulerContinuity};
use crate::error::MocapError;
use crate::geometry::WheelGeometry;
use crate::sink::{EntityId, Keyframe, KeyframeSink};
use crate::wheel::{travel_distance, WheelPosition, WheelRollState};

/// Timing of the emitted keyframes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequencerConfig {
    /// Output frame of the first sample
    pub base_time: f64,
    /// Output frames per second
    pub output_rate: f64,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            base_time: 1.0,
            output_rate: 24.0,
        }
    }
}

impl SequencerConfig {
    /// Milliseconds covered by one output frame
    fn frame_ms(&self) -> Result<f64, MocapError> {
        if self.output_rate.is_finite() && self.output_rate > 0.0 {
            Ok(1000.0 / self.output_rate)
        } else {
            Err(MocapError::InvalidOutputRate(self.output_rate))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerState {
    Idle,
    Running,
    Done,
}

/// Outcome of a completed run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub frames: u32,
    pub keyframes: usize,
    pub start_time: f64,
    pub end_time: f64,
}

/// Trackers of one wheel: integrated spin on X, steering and camber on Y/Z
#[derive(Debug, Clone, Copy)]
struct WheelTrack {
    position: WheelPosition,
    roll: WheelRollState,
    steer_y: ContinuityState,
    steer_z: ContinuityState,
}

impl WheelTrack {
    fn new(position: WheelPosition) -> Self {
        Self {
            position,
            roll: WheelRollState::new(position.side()),
            steer_y: ContinuityState::new(AxisPolicy::Wide),
            steer_z: ContinuityState::new(AxisPolicy::Wide),
        }
    }
}

/// Mutable state owned by a single run
#[derive(Debug, Clone)]
struct RunState {
    body: EulerContinuity,
    wheels: [WheelTrack; 4],
}

impl RunState {
    fn new() -> Self {
        Self {
            body: EulerContinuity::vehicle_body(),
            wheels: WheelPosition::ALL.map(WheelTrack::new),
        }
    }

    fn process<S: KeyframeSink>(
        &mut self,
        sample: &FrameSample,
        time: f64,
        geometry: &WheelGeometry,
        sink: &mut S,
    ) -> usize {
        let raw = sample.body.rotation;
        let rotation = Vector3::new(
            self.body.x.step(raw.x),
            self.body.y.step(raw.y),
            self.body.z.step(raw.z),
        );
        sink.emit(Keyframe {
            entity: EntityId::Vehicle,
            time,
            position: sample.body.position,
            rotation,
        });

        for track in self.wheels.iter_mut() {
            let wheel = sample.wheel(track.position);
            let raw = wheel.transform.rotation;
            let distance = travel_distance(sample.frame_time_ms, wheel.speed);
            let radius = geometry.radius(track.position.axle());
            let rotation = Vector3::new(
                track.roll.step(raw.x, distance, radius),
                track.steer_y.step(raw.y),
                track.steer_z.step(raw.z),
            );
            sink.emit(Keyframe {
                entity: EntityId::Wheel(track.position),
                time,
                position: wheel.transform.position,
                rotation,
            });
        }

        let camera = &sample.camera;
        sink.emit(Keyframe {
            entity: EntityId::CameraHolder,
            time,
            position: camera.holder,
            rotation: Vector3::zeros(),
        });
        sink.emit(Keyframe {
            entity: EntityId::CameraTarget,
            time,
            position: camera.target,
            rotation: Vector3::zeros(),
        });
        // The camera hangs off the holder: roll only, no offset
        sink.emit(Keyframe {
            entity: EntityId::Camera,
            time,
            position: Vector3::zeros(),
            rotation: Vector3::new(0.0, 0.0, camera.roll),
        });
        sink.emit_field_of_view(time, camera.fov);

        EntityId::ALL.len()
    }
}

/// Drives one conversion run at a time
#[derive(Debug)]
pub struct FrameSequencer {
    config: SequencerConfig,
    state: SequencerState,
}

impl FrameSequencer {
    pub fn new(config: SequencerConfig) -> Self {
        Self {
            config,
            state: SequencerState::Idle,
        }
    }

    pub fn config(&self) -> &SequencerConfig {
        &self.config
    }

    pub fn state(&self) -> SequencerState {
        self.state
    }

    /// Convert `record` into keyframes
    ///
    /// Kind, geometry and output rate are checked before anything is emitted.
    /// A sequence violation is only found when the run reaches it; the sink is
    /// told to discard what it received and the sequencer returns to `Idle`.
    pub fn run<S: KeyframeSink>(
        &mut self,
        record: &CaptureRecord,
        geometry: &WheelGeometry,
        sink: &mut S,
    ) -> Result<RunSummary, MocapError> {
        let frame_ms = self.config.frame_ms()?;
        if !record.info.kind.is_supported() {
            return Err(MocapError::UnsupportedVehicleKind(
                record.info.kind.to_string(),
            ));
        }
        geometry.validate()?;

        self.state = SequencerState::Running;
        match self.run_frames(record, geometry, frame_ms, sink) {
            Ok(summary) => {
                self.state = SequencerState::Done;
                Ok(summary)
            }
            Err(e) => {
                sink.discard();
                self.state = SequencerState::Idle;
                Err(e)
            }
        }
    }

    fn run_frames<S: KeyframeSink>(
        &self,
        record: &CaptureRecord,
        geometry: &WheelGeometry,
        frame_ms: f64,
        sink: &mut S,
    ) -> Result<RunSummary, MocapError> {
        let length = record.info.frame_count;
        debug!(
            "Converting {}: {} frames, {} output fps, starting at frame {}",
            record.info.name, length, self.config.output_rate, self.config.base_time
        );

        let mut state = RunState::new();
        let mut time = self.config.base_time;
        let mut keyframes = 0;

        for expected in 1..=length {
            let sample = record.frames.get(expected as usize - 1).ok_or_else(|| {
                MocapError::SequenceViolation(format!(
                    "frame {} missing, capture holds {} samples for a frame count of {}",
                    expected,
                    record.frames.len(),
                    length
                ))
            })?;
            if sample.index != expected {
                return Err(MocapError::SequenceViolation(format!(
                    "expected frame {}, found frame {}",
                    expected, sample.index
                )));
            }

            trace!("{} at {}", expected, time);
            keyframes += state.process(sample, time, geometry, sink);

            if expected < length {
                time += sample.frame_time_ms / frame_ms;
            }
        }

        if record.frames.len() > length as usize {
            return Err(MocapError::SequenceViolation(format!(
                "capture holds {} samples but declares {} frames",
                record.frames.len(),
                length
            )));
        }

        debug!("Emitted {} keyframes up to frame {:.3}", keyframes, time);
        Ok(RunSummary {
            frames: length,
            keyframes,
            start_time: self.config.base_time,
            end_time: time,
        })
    }
}

/// Select vehicle `number` (1-based) from `capture` and convert it
pub fn convert_vehicle<S: KeyframeSink>(
    capture: &CaptureFile,
    number: usize,
    geometry: &WheelGeometry,
    config: SequencerConfig,
    sink: &mut S,
) -> Result<RunSummary, MocapError> {
    let record = capture.vehicle(number)?;
    FrameSequencer::new(config).run(record, geometry, sink)
}

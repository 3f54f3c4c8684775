//! Keyframe output
//!
//! The sequencer never touches a scene. It hands every reconstructed
//! transform to a [`KeyframeSink`], which inserts it into whatever animation
//! system is on the other side. [`KeyframeBuffer`] is the in-memory sink used
//! by the command line tool and by tests.

use std::collections::BTreeMap;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::wheel::WheelPosition;

/// Animated entity of the vehicle rig
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityId {
    Vehicle,
    Wheel(WheelPosition),
    CameraHolder,
    CameraTarget,
    /// Parented to the camera holder, so its position is local to the holder
    /// and always zero. Only the rotation carries information.
    Camera,
}

impl EntityId {
    /// Entities keyed for every sample, in emission order
    pub const ALL: [EntityId; 8] = [
        EntityId::Vehicle,
        EntityId::Wheel(WheelPosition::LeftFront),
        EntityId::Wheel(WheelPosition::RightFront),
        EntityId::Wheel(WheelPosition::LeftBack),
        EntityId::Wheel(WheelPosition::RightBack),
        EntityId::CameraHolder,
        EntityId::CameraTarget,
        EntityId::Camera,
    ];

    /// Default object name in the host scene
    pub fn default_name(&self) -> &'static str {
        match self {
            EntityId::Vehicle => "vehicle",
            EntityId::Wheel(position) => position.dummy_name(),
            EntityId::CameraHolder => "camera_holder",
            EntityId::CameraTarget => "camera_target",
            EntityId::Camera => "camera",
        }
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.default_name())
    }
}

/// One keyframe event
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
    pub entity: EntityId,
    /// Output frame number, fractional between whole frames
    pub time: f64,
    /// Relative to the entity's parent in the rig
    pub position: Vector3<f64>,
    /// Continuous Euler angles in degrees
    pub rotation: Vector3<f64>,
}

/// Consumer of keyframe events
///
/// Events for one entity arrive with non-decreasing `time`. Two samples
/// recorded with a zero frame time share the same output time, and a sink
/// that keys by time sees the later one replace the earlier.
pub trait KeyframeSink {
    fn emit(&mut self, keyframe: Keyframe);

    /// Camera field of view in degrees
    fn emit_field_of_view(&mut self, _time: f64, _degrees: f64) {}

    /// The run aborted; everything emitted for it is inconsistent
    fn discard(&mut self) {}
}

/// Field of view sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldOfView {
    pub time: f64,
    pub degrees: f64,
}

/// Sink that keeps everything in memory
#[derive(Debug, Clone, Default)]
pub struct KeyframeBuffer {
    keyframes: Vec<Keyframe>,
    field_of_view: Vec<FieldOfView>,
}

impl KeyframeBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keyframes in emission order
    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    pub fn field_of_view(&self) -> &[FieldOfView] {
        &self.field_of_view
    }

    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty() && self.field_of_view.is_empty()
    }

    /// Keyframes of one entity in time order
    pub fn curve(&self, entity: EntityId) -> Vec<Keyframe> {
        self.keyframes
            .iter()
            .filter(|k| k.entity == entity)
            .copied()
            .collect()
    }

    /// All keyframes grouped into one curve per entity
    pub fn curves(&self) -> BTreeMap<EntityId, Vec<Keyframe>> {
        let mut curves: BTreeMap<EntityId, Vec<Keyframe>> = BTreeMap::new();
        for keyframe in &self.keyframes {
            curves.entry(keyframe.entity).or_default().push(*keyframe);
        }
        curves
    }
}

impl KeyframeSink for KeyframeBuffer {
    fn emit(&mut self, keyframe: Keyframe) {
        self.keyframes.push(keyframe);
    }

    fn emit_field_of_view(&mut self, time: f64, degrees: f64) {
        self.field_of_view.push(FieldOfView { time, degrees });
    }

    fn discard(&mut self) {
        self.keyframes.clear();
        self.field_of_view.clear();
    }
}

//! Wheel Roll Integrator
//!
//! The captured wheel angle is bounded like every other Euler angle, and a
//! wheel can turn more than once between two samples. The spin angle is
//! therefore rebuilt from the distance the vehicle travelled: whole turns come
//! from `distance / circumference`, and the sampled angle supplies the
//! remaining fraction so the integration cannot drift.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

/// Time base of the capture source's speed value, in seconds
///
/// The recorder reports speed as distance travelled per 1/50 s.
pub const SPEED_REFERENCE_INTERVAL: f64 = 0.02;

/// Side of the vehicle a wheel is mounted on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WheelSide {
    Left,
    Right,
}

/// Axle a wheel belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axle {
    Front,
    Back,
}

impl Axle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Axle::Front => "front",
            Axle::Back => "back",
        }
    }
}

/// The four wheel mounting points of an automobile
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WheelPosition {
    #[serde(rename = "lf")]
    LeftFront,
    #[serde(rename = "rf")]
    RightFront,
    #[serde(rename = "lb")]
    LeftBack,
    #[serde(rename = "rb")]
    RightBack,
}

impl WheelPosition {
    pub const ALL: [WheelPosition; 4] = [
        WheelPosition::LeftFront,
        WheelPosition::RightFront,
        WheelPosition::LeftBack,
        WheelPosition::RightBack,
    ];

    pub fn side(&self) -> WheelSide {
        match self {
            WheelPosition::LeftFront | WheelPosition::LeftBack => WheelSide::Left,
            WheelPosition::RightFront | WheelPosition::RightBack => WheelSide::Right,
        }
    }

    pub fn axle(&self) -> Axle {
        match self {
            WheelPosition::LeftFront | WheelPosition::RightFront => Axle::Front,
            WheelPosition::LeftBack | WheelPosition::RightBack => Axle::Back,
        }
    }

    /// Key of the wheel block in the capture file
    pub fn key(&self) -> &'static str {
        match self {
            WheelPosition::LeftFront => "lf",
            WheelPosition::RightFront => "rf",
            WheelPosition::LeftBack => "lb",
            WheelPosition::RightBack => "rb",
        }
    }

    /// Conventional name of the wheel dummy object
    pub fn dummy_name(&self) -> &'static str {
        match self {
            WheelPosition::LeftFront => "wheel_lf_dummy",
            WheelPosition::RightFront => "wheel_rf_dummy",
            WheelPosition::LeftBack => "wheel_lb_dummy",
            WheelPosition::RightBack => "wheel_rb_dummy",
        }
    }
}

impl std::fmt::Display for WheelPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Distance travelled during one frame
///
/// `speed` is in distance units per [`SPEED_REFERENCE_INTERVAL`]. Negative
/// speed means reversing.
pub fn travel_distance(frame_time_ms: f64, speed: f64) -> f64 {
    (frame_time_ms * 0.001) * speed / SPEED_REFERENCE_INTERVAL
}

/// Signed number of wheel revolutions covering `distance`
pub fn wheel_rotations(distance: f64, radius: f64) -> f64 {
    distance / (2.0 * PI * radius)
}

/// Spin state of one wheel's roll axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelRollState {
    side: WheelSide,
    /// Accumulated spin angle, not restricted to whole turns
    offset: f64,
    /// Previous raw wheel angle, measured from the rest pose
    last_raw: f64,
}

impl WheelRollState {
    pub fn new(side: WheelSide) -> Self {
        Self {
            side,
            offset: 0.0,
            last_raw: 0.0,
        }
    }

    pub fn side(&self) -> WheelSide {
        self.side
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn last_raw(&self) -> f64 {
        self.last_raw
    }

    /// Advance by one frame and return the spin angle in degrees
    ///
    /// `raw` is the sampled wheel angle, `distance` the distance travelled
    /// since the previous frame. `radius` must be strictly positive; the
    /// caller validates it through [`WheelGeometry`](crate::geometry::WheelGeometry).
    pub fn step(&mut self, raw: f64, distance: f64, radius: f64) -> f64 {
        debug_assert!(radius > 0.0, "wheel radius must be positive");

        let rotations = wheel_rotations(distance, radius);
        if rotations.abs() >= 1.0 {
            // Whole turns the sampled angle cannot show
            self.offset += 360.0 * rotations.floor();
        }

        let delta = raw - self.last_raw;
        if distance >= 0.0 {
            if delta > 0.0 {
                self.offset += delta;
            } else if delta < 0.0 {
                self.offset += 360.0 + delta;
            }
        } else if delta > 0.0 {
            self.offset -= delta;
        } else if delta < 0.0 {
            self.offset -= 360.0 + delta;
        }
        self.last_raw = raw;

        self.output()
    }

    /// Current spin angle with the side's sign convention applied
    pub fn output(&self) -> f64 {
        match self.side {
            WheelSide::Left => self.offset,
            WheelSide::Right => -self.offset,
        }
    }
}

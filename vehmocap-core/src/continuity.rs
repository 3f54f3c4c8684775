//! Angle Continuity Tracker
//!
//! Captured Euler angles are bounded: a body turning through 180° shows up as
//! a jump from `179` to `-179`. Keyframing those values directly makes the
//! curve interpolate the long way round. The tracker keeps a running multiple
//! of 360° per (entity, axis) and adds it to every raw sample so the output
//! history is continuous.
//!
//! Each tracker only detects one wrap between consecutive samples. The true
//! rotation between two samples must stay below `360° - threshold`; this is an
//! assumption on the capture rate and is not checked.

use serde::{Deserialize, Serialize};

/// Wrap detection threshold for an axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AxisPolicy {
    /// 90° threshold, used for pitch/roll style axes
    Wide,
    /// 180° threshold, used for the free heading axis
    HalfTurn,
}

impl AxisPolicy {
    /// Threshold in degrees
    pub fn threshold(&self) -> f64 {
        match self {
            AxisPolicy::Wide => 90.0,
            AxisPolicy::HalfTurn => 180.0,
        }
    }
}

/// Per (entity, axis) continuity state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContinuityState {
    policy: AxisPolicy,
    /// Accumulated whole turns, always a multiple of 360°
    offset: f64,
    /// Previous raw sample, `None` until the first sample arrives
    last_raw: Option<f64>,
}

impl ContinuityState {
    pub fn new(policy: AxisPolicy) -> Self {
        Self {
            policy,
            offset: 0.0,
            last_raw: None,
        }
    }

    pub fn policy(&self) -> AxisPolicy {
        self.policy
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn last_raw(&self) -> Option<f64> {
        self.last_raw
    }

    /// Feed the next raw sample and return the continuous angle
    pub fn step(&mut self, raw: f64) -> f64 {
        if let Some(last) = self.last_raw {
            let threshold = self.policy.threshold();
            if raw + threshold < last {
                self.offset += 360.0;
            } else if raw - threshold > last {
                self.offset -= 360.0;
            }
        }
        self.last_raw = Some(raw);
        raw + self.offset
    }
}

/// Continuity states for the three Euler axes of one entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EulerContinuity {
    pub x: ContinuityState,
    pub y: ContinuityState,
    pub z: ContinuityState,
}

impl EulerContinuity {
    pub fn new(x: AxisPolicy, y: AxisPolicy, z: AxisPolicy) -> Self {
        Self {
            x: ContinuityState::new(x),
            y: ContinuityState::new(y),
            z: ContinuityState::new(z),
        }
    }

    /// Half-turn on X, wide on Y and Z
    pub fn vehicle_body() -> Self {
        Self::new(AxisPolicy::HalfTurn, AxisPolicy::Wide, AxisPolicy::Wide)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_first_sample_is_seeded() {
        let mut state = ContinuityState::new(AxisPolicy::Wide);
        assert_eq!(state.step(-135.5), -135.5);
        assert_eq!(state.offset(), 0.0);
        assert_eq!(state.last_raw(), Some(-135.5));

        // No wrap check on the first sample even for a far-off value
        let mut state = ContinuityState::new(AxisPolicy::HalfTurn);
        assert_eq!(state.step(359.0), 359.0);
        assert_eq!(state.offset(), 0.0);
    }

    #[test]
    fn test_forward_wrap_on_wide_axis() {
        let mut state = ContinuityState::new(AxisPolicy::Wide);
        assert_eq!(state.step(179.0), 179.0);
        assert_eq!(state.step(-179.0), 181.0);
        assert_eq!(state.offset(), 360.0);
    }

    #[test]
    fn test_backward_wrap_on_wide_axis() {
        let mut state = ContinuityState::new(AxisPolicy::Wide);
        assert_eq!(state.step(-178.0), -178.0);
        assert_eq!(state.step(177.0), -183.0);
        assert_eq!(state.offset(), -360.0);
    }

    #[test]
    fn test_small_steps_do_not_wrap() {
        let mut state = ContinuityState::new(AxisPolicy::Wide);
        let samples = [10.0, 40.0, 95.0, 60.0, -20.0];
        for raw in samples {
            assert_eq!(state.step(raw), raw);
        }
        assert_eq!(state.offset(), 0.0);
    }

    #[test]
    fn test_half_turn_tolerates_larger_steps() {
        // A 150° drop trips the wide policy but not the half-turn one
        let mut wide = ContinuityState::new(AxisPolicy::Wide);
        let mut half = ContinuityState::new(AxisPolicy::HalfTurn);
        wide.step(100.0);
        half.step(100.0);
        assert_eq!(wide.step(-50.0), 310.0);
        assert_eq!(half.step(-50.0), -50.0);

        let mut half = ContinuityState::new(AxisPolicy::HalfTurn);
        assert_eq!(half.step(170.0), 170.0);
        assert_eq!(half.step(-170.0), 190.0);
    }

    #[test]
    fn test_continuous_spin_accumulates_turns() {
        // Heading sweeping forward 30° per sample through three full turns
        let mut state = ContinuityState::new(AxisPolicy::HalfTurn);
        let mut previous: Option<f64> = None;
        for i in 0..36 {
            let true_angle = i as f64 * 30.0;
            let raw = (true_angle + 180.0).rem_euclid(360.0) - 180.0;
            let out = state.step(raw);
            if let Some(prev) = previous {
                assert_relative_eq!(out - prev, 30.0, epsilon = 1e-9);
            }
            previous = Some(out);
        }
        assert_relative_eq!(previous.unwrap(), 35.0 * 30.0, epsilon = 1e-9);
    }

    #[test]
    fn test_body_policies() {
        let body = EulerContinuity::vehicle_body();
        assert_eq!(body.x.policy(), AxisPolicy::HalfTurn);
        assert_eq!(body.y.policy(), AxisPolicy::Wide);
        assert_eq!(body.z.policy(), AxisPolicy::Wide);
    }
}

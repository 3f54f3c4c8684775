//! Wheel Geometry Resolver
//!
//! Wheel radius is not part of the capture. It is guessed from the model the
//! animation will drive: every wheel dummy normally parents the tire mesh,
//! sometimes next to smaller brake or hub meshes. The guess is a heuristic
//! and is kept here so that the roll integrator only ever sees a validated,
//! positive radius.
//!
//! Wheels roll about their local X axis, so a tire's diameter shows up in its
//! Y and Z bounding dimensions.

use log::{debug, info, warn};
use nalgebra::Vector3;

use crate::error::MocapError;
use crate::wheel::{Axle, WheelPosition};

/// Radius used when no wheel geometry can be found
pub const DEFAULT_WHEEL_RADIUS: f64 = 0.34;

/// Maximum |Y - Z| difference for a cross-section to count as circular
const CIRCULARITY_TOLERANCE: f64 = 0.01;

/// Read-only view of the host scene
///
/// Implemented by whatever holds the 3D model the keyframes will be applied
/// to. Only the parent/child structure and bounding boxes are needed.
pub trait SceneGraph {
    type Handle: Clone + std::fmt::Debug;

    /// Direct children of `entity`
    fn children_of(&self, entity: &Self::Handle) -> Vec<Self::Handle>;

    /// Bounding box size of `entity` along its local X, Y and Z axes
    fn bounding_dimensions(&self, entity: &Self::Handle) -> Vector3<f64>;
}

/// Scene handles of the four wheel dummies, where present
#[derive(Debug, Clone)]
pub struct WheelMounts<H> {
    pub left_front: Option<H>,
    pub right_front: Option<H>,
    pub left_back: Option<H>,
    pub right_back: Option<H>,
}

impl<H> Default for WheelMounts<H> {
    fn default() -> Self {
        Self {
            left_front: None,
            right_front: None,
            left_back: None,
            right_back: None,
        }
    }
}

impl<H> WheelMounts<H> {
    pub fn get(&self, position: WheelPosition) -> Option<&H> {
        match position {
            WheelPosition::LeftFront => self.left_front.as_ref(),
            WheelPosition::RightFront => self.right_front.as_ref(),
            WheelPosition::LeftBack => self.left_back.as_ref(),
            WheelPosition::RightBack => self.right_back.as_ref(),
        }
    }

    pub fn set(&mut self, position: WheelPosition, handle: Option<H>) {
        let slot = match position {
            WheelPosition::LeftFront => &mut self.left_front,
            WheelPosition::RightFront => &mut self.right_front,
            WheelPosition::LeftBack => &mut self.left_back,
            WheelPosition::RightBack => &mut self.right_back,
        };
        *slot = handle;
    }
}

/// Per-axle wheel radius
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelGeometry {
    pub front: f64,
    pub back: f64,
}

impl Default for WheelGeometry {
    fn default() -> Self {
        Self {
            front: DEFAULT_WHEEL_RADIUS,
            back: DEFAULT_WHEEL_RADIUS,
        }
    }
}

impl WheelGeometry {
    /// Create a validated geometry
    pub fn new(front: f64, back: f64) -> Result<Self, MocapError> {
        let geometry = Self { front, back };
        geometry.validate()?;
        Ok(geometry)
    }

    pub fn uniform(radius: f64) -> Result<Self, MocapError> {
        Self::new(radius, radius)
    }

    pub fn radius(&self, axle: Axle) -> f64 {
        match axle {
            Axle::Front => self.front,
            Axle::Back => self.back,
        }
    }

    /// Both radii must be strictly positive (NaN is rejected too)
    pub fn validate(&self) -> Result<(), MocapError> {
        for axle in [Axle::Front, Axle::Back] {
            let radius = self.radius(axle);
            if !(radius > 0.0) {
                return Err(MocapError::InvalidGeometry {
                    axle: axle.as_str(),
                    radius,
                });
            }
        }
        Ok(())
    }
}

/// Rolling radius of a tire-like bounding box
pub fn tire_radius(dimensions: &Vector3<f64>) -> f64 {
    0.5 * dimensions.y.min(dimensions.z)
}

fn circularity_error(dimensions: &Vector3<f64>) -> f64 {
    (dimensions.y - dimensions.z).abs()
}

/// Pick the child most likely to be the tire
///
/// Circular cross-sections win, the largest among them; if none is circular
/// the closest to circular is taken.
fn pick_tire<S: SceneGraph>(scene: &S, children: &[S::Handle]) -> Option<S::Handle> {
    if children.len() == 1 {
        return children.first().cloned();
    }

    let sized: Vec<(&S::Handle, Vector3<f64>)> = children
        .iter()
        .map(|child| (child, scene.bounding_dimensions(child)))
        .collect();

    let circular = sized
        .iter()
        .filter(|(_, dims)| circularity_error(dims) < CIRCULARITY_TOLERANCE)
        .max_by(|a, b| tire_radius(&a.1).total_cmp(&tire_radius(&b.1)));
    if let Some((child, _)) = circular {
        return Some((*child).clone());
    }

    sized
        .iter()
        .min_by(|a, b| {
            circularity_error(&a.1)
                .total_cmp(&circularity_error(&b.1))
                .then_with(|| tire_radius(&b.1).total_cmp(&tire_radius(&a.1)))
        })
        .map(|(child, _)| (*child).clone())
}

/// Derive front and back wheel radius from the scene
///
/// Never fails: anything that cannot be resolved falls back to
/// [`DEFAULT_WHEEL_RADIUS`].
pub fn resolve_wheel_geometry<S: SceneGraph>(
    scene: &S,
    mounts: &WheelMounts<S::Handle>,
) -> WheelGeometry {
    let mut found: Vec<(WheelPosition, f64)> = Vec::new();

    for position in WheelPosition::ALL {
        let Some(mount) = mounts.get(position) else {
            debug!("No {} wheel dummy in scene", position.dummy_name());
            continue;
        };
        let children = scene.children_of(mount);
        let Some(tire) = pick_tire(scene, &children) else {
            debug!("{} has no geometry children", position.dummy_name());
            continue;
        };
        let radius = tire_radius(&scene.bounding_dimensions(&tire));
        if radius > 0.0 {
            debug!(
                "{}: using {:?} with radius {:.4}",
                position.dummy_name(),
                tire,
                radius
            );
            found.push((position, radius));
        } else {
            warn!(
                "{}: ignoring {:?}, degenerate bounding box",
                position.dummy_name(),
                tire
            );
        }
    }

    match found.as_slice() {
        [] => {
            info!(
                "Found no wheel objects, radius set to the default of {}",
                DEFAULT_WHEEL_RADIUS
            );
            WheelGeometry::default()
        }
        [(position, radius)] => {
            info!(
                "Found 1 wheel object ({}), radius {:.4} used for both axles",
                position, radius
            );
            WheelGeometry {
                front: *radius,
                back: *radius,
            }
        }
        _ => {
            info!("Found {} wheel objects", found.len());
            let on_axle = |axle: Axle| {
                found
                    .iter()
                    .find(|(position, _)| position.axle() == axle)
                    .map(|(_, radius)| *radius)
            };
            let front = on_axle(Axle::Front);
            let back = on_axle(Axle::Back);
            // Wheels found on one axle only: share the radius
            let geometry = WheelGeometry {
                front: front.or(back).unwrap_or(DEFAULT_WHEEL_RADIUS),
                back: back.or(front).unwrap_or(DEFAULT_WHEEL_RADIUS),
            };
            debug!(
                "Wheel radius front {:.4}, back {:.4}",
                geometry.front, geometry.back
            );
            geometry
        }
    }
}

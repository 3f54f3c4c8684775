//! Scene description files
//!
//! Stand-in for the host animation scene: a flat list of named objects with
//! their parent and local bounding box size.
//!
//! ```json
//! {
//!   "objects": [
//!     { "name": "vehicle" },
//!     { "name": "wheel_lf_dummy", "parent": "vehicle" },
//!     { "name": "tire_lf", "parent": "wheel_lf_dummy", "dimensions": [0.25, 0.68, 0.68] }
//!   ]
//! }
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::debug;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use vehmocap_core::{SceneGraph, WheelMounts, WheelPosition};

use crate::config::ObjectNames;
use crate::error::CliError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Bounding box size along local X, Y, Z
    #[serde(default)]
    pub dimensions: [f64; 3],
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneDescription {
    pub objects: Vec<SceneObject>,
}

impl SceneDescription {
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn load(path: &Path) -> Result<Self, CliError> {
        let file = File::open(path).map_err(|e| CliError::io(path, e))?;
        let scene: Self =
            serde_json::from_reader(BufReader::new(file)).map_err(|e| CliError::Scene {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        debug!("Loaded {} scene objects from {}", scene.objects.len(), path.display());
        Ok(scene)
    }

    /// First object called `name`
    pub fn find(&self, name: &str) -> Option<usize> {
        self.objects.iter().position(|o| o.name == name)
    }

    /// Child of `parent` called `name`
    pub fn child_named(&self, parent: usize, name: &str) -> Option<usize> {
        let parent_name = &self.objects.get(parent)?.name;
        self.objects
            .iter()
            .position(|o| o.name == name && o.parent.as_deref() == Some(parent_name.as_str()))
    }

    /// Wheel dummies parented to `vehicle`
    pub fn wheel_mounts(&self, vehicle: usize, names: &ObjectNames) -> WheelMounts<usize> {
        let mut mounts = WheelMounts::default();
        for position in WheelPosition::ALL {
            let name = names.wheel(position);
            let mount = self.child_named(vehicle, name);
            if mount.is_none() {
                debug!("{} is not a child of {}", name, names.vehicle);
            }
            mounts.set(position, mount);
        }
        mounts
    }
}

impl SceneGraph for SceneDescription {
    /// Index into `objects`
    type Handle = usize;

    fn children_of(&self, entity: &usize) -> Vec<usize> {
        let Some(parent) = self.objects.get(*entity) else {
            return Vec::new();
        };
        self.objects
            .iter()
            .enumerate()
            .filter(|(_, o)| o.parent.as_deref() == Some(parent.name.as_str()))
            .map(|(i, _)| i)
            .collect()
    }

    fn bounding_dimensions(&self, entity: &usize) -> Vector3<f64> {
        self.objects
            .get(*entity)
            .map(|o| Vector3::from(o.dimensions))
            .unwrap_or_else(Vector3::zeros)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use vehmocap_core::{resolve_wheel_geometry, DEFAULT_WHEEL_RADIUS};

    const SCENE: &str = r#"{
        "objects": [
            { "name": "vehicle" },
            { "name": "wheel_lf_dummy", "parent": "vehicle" },
            { "name": "wheel_rf_dummy", "parent": "vehicle" },
            { "name": "wheel_lb_dummy", "parent": "vehicle" },
            { "name": "wheel_rb_dummy", "parent": "other" },
            { "name": "tire_lf", "parent": "wheel_lf_dummy", "dimensions": [0.25, 0.7, 0.7] },
            { "name": "hub_lf", "parent": "wheel_lf_dummy", "dimensions": [0.1, 0.3, 0.3] },
            { "name": "tire_lb", "parent": "wheel_lb_dummy", "dimensions": [0.3, 0.8, 0.8] }
        ]
    }"#;

    #[test]
    fn test_children_and_dimensions() {
        let scene = SceneDescription::from_json_str(SCENE).unwrap();
        let lf = scene.find("wheel_lf_dummy").unwrap();

        let children: Vec<&str> = scene
            .children_of(&lf)
            .into_iter()
            .map(|i| scene.objects[i].name.as_str())
            .collect();
        assert_eq!(children, vec!["tire_lf", "hub_lf"]);

        let tire = scene.find("tire_lf").unwrap();
        assert_eq!(scene.bounding_dimensions(&tire), Vector3::new(0.25, 0.7, 0.7));
        // Missing dimensions default to a degenerate box
        assert_eq!(scene.bounding_dimensions(&lf), Vector3::zeros());
        assert!(scene.children_of(&99).is_empty());
    }

    #[test]
    fn test_mounts_must_be_children_of_vehicle() {
        let scene = SceneDescription::from_json_str(SCENE).unwrap();
        let vehicle = scene.find("vehicle").unwrap();
        let mounts = scene.wheel_mounts(vehicle, &ObjectNames::default());

        assert!(mounts.get(WheelPosition::LeftFront).is_some());
        assert!(mounts.get(WheelPosition::RightFront).is_some());
        assert!(mounts.get(WheelPosition::LeftBack).is_some());
        assert!(mounts.get(WheelPosition::RightBack).is_none());
    }

    #[test]
    fn test_resolves_geometry() {
        let scene = SceneDescription::from_json_str(SCENE).unwrap();
        let vehicle = scene.find("vehicle").unwrap();
        let mounts = scene.wheel_mounts(vehicle, &ObjectNames::default());

        let geometry = resolve_wheel_geometry(&scene, &mounts);
        assert_relative_eq!(geometry.front, 0.35);
        assert_relative_eq!(geometry.back, 0.4);
    }

    #[test]
    fn test_empty_scene_uses_default() {
        let scene = SceneDescription::from_json_str(r#"{"objects": [{"name": "vehicle"}]}"#)
            .unwrap();
        let mounts = scene.wheel_mounts(0, &ObjectNames::default());
        let geometry = resolve_wheel_geometry(&scene, &mounts);
        assert_eq!(geometry.front, DEFAULT_WHEEL_RADIUS);
        assert_eq!(geometry.back, DEFAULT_WHEEL_RADIUS);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SCENE.as_bytes()).unwrap();

        let scene = SceneDescription::load(file.path()).unwrap();
        assert_eq!(scene.objects.len(), 8);
    }

    #[test]
    fn test_load_rejects_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{\"objects\": 3}").unwrap();

        assert!(matches!(
            SceneDescription::load(file.path()),
            Err(CliError::Scene { .. })
        ));
    }
}

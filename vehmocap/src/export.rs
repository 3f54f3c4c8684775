//! Curve export
//!
//! Keyframes are grouped into one curve per scene object. JSON output keeps
//! the run metadata next to the curves; CSV output has one row per keyframe.

use serde::Serialize;
use vehmocap_core::{CaptureInfo, EntityId, KeyframeBuffer, RunSummary, WheelGeometry};

use crate::config::ObjectNames;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurveMetadata {
    pub vehicle: String,
    pub kind: String,
    pub output_rate: f64,
    pub start_frame: f64,
    pub end_frame: f64,
    pub frames: u32,
    pub front_radius: f64,
    pub back_radius: f64,
}

impl CurveMetadata {
    pub fn new(
        info: &CaptureInfo,
        output_rate: f64,
        summary: &RunSummary,
        geometry: &WheelGeometry,
    ) -> Self {
        Self {
            vehicle: info.name.clone(),
            kind: info.kind.to_string(),
            output_rate,
            start_frame: summary.start_time,
            end_frame: summary.end_time,
            frames: summary.frames,
            front_radius: geometry.front,
            back_radius: geometry.back,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurveKey {
    pub time: f64,
    pub position: [f64; 3],
    pub rotation: [f64; 3],
}

#[derive(Debug, Clone, Serialize)]
pub struct EntityCurve {
    pub entity: EntityId,
    pub object: String,
    pub keys: Vec<CurveKey>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldOfViewKey {
    pub time: f64,
    pub degrees: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurveExport {
    pub metadata: CurveMetadata,
    pub curves: Vec<EntityCurve>,
    pub field_of_view: Vec<FieldOfViewKey>,
}

impl CurveExport {
    pub fn new(metadata: CurveMetadata, buffer: &KeyframeBuffer, names: &ObjectNames) -> Self {
        let curves = buffer
            .curves()
            .into_iter()
            .map(|(entity, keyframes)| EntityCurve {
                entity,
                object: names.entity(entity).to_string(),
                keys: keyframes
                    .iter()
                    .map(|k| CurveKey {
                        time: k.time,
                        position: k.position.into(),
                        rotation: k.rotation.into(),
                    })
                    .collect(),
            })
            .collect();
        let field_of_view = buffer
            .field_of_view()
            .iter()
            .map(|f| FieldOfViewKey {
                time: f.time,
                degrees: f.degrees,
            })
            .collect();

        Self {
            metadata,
            curves,
            field_of_view,
        }
    }
}

pub fn export_json(export: &CurveExport) -> anyhow::Result<String> {
    serde_json::to_string_pretty(export)
        .map_err(|e| anyhow::anyhow!("Failed to serialize to JSON: {}", e))
}

pub fn export_csv(buffer: &KeyframeBuffer, names: &ObjectNames) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["object", "time", "px", "py", "pz", "rx", "ry", "rz"])?;

    for (entity, keyframes) in buffer.curves() {
        let object = names.entity(entity);
        for k in keyframes {
            wtr.write_record([
                object.to_string(),
                k.time.to_string(),
                k.position.x.to_string(),
                k.position.y.to_string(),
                k.position.z.to_string(),
                k.rotation.x.to_string(),
                k.rotation.y.to_string(),
                k.rotation.z.to_string(),
            ])?;
        }
    }

    // Field of view rides on the camera object
    let camera = names.entity(EntityId::Camera);
    for f in buffer.field_of_view() {
        wtr.write_record([
            format!("{}.fov", camera),
            f.time.to_string(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            f.degrees.to_string(),
        ])?;
    }

    wtr.flush()?;
    String::from_utf8(wtr.into_inner()?)
        .map_err(|e| anyhow::anyhow!("Failed to convert CSV to string: {}", e))
}

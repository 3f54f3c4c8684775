//! JSON layout written by the VehMocap recorder resource
//!
//! ```text
//! [
//!   {
//!     "i": { "vN": "Infernus", "vT": "Automobile", "kfPS": 50, "d": 6.24, "fC": 312 },
//!     "1": {
//!       "fT": 20, "V": 0.41,
//!       "v":  { "pX": .., "pY": .., "pZ": .., "rX": .., "rY": .., "rZ": .. },
//!       "lf": { .. }, "rf": { .. }, "lb": { .. }, "rb": { .. },
//!       "c":  { "cX": .., "cY": .., "cZ": .., "tX": .., "tY": .., "tZ": .., "r": .., "fov": .. }
//!     },
//!     "2": { .. }
//!   }
//! ]
//! ```
//!
//! `V` and `fT` are normally written at frame level. Wheel and body blocks
//! may carry their own copies; a wheel's own speed takes precedence.
//!
//! Entries of other vehicle kinds are written with their own wheel blocks.
//! Only their `i` header is read, so a mixed capture still loads and the
//! automobiles in it stay selectable.

use std::collections::BTreeMap;

use log::{debug, warn};
use nalgebra::Vector3;
use serde::Deserialize;
use serde_json::Value;

use super::{
    CameraSample, CaptureFile, CaptureInfo, CaptureRecord, FrameSample, TransformSample,
    VehicleKind, WheelSample,
};
use crate::error::MocapError;
use crate::wheel::WheelPosition;

const INFO_KEY: &str = "i";

#[derive(Debug, Deserialize)]
struct WireInfo {
    #[serde(rename = "vN")]
    name: String,
    #[serde(rename = "vT")]
    kind: String,
    #[serde(rename = "kfPS")]
    sample_rate: u32,
    #[serde(rename = "d")]
    duration: f64,
    #[serde(rename = "fC")]
    frame_count: u32,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireTransform {
    p_x: f64,
    p_y: f64,
    p_z: f64,
    r_x: f64,
    r_y: f64,
    r_z: f64,
    #[serde(rename = "V", default)]
    speed: Option<f64>,
    #[serde(rename = "fT", default)]
    frame_time: Option<f64>,
}

impl WireTransform {
    fn sample(&self) -> TransformSample {
        TransformSample {
            position: Vector3::new(self.p_x, self.p_y, self.p_z),
            rotation: Vector3::new(self.r_x, self.r_y, self.r_z),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireCamera {
    c_x: f64,
    c_y: f64,
    c_z: f64,
    t_x: f64,
    t_y: f64,
    t_z: f64,
    r: f64,
    fov: f64,
}

#[derive(Debug, Deserialize)]
struct WireFrame {
    v: WireTransform,
    lf: WireTransform,
    rf: WireTransform,
    lb: WireTransform,
    rb: WireTransform,
    c: WireCamera,
    #[serde(rename = "V", default)]
    speed: Option<f64>,
    #[serde(rename = "fT", default)]
    frame_time: Option<f64>,
}

impl WireFrame {
    fn wheel(&self, position: WheelPosition) -> &WireTransform {
        match position {
            WheelPosition::LeftFront => &self.lf,
            WheelPosition::RightFront => &self.rf,
            WheelPosition::LeftBack => &self.lb,
            WheelPosition::RightBack => &self.rb,
        }
    }

    fn into_sample(self, index: u32) -> Result<FrameSample, MocapError> {
        let frame_time_ms = self
            .frame_time
            .or_else(|| {
                WheelPosition::ALL
                    .iter()
                    .find_map(|p| self.wheel(*p).frame_time)
            })
            .or(self.v.frame_time)
            .ok_or_else(|| MocapError::malformed_frame(index, "missing frame time `fT`"))?;
        if !frame_time_ms.is_finite() || frame_time_ms < 0.0 {
            return Err(MocapError::malformed_frame(
                index,
                format!("invalid frame time {}", frame_time_ms),
            ));
        }

        let mut wheels = [WheelSample {
            transform: self.v.sample(),
            speed: 0.0,
        }; 4];
        for (slot, position) in wheels.iter_mut().zip(WheelPosition::ALL) {
            let block = self.wheel(position);
            let speed = block.speed.or(self.speed).or(self.v.speed).ok_or_else(|| {
                MocapError::malformed_frame(
                    index,
                    format!("missing speed `V` for wheel {}", position),
                )
            })?;
            *slot = WheelSample {
                transform: block.sample(),
                speed,
            };
        }

        Ok(FrameSample {
            index,
            frame_time_ms,
            body: self.v.sample(),
            wheels,
            camera: CameraSample {
                holder: Vector3::new(self.c.c_x, self.c.c_y, self.c.c_z),
                target: Vector3::new(self.c.t_x, self.c.t_y, self.c.t_z),
                roll: self.c.r,
                fov: self.c.fov,
            },
        })
    }
}

/// Frame keys are written as plain decimal indices starting at 1
///
/// Spellings such as `01` or `+1` would alias another frame and are rejected.
fn parse_frame_key(key: &str) -> Result<u32, MocapError> {
    match key.parse::<u32>() {
        Ok(index) if index > 0 && index.to_string() == key => Ok(index),
        _ => Err(MocapError::malformed(format!(
            "unexpected key `{}`, frames are keyed by 1-based index",
            key
        ))),
    }
}

fn parse_record(
    position: usize,
    mut fields: serde_json::Map<String, Value>,
) -> Result<Option<CaptureRecord>, MocapError> {
    let Some(info) = fields.remove(INFO_KEY) else {
        warn!("Skipping capture entry {}: no info block", position + 1);
        return Ok(None);
    };
    let info: WireInfo = serde_json::from_value(info)
        .map_err(|e| MocapError::malformed(format!("info block: {}", e)))?;
    let info = CaptureInfo {
        name: info.name,
        kind: VehicleKind::from(info.kind.as_str()),
        sample_rate: info.sample_rate,
        duration: info.duration,
        frame_count: info.frame_count,
    };

    // Other vehicle kinds use their own frame layout; only the header is read
    if !info.kind.is_supported() {
        debug!(
            "Capture entry {} is a {}, frames not decoded",
            position + 1,
            info.kind
        );
        return Ok(Some(CaptureRecord {
            info,
            frames: Vec::new(),
        }));
    }

    let mut frames = BTreeMap::new();
    for (key, value) in fields {
        let index = parse_frame_key(&key)?;
        let frame: WireFrame = serde_json::from_value(value)
            .map_err(|e| MocapError::malformed_frame(index, e.to_string()))?;
        if frames.insert(index, frame.into_sample(index)?).is_some() {
            return Err(MocapError::malformed_frame(index, "duplicate frame index"));
        }
    }

    debug!(
        "Parsed capture of {} ({}): {} frames",
        info.name,
        info.kind,
        frames.len()
    );

    Ok(Some(CaptureRecord {
        info,
        frames: frames.into_values().collect(),
    }))
}

pub(super) fn parse_capture(value: Value) -> Result<CaptureFile, MocapError> {
    let Value::Array(entries) = value else {
        return Err(MocapError::malformed(
            "expected an array of vehicle records",
        ));
    };

    let mut records = Vec::new();
    for (position, entry) in entries.into_iter().enumerate() {
        match entry {
            Value::Object(fields) => {
                if let Some(record) = parse_record(position, fields)? {
                    records.push(record);
                }
            }
            _ => warn!("Skipping capture entry {}: not an object", position + 1),
        }
    }

    if records.is_empty() {
        return Err(MocapError::malformed("not a VehMocap capture file"));
    }
    Ok(CaptureFile { records })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn transform(p: f64, r: f64) -> Value {
        json!({ "pX": p, "pY": p + 1.0, "pZ": p + 2.0, "rX": r, "rY": r + 1.0, "rZ": r + 2.0 })
    }

    fn frame(ft: f64, speed: f64) -> Value {
        json!({
            "fT": ft,
            "V": speed,
            "v": transform(10.0, 5.0),
            "lf": transform(11.0, 30.0),
            "rf": transform(12.0, 31.0),
            "lb": transform(13.0, 32.0),
            "rb": transform(14.0, 33.0),
            "c": { "cX": 1, "cY": 2, "cZ": 3, "tX": 4, "tY": 5, "tZ": 6, "r": 7, "fov": 70 }
        })
    }

    fn record(kind: &str, frames: usize) -> Value {
        let mut obj = serde_json::Map::new();
        obj.insert(
            "i".to_string(),
            json!({ "vN": "Infernus", "vT": kind, "kfPS": 50, "d": 0.2, "fC": frames }),
        );
        for i in 1..=frames {
            obj.insert(i.to_string(), frame(20.0, 0.5));
        }
        Value::Object(obj)
    }

    #[test]
    fn test_parse_record() {
        let capture = parse_capture(json!([record("Automobile", 3)])).unwrap();
        assert_eq!(capture.len(), 1);

        let record = &capture.records[0];
        assert_eq!(record.info.name, "Infernus");
        assert_eq!(record.info.kind, VehicleKind::Automobile);
        assert_eq!(record.info.sample_rate, 50);
        assert_eq!(record.info.frame_count, 3);
        assert_eq!(record.frames.len(), 3);

        let first = &record.frames[0];
        assert_eq!(first.index, 1);
        assert_eq!(first.frame_time_ms, 20.0);
        assert_eq!(first.body.position, Vector3::new(10.0, 11.0, 12.0));
        assert_eq!(first.body.rotation, Vector3::new(5.0, 6.0, 7.0));
        let rf = first.wheel(WheelPosition::RightFront);
        assert_eq!(rf.transform.rotation.x, 31.0);
        assert_eq!(rf.speed, 0.5);
        assert_eq!(first.camera.holder, Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(first.camera.target, Vector3::new(4.0, 5.0, 6.0));
        assert_eq!(first.camera.roll, 7.0);
        assert_eq!(first.camera.fov, 70.0);
    }

    #[test]
    fn test_frames_sorted_numerically() {
        let capture = parse_capture(json!([record("Automobile", 12)])).unwrap();
        let indices: Vec<u32> = capture.records[0].frames.iter().map(|f| f.index).collect();
        assert_eq!(indices, (1..=12).collect::<Vec<u32>>());
    }

    #[test]
    fn test_unsupported_kind_is_kept() {
        let capture = parse_capture(json!([record("Helicopter", 1)])).unwrap();
        assert_eq!(
            capture.records[0].info.kind,
            VehicleKind::Unsupported("Helicopter".to_string())
        );
    }

    /// Bike entry with its own wheel blocks, not the automobile layout
    fn bike() -> Value {
        json!({
            "i": { "vN": "PCJ-600", "vT": "Bike", "kfPS": 50, "d": 0.04, "fC": 2 },
            "1": { "fT": 20, "V": 0.3, "v": transform(1.0, 0.0), "f": transform(2.0, 0.0), "b": transform(3.0, 0.0) },
            "2": { "fT": 20, "V": 0.3, "v": transform(1.0, 0.0), "f": transform(2.0, 0.0), "b": transform(3.0, 0.0) }
        })
    }

    #[test]
    fn test_mixed_vehicle_kinds() {
        let capture = parse_capture(json!([bike(), record("Automobile", 2)])).unwrap();
        assert_eq!(capture.len(), 2);

        let bike = capture.vehicle(1).unwrap();
        assert_eq!(bike.info.name, "PCJ-600");
        assert_eq!(bike.info.kind, VehicleKind::Unsupported("Bike".to_string()));
        assert_eq!(bike.info.frame_count, 2);
        assert!(bike.frames.is_empty());

        let car = capture.vehicle(2).unwrap();
        assert_eq!(car.info.kind, VehicleKind::Automobile);
        assert_eq!(car.frames.len(), 2);
    }

    #[test]
    fn test_bike_only_capture_loads() {
        let capture = parse_capture(json!([bike()])).unwrap();
        assert_eq!(capture.records[0].info.summary().lines().next(), Some("Vehicle: PCJ-600"));
    }

    #[test]
    fn test_non_canonical_frame_keys() {
        for key in ["01", "+1", " 1"] {
            let mut rec = record("Automobile", 1);
            let mut aliased = frame(20.0, 0.5);
            aliased["v"]["pX"] = json!(99.0);
            rec.as_object_mut().unwrap().insert(key.to_string(), aliased);

            match parse_capture(json!([rec])) {
                Err(MocapError::MalformedCapture { frame: None, reason }) => {
                    assert!(reason.contains(key), "{}", reason);
                }
                other => panic!("key {:?}: unexpected result {:?}", key, other),
            }
        }
    }

    #[test]
    fn test_frame_key_canonical_form() {
        assert_eq!(parse_frame_key("1").unwrap(), 1);
        assert_eq!(parse_frame_key("312").unwrap(), 312);
        assert!(parse_frame_key("0").is_err());
        assert!(parse_frame_key("007").is_err());
        assert!(parse_frame_key("-1").is_err());
    }

    #[test]
    fn test_entries_without_info_are_skipped() {
        let capture =
            parse_capture(json!([{ "foo": 1 }, 17, record("Automobile", 1)])).unwrap();
        assert_eq!(capture.len(), 1);

        let err = parse_capture(json!([{ "foo": 1 }])).unwrap_err();
        assert!(matches!(err, MocapError::MalformedCapture { frame: None, .. }));
    }

    #[test]
    fn test_not_an_array() {
        let err = parse_capture(json!({ "i": {} })).unwrap_err();
        assert!(matches!(err, MocapError::MalformedCapture { .. }));
    }

    #[test]
    fn test_missing_field_names_frame() {
        let mut rec = record("Automobile", 2);
        rec["2"]["lb"].as_object_mut().unwrap().remove("rY");
        let err = parse_capture(json!([rec])).unwrap_err();
        match err {
            MocapError::MalformedCapture { frame, reason } => {
                assert_eq!(frame, Some(2));
                assert!(reason.contains("rY"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_bad_frame_key() {
        let mut rec = record("Automobile", 1);
        rec.as_object_mut()
            .unwrap()
            .insert("first".to_string(), frame(20.0, 0.5));
        assert!(matches!(
            parse_capture(json!([rec])),
            Err(MocapError::MalformedCapture { .. })
        ));

        let mut rec = record("Automobile", 1);
        rec.as_object_mut()
            .unwrap()
            .insert("0".to_string(), frame(20.0, 0.5));
        assert!(parse_capture(json!([rec])).is_err());
    }

    #[test]
    fn test_speed_and_frame_time_fallbacks() {
        let mut rec = record("Automobile", 1);
        let f = rec["1"].as_object_mut().unwrap();
        f.remove("fT");
        f.remove("V");
        f.get_mut("rf")
            .unwrap()
            .as_object_mut()
            .unwrap()
            .insert("fT".to_string(), json!(16.0));
        f.get_mut("v")
            .unwrap()
            .as_object_mut()
            .unwrap()
            .insert("V".to_string(), json!(0.25));
        f.get_mut("lb")
            .unwrap()
            .as_object_mut()
            .unwrap()
            .insert("V".to_string(), json!(-0.75));

        let capture = parse_capture(json!([rec])).unwrap();
        let sample = &capture.records[0].frames[0];
        assert_eq!(sample.frame_time_ms, 16.0);
        assert_eq!(sample.wheel(WheelPosition::LeftFront).speed, 0.25);
        assert_eq!(sample.wheel(WheelPosition::LeftBack).speed, -0.75);
    }

    #[test]
    fn test_missing_frame_time() {
        let mut rec = record("Automobile", 1);
        rec["1"].as_object_mut().unwrap().remove("fT");
        match parse_capture(json!([rec])) {
            Err(MocapError::MalformedCapture { frame, reason }) => {
                assert_eq!(frame, Some(1));
                assert!(reason.contains("fT"));
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_from_json_str() {
        let text = serde_json::to_string(&json!([record("Automobile", 2)])).unwrap();
        let capture = CaptureFile::from_json_str(&text).unwrap();
        assert_eq!(capture.records[0].frames.len(), 2);

        assert!(matches!(
            CaptureFile::from_json_str("{ not json"),
            Err(MocapError::MalformedCapture { .. })
        ));
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyframe persistence.
//!
//! The keyframe list is stored as one ordered list of [`KeyframeRecord`]s.
//! Records tolerate missing snapshots: when a record is loaded without a
//! camera, light or model snapshot, the current live state is substituted
//! instead of failing the whole load.

use crate::curve::TransitionSpec;
use crate::error::Result;
use crate::keyframe::{AnimatedProperty, Keyframe, KeyframeId, DEFAULT_HOLD, DEFAULT_TRANSITION};
use crate::snapshot::{CameraSnapshot, LightSnapshot, ModelVisibilitySnapshot, VisualState};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_hold() -> f32 {
    DEFAULT_HOLD
}

fn default_transition() -> f32 {
    DEFAULT_TRANSITION
}

/// Persisted form of a keyframe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyframeRecord {
    /// Keyframe ID (regenerated when missing)
    #[serde(default)]
    pub id: Option<KeyframeId>,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Camera pose
    #[serde(default)]
    pub camera: Option<CameraSnapshot>,
    /// Lighting
    #[serde(default)]
    pub lights: Option<LightSnapshot>,
    /// Model visibility
    #[serde(default)]
    pub models: Option<ModelVisibilitySnapshot>,
    /// Hold duration
    #[serde(default = "default_hold")]
    pub hold: f32,
    /// Transition duration
    #[serde(default = "default_transition")]
    pub transition: f32,
    /// Per-property transitions
    #[serde(default)]
    pub transitions: IndexMap<AnimatedProperty, TransitionSpec>,
}

impl From<&Keyframe> for KeyframeRecord {
    fn from(kf: &Keyframe) -> Self {
        Self {
            id: Some(kf.id),
            name: kf.name.clone(),
            camera: Some(kf.camera),
            lights: Some(kf.lights.clone()),
            models: Some(kf.models.clone()),
            hold: kf.hold,
            transition: kf.transition,
            transitions: kf.transitions.clone(),
        }
    }
}

impl KeyframeRecord {
    /// Whether any snapshot is missing
    pub fn is_incomplete(&self) -> bool {
        self.camera.is_none() || self.lights.is_none() || self.models.is_none()
    }

    /// Build a keyframe, filling missing snapshots from `live`
    pub fn repair(self, live: &VisualState) -> Keyframe {
        let mut kf = Keyframe {
            id: self.id.unwrap_or_default(),
            name: self.name,
            camera: self.camera.unwrap_or(live.camera),
            lights: self.lights.unwrap_or_else(|| live.lights.clone()),
            models: self.models.unwrap_or_else(|| live.models.clone()),
            hold: self.hold,
            transition: self.transition,
            transitions: self.transitions,
        };
        kf.normalize();
        kf
    }
}

/// Build keyframes from records, repairing incomplete ones from `live`
pub fn repair_records(records: Vec<KeyframeRecord>, live: &VisualState) -> Vec<Keyframe> {
    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            if record.is_incomplete() {
                tracing::warn!("Keyframe record {} is missing snapshots; using live state", index);
            }
            record.repair(live)
        })
        .collect()
}

/// Serialize records to RON
pub fn to_ron(records: &[KeyframeRecord]) -> Result<String> {
    Ok(ron::ser::to_string_pretty(records, ron::ser::PrettyConfig::default())?)
}

/// Parse records from RON
pub fn from_ron(s: &str) -> Result<Vec<KeyframeRecord>> {
    Ok(ron::from_str(s)?)
}

/// Serialize records to JSON
pub fn to_json(records: &[KeyframeRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Parse records from JSON
pub fn from_json(s: &str) -> Result<Vec<KeyframeRecord>> {
    Ok(serde_json::from_str(s)?)
}

/// Storage for the serialized keyframe list
pub trait PersistenceSink {
    /// Store the full keyframe list
    fn write(&mut self, records: &[KeyframeRecord]) -> Result<()>;

    /// Read the stored list; `None` when nothing has been stored yet
    fn read(&mut self) -> Result<Option<Vec<KeyframeRecord>>>;
}

/// Serialized file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileFormat {
    /// Rusty Object Notation
    #[default]
    Ron,
    /// JSON
    Json,
}

impl FileFormat {
    /// Guess the format from a path's extension
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::Json,
            _ => Self::Ron,
        }
    }
}

/// Keyframe list stored in a single file
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
    format: FileFormat,
}

impl FileSink {
    /// Create a sink, picking the format from the extension
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let format = FileFormat::from_path(&path);
        Self { path, format }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PersistenceSink for FileSink {
    fn write(&mut self, records: &[KeyframeRecord]) -> Result<()> {
        let content = match self.format {
            FileFormat::Ron => to_ron(records)?,
            FileFormat::Json => to_json(records)?,
        };
        std::fs::write(&self.path, content)?;
        tracing::debug!("Saved {} keyframes to {:?}", records.len(), self.path);
        Ok(())
    }

    fn read(&mut self) -> Result<Option<Vec<KeyframeRecord>>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)?;
        let records = match self.format {
            FileFormat::Ron => from_ron(&content)?,
            FileFormat::Json => from_json(&content)?,
        };
        Ok(Some(records))
    }
}

/// In-memory sink holding the last written RON text
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    /// Stored RON text
    pub content: Option<String>,
    /// Number of writes performed
    pub writes: usize,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }
}

impl PersistenceSink for MemorySink {
    fn write(&mut self, records: &[KeyframeRecord]) -> Result<()> {
        self.content = Some(to_ron(records)?);
        self.writes += 1;
        Ok(())
    }

    fn read(&mut self) -> Result<Option<Vec<KeyframeRecord>>> {
        self.content.as_deref().map(from_ron).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{Color, LightEntry, LightKind, ModelState};
    use uuid::Uuid;

    fn temp_path(extension: &str) -> PathBuf {
        std::env::temp_dir().join(format!("mfdvis_timeline_{}.{}", Uuid::new_v4(), extension))
    }

    fn live() -> VisualState {
        let mut state = VisualState::default();
        state.camera.fov = 70.0;
        state.lights.lights.push(LightEntry::spot([0.0, 0.0, 3.0], 0.5));
        state.models = ModelVisibilitySnapshot::new().with_model("chip", ModelState::shown("v2"));
        state
    }

    #[test]
    fn test_missing_snapshots_are_repaired_from_live_state() {
        let records = from_ron("[(name: \"Broken\", hold: 2.0)]").unwrap();
        let keyframes = repair_records(records, &live());

        assert_eq!(keyframes.len(), 1);
        assert_eq!(keyframes[0].name, "Broken");
        assert_eq!(keyframes[0].hold, 2.0);
        assert_eq!(keyframes[0].transition, DEFAULT_TRANSITION);
        assert_eq!(keyframes[0].camera.fov, 70.0);
        assert_eq!(keyframes[0].lights, live().lights);
        assert_eq!(keyframes[0].models, live().models);
    }

    #[test]
    fn test_repair_clamps_durations() {
        let records = from_json(r#"[{"hold": -5.0, "transition": -1.0}]"#).unwrap();
        let keyframes = repair_records(records, &live());
        assert_eq!(keyframes[0].hold, 0.0);
        assert_eq!(keyframes[0].transition, 0.0);
    }

    #[test]
    fn test_complete_records_reload_verbatim() {
        let kf = Keyframe::new(live())
            .with_name("Overview")
            .with_all_transitions(TransitionSpec::smooth());
        let records = vec![KeyframeRecord::from(&kf)];

        let ron_records = from_ron(&to_ron(&records).unwrap()).unwrap();
        assert_eq!(repair_records(ron_records, &VisualState::default()), vec![kf.clone()]);

        let json_records = from_json(&to_json(&records).unwrap()).unwrap();
        assert_eq!(repair_records(json_records, &VisualState::default()), vec![kf]);
    }

    #[test]
    fn test_memory_sink_round_trip() {
        let mut sink = MemorySink::new();
        assert!(sink.read().unwrap().is_none());

        let kf = Keyframe::new(live());
        sink.write(&[KeyframeRecord::from(&kf)]).unwrap();
        let records = sink.read().unwrap().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, Some(kf.id));
        assert_eq!(sink.writes, 1);
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(FileFormat::from_path(Path::new("timeline.json")), FileFormat::Json);
        assert_eq!(FileFormat::from_path(Path::new("timeline.ron")), FileFormat::Ron);
    }

    #[test]
    fn test_partial_camera_uses_field_defaults() {
        let records = from_ron(
            "[(name: \"A\", camera: Some((position: (1.0, 2.0, 3.0), target: (0.0, 0.0, 0.0))), hold: 1.0)]",
        )
        .unwrap();
        let keyframes = repair_records(records, &live());

        let camera = keyframes[0].camera;
        assert_eq!(camera.position, [1.0, 2.0, 3.0]);
        assert_eq!(camera.roll, 0.0);
        assert_eq!(camera.fov, 45.0);
        // Present snapshots are kept, so the live camera is not substituted
        assert_ne!(camera.fov, live().camera.fov);
    }

    #[test]
    fn test_partial_light_entries_use_field_defaults() {
        let records = from_json(
            r#"[{"lights": {"lights": [{"intensity": 0.5, "position": [0.0, 0.0, 5.0]}, {"kind": {"Spot": {"angle": 0.3}}}]}}]"#,
        )
        .unwrap();
        let keyframes = repair_records(records, &live());

        let lights = &keyframes[0].lights;
        assert_eq!(lights.ambient.intensity, 0.4);
        assert_eq!(lights.lights.len(), 2);
        assert_eq!(lights.lights[0].kind, LightKind::Directional);
        assert_eq!(lights.lights[0].color, Color::WHITE);
        assert_eq!(lights.lights[0].intensity, 0.5);

        let spot = lights.lights[1].kind.spot().copied().unwrap();
        assert_eq!(spot.angle, 0.3);
        assert_eq!(spot.decay, 2.0);
        assert_eq!(lights.lights[1].intensity, 1.0);
    }

    #[test]
    fn test_file_sink_round_trip() {
        let keyframes = vec![
            Keyframe::new(live()).with_name("Overview"),
            Keyframe::new(VisualState::default()).with_all_transitions(TransitionSpec::smooth()),
        ];
        let records: Vec<_> = keyframes.iter().map(KeyframeRecord::from).collect();

        for extension in ["ron", "json"] {
            let path = temp_path(extension);
            let mut sink = FileSink::new(&path);
            assert!(sink.read().unwrap().is_none());

            sink.write(&records).unwrap();
            let content = std::fs::read_to_string(sink.path()).unwrap();
            assert_eq!(from_json(&content).is_ok(), extension == "json");
            let reloaded = sink.read().unwrap().unwrap();
            std::fs::remove_file(&path).unwrap();

            assert_eq!(repair_records(reloaded, &VisualState::default()), keyframes);
        }
    }
}

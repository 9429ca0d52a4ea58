// SPDX-License-Identifier: MIT OR Apache-2.0
//! Captured visual state: camera pose, lighting and model visibility.
//!
//! Camera and light records fill missing fields with their defaults when
//! deserialized, so a hand-edited or older timeline file with a partial
//! snapshot still loads.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Camera projection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProjectionMode {
    /// Perspective projection
    #[default]
    Perspective,
    /// Orthographic projection
    Orthographic,
}

/// Camera interaction controls active when the keyframe was captured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InteractionMode {
    /// Orbit around the target
    #[default]
    Orbit,
    /// Free trackball rotation
    Trackball,
}

/// Camera pose
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSnapshot {
    /// Eye position in model space
    pub position: [f32; 3],
    /// Look-at target in model space
    pub target: [f32; 3],
    /// Roll around the view axis (degrees)
    pub roll: f32,
    /// Vertical field of view (degrees)
    pub fov: f32,
    /// Projection mode
    pub projection: ProjectionMode,
    /// Interaction mode tag
    pub interaction: InteractionMode,
}

impl Default for CameraSnapshot {
    fn default() -> Self {
        Self {
            position: [0.0, -10.0, 10.0],
            target: [0.0, 0.0, 0.0],
            roll: 0.0,
            fov: 45.0,
            projection: ProjectionMode::Perspective,
            interaction: InteractionMode::Orbit,
        }
    }
}

impl CameraSnapshot {
    /// Create a camera looking from `position` at `target`
    pub fn looking_at(position: [f32; 3], target: [f32; 3]) -> Self {
        Self {
            position,
            target,
            ..Self::default()
        }
    }
}

/// Linear RGB color with components in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color(pub [f32; 3]);

impl Color {
    /// White
    pub const WHITE: Color = Color([1.0, 1.0, 1.0]);

    /// Create from components
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self([r, g, b])
    }

    /// Create from 8-bit sRGB-style components
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self([r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0])
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Ambient light
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmbientLight {
    /// Color
    pub color: Color,
    /// Intensity
    pub intensity: f32,
}

impl Default for AmbientLight {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            intensity: 0.4,
        }
    }
}

/// Spot-light specific parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpotParams {
    /// Maximum range (0 = unlimited)
    pub distance: f32,
    /// Cone half-angle (radians)
    pub angle: f32,
    /// Penumbra fraction in `[0, 1]`
    pub penumbra: f32,
    /// Distance decay exponent
    pub decay: f32,
}

impl Default for SpotParams {
    fn default() -> Self {
        Self {
            distance: 0.0,
            angle: std::f32::consts::FRAC_PI_6,
            penumbra: 0.1,
            decay: 2.0,
        }
    }
}

/// Type of a scene light
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum LightKind {
    /// Directional light
    #[default]
    Directional,
    /// Spot light
    Spot(SpotParams),
}

impl LightKind {
    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Directional => "Directional",
            Self::Spot(_) => "Spot",
        }
    }

    /// Spot parameters, if this is a spot light
    pub fn spot(&self) -> Option<&SpotParams> {
        match self {
            Self::Spot(params) => Some(params),
            Self::Directional => None,
        }
    }
}

/// A directional or spot light
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightEntry {
    /// Light type
    pub kind: LightKind,
    /// Color
    pub color: Color,
    /// Intensity
    pub intensity: f32,
    /// Position relative to the model center
    pub position: [f32; 3],
    /// Target relative to the model center
    pub target: [f32; 3],
}

impl Default for LightEntry {
    fn default() -> Self {
        Self::directional([10.0, -10.0, 20.0], 1.0)
    }
}

impl LightEntry {
    /// Create a white directional light
    pub fn directional(position: [f32; 3], intensity: f32) -> Self {
        Self {
            kind: LightKind::Directional,
            color: Color::WHITE,
            intensity,
            position,
            target: [0.0, 0.0, 0.0],
        }
    }

    /// Create a white spot light with default cone parameters
    pub fn spot(position: [f32; 3], intensity: f32) -> Self {
        Self {
            kind: LightKind::Spot(SpotParams::default()),
            ..Self::directional(position, intensity)
        }
    }

    /// Set the color
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}

/// Lighting configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightSnapshot {
    /// Ambient light
    #[serde(default)]
    pub ambient: AmbientLight,
    /// Directional and spot lights
    #[serde(default)]
    pub lights: Vec<LightEntry>,
}

impl Default for LightSnapshot {
    fn default() -> Self {
        Self {
            ambient: AmbientLight::default(),
            lights: vec![LightEntry::default()],
        }
    }
}

/// Model identity
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelId(pub String);

impl From<&str> for ModelId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl std::fmt::Display for ModelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Model version identity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct VersionId(pub String);

impl From<&str> for VersionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Visibility and version of one model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelState {
    /// Whether the model is shown
    pub visible: bool,
    /// Selected version
    #[serde(default)]
    pub selected_version: VersionId,
}

impl ModelState {
    /// Visible model with the given version
    pub fn shown(version: impl Into<VersionId>) -> Self {
        Self {
            visible: true,
            selected_version: version.into(),
        }
    }

    /// Hidden model with the given version
    pub fn hidden(version: impl Into<VersionId>) -> Self {
        Self {
            visible: false,
            selected_version: version.into(),
        }
    }
}

/// Visibility of every tracked model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct ModelVisibilitySnapshot {
    /// Per-model state, in capture order
    pub models: IndexMap<ModelId, ModelState>,
}

impl ModelVisibilitySnapshot {
    /// Create an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a model entry
    pub fn with_model(mut self, id: impl Into<ModelId>, state: ModelState) -> Self {
        self.models.insert(id.into(), state);
        self
    }

    /// Whether the model is visible (absent models are hidden)
    pub fn is_visible(&self, id: &ModelId) -> bool {
        self.models.get(id).is_some_and(|m| m.visible)
    }

    /// Get a model entry
    pub fn get(&self, id: &ModelId) -> Option<&ModelState> {
        self.models.get(id)
    }
}

/// Full visual state captured by a keyframe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct VisualState {
    /// Camera pose
    pub camera: CameraSnapshot,
    /// Lighting
    pub lights: LightSnapshot,
    /// Model visibility
    pub models: ModelVisibilitySnapshot,
}

impl VisualState {
    /// Bundle the three snapshots
    pub fn new(
        camera: CameraSnapshot,
        lights: LightSnapshot,
        models: ModelVisibilitySnapshot,
    ) -> Self {
        Self {
            camera,
            lights,
            models,
        }
    }
}

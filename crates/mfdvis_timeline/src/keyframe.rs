// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyframe definitions for the timeline.

use crate::curve::TransitionSpec;
use crate::interpolation::Interpolation;
use crate::snapshot::{CameraSnapshot, LightSnapshot, ModelVisibilitySnapshot, VisualState};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default hold duration in seconds
pub const DEFAULT_HOLD: f32 = 1.0;

/// Default transition duration in seconds
pub const DEFAULT_TRANSITION: f32 = 1.0;

/// Unique identifier for a keyframe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyframeId(pub Uuid);

impl KeyframeId {
    /// Create a new random keyframe ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for KeyframeId {
    fn default() -> Self {
        Self::new()
    }
}

/// Property domains animated between keyframes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimatedProperty {
    /// Camera pose
    Camera,
    /// Ambient and scene lights
    Lights,
    /// Model visibility and versions
    Models,
}

impl AnimatedProperty {
    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Camera => "Camera",
            Self::Lights => "Lights",
            Self::Models => "Models",
        }
    }

    /// Get all properties
    pub fn all() -> &'static [AnimatedProperty] {
        &[Self::Camera, Self::Lights, Self::Models]
    }
}

/// A timeline keyframe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Unique keyframe ID
    pub id: KeyframeId,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Camera pose
    pub camera: CameraSnapshot,
    /// Lighting
    pub lights: LightSnapshot,
    /// Model visibility
    pub models: ModelVisibilitySnapshot,
    /// Seconds to rest on this keyframe
    pub hold: f32,
    /// Seconds to transition to the next keyframe
    pub transition: f32,
    /// Per-property transition into the next keyframe
    #[serde(default)]
    pub transitions: IndexMap<AnimatedProperty, TransitionSpec>,
}

impl Keyframe {
    /// Create a keyframe from captured state with default durations
    pub fn new(state: VisualState) -> Self {
        Self {
            id: KeyframeId::new(),
            name: String::new(),
            camera: state.camera,
            lights: state.lights,
            models: state.models,
            hold: DEFAULT_HOLD,
            transition: DEFAULT_TRANSITION,
            transitions: IndexMap::new(),
        }
    }

    /// Set the name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set hold and transition durations
    pub fn with_durations(mut self, hold: f32, transition: f32) -> Self {
        self.hold = hold;
        self.transition = transition;
        self.normalize();
        self
    }

    /// Set the transition used for one property
    pub fn with_transition(mut self, property: AnimatedProperty, spec: TransitionSpec) -> Self {
        self.transitions.insert(property, spec);
        self.normalize();
        self
    }

    /// Use the same transition for every property
    pub fn with_all_transitions(mut self, spec: TransitionSpec) -> Self {
        for property in AnimatedProperty::all() {
            self.transitions.insert(*property, spec);
        }
        self.normalize();
        self
    }

    /// Transition for a property, or the default when none is set
    pub fn transition_for(&self, property: AnimatedProperty) -> TransitionSpec {
        self.transitions.get(&property).copied().unwrap_or_default()
    }

    /// Captured visual state
    pub fn state(&self) -> VisualState {
        VisualState {
            camera: self.camera,
            lights: self.lights.clone(),
            models: self.models.clone(),
        }
    }

    /// Replace the captured visual state
    pub fn set_state(&mut self, state: VisualState) {
        self.camera = state.camera;
        self.lights = state.lights;
        self.models = state.models;
    }

    /// Clamp durations and curve points into their valid ranges
    pub fn normalize(&mut self) {
        self.hold = Interpolation::duration(self.hold);
        self.transition = Interpolation::duration(self.transition);
        for spec in self.transitions.values_mut() {
            spec.normalize();
        }
    }
}

/// Partial update applied by [`crate::store::KeyframeStore::update`]
#[derive(Debug, Clone, Default)]
pub struct KeyframePatch {
    /// New name
    pub name: Option<String>,
    /// New camera pose
    pub camera: Option<CameraSnapshot>,
    /// New lighting
    pub lights: Option<LightSnapshot>,
    /// New model visibility
    pub models: Option<ModelVisibilitySnapshot>,
    /// New hold duration
    pub hold: Option<f32>,
    /// New transition duration
    pub transition: Option<f32>,
    /// Transition specs to set
    pub transitions: Vec<(AnimatedProperty, TransitionSpec)>,
}

impl KeyframePatch {
    /// Create an empty patch
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the hold duration
    pub fn hold(mut self, seconds: f32) -> Self {
        self.hold = Some(seconds);
        self
    }

    /// Set the transition duration
    pub fn transition(mut self, seconds: f32) -> Self {
        self.transition = Some(seconds);
        self
    }

    /// Set the camera pose
    pub fn camera(mut self, camera: CameraSnapshot) -> Self {
        self.camera = Some(camera);
        self
    }

    /// Set the lighting
    pub fn lights(mut self, lights: LightSnapshot) -> Self {
        self.lights = Some(lights);
        self
    }

    /// Set the model visibility
    pub fn models(mut self, models: ModelVisibilitySnapshot) -> Self {
        self.models = Some(models);
        self
    }

    /// Set the name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the transition spec for a property
    pub fn transition_spec(mut self, property: AnimatedProperty, spec: TransitionSpec) -> Self {
        self.transitions.push((property, spec));
        self
    }

    /// Apply this patch to a keyframe
    pub(crate) fn apply_to(self, keyframe: &mut Keyframe) {
        if let Some(name) = self.name {
            keyframe.name = name;
        }
        if let Some(camera) = self.camera {
            keyframe.camera = camera;
        }
        if let Some(lights) = self.lights {
            keyframe.lights = lights;
        }
        if let Some(models) = self.models {
            keyframe.models = models;
        }
        if let Some(hold) = self.hold {
            keyframe.hold = hold;
        }
        if let Some(transition) = self.transition {
            keyframe.transition = transition;
        }
        for (property, spec) in self.transitions {
            keyframe.transitions.insert(property, spec);
        }
        keyframe.normalize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::TransitionKind;

    #[test]
    fn test_keyframe_defaults() {
        let kf = Keyframe::new(VisualState::default());
        assert_eq!(kf.hold, DEFAULT_HOLD);
        assert_eq!(kf.transition, DEFAULT_TRANSITION);
        assert_eq!(kf.transition_for(AnimatedProperty::Camera), TransitionSpec::linear());
    }

    #[test]
    fn test_durations_are_clamped() {
        let kf = Keyframe::new(VisualState::default()).with_durations(-2.0, f32::NAN);
        assert_eq!(kf.hold, 0.0);
        assert_eq!(kf.transition, 0.0);
    }

    #[test]
    fn test_patch_applies_only_set_fields() {
        let mut kf = Keyframe::new(VisualState::default()).with_name("Overview");
        KeyframePatch::new()
            .hold(3.0)
            .transition_spec(AnimatedProperty::Lights, TransitionSpec::new(TransitionKind::InstantAtEnd))
            .apply_to(&mut kf);

        assert_eq!(kf.name, "Overview");
        assert_eq!(kf.hold, 3.0);
        assert_eq!(kf.transition, DEFAULT_TRANSITION);
        assert_eq!(kf.transition_for(AnimatedProperty::Lights).kind, TransitionKind::InstantAtEnd);
    }

    #[test]
    fn test_keyframe_serialization() {
        let kf = Keyframe::new(VisualState::default())
            .with_name("Close-up")
            .with_all_transitions(TransitionSpec::smooth());
        let ron_str = ron::ser::to_string_pretty(&kf, ron::ser::PrettyConfig::default()).unwrap();
        let loaded: Keyframe = ron::from_str(&ron_str).unwrap();
        assert_eq!(loaded, kf);
    }
}

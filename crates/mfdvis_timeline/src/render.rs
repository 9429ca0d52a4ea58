// SPDX-License-Identifier: MIT OR Apache-2.0
//! Render target boundary.
//!
//! The timeline never draws anything itself. It pushes resolved state into a
//! [`RenderTarget`] and, during export, asks it for the rendered frame.

use crate::snapshot::{AmbientLight, CameraSnapshot, LightEntry, ModelId, VersionId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Scene the timeline drives
pub trait RenderTarget {
    /// Rendered image handed to frame sinks during export
    type Frame;

    /// Set the camera pose
    fn set_camera(&mut self, camera: &CameraSnapshot);

    /// Replace the ambient light and the active light list
    fn set_lights(&mut self, ambient: &AmbientLight, lights: &[LightEntry]);

    /// Set a model's opacity; zero means the model may be skipped
    fn set_model_opacity(&mut self, model: &ModelId, opacity: f32);

    /// Select the version shown for a model
    fn set_model_version(&mut self, model: &ModelId, version: &VersionId);

    /// Render the current state
    fn render_frame(&mut self) -> Self::Frame;
}

/// Everything a [`RecordingTarget`] has been told
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AppliedState {
    /// Last camera pose
    pub camera: Option<CameraSnapshot>,
    /// Last ambient light
    pub ambient: Option<AmbientLight>,
    /// Last light list
    pub lights: Vec<LightEntry>,
    /// Last opacity per model
    pub opacities: IndexMap<ModelId, f32>,
    /// Last version per model
    pub versions: IndexMap<ModelId, VersionId>,
}

/// Render target that records applied state; its frames are state copies
#[derive(Debug, Clone, Default)]
pub struct RecordingTarget {
    state: AppliedState,
    /// Number of frames rendered
    pub frames_rendered: u64,
}

impl RecordingTarget {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// State applied so far
    pub fn applied(&self) -> &AppliedState {
        &self.state
    }
}

impl RenderTarget for RecordingTarget {
    type Frame = AppliedState;

    fn set_camera(&mut self, camera: &CameraSnapshot) {
        self.state.camera = Some(*camera);
    }

    fn set_lights(&mut self, ambient: &AmbientLight, lights: &[LightEntry]) {
        self.state.ambient = Some(*ambient);
        self.state.lights = lights.to_vec();
    }

    fn set_model_opacity(&mut self, model: &ModelId, opacity: f32) {
        self.state.opacities.insert(model.clone(), opacity);
    }

    fn set_model_version(&mut self, model: &ModelId, version: &VersionId) {
        self.state.versions.insert(model.clone(), version.clone());
    }

    fn render_frame(&mut self) -> Self::Frame {
        self.frames_rendered += 1;
        self.state.clone()
    }
}

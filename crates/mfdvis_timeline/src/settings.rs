// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline settings.
//!
//! Defaults used when capturing new keyframes and exporting, stored as RON
//! next to the timeline file.

use crate::curve::TransitionKind;
use crate::error::Result;
use crate::interpolation::Interpolation;
use crate::keyframe::{DEFAULT_HOLD, DEFAULT_TRANSITION};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings file name
pub const SETTINGS_FILE_NAME: &str = "timeline.settings.ron";

/// Highest export frame rate accepted
pub const MAX_EXPORT_FPS: u32 = 240;

/// Timeline settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineSettings {
    /// Hold duration for newly captured keyframes (seconds)
    pub default_hold: f32,
    /// Transition duration for newly captured keyframes (seconds)
    pub default_transition: f32,
    /// Transition kind for newly captured keyframes
    pub default_transition_kind: TransitionKind,
    /// Export frame rate
    pub export_fps: u32,
    /// Write the keyframe list to the persistence sink after every edit
    pub autosave: bool,
}

impl Default for TimelineSettings {
    fn default() -> Self {
        Self {
            default_hold: DEFAULT_HOLD,
            default_transition: DEFAULT_TRANSITION,
            default_transition_kind: TransitionKind::Linear,
            export_fps: 30,
            autosave: true,
        }
    }
}

impl TimelineSettings {
    /// Clamp every value into its valid range
    pub fn sanitized(mut self) -> Self {
        self.default_hold = Interpolation::duration(self.default_hold);
        self.default_transition = Interpolation::duration(self.default_transition);
        self.export_fps = self.export_fps.clamp(1, MAX_EXPORT_FPS);
        self
    }

    /// Parse settings from RON
    pub fn from_ron(s: &str) -> Result<Self> {
        let settings: Self = ron::from_str(s)?;
        Ok(settings.sanitized())
    }

    /// Serialize settings to RON
    pub fn to_ron(&self) -> Result<String> {
        Ok(ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?)
    }

    /// Load settings from a file, falling back to defaults when it is missing
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No settings at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let settings = Self::from_ron(&content)?;
        tracing::info!("Loaded timeline settings from {:?}", path);
        Ok(settings)
    }

    /// Save settings to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_ron()?)?;
        Ok(())
    }
}

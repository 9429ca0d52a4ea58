// SPDX-License-Identifier: MIT OR Apache-2.0
//! Model visibility crossfades.

use crate::snapshot::{ModelId, ModelVisibilitySnapshot, VersionId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Resolved appearance of one model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelAppearance {
    /// Opacity in `[0, 1]`; zero means the model can be skipped entirely
    pub opacity: f32,
    /// Version to show, if any snapshot names one
    pub version: Option<VersionId>,
}

impl ModelAppearance {
    /// Whether the model contributes to the frame
    pub fn is_rendered(&self) -> bool {
        self.opacity > 0.0
    }
}

/// Appearance of every tracked model at one instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct ModelVisibilityFrame {
    /// Per-model appearance
    pub models: IndexMap<ModelId, ModelAppearance>,
}

impl ModelVisibilityFrame {
    /// Exact state of a single snapshot
    pub fn from_snapshot(snapshot: &ModelVisibilitySnapshot) -> Self {
        blend_visibility(snapshot, snapshot, 0.0)
    }

    /// Get a model's appearance
    pub fn get(&self, id: &ModelId) -> Option<&ModelAppearance> {
        self.models.get(id)
    }

    /// Opacity of a model (untracked models are transparent)
    pub fn opacity(&self, id: &ModelId) -> f32 {
        self.models.get(id).map_or(0.0, |m| m.opacity)
    }

    /// Add models absent from this frame as fully transparent, showing the
    /// given fallback version
    pub fn include_hidden(&mut self, fallback: &IndexMap<ModelId, VersionId>) {
        for (id, version) in fallback {
            self.models.entry(id.clone()).or_insert_with(|| ModelAppearance {
                opacity: 0.0,
                version: Some(version.clone()),
            });
        }
    }

    /// Number of models that need rendering
    pub fn rendered_count(&self) -> usize {
        self.models.values().filter(|m| m.is_rendered()).count()
    }
}

/// Blend model visibility between two snapshots.
///
/// Every model named by either snapshot is tracked; a model missing from a
/// snapshot counts as hidden there. Models visible on both sides stay opaque,
/// hidden on both sides stay transparent, and the rest crossfade with `t`.
/// At `t <= 0` the start versions apply and at `t >= 1` the end versions, so
/// nothing blended survives past a segment boundary.
pub fn blend_visibility(
    start: &ModelVisibilitySnapshot,
    end: &ModelVisibilitySnapshot,
    t: f32,
) -> ModelVisibilityFrame {
    let t = t.clamp(0.0, 1.0);
    let mut models = IndexMap::new();

    let ids = start.models.keys().chain(end.models.keys());
    for id in ids {
        if models.contains_key(id) {
            continue;
        }

        let before = start.get(id);
        let after = end.get(id);
        let was_visible = start.is_visible(id);
        let is_visible = end.is_visible(id);

        let opacity = match (was_visible, is_visible) {
            (true, true) => 1.0,
            (false, false) => 0.0,
            (false, true) => t,
            (true, false) => 1.0 - t,
        };

        // Appearing models already show the version they will end on
        let prefer_end = t >= 1.0 || (!was_visible && is_visible);
        let version = if prefer_end {
            after.or(before)
        } else {
            before.or(after)
        }
        .map(|m| m.selected_version.clone());

        models.insert(id.clone(), ModelAppearance { opacity, version });
    }

    ModelVisibilityFrame { models }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::ModelState;

    fn id(name: &str) -> ModelId {
        ModelId::from(name)
    }

    fn snapshots() -> (ModelVisibilitySnapshot, ModelVisibilitySnapshot) {
        let start = ModelVisibilitySnapshot::new()
            .with_model("chip", ModelState::shown("v1"))
            .with_model("valve", ModelState::shown("v1"))
            .with_model("mold", ModelState::hidden("v1"))
            .with_model("lid", ModelState::hidden("v1"));
        let end = ModelVisibilitySnapshot::new()
            .with_model("chip", ModelState::shown("v2"))
            .with_model("valve", ModelState::hidden("v1"))
            .with_model("mold", ModelState::shown("v3"))
            .with_model("lid", ModelState::hidden("v1"));
        (start, end)
    }

    #[test]
    fn test_crossfade_opacities() {
        let (start, end) = snapshots();
        let frame = blend_visibility(&start, &end, 0.25);

        assert_eq!(frame.opacity(&id("chip")), 1.0);
        assert_eq!(frame.opacity(&id("valve")), 0.75);
        assert_eq!(frame.opacity(&id("mold")), 0.25);
        assert_eq!(frame.opacity(&id("lid")), 0.0);
        assert!(!frame.get(&id("lid")).is_some_and(ModelAppearance::is_rendered));
        assert_eq!(frame.rendered_count(), 3);
    }

    #[test]
    fn test_versions_snap_at_boundaries() {
        let (start, end) = snapshots();

        let first = blend_visibility(&start, &end, 0.0);
        assert_eq!(first.get(&id("chip")).and_then(|m| m.version.clone()), Some("v1".into()));

        let mid = blend_visibility(&start, &end, 0.5);
        assert_eq!(mid.get(&id("chip")).and_then(|m| m.version.clone()), Some("v1".into()));
        assert_eq!(mid.get(&id("mold")).and_then(|m| m.version.clone()), Some("v3".into()));

        let last = blend_visibility(&start, &end, 1.0);
        assert_eq!(last.get(&id("chip")).and_then(|m| m.version.clone()), Some("v2".into()));
        assert_eq!(last.opacity(&id("valve")), 0.0);
        assert_eq!(last.opacity(&id("mold")), 1.0);
    }

    #[test]
    fn test_missing_model_counts_as_hidden() {
        let start = ModelVisibilitySnapshot::new();
        let end = ModelVisibilitySnapshot::new().with_model("chip", ModelState::shown("v1"));
        let frame = blend_visibility(&start, &end, 0.4);
        assert!((frame.opacity(&id("chip")) - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_include_hidden_adds_transparent_entries() {
        let (start, _) = snapshots();
        let mut frame = ModelVisibilityFrame::from_snapshot(&start);
        let extra = id("gasket");
        let fallback: IndexMap<ModelId, VersionId> = [
            (extra.clone(), VersionId::from("v4")),
            (id("chip"), VersionId::from("v9")),
        ]
        .into_iter()
        .collect();
        frame.include_hidden(&fallback);
        assert_eq!(frame.opacity(&extra), 0.0);
        assert_eq!(frame.get(&extra).and_then(|m| m.version.clone()), Some("v4".into()));
        assert_eq!(frame.opacity(&id("chip")), 1.0);
        assert_eq!(frame.get(&id("chip")).and_then(|m| m.version.clone()), Some("v1".into()));
        assert_eq!(frame.models.len(), 5);
    }
}

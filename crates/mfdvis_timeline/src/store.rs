// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyframe store.
//!
//! The store is the single owner of the keyframe list. Every mutation goes
//! through it and ends by re-enforcing the list invariants: durations are
//! non-negative, curves are valid, and the last keyframe never transitions.

use crate::curve::TransitionSpec;
use crate::error::{Result, TimelineError};
use crate::keyframe::{AnimatedProperty, Keyframe, KeyframeId, KeyframePatch};
use crate::persistence::{repair_records, KeyframeRecord, PersistenceSink};
use crate::scheduler::total_duration;
use crate::settings::TimelineSettings;
use crate::snapshot::{LightEntry, VisualState};
use serde::{Deserialize, Serialize};

/// Direction for [`KeyframeStore::move_keyframe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    /// Towards index 0
    Earlier,
    /// Towards the end
    Later,
}

/// Row of the keyframe list shown by the UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyframeListing {
    /// Position in the timeline
    pub index: usize,
    /// Keyframe ID
    pub id: KeyframeId,
    /// Display name
    pub name: String,
    /// Hold duration
    pub hold: f32,
    /// Transition duration
    pub transition: f32,
    /// Whether this keyframe is being edited or played
    pub active: bool,
}

/// Open edit session on one keyframe
#[derive(Debug, Clone)]
struct EditSession {
    index: usize,
    pre_edit: VisualState,
}

/// Ordered, mutable keyframe list
#[derive(Debug, Clone, Default)]
pub struct KeyframeStore {
    keyframes: Vec<Keyframe>,
    settings: TimelineSettings,
    edit: Option<EditSession>,
}

impl KeyframeStore {
    /// Create an empty store with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store with the given settings
    pub fn with_settings(settings: TimelineSettings) -> Self {
        Self {
            settings: settings.sanitized(),
            ..Self::default()
        }
    }

    /// Settings used for new keyframes
    pub fn settings(&self) -> &TimelineSettings {
        &self.settings
    }

    /// All keyframes in order
    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    /// Get a keyframe
    pub fn get(&self, index: usize) -> Option<&Keyframe> {
        self.keyframes.get(index)
    }

    /// Index of the keyframe with the given ID
    pub fn index_of(&self, id: KeyframeId) -> Option<usize> {
        self.keyframes.iter().position(|kf| kf.id == id)
    }

    /// Number of keyframes
    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    /// Whether the timeline is empty
    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    /// Timeline length in seconds
    pub fn total_duration(&self) -> f32 {
        total_duration(&self.keyframes)
    }

    /// Append a keyframe captured from `state`; returns its index
    pub fn append(&mut self, state: VisualState) -> Result<usize> {
        self.ensure_no_edit()?;

        let spec = TransitionSpec::new(self.settings.default_transition_kind);
        let keyframe = Keyframe::new(state)
            .with_name(format!("Keyframe {}", self.keyframes.len() + 1))
            .with_durations(self.settings.default_hold, self.settings.default_transition)
            .with_all_transitions(spec);

        // The previous last keyframe starts transitioning again
        if let Some(previous) = self.keyframes.last_mut() {
            if previous.transition <= 0.0 {
                previous.transition = self.settings.default_transition;
            }
        }

        self.keyframes.push(keyframe);
        self.enforce_invariants();

        let index = self.keyframes.len() - 1;
        tracing::debug!("Appended keyframe {}", index);
        Ok(index)
    }

    /// Apply a partial update to a keyframe
    pub fn update(&mut self, index: usize, patch: KeyframePatch) -> Result<()> {
        self.check_index(index)?;

        if let Some(lights) = &patch.lights {
            self.check_light_count(index, lights.lights.len())?;
        }

        patch.apply_to(&mut self.keyframes[index]);
        self.enforce_invariants();
        tracing::debug!("Updated keyframe {}", index);
        Ok(())
    }

    /// Set the transition for one property of a keyframe
    pub fn set_transition(
        &mut self,
        index: usize,
        property: AnimatedProperty,
        spec: TransitionSpec,
    ) -> Result<()> {
        self.update(index, KeyframePatch::new().transition_spec(property, spec))
    }

    /// Rename a keyframe
    pub fn rename(&mut self, index: usize, name: impl Into<String>) -> Result<()> {
        self.update(index, KeyframePatch::new().name(name))
    }

    /// Swap a keyframe with its neighbour; returns its new index
    pub fn move_keyframe(&mut self, index: usize, direction: MoveDirection) -> Result<usize> {
        self.ensure_no_edit()?;
        self.check_index(index)?;

        let target = match direction {
            MoveDirection::Earlier => index.checked_sub(1),
            MoveDirection::Later => Some(index + 1).filter(|i| *i < self.keyframes.len()),
        };
        let Some(target) = target else {
            return Ok(index);
        };

        // A keyframe leaving the last slot needs a transition again
        let last = self.keyframes.len() - 1;
        if index == last || target == last {
            let moved = &mut self.keyframes[last];
            if moved.transition <= 0.0 {
                moved.transition = self.settings.default_transition;
            }
        }

        self.keyframes.swap(index, target);
        self.enforce_invariants();
        tracing::debug!("Moved keyframe {} to {}", index, target);
        Ok(target)
    }

    /// Remove a keyframe
    pub fn remove(&mut self, index: usize) -> Result<Keyframe> {
        self.ensure_no_edit()?;
        self.check_index(index)?;

        let removed = self.keyframes.remove(index);
        self.enforce_invariants();
        tracing::debug!("Removed keyframe {}", index);
        Ok(removed)
    }

    /// Insert a copy of a keyframe right after it; returns the copy's index
    pub fn duplicate(&mut self, index: usize) -> Result<usize> {
        self.ensure_no_edit()?;
        self.check_index(index)?;

        let mut copy = self.keyframes[index].clone();
        copy.id = KeyframeId::new();
        copy.name = format!("{} (copy)", copy.name);
        if copy.transition <= 0.0 {
            copy.transition = self.settings.default_transition;
        }

        let original = &mut self.keyframes[index];
        if original.transition <= 0.0 {
            original.transition = self.settings.default_transition;
        }

        self.keyframes.insert(index + 1, copy);
        self.enforce_invariants();
        Ok(index + 1)
    }

    /// Whether the light list of the keyframe being edited may change length.
    ///
    /// Only a keyframe without an incoming transition can be restructured,
    /// which is keyframe 0.
    pub fn is_structure_editable(&self) -> bool {
        self.edit
            .as_ref()
            .is_some_and(|session| Self::structure_editable_at(session.index))
    }

    /// Whether the light list of `index` may change length
    pub fn structure_editable_at(index: usize) -> bool {
        index == 0
    }

    /// Add a light to a keyframe; returns its slot
    pub fn add_light(&mut self, index: usize, light: LightEntry) -> Result<usize> {
        self.ensure_no_edit()?;
        self.check_index(index)?;
        if !Self::structure_editable_at(index) {
            return Err(TimelineError::StructureLocked(index));
        }

        self.keyframes[index].lights.lights.push(light);
        self.enforce_invariants();

        let slot = self.keyframes[index].lights.lights.len() - 1;
        tracing::debug!("Added light {} to keyframe {}", slot, index);
        Ok(slot)
    }

    /// Remove a light from a keyframe
    pub fn remove_light(&mut self, index: usize, slot: usize) -> Result<LightEntry> {
        self.ensure_no_edit()?;
        self.check_index(index)?;
        if !Self::structure_editable_at(index) {
            return Err(TimelineError::StructureLocked(index));
        }

        let lights = &mut self.keyframes[index].lights.lights;
        if slot >= lights.len() {
            return Err(TimelineError::IndexOutOfRange {
                index: slot,
                len: lights.len(),
            });
        }
        let removed = lights.remove(slot);
        self.enforce_invariants();
        tracing::debug!("Removed light {} from keyframe {}", slot, index);
        Ok(removed)
    }

    /// Enter edit mode on a keyframe.
    ///
    /// `live` is the visual state before editing, restored by
    /// [`cancel`](Self::cancel). Returns the keyframe's state for editing.
    pub fn select(&mut self, index: usize, live: VisualState) -> Result<VisualState> {
        self.ensure_no_edit()?;
        self.check_index(index)?;

        self.edit = Some(EditSession {
            index,
            pre_edit: live,
        });
        tracing::debug!("Editing keyframe {}", index);
        Ok(self.keyframes[index].state())
    }

    /// Index of the keyframe being edited
    pub fn editing(&self) -> Option<usize> {
        self.edit.as_ref().map(|session| session.index)
    }

    /// Write the edited state back into the keyframe and close the session
    pub fn commit(&mut self, state: VisualState) -> Result<usize> {
        let index = self.editing().ok_or(TimelineError::NoEditSession)?;
        self.check_light_count(index, state.lights.lights.len())?;

        self.keyframes[index].set_state(state);
        self.edit = None;
        self.enforce_invariants();
        tracing::debug!("Committed edit of keyframe {}", index);
        Ok(index)
    }

    /// Close the session without changes; returns the pre-edit state
    pub fn cancel(&mut self) -> Result<VisualState> {
        let session = self.edit.take().ok_or(TimelineError::NoEditSession)?;
        tracing::debug!("Cancelled edit of keyframe {}", session.index);
        Ok(session.pre_edit)
    }

    /// Rows for the keyframe list; `active` marks one row
    pub fn listing(&self, active: Option<usize>) -> Vec<KeyframeListing> {
        let active = self.editing().or(active);
        self.keyframes
            .iter()
            .enumerate()
            .map(|(index, kf)| KeyframeListing {
                index,
                id: kf.id,
                name: kf.name.clone(),
                hold: kf.hold,
                transition: kf.transition,
                active: active == Some(index),
            })
            .collect()
    }

    /// Persisted form of the keyframe list
    pub fn to_records(&self) -> Vec<KeyframeRecord> {
        self.keyframes.iter().map(KeyframeRecord::from).collect()
    }

    /// Write the keyframe list to `sink`
    pub fn save(&self, sink: &mut dyn PersistenceSink) -> Result<()> {
        sink.write(&self.to_records())
    }

    /// Replace the keyframe list with the contents of `sink`.
    ///
    /// Incomplete records are repaired from `live`. Returns the number of
    /// keyframes loaded.
    pub fn load(&mut self, sink: &mut dyn PersistenceSink, live: &VisualState) -> Result<usize> {
        self.ensure_no_edit()?;

        let records = sink.read()?.unwrap_or_default();
        self.keyframes = repair_records(records, live);
        self.enforce_invariants();
        tracing::info!("Loaded {} keyframes", self.keyframes.len());
        Ok(self.keyframes.len())
    }

    fn enforce_invariants(&mut self) {
        for kf in &mut self.keyframes {
            kf.normalize();
        }
        if let Some(last) = self.keyframes.last_mut() {
            last.transition = 0.0;
        }
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.keyframes.len() {
            Ok(())
        } else {
            Err(TimelineError::IndexOutOfRange {
                index,
                len: self.keyframes.len(),
            })
        }
    }

    fn check_light_count(&self, index: usize, count: usize) -> Result<()> {
        let current = self.keyframes[index].lights.lights.len();
        if count != current && !Self::structure_editable_at(index) {
            tracing::warn!(
                "Rejected light count change on keyframe {} ({} -> {})",
                index,
                current,
                count
            );
            return Err(TimelineError::StructureLocked(index));
        }
        Ok(())
    }

    fn ensure_no_edit(&self) -> Result<()> {
        match self.editing() {
            Some(index) => Err(TimelineError::EditSessionActive(index)),
            None => Ok(()),
        }
    }
}

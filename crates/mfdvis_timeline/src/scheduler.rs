// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline scheduler.
//!
//! [`sample`] is the pure core: given the keyframes and a time it resolves the
//! full visual state. [`TimelineScheduler`] is the apply step on top of it; it
//! owns the active light list and pushes resolved frames into a render target.
//! Live playback and export both go through the same two calls, so they agree
//! on every instant.

use crate::blend::{blend_camera, blend_lights, blend_visibility, ModelVisibilityFrame};
use crate::curve::ease;
use crate::keyframe::{AnimatedProperty, Keyframe};
use crate::render::RenderTarget;
use crate::snapshot::{CameraSnapshot, LightEntry, LightSnapshot, ModelId, VersionId, VisualState};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Where on the timeline a time falls
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SamplePosition {
    /// Resting on a keyframe
    Hold {
        /// Keyframe index
        index: usize,
    },
    /// Transitioning from `from` to `from + 1`
    Transition {
        /// Index of the keyframe being left
        from: usize,
        /// Raw progress through the transition window
        progress: f32,
    },
}

impl SamplePosition {
    /// Keyframe the position belongs to
    pub fn keyframe_index(&self) -> usize {
        match *self {
            Self::Hold { index } => index,
            Self::Transition { from, .. } => from,
        }
    }
}

/// Fully resolved visual state at one instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualFrame {
    /// Clamped sample time
    pub time: f32,
    /// Timeline position
    pub position: SamplePosition,
    /// Camera pose
    pub camera: CameraSnapshot,
    /// Lighting
    pub lights: LightSnapshot,
    /// Model appearance
    pub models: ModelVisibilityFrame,
}

/// Total timeline length: every hold plus every transition but the last
pub fn total_duration(keyframes: &[Keyframe]) -> f32 {
    let last = keyframes.len().saturating_sub(1);
    keyframes.iter().enumerate().fold(0.0, |end, (index, kf)| {
        let end = end + kf.hold;
        if index == last {
            end
        } else {
            end + kf.transition
        }
    })
}

/// Clamp a time into `[0, duration]`; NaN maps to 0
pub fn clamp_time(keyframes: &[Keyframe], time: f32) -> f32 {
    if time.is_nan() {
        return 0.0;
    }
    time.clamp(0.0, total_duration(keyframes))
}

/// Find the hold or transition window containing `time`
pub fn locate(keyframes: &[Keyframe], time: f32) -> Option<SamplePosition> {
    let last = keyframes.len().checked_sub(1)?;
    let time = clamp_time(keyframes, time);
    let mut window_start = 0.0;

    for (index, kf) in keyframes.iter().enumerate() {
        let hold_end = window_start + kf.hold;
        if index == last || time < hold_end {
            return Some(SamplePosition::Hold { index });
        }

        let transition_end = hold_end + kf.transition;
        if time < transition_end {
            let progress = if kf.transition > 0.0 {
                (time - hold_end) / kf.transition
            } else {
                1.0
            };
            return Some(SamplePosition::Transition {
                from: index,
                progress: progress.clamp(0.0, 1.0),
            });
        }

        window_start = transition_end;
    }

    Some(SamplePosition::Hold { index: last })
}

/// Every model named anywhere on the timeline, in first-seen order.
///
/// Each model maps to the version recorded by the keyframe nearest to
/// `anchor` that names it; on a tie the earlier keyframe wins. The result
/// depends only on the keyframes and the anchor, never on what was shown
/// before.
pub fn tracked_models(keyframes: &[Keyframe], anchor: usize) -> IndexMap<ModelId, VersionId> {
    let mut nearest: IndexMap<ModelId, (usize, VersionId)> = IndexMap::new();
    for (index, kf) in keyframes.iter().enumerate() {
        let distance = index.abs_diff(anchor);
        for (id, state) in &kf.models.models {
            match nearest.get_mut(id) {
                Some(entry) if distance < entry.0 => {
                    *entry = (distance, state.selected_version.clone());
                }
                Some(_) => {}
                None => {
                    nearest.insert(id.clone(), (distance, state.selected_version.clone()));
                }
            }
        }
    }
    nearest
        .into_iter()
        .map(|(id, (_, version))| (id, version))
        .collect()
}

/// Resolve the visual state at `time`; `None` for an empty timeline
pub fn sample(keyframes: &[Keyframe], time: f32) -> Option<VisualFrame> {
    let time = clamp_time(keyframes, time);
    let position = locate(keyframes, time)?;

    let mut frame = match position {
        SamplePosition::Hold { index } => {
            let kf = &keyframes[index];
            VisualFrame {
                time,
                position,
                camera: kf.camera,
                lights: kf.lights.clone(),
                models: ModelVisibilityFrame::from_snapshot(&kf.models),
            }
        }
        SamplePosition::Transition { from, progress } => {
            let a = &keyframes[from];
            let b = &keyframes[from + 1];
            let eased = |property| ease(&a.transition_for(property), progress);

            VisualFrame {
                time,
                position,
                camera: blend_camera(&a.camera, &b.camera, eased(AnimatedProperty::Camera)),
                lights: blend_lights(&a.lights, &b.lights, eased(AnimatedProperty::Lights)),
                models: blend_visibility(&a.models, &b.models, eased(AnimatedProperty::Models)),
            }
        }
    };

    frame
        .models
        .include_hidden(&tracked_models(keyframes, position.keyframe_index()));
    Some(frame)
}

/// Apply step shared by live playback and export
#[derive(Debug, Default)]
pub struct TimelineScheduler {
    /// Lights currently instantiated in the scene, including fading ones
    active_lights: Vec<LightEntry>,
    /// Last applied frame
    last_frame: Option<VisualFrame>,
}

impl TimelineScheduler {
    /// Create a new scheduler
    pub fn new() -> Self {
        Self::default()
    }

    /// Sample `time` and apply the result to `target`.
    ///
    /// Returns the applied frame, or `None` for an empty timeline.
    pub fn sample<R: RenderTarget>(
        &mut self,
        keyframes: &[Keyframe],
        time: f32,
        target: &mut R,
    ) -> Option<&VisualFrame> {
        let frame = sample(keyframes, time)?;
        self.apply(frame, target);
        self.last_frame.as_ref()
    }

    /// Push a resolved frame into `target`
    pub fn apply<R: RenderTarget>(&mut self, frame: VisualFrame, target: &mut R) {
        self.push(&frame.camera, &frame.lights, &frame.models, target);
        self.last_frame = Some(frame);
    }

    /// Push a state that is not on the timeline, such as the scene before an
    /// edit session. Models the timeline knows but `state` omits are hidden,
    /// with versions taken relative to the keyframe at `anchor`.
    pub fn show_state<R: RenderTarget>(
        &mut self,
        keyframes: &[Keyframe],
        anchor: usize,
        state: &VisualState,
        target: &mut R,
    ) {
        let mut models = ModelVisibilityFrame::from_snapshot(&state.models);
        models.include_hidden(&tracked_models(keyframes, anchor));
        self.push(&state.camera, &state.lights, &models, target);
        self.last_frame = None;
    }

    fn push<R: RenderTarget>(
        &mut self,
        camera: &CameraSnapshot,
        lights: &LightSnapshot,
        models: &ModelVisibilityFrame,
        target: &mut R,
    ) {
        target.set_camera(camera);

        self.active_lights.clear();
        self.active_lights.extend_from_slice(&lights.lights);
        target.set_lights(&lights.ambient, &self.active_lights);

        for (id, appearance) in &models.models {
            target.set_model_opacity(id, appearance.opacity);
            if let Some(version) = &appearance.version {
                target.set_model_version(id, version);
            }
        }
    }

    /// Lights currently instantiated in the scene
    pub fn active_lights(&self) -> &[LightEntry] {
        &self.active_lights
    }

    /// Last applied frame
    pub fn last_frame(&self) -> Option<&VisualFrame> {
        self.last_frame.as_ref()
    }

    /// Forget the last applied frame
    pub fn reset(&mut self) {
        self.active_lights.clear();
        self.last_frame = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::{TransitionKind, TransitionSpec};
    use crate::render::RecordingTarget;
    use crate::snapshot::{ModelState, ModelVisibilitySnapshot};

    fn state(x: f32, lights: usize, chip_visible: bool) -> VisualState {
        let mut state = VisualState::default();
        state.camera.position = [x, -10.0, 10.0];
        state.lights.lights = (0..lights)
            .map(|i| LightEntry::directional([i as f32, 0.0, 10.0], 1.0))
            .collect();
        let chip = if chip_visible {
            ModelState::shown("v1")
        } else {
            ModelState::hidden("v1")
        };
        state.models = ModelVisibilitySnapshot::new().with_model("chip", chip);
        state
    }

    fn two_keyframes(hold: f32, transition: f32, spec: TransitionSpec) -> Vec<Keyframe> {
        vec![
            Keyframe::new(state(0.0, 2, true))
                .with_durations(hold, transition)
                .with_all_transitions(spec),
            Keyframe::new(state(10.0, 1, false)).with_durations(hold, 0.0),
        ]
    }

    #[test]
    fn test_empty_timeline_is_noop() {
        let mut target = RecordingTarget::new();
        let mut scheduler = TimelineScheduler::new();
        assert!(sample(&[], 3.0).is_none());
        assert!(scheduler.sample(&[], 3.0, &mut target).is_none());
        assert_eq!(target.applied().camera, None);
        assert_eq!(total_duration(&[]), 0.0);
    }

    #[test]
    fn test_total_duration_ignores_last_transition() {
        let mut keyframes = two_keyframes(1.0, 2.0, TransitionSpec::linear());
        keyframes[1].transition = 5.0;
        assert_eq!(total_duration(&keyframes), 4.0);
    }

    #[test]
    fn test_locate_windows() {
        let keyframes = two_keyframes(1.0, 2.0, TransitionSpec::linear());
        assert_eq!(locate(&keyframes, 0.5), Some(SamplePosition::Hold { index: 0 }));
        assert_eq!(
            locate(&keyframes, 2.0),
            Some(SamplePosition::Transition { from: 0, progress: 0.5 })
        );
        assert_eq!(locate(&keyframes, 3.5), Some(SamplePosition::Hold { index: 1 }));
        assert_eq!(locate(&keyframes, 99.0), Some(SamplePosition::Hold { index: 1 }));
    }

    #[test]
    fn test_hold_applies_exact_snapshot() {
        let keyframes = two_keyframes(1.0, 2.0, TransitionSpec::smooth());
        let frame = sample(&keyframes, 0.25).unwrap();
        assert_eq!(frame.camera, keyframes[0].camera);
        assert_eq!(frame.lights, keyframes[0].lights);
    }

    #[test]
    fn test_linear_midpoint_matches_evaluator() {
        let keyframes = two_keyframes(0.0, 2.0, TransitionSpec::linear());
        let frame = sample(&keyframes, 1.0).unwrap();
        assert_eq!(frame.position, SamplePosition::Transition { from: 0, progress: 0.5 });

        let eased = ease(&TransitionSpec::linear(), 0.5);
        let expected = blend_visibility(&keyframes[0].models, &keyframes[1].models, eased);
        assert_eq!(frame.models, expected);
        assert_eq!(
            frame.lights.lights[1].intensity,
            keyframes[0].lights.lights[1].intensity * (1.0 - eased)
        );
    }

    #[test]
    fn test_out_of_range_time_is_clamped() {
        let keyframes = two_keyframes(0.5, 2.0, TransitionSpec::smooth());
        let duration = total_duration(&keyframes);
        assert_eq!(sample(&keyframes, -3.0), sample(&keyframes, 0.0));
        assert_eq!(sample(&keyframes, duration + 10.0), sample(&keyframes, duration));
        assert_eq!(sample(&keyframes, f32::NAN), sample(&keyframes, 0.0));
    }

    #[test]
    fn test_repeated_sampling_is_idempotent() {
        let keyframes = two_keyframes(0.5, 2.0, TransitionSpec::smooth());
        let mut scheduler = TimelineScheduler::new();
        let mut target = RecordingTarget::new();

        scheduler.sample(&keyframes, 1.3, &mut target);
        let first = target.applied().clone();
        scheduler.sample(&keyframes, 2.2, &mut target);
        scheduler.sample(&keyframes, 1.3, &mut target);
        assert_eq!(target.applied(), &first);
    }

    #[test]
    fn test_transition_uses_per_property_specs() {
        let keyframes = vec![
            Keyframe::new(state(0.0, 1, true))
                .with_durations(0.0, 1.0)
                .with_transition(AnimatedProperty::Camera, TransitionSpec::new(TransitionKind::InstantAtEnd))
                .with_transition(AnimatedProperty::Models, TransitionSpec::new(TransitionKind::InstantAtStart)),
            Keyframe::new(state(10.0, 1, false)).with_durations(0.0, 0.0),
        ];
        let frame = sample(&keyframes, 0.5).unwrap();
        assert_eq!(frame.camera, keyframes[0].camera);
        assert_eq!(frame.models.opacity(&ModelId::from("chip")), 0.0);
    }

    #[test]
    fn test_zero_length_transition_jumps_to_next() {
        let keyframes = vec![
            Keyframe::new(state(0.0, 1, true)).with_durations(1.0, 0.0),
            Keyframe::new(state(10.0, 1, true)).with_durations(1.0, 0.0),
        ];
        assert_eq!(locate(&keyframes, 1.0), Some(SamplePosition::Hold { index: 1 }));
    }

    #[test]
    fn test_apply_step_owns_active_lights() {
        let keyframes = two_keyframes(0.0, 2.0, TransitionSpec::linear());
        let mut scheduler = TimelineScheduler::new();
        let mut target = RecordingTarget::new();

        scheduler.sample(&keyframes, 0.0, &mut target);
        assert_eq!(scheduler.active_lights().len(), 2);
        scheduler.sample(&keyframes, 1.0, &mut target);
        assert_eq!(scheduler.active_lights().len(), 2);
        scheduler.sample(&keyframes, 2.0, &mut target);
        assert_eq!(scheduler.active_lights().len(), 1);
        assert_eq!(target.applied().lights.len(), 1);
    }

    #[test]
    fn test_show_state_hides_unnamed_models() {
        let keyframes = two_keyframes(1.0, 1.0, TransitionSpec::linear());
        let mut scheduler = TimelineScheduler::new();
        let mut target = RecordingTarget::new();
        scheduler.sample(&keyframes, 0.0, &mut target);

        let mut live = VisualState::default();
        live.camera.fov = 20.0;
        scheduler.show_state(&keyframes, 0, &live, &mut target);
        assert_eq!(target.applied().camera, Some(live.camera));
        assert_eq!(target.applied().opacities.get(&ModelId::from("chip")), Some(&0.0));
        assert_eq!(
            target.applied().versions.get(&ModelId::from("chip")),
            Some(&VersionId::from("v1"))
        );
        assert!(scheduler.last_frame().is_none());
    }

    #[test]
    fn test_models_missing_from_hold_are_hidden() {
        let mut keyframes = two_keyframes(1.0, 1.0, TransitionSpec::linear());
        keyframes[1].models = keyframes[1]
            .models
            .clone()
            .with_model("lid", ModelState::shown("v1"));
        let frame = sample(&keyframes, 0.0).unwrap();
        assert_eq!(frame.models.opacity(&ModelId::from("lid")), 0.0);
        assert!(frame.models.get(&ModelId::from("lid")).is_some());
    }

    #[test]
    fn test_hidden_model_versions_follow_nearest_keyframe() {
        let mut keyframes = vec![
            Keyframe::new(state(0.0, 1, true)),
            Keyframe::new(state(5.0, 1, true)),
            Keyframe::new(state(10.0, 1, true)),
        ];
        keyframes[0].models = keyframes[0].models.clone().with_model("lid", ModelState::hidden("v1"));
        keyframes[2].models = keyframes[2].models.clone().with_model("lid", ModelState::shown("v3"));

        let lid = ModelId::from("lid");
        assert_eq!(tracked_models(&keyframes, 0).get(&lid), Some(&VersionId::from("v1")));
        assert_eq!(tracked_models(&keyframes, 2).get(&lid), Some(&VersionId::from("v3")));
        // Equidistant: the earlier keyframe wins
        assert_eq!(tracked_models(&keyframes, 1).get(&lid), Some(&VersionId::from("v1")));
    }

    #[test]
    fn test_scrubbing_back_matches_fresh_sample() {
        let mut keyframes = vec![
            Keyframe::new(state(0.0, 1, true)).with_durations(1.0, 1.0),
            Keyframe::new(state(10.0, 1, true)).with_durations(1.0, 0.0),
        ];
        keyframes[1].models = keyframes[1]
            .models
            .clone()
            .with_model("lid", ModelState::shown("v9"));
        let end = total_duration(&keyframes);

        let mut scrubbed = RecordingTarget::new();
        let mut scheduler = TimelineScheduler::new();
        scheduler.sample(&keyframes, end, &mut scrubbed);
        scheduler.sample(&keyframes, 0.0, &mut scrubbed);

        let mut fresh = RecordingTarget::new();
        TimelineScheduler::new().sample(&keyframes, 0.0, &mut fresh);

        assert_eq!(scrubbed.applied(), fresh.applied());
        assert_eq!(
            fresh.applied().versions.get(&ModelId::from("lid")),
            Some(&VersionId::from("v9"))
        );
    }
}

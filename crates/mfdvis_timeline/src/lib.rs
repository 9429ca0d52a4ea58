// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyframe timeline for the device visualizer.
//!
//! This crate animates a 3D device scene between captured snapshots:
//! - Camera pose and projection
//! - Ambient and scene lights, with crossfades when the light set changes
//! - Model visibility and version selection
//!
//! ## Architecture
//!
//! The timeline is built on:
//! - A keyframe store that owns the ordered list and its invariants
//! - Easing curves evaluated from five control points
//! - Pure property blends for camera, lights and models
//! - A scheduler that resolves any time into a full visual state
//! - Live playback and deterministic frame export sharing that scheduler

pub mod blend;
pub mod curve;
pub mod error;
pub mod export;
pub mod interpolation;
pub mod keyframe;
pub mod persistence;
pub mod playback;
pub mod render;
pub mod scheduler;
pub mod settings;
pub mod snapshot;
pub mod store;
pub mod timeline;

pub use blend::{
    blend_camera, blend_color, blend_hue, blend_lights, blend_visibility, Hsl, ModelAppearance,
    ModelVisibilityFrame,
};
pub use curve::{ease, CurvePreset, EasingCurve, TransitionKind, TransitionSpec};
pub use error::{Result, SinkError, TimelineError};
pub use export::{
    export_frames, frame_count, frame_instants, CallbackSink, CollectSink, ExportFrame,
    ExportSummary, FrameSink,
};
pub use interpolation::Interpolation;
pub use keyframe::{AnimatedProperty, Keyframe, KeyframeId, KeyframePatch};
pub use persistence::{FileFormat, FileSink, KeyframeRecord, MemorySink, PersistenceSink};
pub use playback::{Clock, ManualClock, PlaybackController, PlaybackState, SystemClock};
pub use render::{AppliedState, RecordingTarget, RenderTarget};
pub use scheduler::{sample, total_duration, SamplePosition, TimelineScheduler, VisualFrame};
pub use settings::{TimelineSettings, SETTINGS_FILE_NAME};
pub use snapshot::{
    AmbientLight, CameraSnapshot, Color, InteractionMode, LightEntry, LightKind, LightSnapshot,
    ModelId, ModelState, ModelVisibilitySnapshot, ProjectionMode, SpotParams, VersionId,
    VisualState,
};
pub use store::{KeyframeListing, KeyframeStore, MoveDirection};
pub use timeline::Timeline;

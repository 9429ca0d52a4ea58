// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline facade.
//!
//! Ties the keyframe store, the scheduler and the playback controller to one
//! render target. The host calls [`Timeline::frame`] once per rendered frame
//! while playing and updates [`Timeline::set_live_state`] as the user moves
//! the camera or toggles models.

use crate::error::{Result, SinkError, TimelineError};
use crate::export::{export_frames, CallbackSink, ExportSummary, FrameSink};
use crate::keyframe::{Keyframe, KeyframePatch};
use crate::persistence::PersistenceSink;
use crate::playback::{Clock, PlaybackController, PlaybackState};
use crate::render::RenderTarget;
use crate::scheduler::{locate, TimelineScheduler, VisualFrame};
use crate::settings::TimelineSettings;
use crate::snapshot::{LightEntry, VisualState};
use crate::store::{KeyframeListing, KeyframeStore, MoveDirection};

/// Keyframe timeline driving a render target
pub struct Timeline<R: RenderTarget> {
    store: KeyframeStore,
    scheduler: TimelineScheduler,
    playback: PlaybackController,
    target: R,
    live: VisualState,
    persistence: Option<Box<dyn PersistenceSink>>,
}

impl<R: RenderTarget> Timeline<R> {
    /// Create an empty timeline; `live` is the scene's current state
    pub fn new(target: R, live: VisualState) -> Self {
        Self::with_settings(target, live, TimelineSettings::default())
    }

    /// Create an empty timeline with settings
    pub fn with_settings(target: R, live: VisualState, settings: TimelineSettings) -> Self {
        Self {
            store: KeyframeStore::with_settings(settings),
            scheduler: TimelineScheduler::new(),
            playback: PlaybackController::new(),
            target,
            live,
            persistence: None,
        }
    }

    /// Attach a persistence sink used by [`load`](Self::load),
    /// [`save`](Self::save) and autosave
    pub fn with_persistence(mut self, sink: Box<dyn PersistenceSink>) -> Self {
        self.persistence = Some(sink);
        self
    }

    /// Keyframe store
    pub fn store(&self) -> &KeyframeStore {
        &self.store
    }

    /// All keyframes in order
    pub fn keyframes(&self) -> &[Keyframe] {
        self.store.keyframes()
    }

    /// Render target
    pub fn target(&self) -> &R {
        &self.target
    }

    /// Current scene state outside of playback
    pub fn live_state(&self) -> &VisualState {
        &self.live
    }

    /// Record a change the user made to the scene
    pub fn set_live_state(&mut self, state: VisualState) {
        self.live = state;
    }

    /// Playback controller
    pub fn playback(&self) -> &PlaybackController {
        &self.playback
    }

    /// Current playback state
    pub fn playback_state(&self) -> PlaybackState {
        self.playback.state
    }

    /// Current playback time
    pub fn time(&self) -> f32 {
        self.playback.time
    }

    /// Timeline length in seconds
    pub fn total_duration(&self) -> f32 {
        self.store.total_duration()
    }

    /// Last state pushed to the render target by sampling
    pub fn last_frame(&self) -> Option<&VisualFrame> {
        self.scheduler.last_frame()
    }

    /// Rows for the keyframe list
    pub fn listing(&self) -> Vec<KeyframeListing> {
        let active = if self.playback.is_active() {
            locate(self.store.keyframes(), self.playback.time).map(|p| p.keyframe_index())
        } else {
            None
        };
        self.store.listing(active)
    }

    /// Replace the keyframes with the attached sink's contents
    pub fn load(&mut self) -> Result<usize> {
        self.ensure_stopped()?;
        let Some(sink) = self.persistence.as_deref_mut() else {
            return Ok(self.store.len());
        };
        let count = self.store.load(sink, &self.live)?;
        self.scheduler.reset();
        Ok(count)
    }

    /// Write the keyframes to the attached sink
    pub fn save(&mut self) -> Result<()> {
        if let Some(sink) = self.persistence.as_deref_mut() {
            self.store.save(sink)?;
        }
        Ok(())
    }

    /// Append a keyframe captured from the live scene
    pub fn capture(&mut self) -> Result<usize> {
        self.append(self.live.clone())
    }

    /// Append a keyframe
    pub fn append(&mut self, state: VisualState) -> Result<usize> {
        self.ensure_stopped()?;
        let index = self.store.append(state)?;
        self.autosave()?;
        Ok(index)
    }

    /// Apply a partial update to a keyframe
    pub fn update(&mut self, index: usize, patch: KeyframePatch) -> Result<()> {
        self.ensure_stopped()?;
        self.store.update(index, patch)?;
        self.autosave()
    }

    /// Rename a keyframe
    pub fn rename(&mut self, index: usize, name: impl Into<String>) -> Result<()> {
        self.update(index, KeyframePatch::new().name(name))
    }

    /// Move a keyframe one slot; returns its new index
    pub fn move_keyframe(&mut self, index: usize, direction: MoveDirection) -> Result<usize> {
        self.ensure_stopped()?;
        let index = self.store.move_keyframe(index, direction)?;
        self.autosave()?;
        Ok(index)
    }

    /// Remove a keyframe
    pub fn remove(&mut self, index: usize) -> Result<Keyframe> {
        self.ensure_stopped()?;
        let removed = self.store.remove(index)?;
        self.autosave()?;
        Ok(removed)
    }

    /// Duplicate a keyframe; returns the copy's index
    pub fn duplicate(&mut self, index: usize) -> Result<usize> {
        self.ensure_stopped()?;
        let index = self.store.duplicate(index)?;
        self.autosave()?;
        Ok(index)
    }

    /// Add a light to the first keyframe
    pub fn add_light(&mut self, index: usize, light: LightEntry) -> Result<usize> {
        self.ensure_stopped()?;
        let slot = self.store.add_light(index, light)?;
        self.autosave()?;
        Ok(slot)
    }

    /// Remove a light from the first keyframe
    pub fn remove_light(&mut self, index: usize, slot: usize) -> Result<LightEntry> {
        self.ensure_stopped()?;
        let light = self.store.remove_light(index, slot)?;
        self.autosave()?;
        Ok(light)
    }

    /// Enter edit mode on a keyframe and show it.
    ///
    /// The keyframe's state becomes the live state; edits made through
    /// [`set_live_state`](Self::set_live_state) are written back by
    /// [`commit`](Self::commit).
    pub fn select(&mut self, index: usize) -> Result<VisualState> {
        self.ensure_stopped()?;
        let editable = self.store.select(index, self.live.clone())?;
        self.scheduler
            .show_state(self.store.keyframes(), index, &editable, &mut self.target);
        self.live = editable.clone();
        Ok(editable)
    }

    /// Index of the keyframe being edited
    pub fn editing(&self) -> Option<usize> {
        self.store.editing()
    }

    /// Whether the light list of the edited keyframe may change length
    pub fn is_structure_editable(&self) -> bool {
        self.store.is_structure_editable()
    }

    /// Write the live state into the edited keyframe
    pub fn commit(&mut self) -> Result<usize> {
        let index = self.store.commit(self.live.clone())?;
        self.autosave()?;
        Ok(index)
    }

    /// Leave edit mode and restore the scene from before [`select`](Self::select)
    pub fn cancel(&mut self) -> Result<()> {
        let anchor = self.store.editing().unwrap_or(0);
        let restored = self.store.cancel()?;
        self.scheduler
            .show_state(self.store.keyframes(), anchor, &restored, &mut self.target);
        self.live = restored;
        Ok(())
    }

    /// Sample the timeline at `time` and apply it to the render target
    pub fn sample(&mut self, time: f32) -> Option<&VisualFrame> {
        self.scheduler
            .sample(self.store.keyframes(), time, &mut self.target)
    }

    /// Move the playhead and show the state there
    pub fn seek(&mut self, time: f32) -> Option<&VisualFrame> {
        let duration = self.store.total_duration();
        self.playback.seek(time, duration);
        self.scheduler
            .sample(self.store.keyframes(), self.playback.time, &mut self.target)
    }

    /// Start live playback
    pub fn play(&mut self, from_start: bool) -> Result<()> {
        if let Some(index) = self.store.editing() {
            return Err(TimelineError::EditSessionActive(index));
        }
        self.playback.play(from_start, self.store.total_duration());
        Ok(())
    }

    /// Pause live playback
    pub fn pause(&mut self) {
        self.playback.pause();
    }

    /// Resume paused playback
    pub fn resume(&mut self) {
        self.playback.resume();
    }

    /// Stop live playback, leaving the last sampled state visible
    pub fn stop(&mut self) {
        self.playback.stop();
    }

    /// Set the playback speed multiplier
    pub fn set_speed(&mut self, speed: f32) {
        self.playback.set_speed(speed);
    }

    /// Advance playback from `clock` and apply the state for this frame.
    ///
    /// Call once per rendered frame; returns `None` when not playing.
    pub fn frame(&mut self, clock: &dyn Clock) -> Option<&VisualFrame> {
        let time = self
            .playback
            .tick(clock.now(), self.store.total_duration())?;
        self.scheduler
            .sample(self.store.keyframes(), time, &mut self.target)
    }

    /// Export every frame at `fps` into `sink`.
    ///
    /// Rejected while playing or while a keyframe is being edited, since the
    /// export overwrites what the render target shows.
    pub async fn export_frames<S>(&mut self, fps: u32, sink: &mut S) -> Result<ExportSummary>
    where
        S: FrameSink<R::Frame> + ?Sized,
    {
        self.ensure_stopped()?;
        if let Some(index) = self.store.editing() {
            return Err(TimelineError::EditSessionActive(index));
        }
        export_frames(
            self.store.keyframes(),
            &mut self.scheduler,
            &mut self.target,
            sink,
            fps,
        )
        .await
    }

    /// Export every frame at `fps`, calling `on_frame(time, index, image)`
    pub async fn export_frames_with<C>(&mut self, fps: u32, on_frame: C) -> Result<ExportSummary>
    where
        C: FnMut(f32, u32, R::Frame) -> std::result::Result<(), SinkError>,
    {
        let mut sink = CallbackSink::new(on_frame);
        self.export_frames(fps, &mut sink).await
    }

    /// Export at the frame rate from the settings
    pub async fn export_default<S>(&mut self, sink: &mut S) -> Result<ExportSummary>
    where
        S: FrameSink<R::Frame> + ?Sized,
    {
        let fps = self.store.settings().export_fps;
        self.export_frames(fps, sink).await
    }

    fn ensure_stopped(&self) -> Result<()> {
        if self.playback.is_active() {
            return Err(TimelineError::PlaybackActive);
        }
        Ok(())
    }

    fn autosave(&mut self) -> Result<()> {
        if self.store.settings().autosave {
            self.save()?;
        }
        Ok(())
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Live playback.
//!
//! The controller only tracks time. Sampling and applying happen in the
//! scheduler, so a live session and an export see the same state at the same
//! instant.

use std::cell::Cell;
use std::time::Instant;

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// Stopped
    #[default]
    Stopped,
    /// Playing forward
    Playing,
    /// Paused
    Paused,
}

/// Source of wall-clock time in seconds
pub trait Clock {
    /// Current time in seconds since an arbitrary origin
    fn now(&self) -> f64;
}

/// Monotonic system clock
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Create a clock starting at zero
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Clock advanced by hand
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<f64>,
}

impl ManualClock {
    /// Create a clock at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward
    pub fn advance(&self, seconds: f64) {
        self.now.set(self.now.get() + seconds.max(0.0));
    }

    /// Set the current time
    pub fn set(&self, seconds: f64) {
        self.now.set(seconds);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.now.get()
    }
}

/// Playback controller for the timeline
#[derive(Debug, Clone)]
pub struct PlaybackController {
    /// Current playback time
    pub time: f32,
    /// Playback state
    pub state: PlaybackState,
    /// Playback speed multiplier
    speed: f32,
    /// Clock reading at the previous tick
    last_tick: Option<f64>,
}

impl PlaybackController {
    /// Create a new playback controller
    pub fn new() -> Self {
        Self {
            time: 0.0,
            state: PlaybackState::Stopped,
            speed: 1.0,
            last_tick: None,
        }
    }

    /// Start playing. Restarts from zero when `from_start` is set or the
    /// previous session ran to the end.
    pub fn play(&mut self, from_start: bool, duration: f32) {
        if from_start || self.time >= duration {
            self.time = 0.0;
        }
        self.state = PlaybackState::Playing;
        self.last_tick = None;
        tracing::info!("Playback started at {:.3}s", self.time);
    }

    /// Pause playback
    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
            self.last_tick = None;
            tracing::info!("Playback paused at {:.3}s", self.time);
        }
    }

    /// Resume a paused session in place
    pub fn resume(&mut self) {
        if self.state == PlaybackState::Paused {
            self.state = PlaybackState::Playing;
            tracing::info!("Playback resumed at {:.3}s", self.time);
        }
    }

    /// Stop, keeping the current time so the last sampled state stays visible
    pub fn stop(&mut self) {
        if self.state != PlaybackState::Stopped {
            tracing::info!("Playback stopped at {:.3}s", self.time);
        }
        self.state = PlaybackState::Stopped;
        self.last_tick = None;
    }

    /// Seek to a time, clamped into `[0, duration]`
    pub fn seek(&mut self, time: f32, duration: f32) {
        self.time = if time.is_nan() {
            0.0
        } else {
            time.clamp(0.0, duration.max(0.0))
        };
    }

    /// Playback speed multiplier
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Set the playback speed; negative or NaN values are clamped to zero
    pub fn set_speed(&mut self, speed: f32) {
        self.speed = if speed.is_nan() { 0.0 } else { speed.max(0.0) };
    }

    /// Advance playback by `delta_time` seconds
    pub fn update(&mut self, delta_time: f32, duration: f32) {
        if !self.is_playing() {
            return;
        }

        self.time += delta_time.max(0.0) * self.speed;
        if self.time >= duration {
            self.time = duration.max(0.0);
            self.state = PlaybackState::Stopped;
            self.last_tick = None;
            tracing::info!("Playback reached the last keyframe");
        }
    }

    /// Advance from a clock reading taken once per rendered frame.
    ///
    /// Returns the time to sample, or `None` when nothing is playing. The
    /// final tick of a session returns `duration` before stopping.
    pub fn tick(&mut self, now: f64, duration: f32) -> Option<f32> {
        if !self.is_playing() {
            return None;
        }

        let delta = self.last_tick.map_or(0.0, |last| (now - last).max(0.0));
        self.update(delta as f32, duration);
        if self.is_playing() {
            self.last_tick = Some(now);
        }
        Some(self.time)
    }

    /// Is currently playing
    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Playing or paused
    pub fn is_active(&self) -> bool {
        self.state != PlaybackState::Stopped
    }
}

impl Default for PlaybackController {
    fn default() -> Self {
        Self::new()
    }
}

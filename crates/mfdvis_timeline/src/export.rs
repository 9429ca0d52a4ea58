// SPDX-License-Identifier: MIT OR Apache-2.0
//! Deterministic frame export.
//!
//! Export walks the instants `k / fps` for `k = 0..=ceil(duration * fps)`,
//! samples each one through the scheduler, renders it and hands it to a
//! [`FrameSink`]. Submissions are awaited one at a time, in order. The first
//! rejected frame aborts the export.

use crate::error::{Result, SinkError, TimelineError};
use crate::keyframe::Keyframe;
use crate::render::RenderTarget;
use crate::scheduler::{total_duration, TimelineScheduler};
use futures::future::{self, FutureExt, LocalBoxFuture};
use serde::{Deserialize, Serialize};

/// Guards against `duration * fps` landing a hair above an integer
const FRAME_EPSILON: f64 = 1e-4;

/// One rendered frame of an export
#[derive(Debug, Clone, PartialEq)]
pub struct ExportFrame<F> {
    /// Frame number, starting at 0
    pub index: u32,
    /// Timeline time of this frame
    pub time: f32,
    /// Rendered image
    pub image: F,
}

/// Consumer of exported frames
pub trait FrameSink<F> {
    /// Accept one frame; an error aborts the export
    fn submit(&mut self, frame: ExportFrame<F>) -> LocalBoxFuture<'_, std::result::Result<(), SinkError>>;
}

/// Sink calling a closure with `(time, index, image)` for every frame
pub struct CallbackSink<C> {
    callback: C,
}

impl<C> CallbackSink<C> {
    /// Wrap a callback
    pub fn new(callback: C) -> Self {
        Self { callback }
    }
}

impl<F, C> FrameSink<F> for CallbackSink<C>
where
    C: FnMut(f32, u32, F) -> std::result::Result<(), SinkError>,
{
    fn submit(&mut self, frame: ExportFrame<F>) -> LocalBoxFuture<'_, std::result::Result<(), SinkError>> {
        let result = (self.callback)(frame.time, frame.index, frame.image);
        future::ready(result).boxed_local()
    }
}

/// Sink keeping every frame in memory
#[derive(Debug, Clone)]
pub struct CollectSink<F> {
    /// Frames received so far
    pub frames: Vec<ExportFrame<F>>,
}

impl<F> CollectSink<F> {
    /// Create an empty sink
    pub fn new() -> Self {
        Self { frames: Vec::new() }
    }
}

impl<F> Default for CollectSink<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F> FrameSink<F> for CollectSink<F> {
    fn submit(&mut self, frame: ExportFrame<F>) -> LocalBoxFuture<'_, std::result::Result<(), SinkError>> {
        self.frames.push(frame);
        future::ready(Ok(())).boxed_local()
    }
}

/// Result of a finished export
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExportSummary {
    /// Frames delivered to the sink
    pub frames: u32,
    /// Frame rate used
    pub fps: u32,
    /// Timeline duration in seconds
    pub duration: f32,
}

/// Number of frames exported for `duration` seconds at `fps`
pub fn frame_count(duration: f32, fps: u32) -> u32 {
    if fps == 0 || !duration.is_finite() || duration <= 0.0 {
        return 0;
    }
    let last = (f64::from(duration) * f64::from(fps) - FRAME_EPSILON).ceil().max(0.0);
    last as u32 + 1
}

/// Frame indices and timeline times visited by an export
pub fn frame_instants(duration: f32, fps: u32) -> impl Iterator<Item = (u32, f32)> {
    (0..frame_count(duration, fps)).map(move |k| (k, (f64::from(k) / f64::from(fps)) as f32))
}

/// Render every export instant of `keyframes` into `sink`
pub async fn export_frames<R, S>(
    keyframes: &[Keyframe],
    scheduler: &mut TimelineScheduler,
    target: &mut R,
    sink: &mut S,
    fps: u32,
) -> Result<ExportSummary>
where
    R: RenderTarget,
    S: FrameSink<R::Frame> + ?Sized,
{
    if fps == 0 {
        return Err(TimelineError::InvalidFps(fps));
    }

    let duration = total_duration(keyframes);
    if keyframes.is_empty() || duration <= 0.0 {
        return Err(TimelineError::EmptyTimeline);
    }

    let frames = frame_count(duration, fps);
    tracing::info!("Exporting {} frames at {} fps ({:.3}s)", frames, fps, duration);

    for (index, time) in frame_instants(duration, fps) {
        scheduler.sample(keyframes, time, target);
        let image = target.render_frame();

        if let Err(err) = sink.submit(ExportFrame { index, time, image }).await {
            tracing::error!("Export aborted at frame {}: {}", index, err);
            return Err(TimelineError::FrameRejected {
                index,
                reason: err.0,
            });
        }
    }

    tracing::info!("Export finished");
    Ok(ExportSummary {
        frames,
        fps,
        duration,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{AppliedState, RecordingTarget};
    use crate::scheduler::sample;
    use crate::snapshot::VisualState;
    use futures::executor::block_on;

    fn two_second_timeline() -> Vec<Keyframe> {
        let mut end = VisualState::default();
        end.camera.fov = 90.0;
        vec![
            Keyframe::new(VisualState::default()).with_durations(0.0, 2.0),
            Keyframe::new(end).with_durations(0.0, 0.0),
        ]
    }

    #[test]
    fn test_frame_count() {
        assert_eq!(frame_count(2.0, 30), 61);
        assert_eq!(frame_count(1.0, 24), 25);
        assert_eq!(frame_count(0.5, 3), 3);
        assert_eq!(frame_count(0.0, 30), 0);
        assert_eq!(frame_count(2.0, 0), 0);
    }

    #[test]
    fn test_frame_count_tolerates_float_noise() {
        // Within the tolerance of a whole frame: no extra frame
        assert_eq!(frame_count(2.000_001, 30), 61);
        assert_eq!(frame_count(1.999_999, 30), 61);
        // Past the tolerance: the partial frame is rounded up
        assert_eq!(frame_count(2.000_01, 30), 62);
    }

    #[test]
    fn test_frame_instants_end_on_duration() {
        let instants: Vec<_> = frame_instants(2.0, 30).collect();
        assert_eq!(instants.first(), Some(&(0, 0.0)));
        assert_eq!(instants.last(), Some(&(60, 2.0)));
    }

    #[test]
    fn test_export_emits_every_frame() {
        let keyframes = two_second_timeline();
        let mut scheduler = TimelineScheduler::new();
        let mut target = RecordingTarget::new();
        let mut sink = CollectSink::new();

        let summary = block_on(export_frames(&keyframes, &mut scheduler, &mut target, &mut sink, 30)).unwrap();
        assert_eq!(summary.frames, 61);
        assert_eq!(sink.frames.len(), 61);
        assert_eq!(target.frames_rendered, 61);
        assert_eq!(sink.frames[60].image.camera.map(|c| c.fov), Some(90.0));
    }

    #[test]
    fn test_export_matches_live_sampling() {
        let keyframes = two_second_timeline();
        let mut scheduler = TimelineScheduler::new();
        let mut target = RecordingTarget::new();
        let mut sink = CollectSink::new();
        block_on(export_frames(&keyframes, &mut scheduler, &mut target, &mut sink, 10)).unwrap();

        let frame = &sink.frames[7];
        let live = sample(&keyframes, frame.time).unwrap();
        assert_eq!(frame.image.camera, Some(live.camera));
    }

    #[test]
    fn test_rejected_frame_aborts_export() {
        let keyframes = two_second_timeline();
        let mut scheduler = TimelineScheduler::new();
        let mut target = RecordingTarget::new();
        let mut seen = Vec::new();

        let result = {
            let mut sink = CallbackSink::new(|time: f32, index: u32, _image: AppliedState| {
                seen.push(time);
                if index == 5 {
                    Err(SinkError::new("disk full"))
                } else {
                    Ok(())
                }
            });
            block_on(export_frames(&keyframes, &mut scheduler, &mut target, &mut sink, 30))
        };
        assert!(matches!(
            result,
            Err(TimelineError::FrameRejected { index: 5, ref reason }) if reason == "disk full"
        ));
        assert_eq!(seen.len(), 6);
    }

    #[test]
    fn test_empty_timeline_is_an_error() {
        let mut scheduler = TimelineScheduler::new();
        let mut target = RecordingTarget::new();
        let mut sink = CollectSink::new();

        let result = block_on(export_frames(&[], &mut scheduler, &mut target, &mut sink, 30));
        assert!(matches!(result, Err(TimelineError::EmptyTimeline)));

        let still = vec![Keyframe::new(VisualState::default()).with_durations(0.0, 0.0)];
        let result = block_on(export_frames(&still, &mut scheduler, &mut target, &mut sink, 30));
        assert!(matches!(result, Err(TimelineError::EmptyTimeline)));
        assert!(sink.frames.is_empty());
    }

    #[test]
    fn test_zero_fps_is_an_error() {
        let keyframes = two_second_timeline();
        let mut scheduler = TimelineScheduler::new();
        let mut target = RecordingTarget::new();
        let mut sink = CollectSink::new();
        let result = block_on(export_frames(&keyframes, &mut scheduler, &mut target, &mut sink, 0));
        assert!(matches!(result, Err(TimelineError::InvalidFps(0))));
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error type for timeline operations.

use thiserror::Error;

/// Timeline errors
#[derive(Debug, Error)]
pub enum TimelineError {
    /// Keyframe index does not exist
    #[error("Keyframe index {index} out of range (timeline has {len} keyframes)")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Number of keyframes in the store
        len: usize,
    },

    /// Commit or cancel without a preceding select
    #[error("No keyframe is being edited")]
    NoEditSession,

    /// Structural change requested while a keyframe is being edited
    #[error("Keyframe {0} is being edited; commit or cancel first")]
    EditSessionActive(usize),

    /// Light count changed at a keyframe with an incoming transition
    #[error("Light list of keyframe {0} cannot be restructured")]
    StructureLocked(usize),

    /// Structural change requested during playback or export
    #[error("Timeline is being played back")]
    PlaybackActive,

    /// Export requested for a timeline with nothing to show
    #[error("Cannot export a timeline with zero duration")]
    EmptyTimeline,

    /// Export requested with a zero frame rate
    #[error("Invalid export frame rate: {0}")]
    InvalidFps(u32),

    /// The frame sink refused a frame, aborting the export
    #[error("Frame {index} rejected by sink: {reason}")]
    FrameRejected {
        /// Frame index that failed
        index: u32,
        /// Reason reported by the sink
        reason: String,
    },

    /// RON parse error
    #[error("RON parse error: {0}")]
    RonParse(#[from] ron::error::SpannedError),

    /// RON serialization error
    #[error("RON error: {0}")]
    Ron(#[from] ron::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for timeline operations
pub type Result<T> = std::result::Result<T, TimelineError>;

/// Error reported by a frame sink for a single frame
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct SinkError(pub String);

impl SinkError {
    /// Create a sink error from a message
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

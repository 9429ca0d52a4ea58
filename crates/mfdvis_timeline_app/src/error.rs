// SPDX-License-Identifier: MIT OR Apache-2.0
//! Command line errors.

use mfdvis_timeline::TimelineError;
use thiserror::Error;

/// Errors reported by the command line front end
#[derive(Debug, Error)]
pub enum AppError {
    /// Timeline operation failed
    #[error(transparent)]
    Timeline(#[from] TimelineError),

    /// The timeline file has no keyframes
    #[error("No keyframes in {0}")]
    NoKeyframes(String),

    /// Writing output failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding output failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! JSON-lines frame sink.

use futures::future::{self, FutureExt, LocalBoxFuture};
use mfdvis_timeline::{AppliedState, ExportFrame, FrameSink, SinkError};
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct FrameLine<'a> {
    index: u32,
    time: f32,
    state: &'a AppliedState,
}

/// Writes one JSON object per exported frame
pub struct JsonLinesWriter<W: Write> {
    out: W,
    written: u32,
}

impl<W: Write> JsonLinesWriter<W> {
    /// Wrap a writer
    pub fn new(out: W) -> Self {
        Self { out, written: 0 }
    }

    /// Frames written so far
    pub fn written(&self) -> u32 {
        self.written
    }

    /// Flush and return the writer
    pub fn finish(mut self) -> std::io::Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }

    fn write_frame(&mut self, frame: &ExportFrame<AppliedState>) -> Result<(), SinkError> {
        let line = FrameLine {
            index: frame.index,
            time: frame.time,
            state: &frame.image,
        };
        serde_json::to_writer(&mut self.out, &line).map_err(|e| SinkError::new(e.to_string()))?;
        self.out
            .write_all(b"\n")
            .map_err(|e| SinkError::new(e.to_string()))?;
        self.written += 1;
        Ok(())
    }
}

impl<W: Write> FrameSink<AppliedState> for JsonLinesWriter<W> {
    fn submit(&mut self, frame: ExportFrame<AppliedState>) -> LocalBoxFuture<'_, Result<(), SinkError>> {
        let result = self.write_frame(&frame);
        future::ready(result).boxed_local()
    }
}

use std::path::PathBuf;

use crate::compose::stream::FrameRgba;
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::ReelResult;

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frames-per-second.
    pub fps: Fps,
    /// Exact number of frames that will be pushed.
    pub frame_count: u64,
    /// Narration track to mux, if any.
    pub audio: Option<AudioInputConfig>,
}

/// Raw PCM audio input for sinks that encode audio.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioInputConfig {
    /// Path to interleaved `f32le` PCM data.
    pub path: PathBuf,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
}

/// Sink contract for consuming composited frames in timeline order.
///
/// `push_frame` is called with strictly increasing [`FrameIndex`] values. After a failure or a
/// cancellation the driver calls [`FrameSink::abort`] instead of [`FrameSink::end`].
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()>;
    /// Push one frame.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRgba) -> ReelResult<()>;
    /// Called once after the last frame; finalises the output.
    fn end(&mut self) -> ReelResult<()>;
    /// Discard everything written so far. Must leave no output behind.
    fn abort(&mut self) {}
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, FrameRgba)>,
    finished: bool,
    keep_pixels: bool,
}

impl InMemorySink {
    /// A sink that records frame indices and pixels.
    pub fn new() -> Self {
        Self {
            keep_pixels: true,
            ..Self::default()
        }
    }

    /// A sink that records frame indices only, dropping pixel data.
    pub fn counting() -> Self {
        Self::default()
    }

    /// Configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<&SinkConfig> {
        self.cfg.as_ref()
    }

    /// Captured frames in push order (empty pixel buffers for a counting sink).
    pub fn frames(&self) -> &[(FrameIndex, FrameRgba)] {
        &self.frames
    }

    /// `true` once `end` ran.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.finished = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRgba) -> ReelResult<()> {
        let frame = if self.keep_pixels {
            frame.clone()
        } else {
            FrameRgba {
                width: frame.width,
                height: frame.height,
                data: Vec::new(),
            }
        };
        self.frames.push((idx, frame));
        Ok(())
    }

    fn end(&mut self) -> ReelResult<()> {
        self.finished = true;
        Ok(())
    }

    fn abort(&mut self) {
        self.frames.clear();
        self.finished = false;
    }
}

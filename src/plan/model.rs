use std::path::PathBuf;

use crate::foundation::core::{Canvas, TimeWindow};
use crate::foundation::error::{ReelError, ReelResult};

/// One spoken word with its timing, in seconds.
///
/// Within a [`Segment`] the times are relative to the segment's own audio. After timing
/// normalization they are absolute on the output timeline. Serialized as `{word, start, end}`,
/// the same shape the synthesis stage persists for debugging.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TimedWord {
    /// Word text as spoken.
    #[serde(rename = "word", alias = "text")]
    pub text: String,
    /// Start time in seconds.
    pub start: f64,
    /// End time in seconds.
    pub end: f64,
}

impl TimedWord {
    /// Create a word timing.
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }

    /// Visibility window `[start, end)`.
    pub fn window(&self) -> TimeWindow {
        TimeWindow::new(self.start, self.end)
    }

    /// Return `true` when the word has a positive, finite duration.
    pub fn is_well_formed(&self) -> bool {
        self.window().is_positive()
    }

    pub(crate) fn shifted(&self, offset: f64) -> Self {
        Self {
            text: self.text.clone(),
            start: self.start + offset,
            end: self.end + offset,
        }
    }
}

/// One narration unit: an audio file, its word timings and its true duration.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Segment {
    /// Narration audio for this unit.
    pub audio_path: PathBuf,
    /// Word timings relative to the start of `audio_path`.
    #[serde(default)]
    pub words: Vec<TimedWord>,
    /// Length of `audio_path` in seconds.
    pub duration: f64,
}

impl Segment {
    /// Create a segment.
    pub fn new(audio_path: impl Into<PathBuf>, words: Vec<TimedWord>, duration: f64) -> Self {
        Self {
            audio_path: audio_path.into(),
            words,
            duration,
        }
    }
}

/// Where an overlay sits on the canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    /// Centred on both axes.
    #[default]
    Centered,
    /// Top-left corner at the given canvas position in pixels.
    Custom {
        /// Left edge in pixels.
        x: i32,
        /// Top edge in pixels.
        y: i32,
    },
}

/// A still image shown for a fixed window of the output timeline.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OverlayWindow {
    /// Image file (raster formats supported by `image`, or `.svg`).
    pub asset: PathBuf,
    /// First visible instant, seconds.
    pub visible_from: f64,
    /// Visible until (exclusive), seconds.
    pub visible_until: f64,
    /// Canvas placement.
    #[serde(default)]
    pub placement: Placement,
}

impl OverlayWindow {
    /// Centred overlay visible during `[visible_from, visible_until)`.
    pub fn centered(asset: impl Into<PathBuf>, visible_from: f64, visible_until: f64) -> Self {
        Self {
            asset: asset.into(),
            visible_from,
            visible_until,
            placement: Placement::Centered,
        }
    }

    /// Visibility window.
    pub fn window(&self) -> TimeWindow {
        TimeWindow::new(self.visible_from, self.visible_until)
    }
}

/// Complete, read-only description of one render job.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RenderPlan {
    /// Resolved background video.
    pub background_path: PathBuf,
    /// Output frame size.
    pub canvas: Canvas,
    /// Narration segments in presentation order.
    pub segments: Vec<Segment>,
    /// Still overlays.
    #[serde(default)]
    pub overlays: Vec<OverlayWindow>,
    /// Destination video file.
    pub output_path: PathBuf,
}

impl RenderPlan {
    /// Sum of segment durations, in presentation order.
    pub fn total_duration(&self) -> f64 {
        self.segments.iter().map(|s| s.duration).sum()
    }

    /// Check structural invariants that do not need any file access.
    pub fn validate(&self) -> ReelResult<()> {
        self.canvas.validate()?;
        if self.segments.is_empty() {
            return Err(ReelError::validation(
                "render plan must contain at least one segment",
            ));
        }
        for (i, seg) in self.segments.iter().enumerate() {
            if !seg.duration.is_finite() || seg.duration < 0.0 {
                return Err(ReelError::validation(format!(
                    "segment {i} has invalid duration {}",
                    seg.duration
                )));
            }
        }
        if self.total_duration() <= 0.0 {
            return Err(ReelError::validation(
                "render plan total duration must be > 0",
            ));
        }
        for ov in &self.overlays {
            if !ov.window().is_positive() {
                return Err(ReelError::validation(format!(
                    "overlay '{}' must have visible_until > visible_from",
                    ov.asset.display()
                )));
            }
        }
        if self.output_path.as_os_str().is_empty() {
            return Err(ReelError::validation("output path must be non-empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/plan/model.rs"]
mod tests;

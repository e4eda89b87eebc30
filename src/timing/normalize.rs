use std::path::Path;

use anyhow::Context as _;

use crate::foundation::error::{ReelError, ReelResult};
use crate::plan::model::{Segment, TimedWord};

/// All word timings of one render on a single absolute time axis.
///
/// Derived from the segments on demand; recompute it whenever segment order or durations change.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct GlobalTimeline {
    /// Words with absolute `start`/`end`, in presentation order.
    pub words: Vec<TimedWord>,
    /// Absolute start offset of each segment (same indexing as the input).
    pub segment_offsets: Vec<f64>,
    /// Sum of all segment durations.
    pub total_duration: f64,
}

impl GlobalTimeline {
    /// Absolute `[start, end)` span of segment `idx`, if it exists.
    pub fn segment_span(&self, idx: usize, segments: &[Segment]) -> Option<(f64, f64)> {
        let start = *self.segment_offsets.get(idx)?;
        let seg = segments.get(idx)?;
        Some((start, start + seg.duration))
    }
}

/// Merge per-segment word timings into one timeline.
///
/// Segment `k` is shifted by the sum of durations of segments `0..k`. Words keep their order and
/// are never merged; a segment without words still advances the offset.
#[tracing::instrument(skip(segments), fields(segments = segments.len()))]
pub fn normalize_segments(segments: &[Segment]) -> GlobalTimeline {
    let mut words = Vec::with_capacity(segments.iter().map(|s| s.words.len()).sum());
    let mut segment_offsets = Vec::with_capacity(segments.len());
    let mut offset = 0.0f64;

    for seg in segments {
        segment_offsets.push(offset);
        words.extend(seg.words.iter().map(|w| w.shifted(offset)));
        offset += seg.duration;
    }

    tracing::debug!(
        words = words.len(),
        total_duration = offset,
        "normalized word timings"
    );
    GlobalTimeline {
        words,
        segment_offsets,
        total_duration: offset,
    }
}

/// Persist word timings as a pretty JSON array of `{word, start, end}`.
///
/// This file is a debugging artifact; the render pipeline never reads it back mid-run.
pub fn save_word_timings(words: &[TimedWord], out_path: &Path) -> ReelResult<()> {
    if let Some(parent) = out_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| {
            ReelError::resource(parent, format!("failed to create timings directory: {e}"))
        })?;
    }
    let json = serde_json::to_string_pretty(words).context("serialize word timings")?;
    std::fs::write(out_path, json)
        .map_err(|e| ReelError::resource(out_path, format!("failed to write timings: {e}")))
}

/// Load word timings written by [`save_word_timings`] (or by the synthesis stage).
pub fn load_word_timings(path: &Path) -> ReelResult<Vec<TimedWord>> {
    let bytes = std::fs::read(path).map_err(|e| ReelError::input(path, e.to_string()))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| ReelError::input(path, format!("invalid word timings json: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/timing/normalize.rs"]
mod tests;

use std::path::{Path, PathBuf};

use crate::assets::media::probe_audio_duration;
use crate::config::RenderOptions;
use crate::foundation::core::Canvas;
use crate::foundation::error::{ReelError, ReelResult};
use crate::plan::model::{OverlayWindow, Placement, RenderPlan, Segment, TimedWord};
use crate::timing::normalize::load_word_timings;

/// On-disk job description.
///
/// Relative paths resolve against the directory holding the manifest file.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobManifest {
    /// Background video.
    pub background: PathBuf,
    /// Destination file.
    pub output: PathBuf,
    /// Canvas override; the render options' canvas otherwise.
    #[serde(default)]
    pub canvas: Option<Canvas>,
    /// Narration segments in presentation order.
    pub segments: Vec<SegmentSpec>,
    /// Still overlays.
    #[serde(default)]
    pub overlays: Vec<OverlaySpec>,
}

/// One narration segment in a manifest.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SegmentSpec {
    /// Narration audio.
    pub audio: PathBuf,
    /// Inline word timings.
    #[serde(default)]
    pub words: Vec<TimedWord>,
    /// JSON file of word timings, appended after any inline words.
    #[serde(default)]
    pub words_file: Option<PathBuf>,
    /// Duration reported by the synthesiser; probed from `audio` when absent.
    #[serde(default)]
    pub duration: Option<f64>,
}

/// One overlay in a manifest: either an explicit window or the span of a segment.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OverlaySpec {
    /// Image file.
    pub asset: PathBuf,
    /// Window start in seconds.
    #[serde(default)]
    pub visible_from: Option<f64>,
    /// Window end in seconds.
    #[serde(default)]
    pub visible_until: Option<f64>,
    /// Show for exactly this segment's span instead of an explicit window.
    #[serde(default)]
    pub segment: Option<usize>,
    /// Position on the canvas.
    #[serde(default)]
    pub placement: Placement,
}

impl JobManifest {
    /// Parse a manifest file.
    pub fn from_path(path: &Path) -> ReelResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| ReelError::input(path, e.to_string()))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| ReelError::input(path, format!("invalid job manifest: {e}")))
    }

    /// Resolve paths against `base_dir`, load timing files, probe missing durations.
    pub fn to_plan(&self, base_dir: &Path, opts: &RenderOptions) -> ReelResult<RenderPlan> {
        let resolve = |p: &Path| {
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                base_dir.join(p)
            }
        };

        let mut segments = Vec::with_capacity(self.segments.len());
        for (i, spec) in self.segments.iter().enumerate() {
            let audio_path = resolve(&spec.audio);
            let mut words = spec.words.clone();
            if let Some(file) = &spec.words_file {
                words.extend(load_word_timings(&resolve(file))?);
            }
            let duration = match spec.duration {
                Some(d) => d,
                None => {
                    let d = probe_audio_duration(&audio_path)?;
                    tracing::debug!(segment = i, duration = d, "probed segment duration");
                    d
                }
            };
            segments.push(Segment::new(audio_path, words, duration));
        }

        let mut offsets = Vec::with_capacity(segments.len());
        let mut acc = 0.0f64;
        for seg in &segments {
            offsets.push(acc);
            acc += seg.duration;
        }

        let mut overlays = Vec::with_capacity(self.overlays.len());
        for spec in &self.overlays {
            let (visible_from, visible_until) =
                match (spec.segment, spec.visible_from, spec.visible_until) {
                    (Some(idx), None, None) => {
                        let seg = segments.get(idx).ok_or_else(|| {
                            ReelError::validation(format!(
                                "overlay '{}' refers to missing segment {idx}",
                                spec.asset.display()
                            ))
                        })?;
                        (offsets[idx], offsets[idx] + seg.duration)
                    }
                    (None, Some(from), Some(until)) => (from, until),
                    _ => {
                        return Err(ReelError::validation(format!(
                            "overlay '{}' needs either `segment` or both `visible_from` and \
                             `visible_until`",
                            spec.asset.display()
                        )));
                    }
                };
            overlays.push(OverlayWindow {
                asset: resolve(&spec.asset),
                visible_from,
                visible_until,
                placement: spec.placement,
            });
        }

        let plan = RenderPlan {
            background_path: resolve(&self.background),
            canvas: self.canvas.unwrap_or(opts.canvas),
            segments,
            overlays,
            output_path: resolve(&self.output),
        };
        plan.validate()?;
        Ok(plan)
    }
}

/// Read a manifest and build its plan, with paths relative to the manifest's directory.
pub fn load_plan(manifest_path: &Path, opts: &RenderOptions) -> ReelResult<RenderPlan> {
    let manifest = JobManifest::from_path(manifest_path)?;
    let base_dir = manifest_path.parent().unwrap_or(Path::new(""));
    manifest.to_plan(base_dir, opts)
}

#[cfg(test)]
#[path = "../../tests/unit/plan/manifest.rs"]
mod tests;

//! Storyreel composes narrated vertical videos.
//!
//! A [`RenderPlan`] (narration segments with word timings, a background video, still overlays)
//! becomes one video file with a caption per spoken word:
//!
//! - Merge per-segment word timings into one timeline ([`normalize_segments`])
//! - Fit the background to the canvas and the narration length ([`FitPlan`])
//! - Rasterise captions and place overlays, then composite every frame ([`CompositeStream`])
//! - Stream frames and the concatenated narration into a [`FrameSink`] ([`render`])
//!
//! Decoding and encoding shell out to `ffmpeg`/`ffprobe` (feature `media-ffmpeg`).
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod foundation;

pub(crate) mod audio;
pub(crate) mod canvas;
pub(crate) mod captions;
pub(crate) mod compose;
/// Render options.
pub mod config;
/// Encoding sinks.
pub mod encode;
pub(crate) mod overlay;
pub(crate) mod plan;
pub(crate) mod render;
pub(crate) mod timing;

#[cfg(test)]
#[path = "../tests/unit/support.rs"]
pub(crate) mod test_support;

pub use crate::foundation::cancel::CancelToken;
pub use crate::foundation::core::{Canvas, Fps, FrameIndex, FrameRange, TimeWindow};
pub use crate::foundation::error::{ErrorKind, ReelError, ReelResult};

pub use crate::assets::decode::{decode_image, decode_image_file, rasterize_svg};
pub use crate::assets::media::{
    AudioPcm, FittedBackgroundDecoder, decode_audio_f32_stereo, decode_fitted_frame_at,
    is_tool_on_path, probe_audio_duration, probe_background,
};
pub use crate::assets::sprite::Sprite;
pub use crate::assets::text::TextRasterizer;
pub use crate::audio::concat::{
    NarrationTrack, check_segment_duration, concat_pcm, concat_segments,
};
pub use crate::canvas::fit::{BackgroundInfo, CropWindow, FitPlan};
pub use crate::captions::render::{CaptionUnit, render_captions, render_captions_with};
pub use crate::compose::stream::{
    BackgroundFrames, CompositeStream, DecodedBackground, FrameRgba, SolidBackground,
};
pub use crate::config::{CaptionAnchor, CaptionStyle, RenderOptions, Rgba8};
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
pub use crate::encode::sink::{AudioInputConfig, FrameSink, InMemorySink, SinkConfig};
pub use crate::overlay::place::{PlacedOverlay, place_overlays, place_sprite};
pub use crate::plan::collab::{
    BackgroundSource, Input, Narration, NarrationSynth, Story, StoryInputs, StorySource,
    TitleCardCapture, assemble_plan, plan_story,
};
pub use crate::plan::manifest::{JobManifest, OverlaySpec, SegmentSpec, load_plan};
pub use crate::plan::model::{OverlayWindow, Placement, RenderPlan, Segment, TimedWord};
pub use crate::plan::script::{
    DEFAULT_BODY_LIMIT, TICKS_PER_SECOND, WordBoundary, boundaries_to_words, clean_text,
    truncate_body,
};
pub use crate::render::pipeline::{
    PreparedLayers, RenderReport, drive, prepare_layers, render, render_frame_at,
    save_frame_png,
};
pub use crate::timing::normalize::{
    GlobalTimeline, load_word_timings, normalize_segments, save_word_timings,
};

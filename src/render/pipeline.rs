use std::path::{Path, PathBuf};

use crate::assets::media::{
    FittedBackgroundDecoder, decode_fitted_frame_at, probe_background, require_file,
};
use crate::audio::concat::concat_segments;
use crate::canvas::fit::FitPlan;
use crate::captions::render::{CaptionUnit, render_captions};
use crate::compose::stream::{BackgroundFrames, CompositeStream, DecodedBackground, FrameRgba};
use crate::config::RenderOptions;
use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
use crate::encode::sink::{AudioInputConfig, FrameSink, SinkConfig};
use crate::foundation::cancel::CancelToken;
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::scratch::{TempFileGuard, unique_temp_path};
use crate::overlay::place::{PlacedOverlay, place_overlays};
use crate::plan::model::RenderPlan;
use crate::timing::normalize::{GlobalTimeline, normalize_segments};

/// Summary of a finished render.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderReport {
    /// Output file that now exists.
    pub output_path: PathBuf,
    /// Frames encoded: `round(total_duration * fps)`.
    pub frame_count: u64,
    /// Narration length in seconds.
    pub total_duration: f64,
    /// Caption units painted.
    pub captions: usize,
    /// Overlays painted.
    pub overlays: usize,
}

/// Output of the stages that need no background or encoder.
#[derive(Clone, Debug)]
pub struct PreparedLayers {
    /// Words on the absolute timeline.
    pub timeline: GlobalTimeline,
    /// One caption unit per well-formed word.
    pub captions: Vec<CaptionUnit>,
    /// Decoded and positioned overlays.
    pub overlays: Vec<PlacedOverlay>,
}

/// Normalise timings, render captions and place overlays.
pub fn prepare_layers(plan: &RenderPlan, opts: &RenderOptions) -> ReelResult<PreparedLayers> {
    let timeline = normalize_segments(&plan.segments);
    let captions = render_captions(&timeline.words, &opts.caption, plan.canvas)?;
    let overlays = place_overlays(&plan.overlays, plan.canvas, opts.safe_margin)?;
    Ok(PreparedLayers {
        timeline,
        captions,
        overlays,
    })
}

fn check_plan(plan: &RenderPlan, opts: &RenderOptions) -> ReelResult<()> {
    opts.validate()?;
    plan.validate()?;
    // Overlays are fitted to the plan's canvas, which may differ from `opts.canvas`.
    if opts.safe_margin >= plan.canvas.width {
        return Err(ReelError::validation(format!(
            "safe_margin {} must be smaller than the plan canvas width {}",
            opts.safe_margin, plan.canvas.width
        )));
    }
    Ok(())
}

fn check_inputs(plan: &RenderPlan, opts: &RenderOptions) -> ReelResult<()> {
    check_plan(plan, opts)?;
    require_file(&plan.background_path)?;
    for seg in &plan.segments {
        require_file(&seg.audio_path)?;
    }
    for ov in &plan.overlays {
        require_file(&ov.asset)?;
    }
    Ok(())
}

/// Render `plan` to `plan.output_path`.
///
/// The output path only ever receives a complete file. On any error, including cancellation,
/// nothing is left at the destination and intermediate files are removed.
#[tracing::instrument(skip_all, fields(out = %plan.output_path.display()))]
pub fn render(
    plan: &RenderPlan,
    opts: &RenderOptions,
    cancel: &CancelToken,
) -> ReelResult<RenderReport> {
    check_inputs(plan, opts)?;
    let total_duration = plan.total_duration();
    tracing::info!(
        segments = plan.segments.len(),
        overlays = plan.overlays.len(),
        total_duration,
        "render started"
    );

    cancel.check()?;
    let bg_info = probe_background(&plan.background_path)?;
    let fit = FitPlan::compute(bg_info, total_duration, plan.canvas)?;
    cancel.check()?;

    let layers = prepare_layers(plan, opts)?;
    cancel.check()?;

    let narration = concat_segments(
        &plan.segments,
        opts.audio_sample_rate,
        opts.duration_tolerance_secs,
        cancel,
    )?;
    let audio_path = unique_temp_path("storyreel_narration", "f32le");
    let _audio_tmp = TempFileGuard::new(audio_path.clone());
    narration.write_f32le(&audio_path)?;
    cancel.check()?;

    let stream = CompositeStream::new(
        plan.canvas,
        opts.fps,
        total_duration,
        fit.frame_width(),
        opts.letterbox,
        &layers.overlays,
        &layers.captions,
    )?;

    let decoder = FittedBackgroundDecoder::spawn(
        &plan.background_path,
        &fit,
        opts.fps,
        stream.frame_count(),
    )?;
    let mut background = DecodedBackground::new(decoder, fit.frame_width());
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::from_options(&plan.output_path, opts));
    let audio = AudioInputConfig {
        path: audio_path.clone(),
        sample_rate: narration.sample_rate,
        channels: narration.channels,
    };

    let frame_count = drive(&stream, &mut background, &mut sink, Some(audio), cancel)?;
    // All frames were read; a decoder failure past that point does not affect the output.
    if let Err(e) = background.finish() {
        tracing::debug!(error = %e, "background decoder exited uncleanly after the last frame");
    }

    tracing::info!(frame_count, out = %plan.output_path.display(), "render finished");
    Ok(RenderReport {
        output_path: plan.output_path.clone(),
        frame_count,
        total_duration,
        captions: stream.caption_count(),
        overlays: stream.overlay_count(),
    })
}

/// Paint every frame of `stream` into `sink`.
///
/// Fails with [`ReelError::Timing`] if the background runs out before the last frame and with
/// [`ReelError::Cancelled`] when `cancel` fires. The sink is aborted on every failure.
pub fn drive(
    stream: &CompositeStream,
    background: &mut dyn BackgroundFrames,
    sink: &mut dyn FrameSink,
    audio: Option<AudioInputConfig>,
    cancel: &CancelToken,
) -> ReelResult<u64> {
    let canvas = stream.canvas();
    let cfg = SinkConfig {
        width: canvas.width,
        height: canvas.height,
        fps: stream.fps(),
        frame_count: stream.frame_count(),
        audio,
    };
    let result = run_sink(stream, background, sink, cfg, cancel);
    if let Err(e) = &result {
        tracing::debug!(error = %e, "aborting sink");
        sink.abort();
    }
    result
}

fn run_sink(
    stream: &CompositeStream,
    background: &mut dyn BackgroundFrames,
    sink: &mut dyn FrameSink,
    cfg: SinkConfig,
    cancel: &CancelToken,
) -> ReelResult<u64> {
    sink.begin(cfg)?;
    let range = stream.frame_range();
    let total = range.len_frames();
    let mut bg = Vec::new();
    let mut frame = FrameRgba::blank(stream.canvas());
    for i in range.start.0..range.end.0 {
        cancel.check()?;
        if !background.next_frame(&mut bg)? {
            return Err(ReelError::timing(format!(
                "fitted background ended after {i} of {total} frames"
            )));
        }
        let idx = FrameIndex(i);
        stream.paint_frame(stream.frame_time(idx), &bg, &mut frame)?;
        sink.push_frame(idx, &frame)?;
    }
    sink.end()?;
    Ok(total)
}

/// Composite the single frame shown at time `t`.
#[tracing::instrument(skip(plan, opts))]
pub fn render_frame_at(plan: &RenderPlan, opts: &RenderOptions, t: f64) -> ReelResult<FrameRgba> {
    check_plan(plan, opts)?;
    require_file(&plan.background_path)?;
    let total_duration = plan.total_duration();
    if !(0.0..total_duration).contains(&t) {
        return Err(ReelError::validation(format!(
            "frame time {t} is outside [0, {total_duration})"
        )));
    }

    let fit = FitPlan::compute(
        probe_background(&plan.background_path)?,
        total_duration,
        plan.canvas,
    )?;
    let layers = prepare_layers(plan, opts)?;
    let stream = CompositeStream::new(
        plan.canvas,
        opts.fps,
        total_duration,
        fit.frame_width(),
        opts.letterbox,
        &layers.overlays,
        &layers.captions,
    )?;
    let bg = decode_fitted_frame_at(&plan.background_path, &fit, t)?;
    let mut frame = FrameRgba::blank(plan.canvas);
    stream.paint_frame(t, &bg, &mut frame)?;
    Ok(frame)
}

/// Write a premultiplied frame as a straight-alpha PNG.
pub fn save_frame_png(frame: &FrameRgba, out_path: &Path) -> ReelResult<()> {
    crate::encode::ffmpeg::ensure_parent_dir(out_path)?;
    let mut straight = frame.data.clone();
    unpremultiply_rgba8_in_place(&mut straight);
    let img = image::RgbaImage::from_raw(frame.width, frame.height, straight)
        .ok_or_else(|| ReelError::validation("frame buffer does not match its size"))?;
    img.save_with_format(out_path, image::ImageFormat::Png)
        .map_err(|e| ReelError::resource(out_path, format!("failed to write png: {e}")))
}

fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u32::from(px[3]);
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u32::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;

use std::sync::Arc;

use crate::assets::media::FittedBackgroundDecoder;
use crate::assets::sprite::Sprite;
use crate::captions::render::CaptionUnit;
use crate::config::Rgba8;
use crate::foundation::core::{Canvas, Fps, FrameIndex, FrameRange, TimeWindow};
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::{over, premultiply_rgba8_in_place};
use crate::overlay::place::PlacedOverlay;

/// One composited frame, premultiplied RGBA8 in row-major order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRgba {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// `width * height * 4` bytes.
    pub data: Vec<u8>,
}

impl FrameRgba {
    /// A transparent frame of the canvas size.
    pub fn blank(canvas: Canvas) -> Self {
        Self {
            width: canvas.width,
            height: canvas.height,
            data: vec![0; canvas.rgba_len()],
        }
    }

    /// Pixel at (`x`, `y`), if inside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }
}

/// Sequential source of fitted background frames (opaque RGBA8, canvas height).
pub trait BackgroundFrames {
    /// Width of every frame produced; at most the canvas width.
    fn frame_width(&self) -> u32;
    /// Read the next frame into `buf`. Returns `false` once the source is exhausted.
    fn next_frame(&mut self, buf: &mut Vec<u8>) -> ReelResult<bool>;
}

/// Decoder-backed background of fixed width.
pub struct DecodedBackground {
    decoder: FittedBackgroundDecoder,
    width: u32,
}

impl DecodedBackground {
    /// Wrap a running decoder whose frames are `width` pixels wide.
    pub fn new(decoder: FittedBackgroundDecoder, width: u32) -> Self {
        Self { decoder, width }
    }

    /// Wait for the decoder process and surface its errors.
    pub fn finish(self) -> ReelResult<()> {
        self.decoder.finish()
    }
}

impl BackgroundFrames for DecodedBackground {
    fn frame_width(&self) -> u32 {
        self.width
    }

    fn next_frame(&mut self, buf: &mut Vec<u8>) -> ReelResult<bool> {
        self.decoder.next_frame(buf)
    }
}

/// A single-colour background with a fixed number of frames.
#[derive(Clone, Debug)]
pub struct SolidBackground {
    width: u32,
    height: u32,
    rgba: [u8; 4],
    remaining: u64,
}

impl SolidBackground {
    /// `frames` frames of `width` x `height` filled with an opaque colour.
    pub fn new(width: u32, height: u32, color: Rgba8, frames: u64) -> Self {
        Self {
            width,
            height,
            rgba: [color.r, color.g, color.b, 255],
            remaining: frames,
        }
    }
}

impl BackgroundFrames for SolidBackground {
    fn frame_width(&self) -> u32 {
        self.width
    }

    fn next_frame(&mut self, buf: &mut Vec<u8>) -> ReelResult<bool> {
        if self.remaining == 0 {
            return Ok(false);
        }
        self.remaining -= 1;
        buf.clear();
        buf.reserve(self.width as usize * self.height as usize * 4);
        for _ in 0..(self.width as usize * self.height as usize) {
            buf.extend_from_slice(&self.rgba);
        }
        Ok(true)
    }
}

#[derive(Clone, Debug)]
struct Layer {
    window: TimeWindow,
    sprite: Arc<Sprite>,
    x: i32,
    y: i32,
}

/// Timing and layer stack for one render; paints frames on request.
///
/// Windows are clipped to `[0, total_duration]` when the stream is built. A layer is visible on
/// a frame when the frame's start time falls inside its window. Overlays are painted before
/// captions, each group in input order.
#[derive(Clone, Debug)]
pub struct CompositeStream {
    canvas: Canvas,
    fps: Fps,
    total_duration: f64,
    frame_count: u64,
    background_width: u32,
    letterbox_premul: [u8; 4],
    layers: Vec<Layer>,
    overlay_layers: usize,
}

impl CompositeStream {
    /// Build the layer stack.
    #[tracing::instrument(skip_all, fields(total_duration = total_duration, overlays = overlays.len(), captions = captions.len()))]
    pub fn new(
        canvas: Canvas,
        fps: Fps,
        total_duration: f64,
        background_width: u32,
        letterbox: Rgba8,
        overlays: &[PlacedOverlay],
        captions: &[CaptionUnit],
    ) -> ReelResult<Self> {
        canvas.validate()?;
        if !total_duration.is_finite() || total_duration <= 0.0 {
            return Err(ReelError::validation(
                "composited duration must be finite and > 0",
            ));
        }
        if background_width == 0 || background_width > canvas.width {
            return Err(ReelError::validation(format!(
                "background width {background_width} does not fit canvas width {}",
                canvas.width
            )));
        }

        let overlay_items = overlays
            .iter()
            .map(|o| ("overlay", o.window, &o.sprite, o.x, o.y));
        let caption_items = captions
            .iter()
            .map(|c| ("caption", c.window, &c.sprite, c.x, c.y));
        let mut layers: Vec<Layer> = overlay_items
            .filter_map(|(kind, w, s, x, y)| clip_layer(kind, w, s, x, y, total_duration))
            .collect();
        let overlay_layers = layers.len();
        layers.extend(
            caption_items
                .filter_map(|(kind, w, s, x, y)| clip_layer(kind, w, s, x, y, total_duration)),
        );

        let frame_count = fps.secs_to_frames_round(total_duration);
        tracing::info!(frame_count, layers = layers.len(), "composite stream ready");

        let mut letterbox_premul = letterbox.to_array();
        premultiply_rgba8_in_place(&mut letterbox_premul);
        Ok(Self {
            canvas,
            fps,
            total_duration,
            frame_count,
            background_width,
            letterbox_premul,
            layers,
            overlay_layers,
        })
    }

    /// Output frame size.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Output frame rate.
    pub fn fps(&self) -> Fps {
        self.fps
    }

    /// Exact output length: the narration length.
    pub fn total_duration(&self) -> f64 {
        self.total_duration
    }

    /// `round(total_duration * fps)`.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Every output frame, `[0, frame_count)`.
    pub fn frame_range(&self) -> FrameRange {
        FrameRange {
            start: FrameIndex(0),
            end: FrameIndex(self.frame_count),
        }
    }

    /// Number of overlay layers kept after clipping.
    pub fn overlay_count(&self) -> usize {
        self.overlay_layers
    }

    /// Number of caption layers kept after clipping.
    pub fn caption_count(&self) -> usize {
        self.layers.len() - self.overlay_layers
    }

    /// Start time of frame `idx`, in seconds.
    pub fn frame_time(&self, idx: FrameIndex) -> f64 {
        self.fps.frames_to_secs(idx.0)
    }

    /// Paint the frame shown at time `t` from one fitted background frame.
    pub fn paint_frame(&self, t: f64, background: &[u8], out: &mut FrameRgba) -> ReelResult<()> {
        let (cw, ch) = (self.canvas.width as usize, self.canvas.height as usize);
        let bw = self.background_width as usize;
        if background.len() != bw * ch * 4 {
            return Err(ReelError::backend(format!(
                "background frame has {} bytes, expected {}x{} rgba",
                background.len(),
                bw,
                ch
            )));
        }
        out.width = self.canvas.width;
        out.height = self.canvas.height;
        out.data.resize(cw * ch * 4, 0);

        let x0 = (cw - bw) / 2;
        for (row, src) in out
            .data
            .chunks_exact_mut(cw * 4)
            .zip(background.chunks_exact(bw * 4))
        {
            if bw < cw {
                for px in row.chunks_exact_mut(4) {
                    px.copy_from_slice(&self.letterbox_premul);
                }
            }
            row[x0 * 4..(x0 + bw) * 4].copy_from_slice(src);
        }

        for layer in self.layers.iter().filter(|l| l.window.contains(t)) {
            blit_over(out, &layer.sprite, layer.x, layer.y);
        }
        Ok(())
    }
}

fn clip_layer(
    kind: &'static str,
    window: TimeWindow,
    sprite: &Arc<Sprite>,
    x: i32,
    y: i32,
    total_duration: f64,
) -> Option<Layer> {
    let Some(clipped) = window.clip_to(total_duration) else {
        tracing::warn!(
            kind,
            from = window.from,
            until = window.until,
            total_duration,
            "window lies outside the render, dropping"
        );
        return None;
    };
    if clipped != window {
        tracing::debug!(
            kind,
            from = window.from,
            until = window.until,
            "clipped window to the render length"
        );
    }
    Some(Layer {
        window: clipped,
        sprite: sprite.clone(),
        x,
        y,
    })
}

/// Source-over `sprite` onto `dst` with its top-left at (`x`, `y`), clipped to the frame.
pub(crate) fn blit_over(dst: &mut FrameRgba, sprite: &Sprite, x: i32, y: i32) {
    let (dw, dh) = (i64::from(dst.width), i64::from(dst.height));
    let (sw, sh) = (i64::from(sprite.width), i64::from(sprite.height));
    let (x, y) = (i64::from(x), i64::from(y));

    let x_start = x.max(0);
    let y_start = y.max(0);
    let x_end = (x + sw).min(dw);
    let y_end = (y + sh).min(dh);
    if x_start >= x_end || y_start >= y_end {
        return;
    }

    for dy in y_start..y_end {
        let sy = dy - y;
        for dx in x_start..x_end {
            let sx = dx - x;
            let si = ((sy * sw + sx) * 4) as usize;
            let di = ((dy * dw + dx) * 4) as usize;
            let src = [
                sprite.rgba8_premul[si],
                sprite.rgba8_premul[si + 1],
                sprite.rgba8_premul[si + 2],
                sprite.rgba8_premul[si + 3],
            ];
            let d = [
                dst.data[di],
                dst.data[di + 1],
                dst.data[di + 2],
                dst.data[di + 3],
            ];
            dst.data[di..di + 4].copy_from_slice(&over(d, src));
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/stream.rs"]
mod tests;

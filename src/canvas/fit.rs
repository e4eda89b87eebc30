use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{ReelError, ReelResult};

/// Intrinsic properties of a background source, as probed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackgroundInfo {
    /// Source duration in seconds.
    pub duration: f64,
    /// Source width in pixels.
    pub width: u32,
    /// Source height in pixels.
    pub height: u32,
}

/// Horizontal crop window `[x0, x1)` in scaled-frame pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CropWindow {
    /// First kept column.
    pub x0: u32,
    /// One past the last kept column.
    pub x1: u32,
}

impl CropWindow {
    /// Kept width in pixels.
    pub fn width(self) -> u32 {
        self.x1 - self.x0
    }
}

/// How a background source is mapped onto the canvas for `total_duration` seconds.
///
/// Loop-or-trim, then scale to canvas height, then centre-crop horizontally. Sources narrower than
/// the canvas are not padded by the fit; the compositor centres them over the letterbox colour.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitPlan {
    /// Source properties the plan was derived from.
    pub source: BackgroundInfo,
    /// Target output size.
    pub canvas: Canvas,
    /// Number of source passes played back to back (1 = no looping).
    pub passes: u32,
    /// Exact output duration in seconds.
    pub duration: f64,
    /// Width after aspect-preserving scale to canvas height.
    pub scaled_width: u32,
    /// Height after scaling (always the canvas height).
    pub scaled_height: u32,
    /// Crop applied when the scaled frame is wider than the canvas.
    pub crop: Option<CropWindow>,
}

impl FitPlan {
    /// Derive the fit for a source and a target duration.
    #[tracing::instrument]
    pub fn compute(
        source: BackgroundInfo,
        total_duration: f64,
        canvas: Canvas,
    ) -> ReelResult<Self> {
        canvas.validate()?;
        if !total_duration.is_finite() || total_duration <= 0.0 {
            return Err(ReelError::validation(
                "background fit target duration must be finite and > 0",
            ));
        }
        if !source.duration.is_finite() || source.duration <= 0.0 {
            return Err(ReelError::validation(format!(
                "background duration must be finite and > 0 (got {})",
                source.duration
            )));
        }
        if source.width == 0 || source.height == 0 {
            return Err(ReelError::validation(
                "background width/height must be non-zero",
            ));
        }

        let passes = if source.duration < total_duration {
            (total_duration / source.duration).ceil().max(1.0) as u32
        } else {
            1
        };

        let scaled_height = canvas.height;
        let scaled_width = scaled_width_for_height(source.width, source.height, scaled_height);
        let crop = (scaled_width > canvas.width).then(|| {
            let x0 = (scaled_width - canvas.width) / 2;
            CropWindow {
                x0,
                x1: x0 + canvas.width,
            }
        });

        Ok(Self {
            source,
            canvas,
            passes,
            duration: total_duration,
            scaled_width,
            scaled_height,
            crop,
        })
    }

    /// Combined duration of all source passes (always `>= duration`).
    pub fn looped_duration(&self) -> f64 {
        self.source.duration * f64::from(self.passes)
    }

    /// Width of the frames produced by the fit (canvas width, or less when letterboxed).
    pub fn frame_width(&self) -> u32 {
        self.crop.map(CropWindow::width).unwrap_or(self.scaled_width)
    }

    /// Left offset at which fitted frames are placed on the canvas.
    pub fn placement_x(&self) -> u32 {
        (self.canvas.width - self.frame_width()) / 2
    }

    /// Map an output time to the source time it samples (looping wraps around).
    pub fn source_time(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, self.duration);
        if self.passes <= 1 {
            return t;
        }
        t.rem_euclid(self.source.duration)
    }

    /// `ffmpeg` video filter chain that resamples to `fps`, scales and crops.
    pub fn filter_chain(&self, fps: Fps) -> String {
        let mut chain = format!(
            "fps={}/{},scale={}:{}:flags=bicubic,setsar=1",
            fps.num, fps.den, self.scaled_width, self.scaled_height
        );
        if let Some(crop) = self.crop {
            chain.push_str(&format!(
                ",crop={}:{}:{}:0",
                crop.width(),
                self.scaled_height,
                crop.x0
            ));
        }
        chain
    }
}

fn scaled_width_for_height(src_w: u32, src_h: u32, target_h: u32) -> u32 {
    let w = (f64::from(src_w) * f64::from(target_h) / f64::from(src_h)).round() as u32;
    // Even widths keep chroma-subsampled intermediates aligned.
    (w + (w & 1)).max(2)
}

#[cfg(test)]
#[path = "../../tests/unit/canvas/fit.rs"]
mod tests;

//! Immutable render options.
//!
//! One [`RenderOptions`] value is built per render (defaults, optionally a JSON file, then CLI
//! overrides) and passed by reference into every stage.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{ReelError, ReelResult};

/// Straight-alpha RGBA8 colour.
///
/// Deserializes from `"#RRGGBB"`, `"#RRGGBBAA"`, a few names (`"white"`, `"black"`, ...) or an
/// `[r, g, b]` / `[r, g, b, a]` array of bytes. Serializes as a hex string.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Opaque white.
    pub const WHITE: Self = Self::opaque(255, 255, 255);
    /// Opaque black.
    pub const BLACK: Self = Self::opaque(0, 0, 0);

    /// Opaque colour from RGB bytes.
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// `[r, g, b, a]` array form.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Parse a hex string or colour name.
    pub fn parse(s: &str) -> Result<Self, String> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "white" => return Ok(Self::WHITE),
            "black" => return Ok(Self::BLACK),
            "yellow" => return Ok(Self::opaque(255, 255, 0)),
            "red" => return Ok(Self::opaque(255, 0, 0)),
            "transparent" => return Ok(Self { r: 0, g: 0, b: 0, a: 0 }),
            _ => {}
        }
        let hex = s.strip_prefix('#').unwrap_or(s);

        fn hex_byte(pair: &str) -> Result<u8, String> {
            u8::from_str_radix(pair, 16).map_err(|_| format!("invalid hex byte \"{pair}\""))
        }

        if !hex.is_ascii() {
            return Err(format!("invalid colour \"{s}\""));
        }
        match hex.len() {
            6 => Ok(Self::opaque(
                hex_byte(&hex[0..2])?,
                hex_byte(&hex[2..4])?,
                hex_byte(&hex[4..6])?,
            )),
            8 => Ok(Self {
                r: hex_byte(&hex[0..2])?,
                g: hex_byte(&hex[2..4])?,
                b: hex_byte(&hex[4..6])?,
                a: hex_byte(&hex[6..8])?,
            }),
            _ => Err(format!(
                "colour \"{s}\" must be a name, #RRGGBB or #RRGGBBAA"
            )),
        }
    }
}

impl Serialize for Rgba8 {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!(
            "#{:02x}{:02x}{:02x}{:02x}",
            self.r, self.g, self.b, self.a
        ))
    }
}

impl<'de> Deserialize<'de> for Rgba8 {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Arr(Vec<u8>),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Text(s) => Self::parse(&s).map_err(serde::de::Error::custom),
            Repr::Arr(v) => match v.as_slice() {
                [r, g, b] => Ok(Self::opaque(*r, *g, *b)),
                [r, g, b, a] => Ok(Self {
                    r: *r,
                    g: *g,
                    b: *b,
                    a: *a,
                }),
                _ => Err(serde::de::Error::custom(
                    "rgba array must have len 3 ([r,g,b]) or 4 ([r,g,b,a])",
                )),
            },
        }
    }
}

/// Vertical anchor of the caption line on the canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptionAnchor {
    /// Caption centre sits at the canvas centre.
    #[default]
    Center,
    /// Caption centre sits at the given fraction of canvas height (0 = top, 1 = bottom).
    Fraction(f32),
}

/// Caption styling.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptionStyle {
    /// TrueType/OpenType font file used for every caption.
    pub font_path: PathBuf,
    /// Font size in pixels.
    pub font_size: f32,
    /// Glyph fill colour.
    pub fill: Rgba8,
    /// Glyph outline colour.
    pub outline: Rgba8,
    /// Outline stroke width in pixels (0 disables the outline).
    pub outline_width: f32,
    /// Wrap width in pixels. A word wider than this is broken inside itself.
    pub max_width: f32,
    /// Vertical placement.
    pub anchor: CaptionAnchor,
}

impl Default for CaptionStyle {
    fn default() -> Self {
        Self {
            font_path: PathBuf::from("assets/fonts/Arial-Bold.ttf"),
            font_size: 70.0,
            fill: Rgba8::WHITE,
            outline: Rgba8::BLACK,
            outline_width: 2.0,
            max_width: 880.0,
            anchor: CaptionAnchor::Center,
        }
    }
}

/// All tunables of a render. Defaults produce a 1080x1920, 24 fps H.264/AAC MP4.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Canvas for jobs that do not set their own. `safe_margin` is checked against it here
    /// and against the plan's canvas again at render time.
    pub canvas: Canvas,
    /// Output frame rate.
    pub fps: Fps,
    /// Caption styling.
    pub caption: CaptionStyle,
    /// Horizontal margin kept free around overlay images, in pixels.
    pub safe_margin: u32,
    /// `ffmpeg` video encoder name.
    pub video_codec: String,
    /// `ffmpeg` audio encoder name.
    pub audio_codec: String,
    /// Output pixel format.
    pub pix_fmt: String,
    /// `ffmpeg` output container (muxer) name.
    pub container: String,
    /// Sample rate of the concatenated narration track.
    pub audio_sample_rate: u32,
    /// Allowed difference between a segment's declared and decoded duration, seconds.
    pub duration_tolerance_secs: f64,
    /// Colour shown where the background does not cover the canvas.
    pub letterbox: Rgba8,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            canvas: Canvas::default(),
            fps: Fps::default(),
            caption: CaptionStyle::default(),
            safe_margin: 100,
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
            pix_fmt: "yuv420p".to_string(),
            container: "mp4".to_string(),
            audio_sample_rate: 48_000,
            duration_tolerance_secs: 0.05,
            letterbox: Rgba8::BLACK,
        }
    }
}

impl RenderOptions {
    /// Load options from a JSON file; missing keys keep their defaults.
    pub fn from_path(path: &Path) -> ReelResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| ReelError::input(path, e.to_string()))?;
        let opts: Self = serde_json::from_slice(&bytes)
            .map_err(|e| ReelError::input(path, format!("invalid options json: {e}")))?;
        opts.validate()?;
        Ok(opts)
    }

    /// Reject option combinations no render can satisfy.
    pub fn validate(&self) -> ReelResult<()> {
        self.canvas.validate()?;
        Fps::new(self.fps.num, self.fps.den)?;
        let c = &self.caption;
        if !c.font_size.is_finite() || c.font_size <= 0.0 {
            return Err(ReelError::validation(
                "caption font_size must be finite and > 0",
            ));
        }
        if !c.outline_width.is_finite() || c.outline_width < 0.0 {
            return Err(ReelError::validation(
                "caption outline_width must be finite and >= 0",
            ));
        }
        if !c.max_width.is_finite() || c.max_width <= 0.0 {
            return Err(ReelError::validation(
                "caption max_width must be finite and > 0",
            ));
        }
        if let CaptionAnchor::Fraction(f) = c.anchor
            && !(0.0..=1.0).contains(&f)
        {
            return Err(ReelError::validation(
                "caption anchor fraction must be within [0, 1]",
            ));
        }
        if self.safe_margin >= self.canvas.width {
            return Err(ReelError::validation(
                "safe_margin must be smaller than the canvas width",
            ));
        }
        if self.audio_sample_rate == 0 {
            return Err(ReelError::validation("audio_sample_rate must be non-zero"));
        }
        if !self.duration_tolerance_secs.is_finite() || self.duration_tolerance_secs < 0.0 {
            return Err(ReelError::validation(
                "duration_tolerance_secs must be finite and >= 0",
            ));
        }
        for (name, v) in [
            ("video_codec", &self.video_codec),
            ("audio_codec", &self.audio_codec),
            ("pix_fmt", &self.pix_fmt),
            ("container", &self.container),
        ] {
            if v.trim().is_empty() {
                return Err(ReelError::validation(format!("{name} must be non-empty")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;

use std::collections::HashMap;
use std::sync::Arc;

use crate::assets::sprite::Sprite;
use crate::assets::text::TextRasterizer;
use crate::config::{CaptionAnchor, CaptionStyle};
use crate::foundation::core::{Canvas, TimeWindow};
use crate::foundation::error::{ReelError, ReelResult};
use crate::plan::model::TimedWord;

/// One rendered caption, visible during `window` at canvas position (`x`, `y`).
#[derive(Clone, Debug)]
pub struct CaptionUnit {
    /// Source word.
    pub text: String,
    /// Visibility on the output timeline (not yet clipped to the render length).
    pub window: TimeWindow,
    /// Rasterised glyphs, shared between repeated words.
    pub sprite: Arc<Sprite>,
    /// Left edge on the canvas.
    pub x: i32,
    /// Top edge on the canvas.
    pub y: i32,
}

/// Render one caption unit per well-formed word, preserving input order.
///
/// Words with `end <= start` (or blank text) are dropped. Any rasterisation failure fails the
/// whole batch; no partial caption track is ever returned.
#[tracing::instrument(skip_all, fields(words = words.len(), font = %style.font_path.display()))]
pub fn render_captions(
    words: &[TimedWord],
    style: &CaptionStyle,
    canvas: Canvas,
) -> ReelResult<Vec<CaptionUnit>> {
    if !words.iter().any(is_drawable) {
        return Ok(Vec::new());
    }
    let mut raster = TextRasterizer::from_font_file(&style.font_path)?;
    render_captions_with(&mut raster, words, style, canvas)
}

/// Same as [`render_captions`] with a caller-provided rasteriser.
pub fn render_captions_with(
    raster: &mut TextRasterizer,
    words: &[TimedWord],
    style: &CaptionStyle,
    canvas: Canvas,
) -> ReelResult<Vec<CaptionUnit>> {
    let mut cache: HashMap<&str, Arc<Sprite>> = HashMap::new();
    let mut units = Vec::with_capacity(words.len());
    let mut dropped = 0usize;

    for w in words {
        if !is_drawable(w) {
            tracing::debug!(word = %w.text, start = w.start, end = w.end, "dropping malformed word");
            dropped += 1;
            continue;
        }
        let sprite = match cache.get(w.text.as_str()) {
            Some(s) => s.clone(),
            None => {
                let s = Arc::new(raster.rasterize(&w.text, style).map_err(|e| match e {
                    ReelError::Backend(msg) => {
                        ReelError::backend(format!("caption \"{}\": {msg}", w.text))
                    }
                    other => other,
                })?);
                cache.insert(w.text.as_str(), s.clone());
                s
            }
        };
        let (x, y) = caption_origin(&sprite, style, canvas);
        units.push(CaptionUnit {
            text: w.text.clone(),
            window: w.window(),
            sprite,
            x,
            y,
        });
    }

    tracing::info!(
        captions = units.len(),
        dropped,
        distinct = cache.len(),
        "rendered caption batch"
    );
    Ok(units)
}

fn is_drawable(w: &TimedWord) -> bool {
    w.is_well_formed() && !w.text.trim().is_empty()
}

/// Top-left corner that centres the sprite horizontally and on the vertical anchor.
pub(crate) fn caption_origin(sprite: &Sprite, style: &CaptionStyle, canvas: Canvas) -> (i32, i32) {
    let center_y = match style.anchor {
        CaptionAnchor::Center => f64::from(canvas.height) / 2.0,
        CaptionAnchor::Fraction(f) => f64::from(canvas.height) * f64::from(f),
    };
    let x = (i64::from(canvas.width) - i64::from(sprite.width)) / 2;
    let y = (center_y - f64::from(sprite.height) / 2.0).round() as i64;
    (x as i32, y as i32)
}

#[cfg(test)]
#[path = "../../tests/unit/captions/render.rs"]
mod tests;

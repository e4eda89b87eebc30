use std::path::Path;

use crate::assets::sprite::Sprite;
use crate::config::{CaptionStyle, Rgba8};
use crate::foundation::error::{ReelError, ReelResult};

/// Brush carried through the Parley layout. Colour is applied per pass instead.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct CaptionBrush;

/// Shapes caption text with one registered font and rasterises it to premultiplied sprites.
///
/// Each sprite carries the outline pass underneath the fill pass, with a transparent margin wide
/// enough that the stroke is never clipped.
pub struct TextRasterizer {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<CaptionBrush>,
    family_name: String,
    font: vello_cpu::peniko::FontData,
}

impl std::fmt::Debug for TextRasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextRasterizer")
            .field("family_name", &self.family_name)
            .finish_non_exhaustive()
    }
}

impl TextRasterizer {
    /// Load a font file. Missing or unparsable fonts are backend errors.
    pub fn from_font_file(path: &Path) -> ReelResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            ReelError::backend(format!("failed to read font '{}': {e}", path.display()))
        })?;
        Self::from_font_bytes(bytes).map_err(|e| match e {
            ReelError::Backend(msg) => {
                ReelError::backend(format!("font '{}': {msg}", path.display()))
            }
            other => other,
        })
    }

    /// Register raw TrueType/OpenType bytes.
    pub fn from_font_bytes(bytes: Vec<u8>) -> ReelResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(bytes.clone()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| ReelError::backend("no font families registered from font bytes"))?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| ReelError::backend("registered font family has no name"))?
            .to_string();

        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
            font: vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(bytes), 0),
        })
    }

    fn layout(
        &mut self,
        text: &str,
        size_px: f32,
        max_width_px: f32,
    ) -> parley::Layout<CaptionBrush> {
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(CaptionBrush));
        // A single word wider than the wrap width breaks inside itself.
        builder.push_default(parley::style::StyleProperty::OverflowWrap(
            parley::style::OverflowWrap::Anywhere,
        ));

        let mut layout: parley::Layout<CaptionBrush> = builder.build(text);
        layout.break_all_lines(Some(max_width_px));
        layout
    }

    /// Rasterise `text` with `style`, each line horizontally centred inside the sprite.
    pub fn rasterize(&mut self, text: &str, style: &CaptionStyle) -> ReelResult<Sprite> {
        if text.trim().is_empty() {
            return Err(ReelError::backend("cannot rasterise empty caption text"));
        }
        if !style.font_size.is_finite() || style.font_size <= 0.0 {
            return Err(ReelError::validation(
                "caption font_size must be finite and > 0",
            ));
        }

        let layout = self.layout(text, style.font_size, style.max_width);
        let text_w = f64::from(layout.width());
        let text_h = f64::from(layout.height());

        // Any `.notdef` glyph means the font cannot draw this text.
        let mut missing = 0usize;
        let mut lines: Vec<(f64, Vec<vello_cpu::Glyph>)> = Vec::new();
        for line in layout.lines() {
            let m = line.metrics();
            let visible = f64::from(m.advance - m.trailing_whitespace);
            let dx = ((text_w - visible) / 2.0).max(0.0);
            let mut glyphs = Vec::new();
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                for g in run.positioned_glyphs() {
                    if g.id == 0 {
                        missing += 1;
                    }
                    glyphs.push(vello_cpu::Glyph {
                        id: g.id,
                        x: g.x,
                        y: g.y,
                    });
                }
            }
            lines.push((dx, glyphs));
        }
        if missing > 0 {
            return Err(ReelError::backend(format!(
                "font '{}' is missing {missing} glyph(s) for caption \"{text}\"",
                self.family_name
            )));
        }

        let pad = f64::from(style.outline_width).ceil() + 2.0;
        let width = (text_w + 2.0 * pad).ceil();
        let height = (text_h + 2.0 * pad).ceil();
        let (width_u16, height_u16) = (to_u16(width)?, to_u16(height)?);

        let mut ctx = vello_cpu::RenderContext::new(width_u16, height_u16);
        if style.outline_width > 0.0 {
            ctx.set_stroke(vello_cpu::kurbo::Stroke::new(
                f64::from(style.outline_width) * 2.0,
            ));
            ctx.set_paint(paint(style.outline));
            for (dx, glyphs) in &lines {
                ctx.set_transform(vello_cpu::kurbo::Affine::translate((pad + dx, pad)));
                ctx.glyph_run(&self.font)
                    .font_size(style.font_size)
                    .stroke_glyphs(glyphs.iter().copied());
            }
        }
        ctx.set_paint(paint(style.fill));
        for (dx, glyphs) in &lines {
            ctx.set_transform(vello_cpu::kurbo::Affine::translate((pad + dx, pad)));
            ctx.glyph_run(&self.font)
                .font_size(style.font_size)
                .fill_glyphs(glyphs.iter().copied());
        }
        ctx.flush();

        let mut pixmap = vello_cpu::Pixmap::new(width_u16, height_u16);
        ctx.render_to_pixmap(&mut pixmap);
        let sprite = Sprite::from_premul(
            u32::from(width_u16),
            u32::from(height_u16),
            pixmap.data_as_u8_slice().to_vec(),
        )?;

        // A lone glyph can still be wider than the wrap width; shrink the whole sprite then.
        let max_width = (f64::from(style.max_width) + 2.0 * pad).ceil() as u32;
        if sprite.width > max_width {
            tracing::debug!(
                text,
                width = sprite.width,
                max_width,
                "scaling oversized caption down"
            );
            return sprite.scaled_to_width(max_width);
        }
        Ok(sprite)
    }
}

fn paint(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn to_u16(v: f64) -> ReelResult<u16> {
    if v.is_finite() && v >= 1.0 && v <= f64::from(u16::MAX) {
        Ok(v as u16)
    } else {
        Err(ReelError::backend(format!(
            "caption raster size {v} is out of range"
        )))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/text.rs"]
mod tests;

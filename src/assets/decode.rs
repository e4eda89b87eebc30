use std::path::Path;

use crate::assets::sprite::Sprite;
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::premultiply_rgba8_in_place;

/// Decode an overlay image file into a premultiplied sprite.
///
/// Files with an `.svg` extension are rasterised at their intrinsic size; everything else goes
/// through the `image` decoders.
pub fn decode_image_file(path: &Path) -> ReelResult<Sprite> {
    let bytes = std::fs::read(path).map_err(|e| ReelError::input(path, e.to_string()))?;
    let is_svg = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("svg"));
    let decoded = if is_svg {
        rasterize_svg(&bytes)
    } else {
        decode_image(&bytes)
    };
    decoded.map_err(|e| ReelError::input(path, e.to_string()))
}

/// Decode encoded raster image bytes and convert to premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> ReelResult<Sprite> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| ReelError::validation(format!("decode image from memory: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);
    Sprite::from_premul(width, height, rgba8_premul)
}

/// Parse SVG bytes and rasterise them at the document's intrinsic size.
pub fn rasterize_svg(bytes: &[u8]) -> ReelResult<Sprite> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts)
        .map_err(|e| ReelError::validation(format!("parse svg tree: {e}")))?;

    let size = tree.size();
    let (w, h) = (size.width(), size.height());
    if !w.is_finite() || !h.is_finite() || w <= 0.0 || h <= 0.0 {
        return Err(ReelError::validation("svg has invalid width/height"));
    }
    let width = (w.ceil() as u32).max(1);
    let height = (h.ceil() as u32).max(1);

    // Avoid pathological allocations from hostile documents.
    const MAX_DIM: u32 = 16_384;
    if width > MAX_DIM || height > MAX_DIM {
        return Err(ReelError::validation(format!(
            "svg raster size too large: {width}x{height} (max {MAX_DIM}x{MAX_DIM})"
        )));
    }

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| ReelError::backend("failed to allocate svg pixmap"))?;
    let xform = resvg::tiny_skia::Transform::from_scale(width as f32 / w, height as f32 / h);
    resvg::render(&tree, xform, &mut pixmap.as_mut());
    Sprite::from_premul(width, height, pixmap.data().to_vec())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;

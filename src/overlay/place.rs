use std::path::PathBuf;
use std::sync::Arc;

use crate::assets::decode::decode_image_file;
use crate::assets::sprite::Sprite;
use crate::foundation::core::{Canvas, TimeWindow};
use crate::foundation::error::ReelResult;
use crate::plan::model::{OverlayWindow, Placement};

/// A decoded overlay with its final size and canvas position.
#[derive(Clone, Debug)]
pub struct PlacedOverlay {
    /// Source image path.
    pub asset: PathBuf,
    /// Visibility window, taken verbatim from the [`OverlayWindow`].
    pub window: TimeWindow,
    /// Image pixels after any downscaling.
    pub sprite: Arc<Sprite>,
    /// Left edge on the canvas.
    pub x: i32,
    /// Top edge on the canvas.
    pub y: i32,
}

/// Decode and place every overlay, in input order.
///
/// An undecodable image is an input-resolution error for the whole render.
#[tracing::instrument(skip_all, fields(overlays = overlays.len()))]
pub fn place_overlays(
    overlays: &[OverlayWindow],
    canvas: Canvas,
    safe_margin: u32,
) -> ReelResult<Vec<PlacedOverlay>> {
    overlays
        .iter()
        .map(|ov| {
            let sprite = decode_image_file(&ov.asset)?;
            place_sprite(ov, sprite, canvas, safe_margin)
        })
        .collect()
}

/// Fit an already decoded image and compute its position.
///
/// Images wider than `canvas.width - safe_margin` are scaled down to that width, preserving
/// aspect ratio. Smaller images are never scaled up.
pub fn place_sprite(
    ov: &OverlayWindow,
    sprite: Sprite,
    canvas: Canvas,
    safe_margin: u32,
) -> ReelResult<PlacedOverlay> {
    let max_width = canvas.width.saturating_sub(safe_margin).max(1);
    let sprite = if sprite.width > max_width {
        tracing::debug!(
            asset = %ov.asset.display(),
            from = sprite.width,
            to = max_width,
            "scaling overlay down"
        );
        sprite.scaled_to_width(max_width)?
    } else {
        sprite
    };

    let (x, y) = match ov.placement {
        Placement::Centered => (
            centered(canvas.width, sprite.width),
            centered(canvas.height, sprite.height),
        ),
        Placement::Custom { x, y } => (x, y),
    };

    Ok(PlacedOverlay {
        asset: ov.asset.clone(),
        window: ov.window(),
        sprite: Arc::new(sprite),
        x,
        y,
    })
}

fn centered(outer: u32, inner: u32) -> i32 {
    ((i64::from(outer) - i64::from(inner)) / 2) as i32
}

#[cfg(test)]
#[path = "../../tests/unit/overlay/place.rs"]
mod tests;

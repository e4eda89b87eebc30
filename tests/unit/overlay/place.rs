use std::io::Cursor;

use super::*;
use crate::foundation::error::ReelError;

fn solid(w: u32, h: u32) -> Sprite {
    Sprite::from_premul(w, h, vec![255; w as usize * h as usize * 4]).unwrap()
}

#[test]
fn wide_image_is_scaled_down_to_safe_width_and_centered() {
    let ov = OverlayWindow::centered("title.png", 0.0, 2.0);
    let placed = place_sprite(&ov, solid(2000, 500), Canvas::default(), 100).unwrap();
    assert_eq!(placed.sprite.width, 980);
    assert_eq!(placed.sprite.height, 245);
    assert_eq!(placed.x, 50);
    assert_eq!(placed.y, (1920 - 245) / 2);
    assert_eq!(placed.window, TimeWindow::new(0.0, 2.0));
}

#[test]
fn small_image_is_never_scaled_up() {
    let ov = OverlayWindow::centered("title.png", 0.0, 2.0);
    let placed = place_sprite(&ov, solid(400, 300), Canvas::default(), 100).unwrap();
    assert_eq!((placed.sprite.width, placed.sprite.height), (400, 300));
    assert_eq!((placed.x, placed.y), (340, 810));
}

#[test]
fn image_exactly_at_limit_is_untouched() {
    let ov = OverlayWindow::centered("title.png", 1.0, 3.0);
    let placed = place_sprite(&ov, solid(980, 10), Canvas::default(), 100).unwrap();
    assert_eq!(placed.sprite.width, 980);
}

#[test]
fn custom_placement_is_used_verbatim() {
    let mut ov = OverlayWindow::centered("logo.png", 0.0, 1.0);
    ov.placement = Placement::Custom { x: -10, y: 40 };
    let placed = place_sprite(&ov, solid(20, 20), Canvas::default(), 100).unwrap();
    assert_eq!((placed.x, placed.y), (-10, 40));
}

#[test]
fn overlays_are_decoded_from_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("card.png");
    let img = image::RgbaImage::from_pixel(8, 4, image::Rgba([10, 20, 30, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    std::fs::write(&path, buf).unwrap();

    let placed = place_overlays(
        &[OverlayWindow::centered(&path, 0.0, 1.5)],
        Canvas::default(),
        100,
    )
    .unwrap();
    assert_eq!(placed.len(), 1);
    assert_eq!(placed[0].sprite.rgba8_premul[..4], [10, 20, 30, 255]);
}

#[test]
fn missing_image_reports_its_path() {
    let err = place_overlays(
        &[OverlayWindow::centered("gone/title.png", 0.0, 1.0)],
        Canvas::default(),
        100,
    )
    .unwrap_err();
    match err {
        ReelError::InputResolution { path, .. } => assert!(path.ends_with("title.png")),
        other => panic!("unexpected error: {other}"),
    }
}

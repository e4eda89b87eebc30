use std::io::Cursor;

use super::*;

fn png_bytes(w: u32, h: u32, px: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(px));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_image_png_dimensions_and_premul() {
    let prepared = decode_image(&png_bytes(1, 1, [100, 50, 200, 128])).unwrap();
    assert_eq!(prepared.width, 1);
    assert_eq!(prepared.height, 1);
    assert_eq!(
        prepared.rgba8_premul.as_slice(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn svg_is_rasterized_at_intrinsic_size() {
    let svg = br##"<svg xmlns="http://www.w3.org/2000/svg" width="8" height="4"><rect width="8" height="4" fill="#ff0000"/></svg>"##;
    let sprite = rasterize_svg(svg).unwrap();
    assert_eq!((sprite.width, sprite.height), (8, 4));
    assert_eq!(&sprite.rgba8_premul[..4], &[255, 0, 0, 255]);
    assert!(rasterize_svg(b"<svg").is_err());
}

#[test]
fn decode_file_reports_offending_path() {
    let dir = tempfile::tempdir().unwrap();
    let bad = dir.path().join("title.png");
    std::fs::write(&bad, b"not an image").unwrap();
    match decode_image_file(&bad).unwrap_err() {
        ReelError::InputResolution { path, .. } => assert_eq!(path, bad),
        other => panic!("unexpected error: {other}"),
    }

    let good = dir.path().join("ok.png");
    std::fs::write(&good, png_bytes(4, 2, [0, 0, 255, 255])).unwrap();
    let sprite = decode_image_file(&good).unwrap();
    assert_eq!((sprite.width, sprite.height), (4, 2));
}

#[test]
fn scaling_preserves_aspect_ratio() {
    let sprite = decode_image(&png_bytes(100, 50, [255, 255, 255, 255])).unwrap();
    let scaled = sprite.scaled_to_width(40).unwrap();
    assert_eq!((scaled.width, scaled.height), (40, 20));
    assert_eq!(scaled.rgba8_premul.len(), 40 * 20 * 4);
}

use std::path::PathBuf;

use super::*;

const CANVAS: Canvas = Canvas {
    width: 8,
    height: 4,
};

fn dot(rgba: [u8; 4]) -> Arc<Sprite> {
    Arc::new(Sprite::from_premul(1, 1, rgba.to_vec()).unwrap())
}

fn caption(window: TimeWindow, rgba: [u8; 4], x: i32, y: i32) -> CaptionUnit {
    CaptionUnit {
        text: "w".to_string(),
        window,
        sprite: dot(rgba),
        x,
        y,
    }
}

fn overlay(window: TimeWindow, rgba: [u8; 4], x: i32, y: i32) -> PlacedOverlay {
    PlacedOverlay {
        asset: PathBuf::from("title.png"),
        window,
        sprite: dot(rgba),
        x,
        y,
    }
}

fn grey_bg(width: u32) -> Vec<u8> {
    [50u8, 50, 50, 255].repeat(width as usize * CANVAS.height as usize)
}

#[test]
fn frame_count_is_rounded_duration_times_fps() {
    let s = CompositeStream::new(CANVAS, Fps::default(), 6.0, 8, Rgba8::BLACK, &[], &[]).unwrap();
    assert_eq!(s.frame_count(), 144);
    assert!((s.frame_time(FrameIndex(12)) - 0.5).abs() < 1e-12);

    let s = CompositeStream::new(CANVAS, Fps::default(), 6.01, 8, Rgba8::BLACK, &[], &[]).unwrap();
    assert_eq!(s.frame_count(), 144);
}

#[test]
fn narrow_background_is_centered_over_letterbox() {
    let s = CompositeStream::new(
        CANVAS,
        Fps::default(),
        1.0,
        4,
        Rgba8::opaque(0, 0, 200),
        &[],
        &[],
    )
    .unwrap();
    let mut out = FrameRgba::blank(CANVAS);
    s.paint_frame(0.0, &grey_bg(4), &mut out).unwrap();
    assert_eq!(out.pixel(0, 0), Some([0, 0, 200, 255]));
    assert_eq!(out.pixel(1, 3), Some([0, 0, 200, 255]));
    assert_eq!(out.pixel(2, 0), Some([50, 50, 50, 255]));
    assert_eq!(out.pixel(5, 2), Some([50, 50, 50, 255]));
    assert_eq!(out.pixel(6, 1), Some([0, 0, 200, 255]));
}

#[test]
fn captions_are_visible_on_half_open_windows() {
    let red = [255, 0, 0, 255];
    let caps = [caption(TimeWindow::new(0.5, 1.0), red, 3, 1)];
    let s = CompositeStream::new(CANVAS, Fps::default(), 2.0, 8, Rgba8::BLACK, &[], &caps).unwrap();
    let bg = grey_bg(8);
    let mut out = FrameRgba::blank(CANVAS);

    for (t, visible) in [(0.4, false), (0.5, true), (0.99, true), (1.0, false)] {
        s.paint_frame(t, &bg, &mut out).unwrap();
        assert_eq!(out.pixel(3, 1) == Some(red), visible, "t = {t}");
    }
}

#[test]
fn captions_paint_above_overlays() {
    let ovs = [overlay(TimeWindow::new(0.0, 1.0), [0, 255, 0, 255], 2, 2)];
    let caps = [caption(TimeWindow::new(0.0, 1.0), [255, 0, 0, 255], 2, 2)];
    let s = CompositeStream::new(CANVAS, Fps::default(), 1.0, 8, Rgba8::BLACK, &ovs, &caps).unwrap();
    let mut out = FrameRgba::blank(CANVAS);
    s.paint_frame(0.0, &grey_bg(8), &mut out).unwrap();
    assert_eq!(out.pixel(2, 2), Some([255, 0, 0, 255]));
    assert_eq!(s.overlay_count(), 1);
    assert_eq!(s.caption_count(), 1);
}

#[test]
fn translucent_caption_blends_with_background() {
    // Premultiplied half-alpha white.
    let caps = [caption(TimeWindow::new(0.0, 1.0), [128, 128, 128, 128], 0, 0)];
    let s = CompositeStream::new(CANVAS, Fps::default(), 1.0, 8, Rgba8::BLACK, &[], &caps).unwrap();
    let mut out = FrameRgba::blank(CANVAS);
    s.paint_frame(0.0, &[0u8, 0, 0, 255].repeat(32), &mut out).unwrap();
    assert_eq!(out.pixel(0, 0), Some([128, 128, 128, 255]));
}

#[test]
fn out_of_range_windows_are_clipped_not_rejected() {
    let red = [255, 0, 0, 255];
    let caps = [
        caption(TimeWindow::new(-0.5, 0.25), red, 0, 0),
        caption(TimeWindow::new(0.75, 9.0), red, 1, 0),
        caption(TimeWindow::new(7.0, 8.0), red, 2, 0),
    ];
    let s = CompositeStream::new(CANVAS, Fps::default(), 1.0, 8, Rgba8::BLACK, &[], &caps).unwrap();
    assert_eq!(s.caption_count(), 2);

    let bg = grey_bg(8);
    let mut out = FrameRgba::blank(CANVAS);
    s.paint_frame(0.0, &bg, &mut out).unwrap();
    assert_eq!(out.pixel(0, 0), Some(red));
    s.paint_frame(0.9, &bg, &mut out).unwrap();
    assert_eq!(out.pixel(1, 0), Some(red));
}

#[test]
fn sprites_partly_off_canvas_are_clipped() {
    let sprite = Sprite::from_premul(3, 3, [9u8, 9, 9, 255].repeat(9)).unwrap();
    let mut frame = FrameRgba::blank(CANVAS);
    blit_over(&mut frame, &sprite, -2, -2);
    assert_eq!(frame.pixel(0, 0), Some([9, 9, 9, 255]));
    assert_eq!(frame.pixel(1, 0), Some([0, 0, 0, 0]));
    blit_over(&mut frame, &sprite, 7, 3);
    assert_eq!(frame.pixel(7, 3), Some([9, 9, 9, 255]));
    blit_over(&mut frame, &sprite, 100, 100);
}

#[test]
fn wrong_background_size_is_backend_error() {
    let s = CompositeStream::new(CANVAS, Fps::default(), 1.0, 8, Rgba8::BLACK, &[], &[]).unwrap();
    let mut out = FrameRgba::blank(CANVAS);
    let err = s.paint_frame(0.0, &grey_bg(4), &mut out).unwrap_err();
    assert!(matches!(err, ReelError::Backend(_)));
}

#[test]
fn background_wider_than_canvas_is_rejected() {
    assert!(CompositeStream::new(CANVAS, Fps::default(), 1.0, 10, Rgba8::BLACK, &[], &[]).is_err());
    assert!(CompositeStream::new(CANVAS, Fps::default(), 0.0, 8, Rgba8::BLACK, &[], &[]).is_err());
}

#[test]
fn solid_background_yields_exactly_its_frames() {
    let mut bg = SolidBackground::new(4, 4, Rgba8::WHITE, 2);
    let mut buf = Vec::new();
    assert!(bg.next_frame(&mut buf).unwrap());
    assert_eq!(buf.len(), 64);
    assert!(bg.next_frame(&mut buf).unwrap());
    assert!(!bg.next_frame(&mut buf).unwrap());
    assert_eq!(bg.frame_width(), 4);
}

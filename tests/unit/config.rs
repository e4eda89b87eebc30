use super::*;

#[test]
fn defaults_are_valid_and_vertical() {
    let opts = RenderOptions::default();
    opts.validate().unwrap();
    assert_eq!(opts.canvas.width, 1080);
    assert_eq!(opts.canvas.height, 1920);
    assert_eq!(opts.fps, Fps { num: 24, den: 1 });
    assert_eq!(opts.caption.max_width, 880.0);
    assert_eq!(opts.safe_margin, 100);
}

#[test]
fn partial_json_keeps_defaults() {
    let opts: RenderOptions = serde_json::from_str(
        r##"{ "fps": { "num": 30, "den": 1 }, "caption": { "fill": "#ffff00", "font_size": 64 } }"##,
    )
    .unwrap();
    assert_eq!(opts.fps.num, 30);
    assert_eq!(opts.caption.fill, Rgba8::opaque(255, 255, 0));
    assert_eq!(opts.caption.font_size, 64.0);
    assert_eq!(opts.caption.outline, Rgba8::BLACK);
    assert_eq!(opts.video_codec, "libx264");
}

#[test]
fn colours_parse_from_names_hex_and_arrays() {
    assert_eq!(Rgba8::parse("white").unwrap(), Rgba8::WHITE);
    assert_eq!(Rgba8::parse("#000000").unwrap(), Rgba8::BLACK);
    assert_eq!(Rgba8::parse("#ff000080").unwrap().a, 0x80);
    assert!(Rgba8::parse("#12").is_err());
    assert!(Rgba8::parse("#gg0000").is_err());

    let c: Rgba8 = serde_json::from_str("[1, 2, 3]").unwrap();
    assert_eq!(c, Rgba8::opaque(1, 2, 3));
    assert_eq!(serde_json::to_string(&c).unwrap(), "\"#010203ff\"");
}

#[test]
fn validation_rejects_bad_values() {
    let mut opts = RenderOptions::default();
    opts.caption.font_size = 0.0;
    assert!(opts.validate().is_err());

    let mut opts = RenderOptions::default();
    opts.canvas.width = 1079;
    assert!(opts.validate().is_err());

    let mut opts = RenderOptions::default();
    opts.fps.den = 0;
    assert!(opts.validate().is_err());

    let mut opts = RenderOptions::default();
    opts.caption.anchor = CaptionAnchor::Fraction(1.5);
    assert!(opts.validate().is_err());
}

#[test]
fn missing_options_file_is_input_error() {
    let err = RenderOptions::from_path(Path::new("nope/options.json")).unwrap_err();
    assert!(matches!(err, ReelError::InputResolution { .. }));
}

use super::*;

#[test]
fn flatten_premul_alpha_0_returns_bg() {
    let src = vec![0u8, 0, 0, 0];
    let mut dst = vec![0u8; 4];
    flatten_premul_over_bg_to_opaque_rgba8(&mut dst, &src, [10, 20, 30, 255]).unwrap();
    assert_eq!(dst, vec![10, 20, 30, 255]);
}

#[test]
fn flatten_premul_alpha_255_is_identity() {
    let src = vec![1u8, 2, 3, 255];
    let mut dst = vec![0u8; 4];
    flatten_premul_over_bg_to_opaque_rgba8(&mut dst, &src, [10, 20, 30, 255]).unwrap();
    assert_eq!(dst, src);
}

#[test]
fn opts_follow_render_options() {
    let mut ro = RenderOptions::default();
    ro.video_codec = "libx265".to_string();
    ro.container = "matroska".to_string();
    let opts = FfmpegSinkOpts::from_options("out/final.mkv", &ro);
    assert_eq!(opts.video_codec, "libx265");
    assert_eq!(opts.audio_codec, "aac");
    assert_eq!(opts.container, "matroska");
}

#[test]
fn odd_dimensions_are_rejected_before_spawning() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(dir.path().join("out.mp4")));
    let err = sink
        .begin(SinkConfig {
            width: 9,
            height: 16,
            fps: Fps::default(),
            frame_count: 1,
            audio: None,
        })
        .unwrap_err();
    assert!(matches!(err, ReelError::Validation(_)));
    assert!(sink.partial_path().is_none());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn push_before_begin_fails() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new("never.mp4"));
    let frame = FrameRgba {
        width: 2,
        height: 2,
        data: vec![0; 16],
    };
    assert!(sink.push_frame(FrameIndex(0), &frame).is_err());
}

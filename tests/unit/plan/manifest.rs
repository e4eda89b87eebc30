use super::*;

fn write(dir: &Path, name: &str, body: &str) -> PathBuf {
    let p = dir.join(name);
    std::fs::write(&p, body).unwrap();
    p
}

#[test]
fn paths_resolve_against_manifest_dir() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "content_timings.json",
        r#"[{"word": "there", "start": 0.0, "end": 0.6}, {"word": "friend", "start": 0.6, "end": 1.2}]"#,
    );
    let manifest = write(
        dir.path(),
        "job.json",
        r#"{
            "background": "bg/loop.mp4",
            "output": "/abs/final.mp4",
            "segments": [
                { "audio": "title.mp3", "words": [{"word": "Hi", "start": 0.0, "end": 0.5}], "duration": 2.0 },
                { "audio": "content.mp3", "words_file": "content_timings.json", "duration": 4.0 }
            ],
            "overlays": [ { "asset": "title.png", "segment": 0 } ]
        }"#,
    );

    let plan = load_plan(&manifest, &RenderOptions::default()).unwrap();
    assert_eq!(plan.background_path, dir.path().join("bg/loop.mp4"));
    assert_eq!(plan.output_path, PathBuf::from("/abs/final.mp4"));
    assert_eq!(plan.canvas, Canvas::default());
    assert_eq!(plan.segments[1].words.len(), 2);
    assert_eq!(plan.segments[1].audio_path, dir.path().join("content.mp3"));
    assert_eq!(plan.total_duration(), 6.0);
    assert_eq!(plan.overlays[0].window().from, 0.0);
    assert_eq!(plan.overlays[0].window().until, 2.0);
    assert_eq!(plan.overlays[0].placement, Placement::Centered);
}

#[test]
fn overlay_can_span_a_later_segment_or_explicit_window() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = write(
        dir.path(),
        "job.json",
        r#"{
            "background": "bg.mp4",
            "output": "out.mp4",
            "canvas": { "width": 720, "height": 1280 },
            "segments": [
                { "audio": "a.mp3", "duration": 1.5 },
                { "audio": "b.mp3", "duration": 2.5 }
            ],
            "overlays": [
                { "asset": "b.png", "segment": 1 },
                { "asset": "c.png", "visible_from": 0.25, "visible_until": 1.0,
                  "placement": { "custom": { "x": 10, "y": 20 } } }
            ]
        }"#,
    );
    let plan = load_plan(&manifest, &RenderOptions::default()).unwrap();
    assert_eq!(plan.canvas.width, 720);
    assert_eq!(plan.overlays[0].visible_from, 1.5);
    assert_eq!(plan.overlays[0].visible_until, 4.0);
    assert_eq!(plan.overlays[1].placement, Placement::Custom { x: 10, y: 20 });
}

#[test]
fn ambiguous_overlay_timing_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = write(
        dir.path(),
        "job.json",
        r#"{
            "background": "bg.mp4",
            "output": "out.mp4",
            "segments": [ { "audio": "a.mp3", "duration": 1.0 } ],
            "overlays": [ { "asset": "t.png", "visible_from": 0.0 } ]
        }"#,
    );
    let err = load_plan(&manifest, &RenderOptions::default()).unwrap_err();
    assert!(matches!(err, ReelError::Validation(_)));
}

#[test]
fn missing_timings_file_is_input_error() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = write(
        dir.path(),
        "job.json",
        r#"{
            "background": "bg.mp4",
            "output": "out.mp4",
            "segments": [ { "audio": "a.mp3", "words_file": "nope.json", "duration": 1.0 } ]
        }"#,
    );
    let err = load_plan(&manifest, &RenderOptions::default()).unwrap_err();
    assert!(matches!(err, ReelError::InputResolution { .. }));
}

#[test]
fn unknown_fields_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = write(
        dir.path(),
        "job.json",
        r#"{ "background": "bg.mp4", "output": "o.mp4", "segments": [], "speed": 2 }"#,
    );
    let err = JobManifest::from_path(&manifest).unwrap_err();
    assert!(matches!(err, ReelError::InputResolution { .. }));
}

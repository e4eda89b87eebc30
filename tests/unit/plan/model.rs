use super::*;

fn plan() -> RenderPlan {
    RenderPlan {
        background_path: PathBuf::from("bg.mp4"),
        canvas: Canvas::default(),
        segments: vec![
            Segment::new("title.mp3", vec![TimedWord::new("Hi", 0.0, 0.5)], 2.0),
            Segment::new("body.mp3", vec![], 4.0),
        ],
        overlays: vec![OverlayWindow::centered("title.png", 0.0, 2.0)],
        output_path: PathBuf::from("out.mp4"),
    }
}

#[test]
fn total_duration_sums_segments() {
    assert_eq!(plan().total_duration(), 6.0);
    plan().validate().unwrap();
}

#[test]
fn validate_rejects_empty_overlay_window() {
    let mut p = plan();
    p.overlays[0].visible_until = 0.0;
    assert!(matches!(p.validate(), Err(ReelError::Validation(_))));
}

#[test]
fn validate_rejects_missing_segments_and_bad_durations() {
    let mut p = plan();
    p.segments.clear();
    assert!(p.validate().is_err());

    let mut p = plan();
    p.segments[1].duration = f64::NAN;
    assert!(p.validate().is_err());
}

#[test]
fn timed_word_json_uses_word_key() {
    let w: TimedWord = serde_json::from_str(r#"{"word":"friend","start":0.6,"end":1.2}"#).unwrap();
    assert_eq!(w, TimedWord::new("friend", 0.6, 1.2));
    let json = serde_json::to_string(&w).unwrap();
    assert!(json.contains("\"word\":\"friend\""));
}

#[test]
fn placement_defaults_to_centered() {
    let ov: OverlayWindow =
        serde_json::from_str(r#"{"asset":"a.png","visible_from":0,"visible_until":1}"#).unwrap();
    assert_eq!(ov.placement, Placement::Centered);

    let ov: OverlayWindow = serde_json::from_str(
        r#"{"asset":"a.png","visible_from":0,"visible_until":1,"placement":{"custom":{"x":10,"y":20}}}"#,
    )
    .unwrap();
    assert_eq!(ov.placement, Placement::Custom { x: 10, y: 20 });
}

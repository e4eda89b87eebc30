use super::*;

fn canvas() -> Canvas {
    Canvas {
        width: 1080,
        height: 1920,
    }
}

#[test]
fn short_background_is_looped_then_trimmed() {
    let src = BackgroundInfo {
        duration: 10.0,
        width: 1920,
        height: 1080,
    };
    let fit = FitPlan::compute(src, 25.0, canvas()).unwrap();
    assert_eq!(fit.passes, 3);
    assert!(fit.looped_duration() >= 25.0);
    assert_eq!(fit.duration, 25.0);
    assert!((fit.source_time(12.5) - 2.5).abs() < 1e-9);
}

#[test]
fn long_background_takes_leading_portion() {
    let src = BackgroundInfo {
        duration: 90.0,
        width: 1080,
        height: 1920,
    };
    let fit = FitPlan::compute(src, 25.0, canvas()).unwrap();
    assert_eq!(fit.passes, 1);
    assert_eq!(fit.source_time(0.0), 0.0);
    assert_eq!(fit.source_time(24.0), 24.0);
    assert_eq!(fit.crop, None);
}

#[test]
fn output_matches_canvas_for_any_aspect() {
    for (w, h) in [(1920, 1080), (640, 480), (1080, 1920), (720, 1920), (4000, 3000)] {
        let src = BackgroundInfo {
            duration: 10.0,
            width: w,
            height: h,
        };
        let fit = FitPlan::compute(src, 25.0, canvas()).unwrap();
        assert_eq!(fit.scaled_height, 1920);
        assert!(fit.frame_width() <= 1080);
        assert_eq!(fit.placement_x() * 2 + fit.frame_width(), 1080);
        assert_eq!(fit.duration, 25.0);
    }
}

#[test]
fn wide_frame_is_center_cropped() {
    // 1000x960 scales to 2000x1920.
    let src = BackgroundInfo {
        duration: 5.0,
        width: 1000,
        height: 960,
    };
    let fit = FitPlan::compute(src, 5.0, canvas()).unwrap();
    assert_eq!(fit.scaled_width, 2000);
    assert_eq!(fit.crop, Some(CropWindow { x0: 460, x1: 1540 }));
    assert!(fit.filter_chain(Fps::default()).ends_with("crop=1080:1920:460:0"));
}

#[test]
fn narrow_frame_is_not_cropped_or_padded() {
    let src = BackgroundInfo {
        duration: 5.0,
        width: 480,
        height: 960,
    };
    let fit = FitPlan::compute(src, 5.0, canvas()).unwrap();
    assert_eq!(fit.scaled_width, 960);
    assert_eq!(fit.crop, None);
    assert_eq!(fit.placement_x(), 60);
    assert!(!fit.filter_chain(Fps::default()).contains("crop"));
}

#[test]
fn invalid_inputs_are_rejected() {
    let src = BackgroundInfo {
        duration: 0.0,
        width: 10,
        height: 10,
    };
    assert!(FitPlan::compute(src, 5.0, canvas()).is_err());
    let src = BackgroundInfo {
        duration: 1.0,
        width: 10,
        height: 10,
    };
    assert!(FitPlan::compute(src, 0.0, canvas()).is_err());
}

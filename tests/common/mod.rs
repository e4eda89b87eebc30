#![allow(dead_code)]

use std::path::{Path, PathBuf};

/// A TrueType font for caption tests: `STORYREEL_TEST_FONT`, then common system locations.
pub fn test_font() -> Option<PathBuf> {
    if let Some(p) = std::env::var_os("STORYREEL_TEST_FONT").map(PathBuf::from)
        && p.is_file()
    {
        return Some(p);
    }
    [
        "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/Library/Fonts/Arial Bold.ttf",
        "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    ]
    .into_iter()
    .map(PathBuf::from)
    .find(|p| p.is_file())
}

/// Write an opaque single-colour PNG.
pub fn write_png(path: &Path, width: u32, height: u32, rgb: [u8; 3]) {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([rgb[0], rgb[1], rgb[2], 255]));
    img.save(path).unwrap();
}

/// `true` when both `ffmpeg` and `ffprobe` run.
pub fn ffmpeg_tools_available() -> bool {
    storyreel::is_tool_on_path("ffmpeg") && storyreel::is_tool_on_path("ffprobe")
}

/// The two-segment narration used across scenarios: 2 s then 4 s.
pub fn scenario_segments(dir: &Path) -> Vec<storyreel::Segment> {
    vec![
        storyreel::Segment::new(
            dir.join("title.wav"),
            vec![storyreel::TimedWord::new("Hi", 0.0, 0.5)],
            2.0,
        ),
        storyreel::Segment::new(
            dir.join("content.wav"),
            vec![
                storyreel::TimedWord::new("there", 0.0, 0.6),
                storyreel::TimedWord::new("friend", 0.6, 1.2),
            ],
            4.0,
        ),
    ]
}

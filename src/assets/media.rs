use std::path::Path;

use crate::canvas::fit::{BackgroundInfo, FitPlan};
use crate::foundation::core::Fps;
use crate::foundation::error::{ReelError, ReelResult};

/// Decoded interleaved floating-point PCM.
#[derive(Clone, Debug)]
pub struct AudioPcm {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
    /// Interleaved `f32` PCM samples.
    pub interleaved_f32: Vec<f32>,
}

impl AudioPcm {
    /// Number of sample frames (samples per channel).
    pub fn frames(&self) -> usize {
        self.interleaved_f32.len() / usize::from(self.channels.max(1))
    }

    /// Decoded length in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / f64::from(self.sample_rate.max(1))
    }
}

/// Return `true` when `tool -version` runs successfully from `PATH`.
pub fn is_tool_on_path(tool: &str) -> bool {
    std::process::Command::new(tool)
        .arg("-version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Fail with an input-resolution error unless `path` is an existing regular file.
pub(crate) fn require_file(path: &Path) -> ReelResult<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(ReelError::input(path, "file does not exist"))
    }
}

#[cfg(feature = "media-ffmpeg")]
#[derive(serde::Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    duration: Option<String>,
}

#[cfg(feature = "media-ffmpeg")]
#[derive(serde::Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

#[cfg(feature = "media-ffmpeg")]
#[derive(serde::Deserialize)]
struct ProbeOut {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[cfg(feature = "media-ffmpeg")]
fn run_ffprobe(path: &Path) -> ReelResult<ProbeOut> {
    require_file(path)?;
    let out = std::process::Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(path)
        .output()
        .map_err(|e| ReelError::backend(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(ReelError::input(
            path,
            format!(
                "ffprobe could not decode file: {}",
                String::from_utf8_lossy(&out.stderr).trim()
            ),
        ));
    }
    serde_json::from_slice(&out.stdout)
        .map_err(|e| ReelError::backend(format!("ffprobe json parse failed: {e}")))
}

#[cfg(feature = "media-ffmpeg")]
fn parse_secs(v: Option<&str>) -> Option<f64> {
    v.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d > 0.0)
}

/// Probe a background video's duration and frame size through `ffprobe`.
#[cfg(feature = "media-ffmpeg")]
pub fn probe_background(path: &Path) -> ReelResult<BackgroundInfo> {
    let parsed = run_ffprobe(path)?;
    let stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| ReelError::input(path, "no video stream found"))?;
    let (Some(width), Some(height)) = (stream.width, stream.height) else {
        return Err(ReelError::input(path, "video stream has no frame size"));
    };
    let duration = parse_secs(stream.duration.as_deref())
        .or_else(|| parse_secs(parsed.format.as_ref().and_then(|f| f.duration.as_deref())))
        .ok_or_else(|| ReelError::input(path, "video duration is unknown"))?;

    Ok(BackgroundInfo {
        duration,
        width,
        height,
    })
}

/// Probe the container duration of an audio file through `ffprobe`.
#[cfg(feature = "media-ffmpeg")]
pub fn probe_audio_duration(path: &Path) -> ReelResult<f64> {
    let parsed = run_ffprobe(path)?;
    if !parsed
        .streams
        .iter()
        .any(|s| s.codec_type.as_deref() == Some("audio"))
    {
        return Err(ReelError::input(path, "no audio stream found"));
    }
    parse_secs(parsed.format.as_ref().and_then(|f| f.duration.as_deref()))
        .ok_or_else(|| ReelError::input(path, "audio duration is unknown"))
}

/// Decode audio from a media file to stereo interleaved `f32` PCM.
#[cfg(feature = "media-ffmpeg")]
pub fn decode_audio_f32_stereo(path: &Path, sample_rate: u32) -> ReelResult<AudioPcm> {
    require_file(path)?;
    let out = std::process::Command::new("ffmpeg")
        .args(["-v", "error", "-i"])
        .arg(path)
        .args([
            "-vn",
            "-f",
            "f32le",
            "-acodec",
            "pcm_f32le",
            "-ac",
            "2",
            "-ar",
            &sample_rate.to_string(),
            "pipe:1",
        ])
        .output()
        .map_err(|e| ReelError::backend(format!("failed to run ffmpeg for audio decode: {e}")))?;

    if !out.status.success() {
        return Err(ReelError::input(
            path,
            format!(
                "ffmpeg audio decode failed: {}",
                String::from_utf8_lossy(&out.stderr).trim()
            ),
        ));
    }
    if !out.stdout.len().is_multiple_of(4) {
        return Err(ReelError::backend(
            "decoded audio byte length is not aligned to f32 samples",
        ));
    }

    let interleaved_f32 = out
        .stdout
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();
    Ok(AudioPcm {
        sample_rate,
        channels: 2,
        interleaved_f32,
    })
}

/// Streaming decoder producing fitted background frames as opaque RGBA8.
///
/// Spawns one `ffmpeg` process that loops, trims, resamples to the output rate, scales and crops
/// according to a [`FitPlan`]. Frames are read sequentially from its stdout.
#[cfg(feature = "media-ffmpeg")]
pub struct FittedBackgroundDecoder {
    path: std::path::PathBuf,
    child: std::process::Child,
    stdout: std::process::ChildStdout,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,
    exited: bool,
    frame_len: usize,
}

#[cfg(feature = "media-ffmpeg")]
impl FittedBackgroundDecoder {
    /// Start decoding `path` according to `fit`, resampled to `fps`, stopping after `max_frames`.
    pub fn spawn(path: &Path, fit: &FitPlan, fps: Fps, max_frames: u64) -> ReelResult<Self> {
        use std::process::{Command, Stdio};

        require_file(path)?;
        let mut cmd = Command::new("ffmpeg");
        // `-xerror` turns corrupt input into a failed exit instead of a short stream.
        cmd.args(["-v", "error", "-nostdin", "-xerror"]);
        if fit.passes > 1 {
            cmd.args(["-stream_loop", &(fit.passes - 1).to_string()]);
        }
        cmd.arg("-i")
            .arg(path)
            .args([
                "-an",
                "-t",
                &format!("{:.6}", fit.duration),
                "-vf",
                &fit.filter_chain(fps),
                "-frames:v",
                &max_frames.to_string(),
                "-f",
                "rawvideo",
                "-pix_fmt",
                "rgba",
                "pipe:1",
            ])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        tracing::debug!(cmd = ?cmd, "spawning background decoder");

        let mut child = cmd
            .spawn()
            .map_err(|e| ReelError::backend(format!("failed to spawn ffmpeg decoder: {e}")))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ReelError::backend("failed to open ffmpeg stdout (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| ReelError::backend("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            use std::io::Read as _;
            let mut bytes = Vec::new();
            stderr.read_to_end(&mut bytes)?;
            Ok(bytes)
        });

        Ok(Self {
            path: path.to_path_buf(),
            child,
            stdout,
            stderr_drain: Some(stderr_drain),
            exited: false,
            frame_len: fit.frame_width() as usize * fit.scaled_height as usize * 4,
        })
    }

    /// Read the next frame into `buf`. Returns `false` once the stream is exhausted.
    ///
    /// End of stream caused by a failed decode is an input-resolution error for the background,
    /// not a short stream.
    pub fn next_frame(&mut self, buf: &mut Vec<u8>) -> ReelResult<bool> {
        use std::io::Read as _;

        buf.resize(self.frame_len, 0);
        let mut filled = 0usize;
        while filled < self.frame_len {
            let n = self
                .stdout
                .read(&mut buf[filled..])
                .map_err(|e| ReelError::backend(format!("background decode read failed: {e}")))?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        if filled == 0 {
            self.reap()?;
            return Ok(false);
        }
        if filled < self.frame_len {
            self.reap()?;
            return Err(ReelError::backend(format!(
                "background decoder produced a truncated frame ({filled} of {} bytes)",
                self.frame_len
            )));
        }
        Ok(true)
    }

    /// Wait for the decoder and surface its stderr on failure.
    pub fn finish(mut self) -> ReelResult<()> {
        self.reap()
    }

    fn reap(&mut self) -> ReelResult<()> {
        if self.exited {
            return Ok(());
        }
        let status = self
            .child
            .wait()
            .map_err(|e| ReelError::backend(format!("failed to wait for ffmpeg decoder: {e}")))?;
        self.exited = true;
        let stderr = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| ReelError::backend("ffmpeg stderr drain thread panicked"))?
                .unwrap_or_default(),
            None => Vec::new(),
        };
        if !status.success() {
            return Err(ReelError::input(
                &self.path,
                format!(
                    "background decode failed ({status}): {}",
                    String::from_utf8_lossy(&stderr).trim()
                ),
            ));
        }
        Ok(())
    }
}

#[cfg(feature = "media-ffmpeg")]
impl Drop for FittedBackgroundDecoder {
    fn drop(&mut self) {
        if !self.exited
            && let Ok(None) = self.child.try_wait()
        {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

/// Decode the single fitted background frame shown at output time `t`.
#[cfg(feature = "media-ffmpeg")]
pub fn decode_fitted_frame_at(path: &Path, fit: &FitPlan, t: f64) -> ReelResult<Vec<u8>> {
    require_file(path)?;
    let source_t = fit.source_time(t);
    let mut chain = format!(
        "scale={}:{}:flags=bicubic,setsar=1",
        fit.scaled_width, fit.scaled_height
    );
    if let Some(crop) = fit.crop {
        chain.push_str(&format!(
            ",crop={}:{}:{}:0",
            crop.width(),
            fit.scaled_height,
            crop.x0
        ));
    }
    let out = std::process::Command::new("ffmpeg")
        .args(["-v", "error", "-nostdin", "-ss", &format!("{source_t:.6}")])
        .arg("-i")
        .arg(path)
        .args([
            "-frames:v",
            "1",
            "-vf",
            &chain,
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "pipe:1",
        ])
        .output()
        .map_err(|e| ReelError::backend(format!("failed to run ffmpeg for frame decode: {e}")))?;
    if !out.status.success() {
        return Err(ReelError::input(
            path,
            format!(
                "ffmpeg frame decode failed: {}",
                String::from_utf8_lossy(&out.stderr).trim()
            ),
        ));
    }
    let expected = fit.frame_width() as usize * fit.scaled_height as usize * 4;
    if out.stdout.len() < expected {
        return Err(ReelError::backend(format!(
            "decoded frame has {} bytes, expected {expected}",
            out.stdout.len()
        )));
    }
    Ok(out.stdout[..expected].to_vec())
}

#[cfg(not(feature = "media-ffmpeg"))]
fn media_disabled<T>(path: &Path) -> ReelResult<T> {
    require_file(path)?;
    Err(ReelError::backend(
        "video/audio inputs require the 'media-ffmpeg' feature",
    ))
}

#[cfg(not(feature = "media-ffmpeg"))]
/// Probe a background video's duration and frame size through `ffprobe`.
///
/// Returns an error when `media-ffmpeg` feature is disabled.
pub fn probe_background(path: &Path) -> ReelResult<BackgroundInfo> {
    media_disabled(path)
}

#[cfg(not(feature = "media-ffmpeg"))]
/// Probe the container duration of an audio file through `ffprobe`.
///
/// Returns an error when `media-ffmpeg` feature is disabled.
pub fn probe_audio_duration(path: &Path) -> ReelResult<f64> {
    media_disabled(path)
}

#[cfg(not(feature = "media-ffmpeg"))]
/// Decode audio from a media file to stereo interleaved `f32` PCM.
///
/// Returns an error when `media-ffmpeg` feature is disabled.
pub fn decode_audio_f32_stereo(path: &Path, _sample_rate: u32) -> ReelResult<AudioPcm> {
    media_disabled(path)
}

#[cfg(not(feature = "media-ffmpeg"))]
/// Streaming decoder producing fitted background frames as opaque RGBA8.
///
/// Without the `media-ffmpeg` feature, [`FittedBackgroundDecoder::spawn`] always fails.
pub struct FittedBackgroundDecoder {
    _private: (),
}

#[cfg(not(feature = "media-ffmpeg"))]
impl FittedBackgroundDecoder {
    /// Start decoding `path` according to `fit`, resampled to `fps`, stopping after `max_frames`.
    pub fn spawn(path: &Path, _fit: &FitPlan, _fps: Fps, _max_frames: u64) -> ReelResult<Self> {
        media_disabled(path)
    }

    /// Read the next frame into `buf`.
    pub fn next_frame(&mut self, _buf: &mut Vec<u8>) -> ReelResult<bool> {
        Ok(false)
    }

    /// Wait for the decoder.
    pub fn finish(self) -> ReelResult<()> {
        Ok(())
    }
}

#[cfg(not(feature = "media-ffmpeg"))]
/// Decode the single fitted background frame shown at output time `t`.
///
/// Returns an error when `media-ffmpeg` feature is disabled.
pub fn decode_fitted_frame_at(path: &Path, _fit: &FitPlan, _t: f64) -> ReelResult<Vec<u8>> {
    media_disabled(path)
}

// No unit tests here beyond the path checks: these functions shell out to `ffprobe`/`ffmpeg` and
// are covered by the media pipeline integration test, which skips when the tools are missing.
#[cfg(test)]
#[path = "../../tests/unit/assets/media.rs"]
mod tests;

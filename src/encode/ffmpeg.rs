use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use crate::compose::stream::FrameRgba;
use crate::config::RenderOptions;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::mul_div255_u16;
use crate::foundation::scratch::{TempFileGuard, partial_path_for};

/// Options for [`FfmpegSink`].
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Final output path. Only ever written by a rename of a finished file.
    pub out_path: PathBuf,
    /// `ffmpeg` video encoder.
    pub video_codec: String,
    /// `ffmpeg` audio encoder.
    pub audio_codec: String,
    /// Encoded pixel format.
    pub pix_fmt: String,
    /// `ffmpeg` muxer name.
    pub container: String,
    /// Background color used to flatten alpha (RGBA8, straight alpha).
    pub bg_rgba: [u8; 4],
}

impl FfmpegSinkOpts {
    /// H.264/AAC MP4 output to `out_path`.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self::from_options(out_path, &RenderOptions::default())
    }

    /// Codec and container choices taken from render options.
    pub fn from_options(out_path: impl Into<PathBuf>, opts: &RenderOptions) -> Self {
        Self {
            out_path: out_path.into(),
            video_codec: opts.video_codec.clone(),
            audio_codec: opts.audio_codec.clone(),
            pix_fmt: opts.pix_fmt.clone(),
            container: opts.container.clone(),
            bg_rgba: [0, 0, 0, 255],
        }
    }
}

/// Sink that spawns the system `ffmpeg` and streams raw frames to its stdin.
///
/// `ffmpeg` writes to a hidden partial file beside the destination. [`FrameSink::end`] renames it
/// into place after a clean exit; every other path (error, abort, drop) deletes it.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,
    partial: TempFileGuard,

    scratch: Vec<u8>,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
}

impl FfmpegSink {
    /// Create a sink; nothing is spawned until `begin`.
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            partial: TempFileGuard::default(),
            scratch: Vec::new(),
            cfg: None,
            last_idx: None,
        }
    }

    /// Partial file currently being written, if encoding is in progress.
    pub fn partial_path(&self) -> Option<&Path> {
        self.partial.path()
    }

    fn kill_child(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        if let Some(handle) = self.stderr_drain.take() {
            let _ = handle.join();
        }
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()> {
        if cfg.fps.num == 0 || cfg.fps.den == 0 {
            return Err(ReelError::validation("fps must be non-zero"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(ReelError::validation(
                "ffmpeg sink width/height must be non-zero",
            ));
        }
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(ReelError::validation(
                "ffmpeg sink width/height must be even (required for yuv420p output)",
            ));
        }
        if let Some(audio) = cfg.audio.as_ref()
            && (audio.sample_rate == 0 || audio.channels == 0)
        {
            return Err(ReelError::validation(
                "audio sample_rate and channels must be non-zero when audio is enabled",
            ));
        }
        if !crate::assets::media::is_tool_on_path("ffmpeg") {
            return Err(ReelError::backend(
                "ffmpeg is required for encoding, but was not found on PATH",
            ));
        }

        ensure_parent_dir(&self.opts.out_path)?;
        let partial = partial_path_for(&self.opts.out_path);
        std::fs::File::create(&partial).map_err(|e| {
            ReelError::resource(
                &self.opts.out_path,
                format!("destination is not writable: {e}"),
            )
        })?;
        self.partial = TempFileGuard::new(partial.clone());

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        cmd.args(["-y", "-loglevel", "error", "-nostdin"]);

        // Input: raw RGBA8 frames. `ffmpeg` does not understand premul, so alpha is flattened
        // before writing to stdin (push_frame).
        cmd.args([
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
        ]);
        push_input_fps(&mut cmd, cfg.fps);
        cmd.args(["-i", "pipe:0"]);

        if let Some(audio) = cfg.audio.as_ref() {
            cmd.args([
                "-f",
                "f32le",
                "-ar",
                &audio.sample_rate.to_string(),
                "-ac",
                &audio.channels.to_string(),
                "-i",
            ])
            .arg(&audio.path)
            .args(["-map", "0:v:0", "-map", "1:a:0", "-c:a", &self.opts.audio_codec]);
        } else {
            cmd.arg("-an");
        }
        cmd.args([
            "-c:v",
            &self.opts.video_codec,
            "-pix_fmt",
            &self.opts.pix_fmt,
            "-frames:v",
            &cfg.frame_count.to_string(),
        ]);
        if matches!(self.opts.container.as_str(), "mp4" | "mov") {
            cmd.args(["-movflags", "+faststart"]);
        }
        cmd.args(["-f", &self.opts.container]).arg(&partial);
        tracing::debug!(cmd = ?cmd, "spawning ffmpeg encoder");

        let mut child = cmd.spawn().map_err(|e| {
            ReelError::backend(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ReelError::backend("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| ReelError::backend("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        self.scratch = vec![0u8; cfg.width as usize * cfg.height as usize * 4];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRgba) -> ReelResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| ReelError::backend("ffmpeg sink not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(ReelError::backend(
                "ffmpeg sink received out-of-order frame index",
            ));
        }
        self.last_idx = Some(idx);

        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(ReelError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        if frame.data.len() != self.scratch.len() {
            return Err(ReelError::validation(
                "frame.data size mismatch with width*height*4",
            ));
        }

        flatten_premul_over_bg_to_opaque_rgba8(&mut self.scratch, &frame.data, self.opts.bg_rgba)?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(ReelError::backend("ffmpeg sink is already finalized"));
        };

        use std::io::Write as _;
        stdin.write_all(&self.scratch).map_err(|e| {
            ReelError::backend(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        Ok(())
    }

    fn end(&mut self) -> ReelResult<()> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| ReelError::backend("ffmpeg sink not started"))?;

        let status = child.wait().map_err(|e| {
            ReelError::backend(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| ReelError::backend("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| ReelError::backend(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };
        self.cfg = None;

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(ReelError::backend(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }

        let partial = self
            .partial
            .path()
            .map(Path::to_path_buf)
            .ok_or_else(|| ReelError::backend("ffmpeg sink has no partial output"))?;
        std::fs::rename(&partial, &self.opts.out_path).map_err(|e| {
            ReelError::resource(
                &self.opts.out_path,
                format!("failed to move finished output into place: {e}"),
            )
        })?;
        self.partial.keep();
        tracing::info!(out = %self.opts.out_path.display(), "encoded output");
        Ok(())
    }

    fn abort(&mut self) {
        self.kill_child();
        self.cfg = None;
        // Dropping the guard deletes the partial file.
        self.partial = TempFileGuard::default();
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        self.kill_child();
    }
}

fn push_input_fps(cmd: &mut Command, fps: Fps) {
    // For rawvideo input, `-r` before `-i` sets the input framerate (rational `num/den`).
    cmd.args(["-r", &format!("{}/{}", fps.num, fps.den)]);
}

fn flatten_premul_over_bg_to_opaque_rgba8(
    dst: &mut [u8],
    src_premul: &[u8],
    bg_rgba: [u8; 4],
) -> ReelResult<()> {
    if dst.len() != src_premul.len() || !dst.len().is_multiple_of(4) {
        return Err(ReelError::validation(
            "flatten_premul_over_bg_to_opaque_rgba8 expects equal-length rgba8 buffers",
        ));
    }

    let bg_r = u16::from(bg_rgba[0]);
    let bg_g = u16::from(bg_rgba[1]);
    let bg_b = u16::from(bg_rgba[2]);

    for (d, s) in dst.chunks_exact_mut(4).zip(src_premul.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }

        let inv = 255u16 - a;
        d[0] = (u16::from(s[0]) + mul_div255_u16(bg_r, inv)).min(255) as u8;
        d[1] = (u16::from(s[1]) + mul_div255_u16(bg_g, inv)).min(255) as u8;
        d[2] = (u16::from(s[2]) + mul_div255_u16(bg_b, inv)).min(255) as u8;
        d[3] = 255;
    }

    Ok(())
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> ReelResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| {
            ReelError::resource(parent, format!("failed to create output directory: {e}"))
        })?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;

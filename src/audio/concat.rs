use std::path::Path;

use crate::assets::media::{AudioPcm, decode_audio_f32_stereo};
use crate::foundation::cancel::CancelToken;
use crate::foundation::error::{ReelError, ReelResult};
use crate::plan::model::Segment;

/// The concatenated narration as interleaved stereo `f32` PCM.
#[derive(Clone, Debug, PartialEq)]
pub struct NarrationTrack {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Always 2.
    pub channels: u16,
    /// Interleaved samples, exactly `round(total_duration * sample_rate)` frames long.
    pub interleaved_f32: Vec<f32>,
}

impl NarrationTrack {
    /// Number of sample frames.
    pub fn frames(&self) -> usize {
        self.interleaved_f32.len() / usize::from(self.channels)
    }

    /// Track length in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / f64::from(self.sample_rate)
    }

    /// Write raw little-endian `f32` samples, the form the encoder reads.
    pub fn write_f32le(&self, out_path: &Path) -> ReelResult<()> {
        let mut bytes = Vec::<u8>::with_capacity(self.interleaved_f32.len() * 4);
        for &sample in &self.interleaved_f32 {
            bytes.extend_from_slice(&sample.to_le_bytes());
        }
        std::fs::write(out_path, bytes).map_err(|e| {
            ReelError::resource(out_path, format!("failed to write narration audio: {e}"))
        })
    }
}

/// Nearest sample index for a time in seconds.
pub(crate) fn secs_to_sample(secs: f64, sample_rate: u32) -> usize {
    (secs * f64::from(sample_rate)).round().max(0.0) as usize
}

/// Fail when a decoded segment is longer or shorter than the duration its word offsets used.
pub fn check_segment_duration(
    index: usize,
    declared: f64,
    decoded: f64,
    tolerance: f64,
) -> ReelResult<()> {
    let drift = (decoded - declared).abs();
    if drift > tolerance {
        return Err(ReelError::timing(format!(
            "segment {index} declares {declared:.3}s but its audio decodes to {decoded:.3}s \
             (off by {drift:.3}s, tolerance {tolerance:.3}s)"
        )));
    }
    Ok(())
}

/// Decode every segment's audio and join the results.
///
/// `cancel` is checked before each segment is decoded.
#[tracing::instrument(skip_all, fields(segments = segments.len(), sample_rate = sample_rate))]
pub fn concat_segments(
    segments: &[Segment],
    sample_rate: u32,
    tolerance: f64,
    cancel: &CancelToken,
) -> ReelResult<NarrationTrack> {
    let mut parts = Vec::with_capacity(segments.len());
    for seg in segments {
        cancel.check()?;
        let pcm = decode_audio_f32_stereo(&seg.audio_path, sample_rate)?;
        tracing::debug!(
            audio = %seg.audio_path.display(),
            declared = seg.duration,
            decoded = pcm.duration_secs(),
            "decoded narration segment"
        );
        parts.push((seg.duration, pcm));
    }
    concat_pcm(&parts, sample_rate, tolerance)
}

/// Join decoded parts back to back.
///
/// Segment `k` starts at the sample nearest to the sum of the declared durations before it, the
/// same offsets the caption timeline uses. Each part is cut or padded with silence to its
/// declared length, after the tolerance check.
pub fn concat_pcm(
    parts: &[(f64, AudioPcm)],
    sample_rate: u32,
    tolerance: f64,
) -> ReelResult<NarrationTrack> {
    if sample_rate == 0 {
        return Err(ReelError::validation("audio sample_rate must be non-zero"));
    }
    let total: f64 = parts.iter().map(|(d, _)| *d).sum();
    let total_frames = secs_to_sample(total, sample_rate);
    let mut out = vec![0.0f32; total_frames * 2];

    let mut offset = 0.0f64;
    for (index, (declared, pcm)) in parts.iter().enumerate() {
        if pcm.sample_rate != sample_rate {
            return Err(ReelError::validation(format!(
                "segment {index} audio is {} Hz, expected {sample_rate} Hz",
                pcm.sample_rate
            )));
        }
        check_segment_duration(index, *declared, pcm.duration_secs(), tolerance)?;

        let start = secs_to_sample(offset, sample_rate).min(total_frames);
        let end = secs_to_sample(offset + declared, sample_rate).min(total_frames);
        let n = (end - start).min(pcm.frames());
        copy_as_stereo(&mut out[start * 2..(start + n) * 2], pcm);
        offset += declared;
    }

    tracing::info!(
        frames = total_frames,
        duration = total,
        "concatenated narration"
    );
    Ok(NarrationTrack {
        sample_rate,
        channels: 2,
        interleaved_f32: out,
    })
}

fn copy_as_stereo(dst: &mut [f32], pcm: &AudioPcm) {
    let ch = usize::from(pcm.channels.max(1));
    for (i, frame) in dst.chunks_exact_mut(2).enumerate() {
        let src = &pcm.interleaved_f32[i * ch..];
        frame[0] = src[0];
        frame[1] = if ch > 1 { src[1] } else { src[0] };
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/concat.rs"]
mod tests;

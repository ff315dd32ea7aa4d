use std::path::Path;

use crate::foundation::core::TimeRange;
use crate::foundation::error::{VinylcastError, VinylcastResult};

/// Channel count of every decoded segment.
pub const SEGMENT_CHANNELS: u16 = 2;

/// Interleaved `f32` PCM covering exactly one trimmed range.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioSegment {
    pub sample_rate: u32,
    pub channels: u16,
    pub interleaved: Vec<f32>,
}

impl AudioSegment {
    /// Sample frames (one sample per channel each).
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.interleaved.len() / usize::from(self.channels)
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / f64::from(self.sample_rate)
    }

    /// Pad with silence or truncate to exactly `frames` sample frames.
    pub fn fit_to_frames(&mut self, frames: usize) {
        self.interleaved
            .resize(frames * usize::from(self.channels), 0.0);
    }

    /// Write raw little-endian `f32` PCM.
    pub fn write_f32le(&self, out_path: &Path) -> VinylcastResult<()> {
        crate::encode::ffmpeg::ensure_parent_dir(out_path)?;
        let mut bytes = Vec::<u8>::with_capacity(self.interleaved.len() * 4);
        for &sample in &self.interleaved {
            bytes.extend_from_slice(&sample.to_le_bytes());
        }
        std::fs::write(out_path, bytes).map_err(|e| {
            VinylcastError::encode(format!(
                "failed to write audio file '{}': {e}",
                out_path.display()
            ))
        })
    }
}

/// Sample frames a range covers at `sample_rate`.
pub fn expected_frames(range: TimeRange, sample_rate: u32) -> usize {
    (range.duration() * f64::from(sample_rate)).round() as usize
}

/// Decode `[start, end)` of `path` to stereo PCM at `sample_rate`, padded or truncated to
/// [`expected_frames`].
#[tracing::instrument]
pub fn trim_audio(path: &Path, range: TimeRange, sample_rate: u32) -> VinylcastResult<AudioSegment> {
    if sample_rate == 0 {
        return Err(VinylcastError::validation("audio sample rate must be non-zero"));
    }
    let out = std::process::Command::new("ffmpeg")
        .args([
            "-v",
            "error",
            "-ss",
            &format!("{:.6}", range.start()),
            "-t",
            &format!("{:.6}", range.duration()),
            "-i",
        ])
        .arg(path)
        .args([
            "-vn",
            "-f",
            "f32le",
            "-acodec",
            "pcm_f32le",
            "-ac",
            &SEGMENT_CHANNELS.to_string(),
            "-ar",
            &sample_rate.to_string(),
            "pipe:1",
        ])
        .output()
        .map_err(|e| {
            VinylcastError::audio_decode(path, format!("failed to run ffmpeg for audio decode: {e}"))
        })?;

    if !out.status.success() {
        return Err(VinylcastError::audio_decode(
            path,
            format!(
                "ffmpeg audio decode failed: {}",
                String::from_utf8_lossy(&out.stderr).trim()
            ),
        ));
    }

    let mut segment = AudioSegment {
        sample_rate,
        channels: SEGMENT_CHANNELS,
        interleaved: pcm_from_f32le(path, &out.stdout)?,
    };
    let decoded = segment.frames();
    let wanted = expected_frames(range, sample_rate);
    if decoded != wanted {
        tracing::debug!(decoded, wanted, "adjusting trimmed audio length");
    }
    segment.fit_to_frames(wanted);
    Ok(segment)
}

fn pcm_from_f32le(path: &Path, bytes: &[u8]) -> VinylcastResult<Vec<f32>> {
    if !bytes.len().is_multiple_of(4) {
        return Err(VinylcastError::audio_decode(
            path,
            "decoded audio byte length is not aligned to f32 samples",
        ));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

#[cfg(test)]
#[path = "../../tests/unit/audio/trim.rs"]
mod tests;

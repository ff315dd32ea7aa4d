use std::path::{Path, PathBuf};

use crate::foundation::error::{VinylcastError, VinylcastResult};

/// What `ffprobe` reports about an audio source.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioInfo {
    pub path: PathBuf,
    /// Length in seconds.
    pub duration: f64,
    pub sample_rate: u32,
    pub channels: u16,
}

#[derive(serde::Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    sample_rate: Option<String>,
    channels: Option<u16>,
    duration: Option<String>,
}

#[derive(serde::Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

#[derive(serde::Deserialize)]
struct ProbeOut {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

/// Probe `path` for its first audio stream and total duration.
#[tracing::instrument]
pub fn probe_audio(path: &Path) -> VinylcastResult<AudioInfo> {
    if !path.is_file() {
        return Err(VinylcastError::audio_decode(path, "file not found"));
    }

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
        .map_err(|e| VinylcastError::audio_decode(path, format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(VinylcastError::audio_decode(
            path,
            format!(
                "ffprobe failed: {}",
                String::from_utf8_lossy(&out.stderr).trim()
            ),
        ));
    }

    let info = parse_probe_output(path, &out.stdout)?;
    tracing::debug!(
        duration = info.duration,
        sample_rate = info.sample_rate,
        channels = info.channels,
        "audio probed"
    );
    Ok(info)
}

fn parse_probe_output(path: &Path, json: &[u8]) -> VinylcastResult<AudioInfo> {
    let parsed: ProbeOut = serde_json::from_slice(json).map_err(|e| {
        VinylcastError::audio_decode(path, format!("ffprobe json parse failed: {e}"))
    })?;

    let audio: Vec<&ProbeStream> = parsed
        .streams
        .iter()
        .filter(|s| s.codec_type.as_deref() == Some("audio"))
        .collect();
    let first = audio
        .first()
        .ok_or_else(|| VinylcastError::audio_decode(path, "no audio stream found"))?;

    let format_duration = parsed
        .format
        .as_ref()
        .and_then(|f| f.duration.as_deref())
        .and_then(parse_secs);
    let stream_duration = audio
        .iter()
        .filter_map(|s| s.duration.as_deref().and_then(parse_secs))
        .fold(None, |acc: Option<f64>, d| Some(acc.map_or(d, |a| a.max(d))));
    let duration = format_duration
        .or(stream_duration)
        .ok_or_else(|| VinylcastError::audio_decode(path, "could not determine duration"))?;

    let sample_rate = first
        .sample_rate
        .as_deref()
        .and_then(|s| s.parse::<u32>().ok())
        .filter(|&sr| sr > 0)
        .ok_or_else(|| VinylcastError::audio_decode(path, "missing audio sample rate"))?;
    let channels = first.channels.filter(|&c| c > 0).unwrap_or(2);

    Ok(AudioInfo {
        path: path.to_path_buf(),
        duration,
        sample_rate,
        channels,
    })
}

fn parse_secs(s: &str) -> Option<f64> {
    s.trim()
        .parse::<f64>()
        .ok()
        .filter(|d| d.is_finite() && *d > 0.0)
}

/// Return `true` when `ffprobe` can be invoked from `PATH`.
pub fn is_ffprobe_on_path() -> bool {
    std::process::Command::new("ffprobe")
        .arg("-version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/audio/probe.rs"]
mod tests;

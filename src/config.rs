use std::path::{Path, PathBuf};

use crate::effects::blur::BlurMode;
use crate::foundation::error::{VinylcastError, VinylcastResult};

/// Tunables for one render job.
///
/// Every field is optional in JSON; missing fields take the [`Default`] value.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderOpts {
    /// Render frames on a dedicated rayon pool.
    pub parallel: bool,
    /// Override the number of worker threads. `None` uses rayon defaults.
    pub threads: Option<usize>,
    /// Frames handed to the pool per batch.
    pub chunk_size: usize,
    /// Bounded channel capacity between render workers and the encoder thread.
    pub channel_capacity: usize,

    /// Preferred font family for artist and title.
    pub font_family: String,
    /// Directory searched for font files before the system fonts.
    pub fonts_dir: Option<PathBuf>,

    /// Smoothing applied to each background sample.
    pub blur: BlurMode,

    /// x264 constant rate factor (0..=51).
    pub crf: u8,
    /// x264 preset name.
    pub preset: String,
    /// AAC bitrate passed to ffmpeg.
    pub audio_bitrate: String,
    /// Replace an existing output file.
    pub overwrite: bool,

    /// Sample rate of the trimmed PCM handed to the encoder.
    pub audio_sample_rate: u32,
}

impl Default for RenderOpts {
    fn default() -> Self {
        Self {
            parallel: true,
            threads: None,
            chunk_size: 16,
            channel_capacity: 4,
            font_family: "Helvetica".to_owned(),
            fonts_dir: None,
            blur: BlurMode::Gaussian,
            crf: 18,
            preset: "slow".to_owned(),
            audio_bitrate: "192k".to_owned(),
            overwrite: true,
            audio_sample_rate: 48_000,
        }
    }
}

impl RenderOpts {
    pub fn validate(&self) -> VinylcastResult<()> {
        if self.threads == Some(0) {
            return Err(VinylcastError::validation(
                "'threads' must be >= 1 when set",
            ));
        }
        if self.crf > 51 {
            return Err(VinylcastError::validation(format!(
                "'crf' must be within 0..=51, got {}",
                self.crf
            )));
        }
        if self.preset.trim().is_empty() {
            return Err(VinylcastError::validation("'preset' must not be empty"));
        }
        if self.audio_bitrate.trim().is_empty() {
            return Err(VinylcastError::validation(
                "'audio_bitrate' must not be empty",
            ));
        }
        if self.audio_sample_rate == 0 {
            return Err(VinylcastError::validation(
                "'audio_sample_rate' must be non-zero",
            ));
        }
        Ok(())
    }

    /// Load and validate options from a JSON file.
    pub fn from_json_path(path: &Path) -> VinylcastResult<Self> {
        use anyhow::Context as _;
        let bytes = std::fs::read(path)
            .with_context(|| format!("read render options from '{}'", path.display()))?;
        let opts: Self = serde_json::from_slice(&bytes).map_err(|e| {
            VinylcastError::validation(format!(
                "invalid render options in '{}': {e}",
                path.display()
            ))
        })?;
        opts.validate()?;
        Ok(opts)
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;

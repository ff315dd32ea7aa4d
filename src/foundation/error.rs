use std::path::{Path, PathBuf};

/// Result alias used across the crate.
pub type VinylcastResult<T> = Result<T, VinylcastError>;

/// Terminal failure of a render job (or of one of its building blocks).
#[derive(thiserror::Error, Debug)]
pub enum VinylcastError {
    /// `end <= start`, `start < 0` or a non-finite bound.
    #[error("invalid time range: start={start}s end={end}s")]
    InvalidTimeRange {
        /// Requested start in seconds.
        start: f64,
        /// Requested end in seconds.
        end: f64,
    },

    /// The audio source is missing, unreadable or not decodable.
    #[error("audio decode error: '{}': {detail}", path.display())]
    AudioDecode {
        /// Offending audio path.
        path: PathBuf,
        /// Human-readable cause.
        detail: String,
    },

    /// The cover image is missing, unreadable or not decodable.
    #[error("image decode error: '{}': {detail}", path.display())]
    ImageDecode {
        /// Offending image path.
        path: PathBuf,
        /// Human-readable cause.
        detail: String,
    },

    /// The requested end lies beyond the measured audio length.
    #[error("duration exceeded: requested end {requested}s but audio lasts {measured}s")]
    DurationExceeded {
        /// Requested end in seconds.
        requested: f64,
        /// Measured audio duration in seconds.
        measured: f64,
    },

    /// A layer could not be produced even after its in-component fallback.
    #[error("layer construction failed: {layer}: {detail}")]
    LayerConstruction {
        /// Which layer failed.
        layer: LayerName,
        /// Human-readable cause.
        detail: String,
    },

    /// The encoder rejected the stream or the write failed.
    #[error("encode failure: {0}")]
    Encode(String),

    /// The render was cancelled through its [`CancelToken`](crate::CancelToken).
    #[error("render cancelled")]
    Cancelled,

    /// Invalid options or internal precondition violations.
    #[error("validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Identifies one of the three visual layers in error reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerName {
    /// Animated gradient background.
    Background,
    /// Rotating cover disc.
    Disc,
    /// Static artist/title overlay.
    Text,
}

impl std::fmt::Display for LayerName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Background => "background",
            Self::Disc => "disc",
            Self::Text => "text",
        })
    }
}

/// Coarse error classification for callers that map failures to their own surface
/// (status codes, job states) without matching on messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidTimeRange,
    AudioDecode,
    ImageDecode,
    DurationExceeded,
    LayerConstruction,
    Encode,
    Cancelled,
    Validation,
    Other,
}

impl VinylcastError {
    pub fn invalid_time_range(start: f64, end: f64) -> Self {
        Self::InvalidTimeRange { start, end }
    }

    pub fn audio_decode(path: impl AsRef<Path>, detail: impl Into<String>) -> Self {
        Self::AudioDecode {
            path: path.as_ref().to_path_buf(),
            detail: detail.into(),
        }
    }

    pub fn image_decode(path: impl AsRef<Path>, detail: impl Into<String>) -> Self {
        Self::ImageDecode {
            path: path.as_ref().to_path_buf(),
            detail: detail.into(),
        }
    }

    pub fn duration_exceeded(requested: f64, measured: f64) -> Self {
        Self::DurationExceeded {
            requested,
            measured,
        }
    }

    pub fn layer(layer: LayerName, detail: impl Into<String>) -> Self {
        Self::LayerConstruction {
            layer,
            detail: detail.into(),
        }
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidTimeRange { .. } => ErrorKind::InvalidTimeRange,
            Self::AudioDecode { .. } => ErrorKind::AudioDecode,
            Self::ImageDecode { .. } => ErrorKind::ImageDecode,
            Self::DurationExceeded { .. } => ErrorKind::DurationExceeded,
            Self::LayerConstruction { .. } => ErrorKind::LayerConstruction,
            Self::Encode(_) => ErrorKind::Encode,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Other(_) => ErrorKind::Other,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;

use crate::foundation::error::{VinylcastError, VinylcastResult};

/// Output width of every rendered video.
pub const VIDEO_WIDTH: u32 = 1080;
/// Output height of every rendered video.
pub const VIDEO_HEIGHT: u32 = 1350;
/// Edge length of the square disc layer.
pub const VINYL_SIZE: u32 = 800;
/// Output frame rate.
pub const FPS: u32 = 30;

/// Absolute 0-based frame index in output timeline space.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Half-open frame range `[start, end)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameRange {
    /// Inclusive range start.
    pub start: FrameIndex,
    /// Exclusive range end.
    pub end: FrameIndex,
}

impl FrameRange {
    /// Create a validated range with `start <= end`.
    pub fn new(start: FrameIndex, end: FrameIndex) -> VinylcastResult<Self> {
        if start.0 > end.0 {
            return Err(VinylcastError::validation("FrameRange start must be <= end"));
        }
        Ok(Self { start, end })
    }

    /// Range covering the first `n` frames.
    pub fn first(n: u64) -> Self {
        Self {
            start: FrameIndex(0),
            end: FrameIndex(n),
        }
    }

    /// Number of frames contained in the range.
    pub fn len_frames(self) -> u64 {
        self.end.0.saturating_sub(self.start.0)
    }

    /// Return `true` when the range has no frames.
    pub fn is_empty(self) -> bool {
        self.start.0 == self.end.0
    }

    /// Return `true` when `f` is inside `[start, end)`.
    pub fn contains(self, f: FrameIndex) -> bool {
        self.start.0 <= f.0 && f.0 < self.end.0
    }
}

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// The fixed output rate.
    pub const OUTPUT: Fps = Fps { num: FPS, den: 1 };

    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> VinylcastResult<Self> {
        if den == 0 {
            return Err(VinylcastError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(VinylcastError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Timestamp (seconds) of frame `idx`, i.e. `idx / fps`.
    pub fn frame_time(self, idx: FrameIndex) -> f64 {
        (idx.0 as f64) * f64::from(self.den) / f64::from(self.num)
    }

    /// Convert seconds to a frame count, rounding to the nearest frame.
    pub fn secs_to_frames_round(self, secs: f64) -> u64 {
        (secs * self.as_f64()).round().max(0.0) as u64
    }
}

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    pub fn pixel_count(self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Validated `[start, end)` clip window in seconds of source audio.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TimeRange {
    start: f64,
    end: f64,
}

impl TimeRange {
    /// Reject `start < 0`, `end <= start` and non-finite bounds.
    pub fn new(start: f64, end: f64) -> VinylcastResult<Self> {
        if !start.is_finite() || !end.is_finite() || start < 0.0 || end <= start {
            return Err(VinylcastError::invalid_time_range(start, end));
        }
        Ok(Self { start, end })
    }

    /// Like [`TimeRange::new`], but also reject windows too short to yield one output frame.
    pub fn clip(start: f64, end: f64) -> VinylcastResult<Self> {
        let range = Self::new(start, end)?;
        if range.frame_count(Fps::OUTPUT) == 0 {
            return Err(VinylcastError::invalid_time_range(start, end));
        }
        Ok(range)
    }

    pub fn start(self) -> f64 {
        self.start
    }

    pub fn end(self) -> f64 {
        self.end
    }

    /// `end - start`, always > 0.
    pub fn duration(self) -> f64 {
        self.end - self.start
    }

    /// `round(duration * fps)`.
    pub fn frame_count(self, fps: Fps) -> u64 {
        fps.secs_to_frames_round(self.duration())
    }
}

/// Placement of the three layers on the output canvas.
///
/// Public entry points always use [`StageLayout::portrait`]; smaller stages exist so the
/// compositing pipeline can be exercised on tiny canvases.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct StageLayout {
    pub canvas: Canvas,
    /// Edge length of the square disc.
    pub disc_size: u32,
    /// Top-left corner of the disc on the canvas.
    pub disc_origin: (i32, i32),
    /// Width of the text overlay image.
    pub text_width: u32,
    /// Top edge of the text overlay image.
    pub text_top: i32,
}

impl StageLayout {
    /// The fixed 1080x1350 delivery format.
    pub fn portrait() -> Self {
        Self::build(
            Canvas {
                width: VIDEO_WIDTH,
                height: VIDEO_HEIGHT,
            },
            VINYL_SIZE,
        )
    }

    pub(crate) fn for_canvas(canvas: Canvas, disc_size: u32) -> VinylcastResult<Self> {
        if canvas.width == 0 || canvas.height == 0 {
            return Err(VinylcastError::validation("canvas must be non-empty"));
        }
        if disc_size == 0 || disc_size > canvas.width || disc_size > canvas.height {
            return Err(VinylcastError::validation(
                "disc size must be non-zero and fit the canvas",
            ));
        }
        if canvas.width <= 100 {
            return Err(VinylcastError::validation(
                "canvas must be wider than the text side margins",
            ));
        }
        Ok(Self::build(canvas, disc_size))
    }

    fn build(canvas: Canvas, disc_size: u32) -> Self {
        let x = (canvas.width - disc_size) / 2;
        let y = (canvas.height - disc_size) / 2;
        Self {
            canvas,
            disc_size,
            disc_origin: (x as i32, y as i32),
            text_width: canvas.width - 100,
            text_top: canvas.height as i32 - 200,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;

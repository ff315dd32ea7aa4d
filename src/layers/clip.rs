use crate::foundation::core::Fps;
use crate::foundation::error::{VinylcastError, VinylcastResult};

/// A time-domain layer: a pure function from timestamp to frame over `[0, duration)`.
///
/// Implementations carry no cross-frame mutable state, so samples may be taken concurrently
/// and in any order.
pub trait Clip: Send + Sync {
    /// Frame type produced by [`Clip::sample`].
    type Frame;

    /// Length in seconds, fixed at construction.
    fn duration(&self) -> f64;

    /// Frame rate the clip is sampled at.
    fn fps(&self) -> Fps {
        Fps::OUTPUT
    }

    /// Produce the frame at `t` seconds.
    fn sample(&self, t: f64) -> VinylcastResult<Self::Frame>;

    /// Reject timestamps outside `[0, duration)`.
    fn check_time(&self, t: f64) -> VinylcastResult<()> {
        if !t.is_finite() || t < 0.0 || t >= self.duration() {
            return Err(VinylcastError::validation(format!(
                "sample time {t}s outside clip range [0, {})",
                self.duration()
            )));
        }
        Ok(())
    }
}

//! Job orchestration: the frame compositor and the `generate_video` entry point.

pub mod compositor;
pub mod generate;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cooperative cancellation flag shared between a caller and a running render.
///
/// Checked before every frame sample; a cancelled render fails with
/// [`VinylcastError::Cancelled`](crate::VinylcastError::Cancelled).
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

//! Pixel operations shared by the layers and the compositor.

/// Fixed-point separable blur over packed RGB8.
pub mod blur;
/// Premultiplied-over compositing onto opaque frames.
pub mod composite;

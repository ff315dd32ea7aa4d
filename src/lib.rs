//! Vinylcast renders vertical spinning-vinyl music videos.
//!
//! A job takes a song, an optional cover image, an artist and a title, and a `[start, end)`
//! window. The output is a 1080x1350, 30 fps H.264/AAC MP4 with three layers:
//!
//! - an animated gradient background tinted from the cover's dominant colours
//! - the cover masked into a disc, rotating at 33.333 rpm
//! - a static artist/title overlay near the bottom edge
//!
//! Start with [`generate_video`] or, for control over options, fonts and cancellation,
//! [`Generator`].
#![forbid(unsafe_code)]

mod foundation;

pub mod assets;
pub mod audio;
pub mod config;
pub mod effects;
pub mod encode;
pub mod layers;
pub mod session;
pub mod text;

pub use crate::foundation::core::{
    Canvas, FPS, Fps, FrameIndex, FrameRange, StageLayout, TimeRange, VIDEO_HEIGHT, VIDEO_WIDTH,
    VINYL_SIZE,
};
pub use crate::foundation::error::{ErrorKind, LayerName, VinylcastError, VinylcastResult};
pub use crate::foundation::frame::{FrameRgb, PremulImage};

pub use crate::config::RenderOpts;
pub use crate::effects::blur::BlurMode;
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, OutputGuard, is_ffmpeg_on_path};
pub use crate::encode::sink::{AudioInputConfig, FrameSink, InMemorySink, SinkConfig};
pub use crate::layers::LayerCleanup;
pub use crate::session::CancelToken;
pub use crate::session::compositor::{Compositor, RenderStats};
pub use crate::session::generate::{Generator, RenderJob, generate_video};
pub use crate::text::fonts::{BuiltinFontResolver, FontResolver, SystemFontResolver};

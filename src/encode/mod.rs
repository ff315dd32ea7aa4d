//! Frame sinks: the in-memory test sink and the `ffmpeg` MP4 encoder.

pub mod ffmpeg;
pub mod sink;

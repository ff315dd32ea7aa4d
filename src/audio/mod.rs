//! Audio probing and trimming through the system `ffprobe`/`ffmpeg` binaries.

pub mod probe;
pub mod trim;

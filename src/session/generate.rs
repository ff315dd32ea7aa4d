use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::assets::cover::{placeholder_cover, prepare_cover};
use crate::assets::decode::decode_image;
use crate::assets::palette::{DEFAULT_SWATCH_COUNT, Palette, extract_palette};
use crate::audio::probe::probe_audio;
use crate::audio::trim::trim_audio;
use crate::config::RenderOpts;
use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, OutputGuard};
use crate::encode::sink::AudioInputConfig;
use crate::foundation::core::{FPS, FrameIndex, StageLayout, TimeRange, VINYL_SIZE};
use crate::foundation::error::{LayerName, VinylcastError, VinylcastResult};
use crate::foundation::frame::FrameRgb;
use crate::layers::LayerCleanup;
use crate::layers::background::Background;
use crate::layers::disc::DiscLayer;
use crate::session::CancelToken;
use crate::session::compositor::Compositor;
use crate::text::fonts::{FontResolver, SystemFontResolver};
use crate::text::layout::build_overlay;

static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// One music-video request.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RenderJob {
    /// Source song.
    pub audio: PathBuf,
    /// Cover art. `None` renders a placeholder record.
    pub cover: Option<PathBuf>,
    pub artist: String,
    pub title: String,
    /// Clip start in seconds of source audio.
    pub start: f64,
    /// Clip end (exclusive) in seconds of source audio.
    pub end: f64,
    /// Destination MP4.
    pub output: PathBuf,
}

impl RenderJob {
    /// Check everything that can be checked without touching the filesystem.
    pub fn validate(&self) -> VinylcastResult<TimeRange> {
        let range = TimeRange::clip(self.start, self.end)?;
        if self.output.as_os_str().is_empty() {
            return Err(VinylcastError::validation("output path must not be empty"));
        }
        Ok(range)
    }
}

/// Runs render jobs with one set of options and one font resolver.
pub struct Generator {
    opts: RenderOpts,
    fonts: Arc<dyn FontResolver>,
    cancel: CancelToken,
}

impl std::fmt::Debug for Generator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Generator")
            .field("opts", &self.opts)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

impl Generator {
    /// Validate `opts` and load the font database (`fonts_dir` first, then system fonts).
    pub fn new(opts: RenderOpts) -> VinylcastResult<Self> {
        opts.validate()?;
        let fonts = Arc::new(SystemFontResolver::new(opts.fonts_dir.as_deref()));
        Ok(Self {
            opts,
            fonts,
            cancel: CancelToken::new(),
        })
    }

    pub fn with_font_resolver(mut self, fonts: Arc<dyn FontResolver>) -> Self {
        self.fonts = fonts;
        self
    }

    /// Share `cancel` with the caller; cancelling aborts the current render.
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn opts(&self) -> &RenderOpts {
        &self.opts
    }

    /// Render `job` to its output path and return that path.
    ///
    /// Nothing is written before the time range is validated. On failure, temporaries and
    /// any partially written output are removed.
    #[tracing::instrument(
        skip(self, job),
        fields(
            audio = %job.audio.display(),
            out = %job.output.display(),
            start = job.start,
            end = job.end
        )
    )]
    pub fn generate(&self, job: &RenderJob) -> VinylcastResult<PathBuf> {
        let range = job.validate()?;
        if !self.opts.overwrite && job.output.exists() {
            return Err(VinylcastError::encode(format!(
                "output file '{}' already exists",
                job.output.display()
            )));
        }

        let info = probe_audio(&job.audio)?;
        if range.end() > info.duration {
            return Err(VinylcastError::duration_exceeded(range.end(), info.duration));
        }

        let compositor = self.build_compositor(job, range)?;

        let mut cleanup = LayerCleanup::new();
        let segment = trim_audio(&job.audio, range, self.opts.audio_sample_rate)?;
        let pcm_path = temp_pcm_path();
        cleanup.track(&pcm_path);
        segment.write_f32le(&pcm_path)?;
        let audio = AudioInputConfig {
            path: pcm_path,
            sample_rate: segment.sample_rate,
            channels: segment.channels,
        };

        let guard = OutputGuard::new(&job.output);
        let mut sink = FfmpegSink::new(FfmpegSinkOpts::from_render_opts(&job.output, &self.opts));
        let stats = compositor.render(compositor.full_range(), &mut sink, Some(audio))?;
        drop(sink);
        let out = guard.commit();
        cleanup.release();

        tracing::info!(
            out = %out.display(),
            frames = stats.frames,
            secs = stats.elapsed.as_secs_f64(),
            "video written"
        );
        Ok(out)
    }

    /// Composite the single frame at `t` seconds into the clip without encoding anything.
    /// The audio file is not read.
    pub fn render_preview_frame(&self, job: &RenderJob, t: f64) -> VinylcastResult<FrameRgb> {
        let range = job.validate()?;
        if !t.is_finite() || t < 0.0 || t >= range.duration() {
            return Err(VinylcastError::validation(format!(
                "preview time {t}s outside clip of {}s",
                range.duration()
            )));
        }
        let compositor = self.build_compositor(job, range)?;
        let idx = FrameIndex((t * f64::from(FPS)).floor() as u64);
        compositor.compose_frame(idx.min(FrameIndex(compositor.frame_count().saturating_sub(1))))
    }

    fn build_compositor(&self, job: &RenderJob, range: TimeRange) -> VinylcastResult<Compositor> {
        let stage = StageLayout::portrait();
        let duration = range.duration();

        let cover = load_cover(job.cover.as_deref())?;
        let palette = match job.cover {
            Some(_) => extract_palette(
                &image::DynamicImage::ImageRgb8(cover.clone()),
                DEFAULT_SWATCH_COUNT,
            ),
            None => Palette::default_palette(),
        };

        let background = Background::new(stage.canvas, &palette, duration, self.opts.blur)?;
        let disc = DiscLayer::new(&cover, stage.disc_size, duration)?;
        let text = build_overlay(
            self.fonts.as_ref(),
            &self.opts.font_family,
            &job.artist,
            &job.title,
            &stage,
        )?;

        let compositor = Compositor::new(background, disc, text, stage, self.opts.clone())?;
        Ok(compositor.with_cancel(self.cancel.clone()))
    }
}

/// Decode and square the cover, or synthesize a placeholder when there is none.
fn load_cover(path: Option<&Path>) -> VinylcastResult<image::RgbImage> {
    match path {
        Some(path) => {
            let img = decode_image(path)?;
            prepare_cover(&img, VINYL_SIZE)
                .map_err(|e| VinylcastError::layer(LayerName::Disc, e.to_string()))
        }
        None => {
            tracing::debug!("no cover given, using placeholder artwork");
            placeholder_cover(VINYL_SIZE)
                .map_err(|e| VinylcastError::layer(LayerName::Disc, e.to_string()))
        }
    }
}

fn temp_pcm_path() -> PathBuf {
    std::env::temp_dir().join(format!(
        "vinylcast_audio_{}_{}_{}.f32le",
        std::process::id(),
        TEMP_SEQ.fetch_add(1, Ordering::Relaxed),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0)
    ))
}

/// Render a spinning-vinyl video for `[start_time, end_time)` of `audio_path` with default
/// options and return the finished file's path.
pub fn generate_video(
    audio_path: impl AsRef<Path>,
    cover_path: Option<&Path>,
    output_path: impl AsRef<Path>,
    artist: &str,
    title: &str,
    start_time: f64,
    end_time: f64,
) -> VinylcastResult<PathBuf> {
    let job = RenderJob {
        audio: audio_path.as_ref().to_path_buf(),
        cover: cover_path.map(Path::to_path_buf),
        artist: artist.to_owned(),
        title: title.to_owned(),
        start: start_time,
        end: end_time,
        output: output_path.as_ref().to_path_buf(),
    };
    // Reject bad ranges before the font database is loaded.
    job.validate()?;
    Generator::new(RenderOpts::default())?.generate(&job)
}

#[cfg(test)]
#[path = "../../tests/unit/session/generate.rs"]
mod tests;

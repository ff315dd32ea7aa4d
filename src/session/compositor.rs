use std::collections::HashMap;
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use rayon::prelude::*;

use crate::config::RenderOpts;
use crate::effects::composite::over_premul_rgb;
use crate::encode::sink::{AudioInputConfig, FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex, FrameRange, StageLayout};
use crate::foundation::error::{VinylcastError, VinylcastResult};
use crate::foundation::frame::{FrameRgb, PremulImage};
use crate::layers::background::Background;
use crate::layers::clip::Clip;
use crate::layers::disc::DiscLayer;
use crate::session::CancelToken;
use crate::text::layout::TextOverlay;

const MAX_REORDER_BUFFER_BYTES: u64 = 128 * 1024 * 1024;
const SINK_CLOSED: &str = "encoder thread is not accepting frames";

/// Range render statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RenderStats {
    /// Frames delivered to the sink.
    pub frames: u64,
    pub elapsed: Duration,
}

impl RenderStats {
    /// Frames per wall-clock second.
    pub fn fps(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs <= 0.0 {
            0.0
        } else {
            self.frames as f64 / secs
        }
    }
}

/// Merges the background, the spinning disc and the static text overlay into output frames.
///
/// All layers are immutable once built and shared read-only across render workers.
pub struct Compositor {
    background: Arc<Background>,
    disc: Arc<DiscLayer>,
    text: Arc<TextOverlay>,
    layout: StageLayout,
    opts: RenderOpts,
    fps: Fps,
    frame_count: u64,
    cancel: CancelToken,
}

impl std::fmt::Debug for Compositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compositor")
            .field("layout", &self.layout)
            .field("frame_count", &self.frame_count)
            .field("parallel", &self.opts.parallel)
            .finish()
    }
}

impl Compositor {
    pub fn new(
        background: Background,
        disc: DiscLayer,
        text: TextOverlay,
        layout: StageLayout,
        opts: RenderOpts,
    ) -> VinylcastResult<Self> {
        opts.validate()?;
        if background.canvas() != layout.canvas {
            return Err(VinylcastError::validation(
                "background canvas does not match the stage layout",
            ));
        }
        if disc.size() != layout.disc_size {
            return Err(VinylcastError::validation(
                "disc size does not match the stage layout",
            ));
        }
        if (background.duration() - disc.duration()).abs() > 1e-9 {
            return Err(VinylcastError::validation(
                "background and disc durations differ",
            ));
        }
        let fps = Fps::OUTPUT;
        let frame_count = fps.secs_to_frames_round(background.duration());
        Ok(Self {
            background: Arc::new(background),
            disc: Arc::new(disc),
            text: Arc::new(text),
            layout,
            opts,
            fps,
            frame_count,
            cancel: CancelToken::new(),
        })
    }

    /// Attach a cancellation token checked before every frame.
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// `round(duration * fps)`.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn fps(&self) -> Fps {
        self.fps
    }

    pub fn layout(&self) -> &StageLayout {
        &self.layout
    }

    /// The whole clip as a frame range.
    pub fn full_range(&self) -> FrameRange {
        FrameRange::first(self.frame_count)
    }

    /// Composite frame `idx`: background, then the disc over it, then the text over both.
    pub fn compose_frame(&self, idx: FrameIndex) -> VinylcastResult<FrameRgb> {
        let mut worker = FrameWorker::new(&self.layout);
        self.compose_into(&mut worker, idx)?;
        Ok(worker.frame)
    }

    fn compose_into(&self, w: &mut FrameWorker, idx: FrameIndex) -> VinylcastResult<()> {
        if self.cancel.is_cancelled() {
            return Err(VinylcastError::Cancelled);
        }
        if idx.0 >= self.frame_count {
            return Err(VinylcastError::validation(format!(
                "frame {} outside clip of {} frames",
                idx.0, self.frame_count
            )));
        }
        let t = self.fps.frame_time(idx);
        self.background.render_into(t, &mut w.frame, &mut w.scratch)?;
        self.disc.render_into(t, &mut w.disc)?;
        let (dx, dy) = DiscLayer::position(&self.layout);
        over_premul_rgb(&mut w.frame, &w.disc, dx, dy);
        over_premul_rgb(&mut w.frame, &self.text.image, self.text.x, self.text.y);
        Ok(())
    }

    /// Render `range` and stream it into `sink`.
    ///
    /// The sink receives frames in strictly increasing index order. With `parallel` set,
    /// frames are rendered on a dedicated rayon pool in chunks and reordered on the encoder
    /// thread; output is identical to the sequential path.
    #[tracing::instrument(skip(self, sink, audio), fields(frames = range.len_frames()))]
    pub fn render(
        &self,
        range: FrameRange,
        sink: &mut dyn FrameSink,
        audio: Option<AudioInputConfig>,
    ) -> VinylcastResult<RenderStats> {
        if range.is_empty() {
            return Err(VinylcastError::validation("render range must be non-empty"));
        }
        if range.end.0 > self.frame_count {
            return Err(VinylcastError::validation(format!(
                "render range end {} exceeds clip length of {} frames",
                range.end.0, self.frame_count
            )));
        }

        let started = Instant::now();
        let cfg = SinkConfig {
            width: self.layout.canvas.width,
            height: self.layout.canvas.height,
            fps: self.fps,
            audio,
        };

        let cap = self.opts.channel_capacity.max(1);
        let bytes_per_frame = (cfg.width as u64)
            .saturating_mul(cfg.height as u64)
            .saturating_mul(3)
            .max(1);
        let max_chunk_by_mem = (MAX_REORDER_BUFFER_BYTES / bytes_per_frame).max(1);
        let chunk_size = normalized_chunk_size(self.opts.chunk_size)
            .min(max_chunk_by_mem)
            .min(range.len_frames());

        let pool = if self.opts.parallel {
            Some(build_thread_pool(self.opts.threads)?)
        } else {
            None
        };

        let frames = std::thread::scope(|scope| -> VinylcastResult<u64> {
            let (tx, rx) = mpsc::sync_channel::<FrameMsg>(cap);
            let range_start = range.start.0;
            let range_end = range.end.0;
            let sink_ref: &mut dyn FrameSink = sink;

            let enc = scope.spawn(move || -> VinylcastResult<u64> {
                sink_ref.begin(cfg)?;

                let mut next = range_start;
                let mut pending = HashMap::<u64, FrameRgb>::new();
                while next < range_end {
                    if let Some(frame) = pending.remove(&next) {
                        sink_ref.push_frame(FrameIndex(next), &frame)?;
                        next += 1;
                        continue;
                    }

                    let msg = rx.recv().map_err(|_| {
                        VinylcastError::encode("render workers stopped before the last frame")
                    })?;
                    pending.insert(msg.idx.0, msg.frame);
                }

                sink_ref.end()?;
                Ok(next - range_start)
            });

            let produce_res = match pool.as_ref() {
                Some(pool) => {
                    let mut chunk_start = range_start;
                    let mut res = Ok(());
                    while chunk_start < range_end {
                        let chunk_end = (chunk_start + chunk_size).min(range_end);
                        res = self.render_chunk_parallel(pool, &tx, chunk_start, chunk_end);
                        if res.is_err() {
                            break;
                        }
                        chunk_start = chunk_end;
                    }
                    res
                }
                None => self.render_sequential(&tx, range_start, range_end),
            };

            drop(tx);
            let enc_res = enc
                .join()
                .map_err(|_| VinylcastError::encode("encoder thread panicked"))?;

            match (produce_res, enc_res) {
                (Ok(()), enc_res) => enc_res,
                // The sink failed first; its error explains the closed channel.
                (Err(VinylcastError::Encode(msg)), Err(enc_err)) if msg == SINK_CLOSED => {
                    Err(enc_err)
                }
                (Err(e), _) => Err(e),
            }
        })?;

        let stats = RenderStats {
            frames,
            elapsed: started.elapsed(),
        };
        tracing::info!(
            frames = stats.frames,
            secs = stats.elapsed.as_secs_f64(),
            fps = stats.fps(),
            "render finished"
        );
        Ok(stats)
    }

    fn render_sequential(
        &self,
        tx: &mpsc::SyncSender<FrameMsg>,
        start: u64,
        end: u64,
    ) -> VinylcastResult<()> {
        let mut worker = FrameWorker::new(&self.layout);
        for f in start..end {
            self.compose_into(&mut worker, FrameIndex(f))?;
            send_frame(tx, FrameIndex(f), worker.frame.clone())?;
        }
        Ok(())
    }

    fn render_chunk_parallel(
        &self,
        pool: &rayon::ThreadPool,
        tx: &mpsc::SyncSender<FrameMsg>,
        start: u64,
        end: u64,
    ) -> VinylcastResult<()> {
        let tx = tx.clone();
        pool.install(|| {
            (start..end).into_par_iter().try_for_each_init(
                || FrameWorker::new(&self.layout),
                move |w, f| -> VinylcastResult<()> {
                    self.compose_into(w, FrameIndex(f))?;
                    send_frame(&tx, FrameIndex(f), w.frame.clone())
                },
            )
        })
    }
}

/// Per-thread reusable buffers.
struct FrameWorker {
    frame: FrameRgb,
    scratch: Vec<u8>,
    disc: PremulImage,
}

impl FrameWorker {
    fn new(layout: &StageLayout) -> Self {
        Self {
            frame: FrameRgb::new(layout.canvas.width, layout.canvas.height),
            scratch: Vec::new(),
            disc: PremulImage::transparent(layout.disc_size, layout.disc_size),
        }
    }
}

#[derive(Debug)]
struct FrameMsg {
    idx: FrameIndex,
    frame: FrameRgb,
}

fn send_frame(
    tx: &mpsc::SyncSender<FrameMsg>,
    idx: FrameIndex,
    frame: FrameRgb,
) -> VinylcastResult<()> {
    tx.send(FrameMsg { idx, frame })
        .map_err(|_| VinylcastError::encode(SINK_CLOSED))
}

fn normalized_chunk_size(chunk_size: usize) -> u64 {
    if chunk_size == 0 {
        1
    } else {
        chunk_size as u64
    }
}

fn build_thread_pool(threads: Option<usize>) -> VinylcastResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(VinylcastError::validation(
            "'threads' must be >= 1 when set",
        ));
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| VinylcastError::validation(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/session/compositor.rs"]
mod tests;

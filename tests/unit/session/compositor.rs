use super::*;
use crate::assets::palette::Palette;
use crate::effects::blur::BlurMode;
use crate::foundation::core::Canvas;
use crate::foundation::error::ErrorKind;
use crate::encode::sink::InMemorySink;
use crate::text::fonts::BuiltinFontResolver;
use crate::text::layout::build_overlay;

const DISC: u32 = 60;

fn stage() -> StageLayout {
    StageLayout::for_canvas(
        Canvas {
            width: 200,
            height: 400,
        },
        DISC,
    )
    .unwrap()
}

fn cover() -> image::RgbImage {
    image::RgbImage::from_fn(DISC, DISC, |x, y| {
        image::Rgb([(x * 4) as u8, (y * 4) as u8, 120])
    })
}

fn background(duration: f64) -> Background {
    Background::new(
        stage().canvas,
        &Palette::default_palette(),
        duration,
        BlurMode::None,
    )
    .unwrap()
}

fn disc(duration: f64) -> DiscLayer {
    DiscLayer::new(&cover(), DISC, duration).unwrap()
}

fn text() -> TextOverlay {
    build_overlay(&BuiltinFontResolver, "Helvetica", "Artist", "Song", &stage()).unwrap()
}

fn opts(parallel: bool) -> RenderOpts {
    RenderOpts {
        parallel,
        threads: Some(3),
        chunk_size: 4,
        channel_capacity: 2,
        ..RenderOpts::default()
    }
}

fn compositor(duration: f64, parallel: bool) -> Compositor {
    Compositor::new(
        background(duration),
        disc(duration),
        text(),
        stage(),
        opts(parallel),
    )
    .unwrap()
}

#[test]
fn frame_count_rounds_duration() {
    assert_eq!(compositor(0.5, false).frame_count(), 15);
    assert_eq!(compositor(0.51, false).frame_count(), 15);
    assert_eq!(compositor(0.52, false).frame_count(), 16);
    assert_eq!(compositor(0.5, false).full_range(), FrameRange::first(15));
}

#[test]
fn parallel_output_matches_sequential() {
    let mut seq = InMemorySink::new();
    let c = compositor(0.5, false);
    let stats = c.render(c.full_range(), &mut seq, None).unwrap();
    assert_eq!(stats.frames, 15);

    let mut par = InMemorySink::new();
    let c = compositor(0.5, true);
    let stats = c.render(c.full_range(), &mut par, None).unwrap();
    assert_eq!(stats.frames, 15);

    assert!(seq.ended() && par.ended());
    assert_eq!(seq.frames(), par.frames());
}

#[test]
fn sink_sees_strictly_increasing_indices() {
    let c = compositor(0.5, true);
    let mut sink = InMemorySink::new();
    c.render(c.full_range(), &mut sink, None).unwrap();

    let idx: Vec<u64> = sink.frames().iter().map(|(i, _)| i.0).collect();
    assert_eq!(idx, (0..15).collect::<Vec<_>>());

    let cfg = sink.config().unwrap();
    assert_eq!((cfg.width, cfg.height), (200, 400));
    assert_eq!(cfg.fps, Fps::OUTPUT);
    assert!(cfg.audio.is_none());
}

#[test]
fn sub_range_renders_only_its_frames() {
    let c = compositor(0.5, true);
    let mut sink = InMemorySink::new();
    let range = FrameRange::new(FrameIndex(5), FrameIndex(10)).unwrap();
    let stats = c.render(range, &mut sink, None).unwrap();
    assert_eq!(stats.frames, 5);
    let idx: Vec<u64> = sink.frames().iter().map(|(i, _)| i.0).collect();
    assert_eq!(idx, [5, 6, 7, 8, 9]);
    assert_eq!(sink.frames()[0].1, c.compose_frame(FrameIndex(5)).unwrap());
}

#[test]
fn layers_stack_background_disc_text() {
    let duration = 1.0;
    // Opaque 10x10 red square on top of the disc centre.
    let mut square = PremulImage::transparent(10, 10);
    for px in square.data.chunks_exact_mut(4) {
        px.copy_from_slice(&[255, 0, 0, 255]);
    }
    let layout = stage();
    let (dx, dy) = DiscLayer::position(&layout);
    let overlay = TextOverlay {
        image: square,
        x: dx + 40,
        y: dy + 40,
    };
    let c = Compositor::new(
        background(duration),
        disc(duration),
        overlay,
        layout,
        opts(false),
    )
    .unwrap();

    let idx = FrameIndex(7);
    let t = Fps::OUTPUT.frame_time(idx);
    let frame = c.compose_frame(idx).unwrap();
    let bg = background(duration).sample(t).unwrap();
    let disc_px = disc(duration).sample(t).unwrap();

    // Canvas corner: background only.
    assert_eq!(frame.pixel(0, 0), bg.pixel(0, 0));
    assert_eq!(frame.pixel(199, 399), bg.pixel(199, 399));
    // Disc centre is fully opaque and covers the background.
    let centre = disc_px.pixel(DISC / 2, DISC / 2);
    assert_eq!(centre[3], 255);
    assert_eq!(
        frame.pixel(dx as u32 + DISC / 2, dy as u32 + DISC / 2),
        [centre[0], centre[1], centre[2]]
    );
    // Overlay sits above the disc.
    assert_eq!(frame.pixel(dx as u32 + 45, dy as u32 + 45), [255, 0, 0]);
}

#[test]
fn cancelled_render_fails_with_cancelled() {
    let cancel = CancelToken::new();
    let c = compositor(0.5, true).with_cancel(cancel.clone());
    cancel.cancel();

    let mut sink = InMemorySink::new();
    let err = c.render(c.full_range(), &mut sink, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cancelled);
    assert!(!sink.ended());

    let err = c.compose_frame(FrameIndex(0)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cancelled);
}

#[test]
fn cancelled_sequential_render_fails_with_cancelled() {
    let cancel = CancelToken::new();
    let c = compositor(0.5, false).with_cancel(cancel.clone());
    cancel.cancel();
    let mut sink = InMemorySink::new();
    let err = c.render(c.full_range(), &mut sink, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cancelled);
}

#[test]
fn rejects_bad_ranges() {
    let c = compositor(0.5, false);
    let mut sink = InMemorySink::new();

    let empty = FrameRange::new(FrameIndex(3), FrameIndex(3)).unwrap();
    let err = c.render(empty, &mut sink, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = c.render(FrameRange::first(16), &mut sink, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = c.compose_frame(FrameIndex(15)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn rejects_mismatched_layers() {
    let err = Compositor::new(
        background(0.5),
        DiscLayer::new(&cover(), 50, 0.5).unwrap(),
        text(),
        stage(),
        opts(false),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = Compositor::new(background(0.5), disc(0.6), text(), stage(), opts(false))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let wide = Background::new(
        Canvas {
            width: 220,
            height: 400,
        },
        &Palette::default_palette(),
        0.5,
        BlurMode::None,
    )
    .unwrap();
    let err = Compositor::new(wide, disc(0.5), text(), stage(), opts(false)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn rejects_invalid_opts() {
    let bad = RenderOpts {
        threads: Some(0),
        ..RenderOpts::default()
    };
    let err = Compositor::new(background(0.5), disc(0.5), text(), stage(), bad).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

/// Accepts a few frames, then fails.
struct FailingSink {
    accepted: u64,
}

impl FrameSink for FailingSink {
    fn begin(&mut self, _cfg: SinkConfig) -> VinylcastResult<()> {
        Ok(())
    }

    fn push_frame(&mut self, _idx: FrameIndex, _frame: &FrameRgb) -> VinylcastResult<()> {
        if self.accepted == 3 {
            return Err(VinylcastError::encode("disk full"));
        }
        self.accepted += 1;
        Ok(())
    }

    fn end(&mut self) -> VinylcastResult<()> {
        Ok(())
    }
}

#[test]
fn sink_error_is_reported() {
    for parallel in [false, true] {
        let c = compositor(0.5, parallel);
        let mut sink = FailingSink { accepted: 0 };
        let err = c.render(c.full_range(), &mut sink, None).unwrap_err();
        match err {
            VinylcastError::Encode(msg) => assert_eq!(msg, "disk full", "parallel={parallel}"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(sink.accepted, 3);
    }
}

#[test]
fn stats_fps_handles_zero_elapsed() {
    assert_eq!(RenderStats::default().fps(), 0.0);
    let stats = RenderStats {
        frames: 30,
        elapsed: Duration::from_secs(2),
    };
    assert_eq!(stats.fps(), 15.0);
}

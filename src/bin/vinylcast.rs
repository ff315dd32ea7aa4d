use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "vinylcast", version, about = "Render spinning-vinyl music videos")]
struct Cli {
    /// Log at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render an MP4 video (requires `ffmpeg` and `ffprobe` on PATH).
    Render(RenderArgs),
    /// Render a single composite frame as a PNG.
    Frame(FrameArgs),
}

#[derive(Args, Debug)]
struct JobArgs {
    /// Source audio file.
    #[arg(long)]
    audio: PathBuf,

    /// Cover image. A placeholder record is drawn when omitted.
    #[arg(long)]
    cover: Option<PathBuf>,

    #[arg(long, default_value = "")]
    artist: String,

    #[arg(long, default_value = "")]
    title: String,

    /// Clip start in seconds.
    #[arg(long, default_value_t = 0.0)]
    start: f64,

    /// Clip end in seconds (exclusive).
    #[arg(long)]
    end: f64,
}

#[derive(Args, Debug)]
struct OptArgs {
    /// Render options JSON; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Render frames on a worker pool.
    #[arg(long, conflicts_with = "sequential")]
    parallel: bool,

    /// Render frames on the calling thread.
    #[arg(long)]
    sequential: bool,

    /// Worker thread count.
    #[arg(long)]
    threads: Option<usize>,

    #[arg(long)]
    font_family: Option<String>,

    /// Directory searched for fonts before the system fonts.
    #[arg(long)]
    fonts_dir: Option<PathBuf>,

    /// x264 constant rate factor (0-51).
    #[arg(long)]
    crf: Option<u8>,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    job: JobArgs,

    #[command(flatten)]
    opts: OptArgs,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[command(flatten)]
    job: JobArgs,

    #[command(flatten)]
    opts: OptArgs,

    /// Time in seconds from the clip start.
    #[arg(long)]
    at: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Frame(args) => cmd_frame(args),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn load_opts(args: &OptArgs) -> anyhow::Result<vinylcast::RenderOpts> {
    let mut opts = match &args.config {
        Some(path) => vinylcast::RenderOpts::from_json_path(path)?,
        None => vinylcast::RenderOpts::default(),
    };
    if args.parallel {
        opts.parallel = true;
    }
    if args.sequential {
        opts.parallel = false;
    }
    if args.threads.is_some() {
        opts.threads = args.threads;
    }
    if let Some(family) = &args.font_family {
        opts.font_family = family.clone();
    }
    if args.fonts_dir.is_some() {
        opts.fonts_dir = args.fonts_dir.clone();
    }
    if let Some(crf) = args.crf {
        opts.crf = crf;
    }
    opts.validate()?;
    Ok(opts)
}

fn make_job(args: JobArgs, out: PathBuf) -> vinylcast::RenderJob {
    vinylcast::RenderJob {
        audio: args.audio,
        cover: args.cover,
        artist: args.artist,
        title: args.title,
        start: args.start,
        end: args.end,
        output: out,
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let opts = load_opts(&args.opts)?;
    let job = make_job(args.job, args.out);
    job.validate()?;

    let generator = vinylcast::Generator::new(opts)?;
    let out = generator.generate(&job)?;
    eprintln!("wrote {}", out.display());
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let opts = load_opts(&args.opts)?;
    let out = args.out;
    let job = make_job(args.job, out.clone());
    job.validate()?;

    let generator = vinylcast::Generator::new(opts)?;
    let frame = generator.render_preview_frame(&job, args.at)?;

    let rgba = frame.to_rgba8();
    vinylcast::assets::decode::write_png_rgba8(&out, frame.width, frame.height, &rgba)
        .with_context(|| format!("write png '{}'", out.display()))?;

    eprintln!("wrote {}", out.display());
    Ok(())
}

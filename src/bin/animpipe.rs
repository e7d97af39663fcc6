use std::path::{Path, PathBuf};

use anyhow::Context as _;
use animpipe::{
    AnimationCodec as _, EncodeSettings, EncodedAsset, FfmpegMedia, GifCodec, JobController,
    JobId, JobStatus, ResourceLimits, SeekableMedia, SourceAsset, TracingObserver,
};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "animpipe", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Shrink an existing animated GIF.
    Compress(CompressArgs),
    /// Turn a clip of a video into an animated GIF (requires `ffmpeg`/`ffprobe` on PATH and the
    /// `media-ffmpeg` feature).
    Capture(CaptureArgs),
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Output GIF path.
    #[arg(long)]
    out: PathBuf,

    /// Maximum output width in pixels (0 keeps the source width).
    #[arg(long)]
    width: Option<u32>,

    /// Global palette size, 2..=255.
    #[arg(long)]
    colors: Option<u16>,

    /// Base settings JSON; flags override its fields.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Resource limits JSON.
    #[arg(long)]
    limits: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct CompressArgs {
    /// Input GIF.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Keep every k-th frame.
    #[arg(long)]
    decimate: Option<u32>,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Args, Debug)]
struct CaptureArgs {
    /// Input video.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Capture rate, 1..=24.
    #[arg(long)]
    fps: Option<u32>,

    /// Window start in seconds.
    #[arg(long)]
    start: Option<f64>,

    /// Window length in seconds, at most 10.
    #[arg(long)]
    duration: Option<f64>,

    #[command(flatten)]
    common: CommonArgs,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Compress(args) => cmd_compress(args).await,
        Command::Capture(args) => cmd_capture(args).await,
    }
}

fn load_settings(common: &CommonArgs) -> anyhow::Result<EncodeSettings> {
    let mut settings = match &common.settings {
        Some(path) => EncodeSettings::from_path(path)?,
        None => EncodeSettings::default(),
    };
    if let Some(w) = common.width {
        settings.target_max_width = w;
    }
    if let Some(c) = common.colors {
        settings.max_colors = c;
    }
    Ok(settings)
}

fn load_limits(common: &CommonArgs) -> anyhow::Result<ResourceLimits> {
    let Some(path) = &common.limits else {
        return Ok(ResourceLimits::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read limits '{}'", path.display()))?;
    Ok(ResourceLimits::from_json_str(&text)?)
}

async fn cmd_compress(args: CompressArgs) -> anyhow::Result<()> {
    let mut settings = load_settings(&args.common)?;
    if let Some(k) = args.decimate {
        settings.decimation_factor = k;
    }

    let codec = GifCodec::new();
    let bytes = std::fs::read(&args.in_path)
        .with_context(|| format!("read input '{}'", args.in_path.display()))?;
    let asset = EncodedAsset::probe(&codec, bytes)
        .with_context(|| format!("probe '{}'", args.in_path.display()))?;

    let mut ctl: JobController<GifCodec> =
        JobController::new(codec).with_limits(load_limits(&args.common)?);
    let id = ctl.add(SourceAsset::Encoded(asset), settings);
    run_and_write(&mut ctl, id, &args.common.out).await
}

async fn cmd_capture(args: CaptureArgs) -> anyhow::Result<()> {
    let mut settings = load_settings(&args.common)?;
    if args.fps.is_some() {
        settings.capture_fps = args.fps;
    }
    if args.start.is_some() {
        settings.capture_start_sec = args.start;
    }
    if args.duration.is_some() {
        settings.capture_duration_sec = args.duration;
    }

    let media = FfmpegMedia::open(&args.in_path)
        .with_context(|| format!("open video '{}'", args.in_path.display()))?;

    let mut ctl: JobController<GifCodec, FfmpegMedia> =
        JobController::new(GifCodec::new()).with_limits(load_limits(&args.common)?);
    let id = ctl.add(SourceAsset::Media(media), settings);
    run_and_write(&mut ctl, id, &args.common.out).await
}

async fn run_and_write<M: SeekableMedia>(
    ctl: &mut JobController<GifCodec, M>,
    id: JobId,
    out: &Path,
) -> anyhow::Result<()> {
    ctl.run_next(&mut TracingObserver).await;

    let job = ctl.job(id).context("job disappeared")?;
    if job.status() != JobStatus::Done {
        let reason = job
            .error()
            .map(|e| e.to_string())
            .unwrap_or_else(|| format!("job ended {:?}", job.status()));
        anyhow::bail!("{reason}");
    }
    let stats = job.stats();
    let artifact = ctl.output(id).context("done job has no output")?;

    if let Some(parent) = out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(out, &artifact.bytes)
        .with_context(|| format!("write {} '{}'", ctl.codec().media_type(), out.display()))?;

    eprintln!(
        "wrote {} ({} frames, {}x{}, {} bytes)",
        out.display(),
        stats.frames_encoded,
        stats.output_width,
        stats.output_height,
        artifact.byte_len
    );
    Ok(())
}

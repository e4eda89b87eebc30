use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "storyreel", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the job to a video file (requires `ffmpeg` and `ffprobe` on PATH).
    Render(RenderArgs),
    /// Render a single composited frame as a PNG.
    Frame(FrameArgs),
    /// Print the merged word timeline as JSON.
    Timeline(TimelineArgs),
}

#[derive(Parser, Debug)]
struct OptionArgs {
    /// Render options JSON; missing keys keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Caption font file.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Output frame rate (whole frames per second).
    #[arg(long)]
    fps: Option<u32>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Job manifest JSON.
    #[arg(long)]
    job: PathBuf,

    /// Output path; overrides the manifest's `output`.
    #[arg(long)]
    out: Option<PathBuf>,

    #[command(flatten)]
    options: OptionArgs,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Job manifest JSON.
    #[arg(long)]
    job: PathBuf,

    /// Presentation time in seconds.
    #[arg(long)]
    at: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    options: OptionArgs,
}

#[derive(Parser, Debug)]
struct TimelineArgs {
    /// Job manifest JSON.
    #[arg(long)]
    job: PathBuf,

    #[command(flatten)]
    options: OptionArgs,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Timeline(args) => cmd_timeline(args),
    }
}

fn load_options(args: &OptionArgs) -> anyhow::Result<storyreel::RenderOptions> {
    let mut opts = match &args.config {
        Some(path) => storyreel::RenderOptions::from_path(path)?,
        None => storyreel::RenderOptions::default(),
    };
    if let Some(font) = &args.font {
        opts.caption.font_path = font.clone();
    }
    if let Some(fps) = args.fps {
        opts.fps = storyreel::Fps::new(fps, 1)?;
    }
    opts.validate()?;
    Ok(opts)
}

fn load_job(
    job: &Path,
    options: &OptionArgs,
) -> anyhow::Result<(storyreel::RenderPlan, storyreel::RenderOptions)> {
    let opts = load_options(options)?;
    let plan = storyreel::load_plan(job, &opts)
        .with_context(|| format!("load job '{}'", job.display()))?;
    Ok((plan, opts))
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let (mut plan, opts) = load_job(&args.job, &args.options)?;
    if let Some(out) = args.out {
        plan.output_path = out;
    }

    let report = storyreel::render(&plan, &opts, &storyreel::CancelToken::new())?;
    eprintln!(
        "wrote {} ({} frames, {:.2}s, {} captions, {} overlays)",
        report.output_path.display(),
        report.frame_count,
        report.total_duration,
        report.captions,
        report.overlays
    );
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let (plan, opts) = load_job(&args.job, &args.options)?;
    let frame = storyreel::render_frame_at(&plan, &opts, args.at)?;
    storyreel::save_frame_png(&frame, &args.out)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_timeline(args: TimelineArgs) -> anyhow::Result<()> {
    let (plan, _opts) = load_job(&args.job, &args.options)?;
    let timeline = storyreel::normalize_segments(&plan.segments);
    let json = serde_json::to_string_pretty(&timeline).context("serialize timeline")?;
    println!("{json}");
    Ok(())
}

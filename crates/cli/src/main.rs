use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use lens_core::compositing::infrastructure::cpu_face_compositor::CpuFaceCompositor;
use lens_core::inference::domain::face_models::ModelSet;
use lens_core::inference::infrastructure::onnx_center_face::OnnxCenterFace;
use lens_core::inference::infrastructure::onnx_face_mesh::OnnxFaceMesh;
use lens_core::inference::infrastructure::onnx_face_swap::OnnxFaceSwap;
use lens_core::output::infrastructure::ffmpeg_file_sink::FfmpegFileSink;
use lens_core::output::infrastructure::ready_ticker::ReadyTicker;
use lens_core::pipeline::frame_pipeline::FramePipeline;
use lens_core::pipeline::infrastructure::threaded_frame_pipeline::ThreadedFramePipeline;
use lens_core::shared::constants::{MAX_FRAME_RATE, VIDEO_EXTENSIONS};
use lens_core::shared::model_resolver;
use lens_core::shared::settings::PipelineSettings;
use lens_core::video::domain::video_reader::VideoReader;
use lens_core::video::frame_pump::FramePump;
use lens_core::video::infrastructure::ffmpeg_reader::FfmpegReader;

/// How long to wait for in-flight frames to reach the sink at end of input.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Real-time face swap for video streams.
#[derive(Parser)]
#[command(name = "lens")]
struct Cli {
    /// Source video file.
    #[arg(long)]
    src: PathBuf,

    /// Destination video file (mp4, mov, avi, mkv or wmv).
    #[arg(long)]
    dst: PathBuf,

    /// Directory holding CenterFace.onnx and FaceMesh.onnx (defaults to the model cache).
    #[arg(long)]
    root_dir: Option<PathBuf>,

    /// Face-swap model, absolute or relative to --root-dir.
    #[arg(long)]
    face_swap_model: String,

    /// Output frame rate (1-60).
    #[arg(long)]
    frame_rate: Option<u32>,

    /// Number of worker threads.
    #[arg(long)]
    workers: Option<usize>,

    /// Capacity of the input and output queues.
    #[arg(long)]
    queue_capacity: Option<usize>,

    /// Output resolution as WxH (defaults to the source resolution).
    #[arg(long, value_parser = parse_size)]
    output_size: Option<(u32, u32)>,

    /// Settings file (defaults to <config dir>/Lens/settings.json).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Restart the source at end of file. Runs until Ctrl-C unless
    /// --max-frames is given.
    #[arg(long = "loop")]
    looping: bool,

    /// Stop after this many source frames.
    #[arg(long)]
    max_frames: Option<u64>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;
    let settings = load_settings(&cli)?;

    let models = build_models(&cli, &settings)?;

    let mut reader = FfmpegReader::new();
    let metadata = reader.open(&cli.src)?;
    let (out_w, out_h) = cli
        .output_size
        .unwrap_or((even(metadata.width), even(metadata.height)));
    log::info!(
        "Writing {}x{} @ {} fps to {}",
        out_w,
        out_h,
        settings.frame_rate,
        cli.dst.display()
    );

    let sink = FfmpegFileSink::new(&cli.dst, out_w, out_h, settings.frame_rate);
    let compositor = CpuFaceCompositor::new(settings.feather_erode, settings.feather_blur);
    let mut pipeline = ThreadedFramePipeline::new(
        models,
        Box::new(compositor),
        Box::new(sink),
        &settings,
    )?;

    let frame_interval = Duration::from_secs(1) / settings.frame_rate;
    let mut ticker = ReadyTicker::spawn(frame_interval, pipeline.ready_handle());

    let cancelled = install_cancel_handler()?;
    let pump = FramePump::new(settings.frame_rate, cancelled)
        .with_looping(cli.looping)
        .with_max_frames(cli.max_frames);
    let pumped = pump.run(&mut reader, &cli.src, |frame| pipeline.submit(frame));
    reader.close();

    if !pipeline.drain(DRAIN_TIMEOUT) {
        log::warn!(
            "{} frames still pending after {:?}, discarding",
            pipeline.pending(),
            DRAIN_TIMEOUT
        );
    }
    ticker.stop();
    pipeline.shutdown()?;

    let report = pumped?;
    log::info!(
        "Source: {} frames decoded, {} accepted, {} restarts",
        report.frames_decoded,
        report.frames_accepted,
        report.restarts
    );
    eprintln!("{}", pipeline.stats().summary_string());
    log::info!("Output written to {}", cli.dst.display());
    Ok(())
}

/// Ctrl-C stops the source; queued frames are still drained and the output
/// file is finalized.
fn install_cancel_handler() -> Result<Arc<AtomicBool>, ctrlc::Error> {
    let cancelled = Arc::new(AtomicBool::new(false));
    let flag = cancelled.clone();
    ctrlc::set_handler(move || {
        log::info!("Interrupted, finishing output...");
        flag.store(true, Ordering::SeqCst);
    })?;
    Ok(cancelled)
}

fn build_models(
    cli: &Cli,
    settings: &PipelineSettings,
) -> Result<ModelSet, Box<dyn std::error::Error>> {
    let root_dir = cli.root_dir.as_deref();

    let detector_path = model_resolver::resolve(&settings.detector_model, root_dir)?;
    log::info!("Loading detector: {}", detector_path.display());
    let detector = OnnxCenterFace::new(&detector_path)?;

    let mesh_path = model_resolver::resolve(&settings.mesh_model, root_dir)?;
    log::info!("Loading face mesh: {}", mesh_path.display());
    let mesh = OnnxFaceMesh::new(&mesh_path)?;

    let swap_path = model_resolver::resolve(&cli.face_swap_model, root_dir)?;
    log::info!("Loading face swap: {}", swap_path.display());
    let swap = OnnxFaceSwap::new(&swap_path)?;

    Ok(ModelSet::new(
        Box::new(detector),
        Box::new(mesh),
        Box::new(swap),
    ))
}

/// Settings from file, with command-line values taking precedence.
fn load_settings(cli: &Cli) -> Result<PipelineSettings, Box<dyn std::error::Error>> {
    let settings = PipelineSettings::load(cli.config.as_deref())?;
    let settings = apply_overrides(settings, cli);
    settings.validate()?;
    Ok(settings)
}

fn apply_overrides(mut settings: PipelineSettings, cli: &Cli) -> PipelineSettings {
    if let Some(frame_rate) = cli.frame_rate {
        settings.frame_rate = frame_rate;
    }
    if let Some(workers) = cli.workers {
        settings.workers = workers;
    }
    if let Some(capacity) = cli.queue_capacity {
        settings.queue_capacity = capacity;
    }
    settings
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.src.is_file() {
        return Err(format!("Source file not found: {}", cli.src.display()).into());
    }
    if !is_video(&cli.dst) {
        return Err(format!(
            "Destination must be a video file ({}), got {}",
            VIDEO_EXTENSIONS.join(", "),
            cli.dst.display()
        )
        .into());
    }
    if let Some(rate) = cli.frame_rate {
        if !(1..=MAX_FRAME_RATE).contains(&rate) {
            return Err(
                format!("Frame rate must be between 1 and {MAX_FRAME_RATE}, got {rate}").into(),
            );
        }
    }
    if cli.workers == Some(0) {
        return Err("--workers must be at least 1".into());
    }
    if cli.queue_capacity == Some(0) {
        return Err("--queue-capacity must be at least 1".into());
    }
    if cli.max_frames == Some(0) {
        return Err("--max-frames must be at least 1".into());
    }
    Ok(())
}

fn is_video(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| VIDEO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Parses `WxH`; both sides must be even for 4:2:0 encoding.
fn parse_size(value: &str) -> Result<(u32, u32), String> {
    let (w, h) = value
        .split_once(|c| c == 'x' || c == 'X')
        .ok_or_else(|| format!("expected WxH, got '{value}'"))?;
    let w: u32 = w.trim().parse().map_err(|_| format!("bad width '{w}'"))?;
    let h: u32 = h.trim().parse().map_err(|_| format!("bad height '{h}'"))?;
    if w == 0 || h == 0 || w % 2 != 0 || h % 2 != 0 {
        return Err(format!("output size must be positive and even, got {w}x{h}"));
    }
    Ok((w, h))
}

/// Largest even value not above `v`, at least 2.
fn even(v: u32) -> u32 {
    (v & !1).max(2)
}

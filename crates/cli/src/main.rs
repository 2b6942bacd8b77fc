use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;

use facegate_core::capture::domain::device_catalog::DeviceCatalog;
use facegate_core::capture::domain::media_backend::MediaBackend;
use facegate_core::capture::infrastructure::nokhwa_backend::NokhwaBackend;
use facegate_core::detection::domain::face_landmarks::FaceLandmarks;
use facegate_core::detection::domain::model_bundle::{ModelBundle, ModelKind, ModelStatus};
use facegate_core::detection::infrastructure::http_model_fetcher::HttpModelFetcher;
use facegate_core::detection::infrastructure::onnx_face_detector::{
    OnnxFaceDetector, DEFAULT_CONFIDENCE,
};
use facegate_core::detection::infrastructure::onnx_landmark_predictor::OnnxLandmarkPredictor;
use facegate_core::pipeline::detection_pipeline::DetectionPipeline;
use facegate_core::pipeline::infrastructure::image_overlay_sink::ImageOverlaySink;
use facegate_core::pipeline::overlay::{NullOverlaySink, OverlaySink};
use facegate_core::pipeline::presence_monitor::{MonitorConfig, PresenceMonitor};
use facegate_core::shared::constants::DEVICE_SETTLE_DELAY;
use facegate_core::shared::geometry::Size;

/// Watch a camera and report when a face is present.
#[derive(Parser)]
#[command(name = "facegate")]
struct Cli {
    /// List available cameras and exit.
    #[arg(long)]
    list_devices: bool,

    /// Camera device id (defaults to the first listed device).
    #[arg(long)]
    device: Option<String>,

    /// How long to monitor before exiting, in seconds.
    #[arg(long, default_value = "30")]
    duration: u64,

    /// Interval between detection passes, in milliseconds.
    #[arg(long, default_value = "1500")]
    period_ms: u64,

    /// Face detection confidence threshold (0.0-1.0).
    #[arg(long, default_value_t = DEFAULT_CONFIDENCE)]
    confidence: f64,

    /// Write the latest landmark overlay as a PNG into this directory.
    #[arg(long)]
    overlay_dir: Option<PathBuf>,

    /// Directory with pre-bundled model files (checked before download).
    #[arg(long)]
    models_dir: Option<PathBuf>,
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

    let backend: Arc<dyn MediaBackend> = Arc::new(NokhwaBackend::new());

    if cli.list_devices {
        return list_devices(backend);
    }

    let fetcher = match cli.models_dir.clone() {
        Some(dir) => HttpModelFetcher::with_bundled_dir(dir),
        None => HttpModelFetcher::new(),
    };
    let bundle = ModelBundle::new(Arc::new(fetcher));
    let pipeline = DetectionPipeline::new(
        Box::new(OnnxFaceDetector::new(bundle.clone(), cli.confidence)),
        Box::new(OnnxLandmarkPredictor::new(bundle.clone())),
        build_sink(&cli)?,
    );
    let config = MonitorConfig {
        sample_period: Duration::from_millis(cli.period_ms),
        settle_delay: DEVICE_SETTLE_DELAY,
    };
    let mut monitor = PresenceMonitor::new(backend, bundle, pipeline, config);

    monitor.refresh_devices()?;
    let device = match cli.device.clone() {
        Some(id) => id,
        None => monitor
            .default_device_id()
            .ok_or("no camera available to select")?,
    };
    let label = monitor
        .devices()
        .iter()
        .find(|d| d.id() == device)
        .map(|d| d.label().to_string())
        .unwrap_or_else(|| device.clone());
    log::info!("monitoring camera {device} ({label})");

    monitor.enable_camera(&device)?;
    watch(&monitor, Duration::from_secs(cli.duration));
    monitor.disable_camera();
    Ok(())
}

/// Poll the gate and print presence transitions, the CLI stand-in for
/// enabling and disabling a start button.
fn watch(monitor: &PresenceMonitor, duration: Duration) {
    let deadline = Instant::now() + duration;
    let mut last_enabled = false;
    let mut models_announced = false;

    println!("no face: start action disabled");
    while Instant::now() < deadline {
        if !models_announced {
            if monitor.is_gate_ready() {
                log::info!("detection models ready");
                models_announced = true;
            } else if gate_model_failed(monitor) {
                log::warn!("a required model failed to load; preview stays up but presence detection is inert");
                models_announced = true;
            }
        }

        let enabled = monitor.start_action_enabled();
        if enabled != last_enabled {
            if enabled {
                println!("face detected: start action enabled");
            } else {
                println!("no face: start action disabled");
            }
            last_enabled = enabled;
        }
        thread::sleep(Duration::from_millis(100));
    }
}

fn gate_model_failed(monitor: &PresenceMonitor) -> bool {
    monitor.model_status(ModelKind::Detector) == ModelStatus::Failed
        || monitor.model_status(ModelKind::Landmarks) == ModelStatus::Failed
}

fn list_devices(backend: Arc<dyn MediaBackend>) -> Result<(), Box<dyn std::error::Error>> {
    let mut catalog = DeviceCatalog::new(backend);
    println!("{:<12} label", "id");
    for device in catalog.refresh()? {
        println!("{:<12} {}", device.id(), device.label());
    }
    Ok(())
}

fn build_sink(cli: &Cli) -> Result<Box<dyn OverlaySink>, Box<dyn std::error::Error>> {
    match &cli.overlay_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            Ok(Box::new(SnapshotSink {
                inner: ImageOverlaySink::new(),
                path: dir.join("overlay.png"),
            }))
        }
        None => Ok(Box::new(NullOverlaySink)),
    }
}

/// Overlay sink that saves the rendered surface to disk after every pass.
struct SnapshotSink {
    inner: ImageOverlaySink,
    path: PathBuf,
}

impl OverlaySink for SnapshotSink {
    fn prepare(&mut self, size: Size) {
        self.inner.prepare(size);
    }

    fn clear(&mut self) {
        self.inner.clear();
    }

    fn draw_landmarks(&mut self, landmarks: &FaceLandmarks) {
        self.inner.draw_landmarks(landmarks);
    }

    fn present(&mut self) {
        if let Err(e) = self.inner.save(&self.path) {
            log::warn!("failed to save overlay to {}: {e}", self.path.display());
        }
    }
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !(0.0..=1.0).contains(&cli.confidence) {
        return Err(format!(
            "Confidence must be between 0.0 and 1.0, got {}",
            cli.confidence
        )
        .into());
    }
    if cli.period_ms == 0 {
        return Err("Sample period must be at least 1 ms".into());
    }
    if cli.duration == 0 {
        return Err("Duration must be at least 1 second".into());
    }
    Ok(())
}

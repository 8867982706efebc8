// Argos - CCTV anomaly monitor
// Watches a video feed, detects objects, and periodically asks a local
// language model whether the accumulated activity looks unusual.

use argos_llm::{AnomalyReasoner, OllamaProvider, PromptTemplate};
use argos_monitor::{DetectionWindow, MonitorConfig, MonitorLoop};
use argos_vision::display::MonitorDisplay;
use argos_vision::models::manager::ModelManager;
use argos_vision::{DetectionStage, FrameSource, YoloModel};
use clap::Parser;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "argos")]
#[command(about = "CCTV anomaly monitor: object detection with periodic LLM assessment", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Video source: device index, file path, or stream URL
    #[arg(long, short)]
    source: Option<String>,

    /// Seconds between anomaly assessments
    #[arg(long)]
    interval: Option<u64>,

    /// Language model name
    #[arg(long)]
    model: Option<String>,

    /// Ollama endpoint URL
    #[arg(long)]
    endpoint: Option<String>,

    /// Run without the preview window
    #[arg(long)]
    headless: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Cli {
    /// Load the config file (or defaults) and apply flag overrides
    fn resolve_config(&self) -> anyhow::Result<MonitorConfig> {
        let mut config = match &self.config {
            Some(path) => MonitorConfig::load(path)?,
            None => MonitorConfig::default(),
        };

        if let Some(source) = &self.source {
            config.source = source.clone();
        }
        if let Some(interval) = self.interval {
            config.interval_secs = interval;
        }
        if let Some(model) = &self.model {
            config.llm.model = model.clone();
        }
        if let Some(endpoint) = &self.endpoint {
            config.llm.endpoint = endpoint.clone();
        }
        if self.headless {
            config.display = false;
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli.log_level.clone())),
        )
        .with_target(false)
        .init();

    let config = cli.resolve_config()?;
    info!(
        source = %config.source,
        interval_secs = config.interval_secs,
        model = %config.llm.model,
        "Starting Argos monitor"
    );

    // Fetch the detection model before touching the camera
    let vision_config = Arc::new(config.vision.clone());
    let manager = ModelManager::new(vision_config.clone());
    let model_path = manager.get_yolo_model().await?;
    let detector = YoloModel::new(&model_path, &config.vision)?;
    info!(model = %model_path.display(), "Detection model loaded");

    // A source that fails to open is fatal; mid-stream failures are too
    let stream = FrameSource::open(&config.source, config.vision.resolution)?;
    info!("Video source opened: {}", stream.source());

    let provider = OllamaProvider::new(
        config.llm.endpoint.clone(),
        Duration::from_secs(config.llm.request_timeout_secs),
    )?;
    let template = PromptTemplate::new(&config.prompt_template)?;
    let reasoner = AnomalyReasoner::new(Arc::new(provider), template, config.llm.clone());

    let stop = Arc::new(AtomicBool::new(false));
    let signal_stop = stop.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
            return;
        }
        info!("Shutdown signal received");
        signal_stop.store(true, Ordering::Relaxed);
    });

    let mut controller = MonitorLoop::new(
        stream,
        DetectionStage::new(Arc::new(detector)),
        reasoner,
        DetectionWindow::new(Duration::from_secs(config.interval_secs)),
        stop,
    );

    if config.display {
        match MonitorDisplay::new("CCTV Monitor") {
            Ok(display) => controller = controller.with_display(display),
            Err(e) => warn!("Preview window unavailable, running headless: {}", e),
        }
    }

    let stats = controller.run().await?;
    info!(
        frames = stats.frames_processed,
        windows = stats.windows_flushed,
        verdicts = stats.verdicts_logged,
        failures = stats.reasoner_failures,
        "Monitor stopped"
    );
    Ok(())
}

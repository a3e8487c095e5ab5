use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use sw_config::PipelineConfig;
use sw_runtime::lifecycle::AnalysisService;
use sw_runtime::tracing_init::init_tracing;
use sw_waves::{default_registry, Collaborators};

const ACCEPTED_EXTENSIONS: &[&str] = &["gif", "png", "jpg", "jpeg", "webp", "bmp", "tiff", "tif"];

const EXIT_OK: u8 = 0;
const EXIT_BAD_INPUT: u8 = 2;
const EXIT_ANALYSIS_ERROR: u8 = 3;
const EXIT_CONTRADICTION_REJECTED: u8 = 4;

#[derive(Parser)]
#[command(name = "signalwave", about = "SignalWave image-intelligence pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one or more images against a running wave catalog
    Analyze {
        /// Path to pipeline.toml config file
        #[arg(short, long)]
        config: PathBuf,
        /// Requested-signals query (comma-separated keys, `name*`, `*`, `@collection`)
        #[arg(long)]
        signals: Option<String>,
        /// Image paths to analyze
        #[arg(required = true)]
        images: Vec<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze { config, signals, images } => run_analyze(config, signals, images).await,
    }
}

async fn run_analyze(config: PathBuf, signals: Option<String>, images: Vec<PathBuf>) -> Result<ExitCode> {
    let config_path = match config.canonicalize() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("config path '{}': {e}", config.display());
            return Ok(ExitCode::from(EXIT_BAD_INPUT));
        }
    };
    let pipeline_config = match PipelineConfig::load(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("loading '{}': {e}", config_path.display());
            return Ok(ExitCode::from(EXIT_BAD_INPUT));
        }
    };
    let base_dir = config_path.parent().expect("config path must have a parent directory");

    let _guard = init_tracing(&pipeline_config.logging, base_dir)?;

    let registry = default_registry(Collaborators::default(), pipeline_config.reject_on_critical, pipeline_config.runtime.ocr_parallelism);
    let service = AnalysisService::bootstrap(&pipeline_config, registry).map_err(|e| anyhow::anyhow!("{e}"))?;

    tracing::info!(domain = "sys", images = images.len(), "signalwave analyze starting");

    let mut worst_exit = EXIT_OK;

    for image_path in &images {
        let exit = analyze_one(&service, image_path, signals.as_deref()).await;
        if exit > worst_exit {
            worst_exit = exit;
        }
    }

    service.shutdown();
    Ok(ExitCode::from(worst_exit))
}

async fn analyze_one(service: &AnalysisService, image_path: &PathBuf, requested_signals: Option<&str>) -> u8 {
    let extension = image_path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    if !ACCEPTED_EXTENSIONS.contains(&extension.as_str()) {
        eprintln!("'{}': unsupported extension '{extension}'", image_path.display());
        return EXIT_BAD_INPUT;
    }

    let image_bytes = match tokio::fs::read(image_path).await {
        Ok(b) => b,
        Err(e) => {
            eprintln!("'{}': {e}", image_path.display());
            return EXIT_BAD_INPUT;
        }
    };

    let path_str = image_path.to_string_lossy().into_owned();
    match service
        .analyze_bytes(&path_str, &image_bytes, 0, 0, &extension, requested_signals)
        .await
    {
        Ok(profile) => {
            match serde_json::to_string(profile.as_ref()) {
                Ok(json) => println!("{json}"),
                Err(e) => eprintln!("'{}': failed to serialize profile: {e}", image_path.display()),
            }
            EXIT_OK
        }
        Err(e) => {
            let message = e.to_string();
            eprintln!("'{}': {message}", image_path.display());
            if message.contains("contradiction validator rejected analysis") {
                EXIT_CONTRADICTION_REJECTED
            } else {
                EXIT_ANALYSIS_ERROR
            }
        }
    }
}

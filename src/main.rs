use anyhow::Result;
use batch_scribe::transcribe::{AzureSpeechBackend, AzureSpeechClient};
use batch_scribe::{BatchRunner, Config};
use clap::Parser;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(
    name = "batch-scribe",
    about = "Batch speech-to-text with speaker attribution"
)]
struct Cli {
    /// Configuration file, without extension
    #[arg(long, default_value = "config/batch-scribe")]
    config: String,

    /// Override the configured input directory
    #[arg(long)]
    input_dir: Option<String>,

    /// Override the configured output directory
    #[arg(long)]
    output_dir: Option<String>,

    /// Override the configured recognition language (e.g. es-ES)
    #[arg(long)]
    language: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    if let Err(e) = dotenvy::dotenv() {
        debug!(".env not loaded: {} (using process environment)", e);
    }

    let cli = Cli::parse();
    let mut cfg = Config::load(&cli.config)?;

    if let Some(input_dir) = cli.input_dir {
        cfg.batch.input_dir = input_dir;
    }
    if let Some(output_dir) = cli.output_dir {
        cfg.batch.output_dir = output_dir;
    }
    if let Some(language) = cli.language {
        cfg.speech.language = language;
    }

    anyhow::ensure!(
        !cfg.speech.key.is_empty(),
        "Speech subscription key is not set (SPEECH_KEY or [speech] key)"
    );

    info!("batch-scribe v0.1.0");
    info!("Input directory: {}", cfg.batch.input_dir);
    info!("Output directory: {}", cfg.batch.output_dir);
    info!("Recognition language: {}", cfg.speech.language);

    let client = AzureSpeechClient::new(
        &cfg.speech.endpoint_url(),
        &cfg.speech.key,
        &cfg.speech.api_version,
    );
    let backend = Arc::new(AzureSpeechBackend::new(client));

    let summary = BatchRunner::new(cfg, backend).run().await?;

    info!(
        "Done: {} processed, {} succeeded, {} failed",
        summary.processed, summary.succeeded, summary.failed
    );

    Ok(())
}

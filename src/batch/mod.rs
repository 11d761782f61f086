//! Batch driver: normalize, transcribe, persist, one file at a time
//!
//! Failures in any per-file step are logged and the loop continues; a failed
//! transcription writes nothing for that file.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::audio::{normalize, NormalizeConfig};
use crate::config::Config;
use crate::transcribe::{SessionConfig, TranscriptionBackend, TranscriptionSession};

/// Intermediate files are siblings of their input, marked with this prefix
const CONVERTED_PREFIX: &str = "converted_";

/// Counts for one batch run
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
}

pub struct BatchRunner {
    config: Config,
    backend: Arc<dyn TranscriptionBackend>,
}

impl BatchRunner {
    pub fn new(config: Config, backend: Arc<dyn TranscriptionBackend>) -> Self {
        Self { config, backend }
    }

    /// Process every accepted file in the input directory.
    pub async fn run(&self) -> Result<BatchSummary> {
        let input_dir = Path::new(&self.config.batch.input_dir);
        let output_dir = Path::new(&self.config.batch.output_dir);

        fs::create_dir_all(output_dir).with_context(|| {
            format!("Failed to create output directory: {}", output_dir.display())
        })?;

        let mut inputs = self.enumerate_inputs(input_dir)?;
        inputs.sort();

        info!(
            "Batch starting: {} files in {}",
            inputs.len(),
            input_dir.display()
        );

        let mut summary = BatchSummary::default();

        for input in inputs {
            summary.processed += 1;

            match self.process_file(&input, output_dir).await {
                Ok(output) => {
                    summary.succeeded += 1;
                    info!("Wrote transcript: {}", output.display());
                }
                Err(e) => {
                    summary.failed += 1;
                    error!("Failed to process {}: {:#}", input.display(), e);
                }
            }
        }

        info!(
            "Batch complete: {} processed, {} succeeded, {} failed",
            summary.processed, summary.succeeded, summary.failed
        );

        Ok(summary)
    }

    fn enumerate_inputs(&self, input_dir: &Path) -> Result<Vec<PathBuf>> {
        let mut inputs = Vec::new();

        let entries = fs::read_dir(input_dir).with_context(|| {
            format!("Failed to read input directory: {}", input_dir.display())
        })?;

        for entry in entries {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }

            // Leftover intermediates from an interrupted run are not inputs
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if name.starts_with(CONVERTED_PREFIX) {
                    warn!("Skipping leftover intermediate file: {}", name);
                    continue;
                }
            }

            let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
                continue;
            };

            if self
                .config
                .batch
                .extensions
                .iter()
                .any(|e| e.eq_ignore_ascii_case(ext))
            {
                inputs.push(path);
            }
        }

        Ok(inputs)
    }

    /// Normalize, transcribe, and persist one input file. The intermediate
    /// WAV is removed on both success and failure paths.
    async fn process_file(&self, input: &Path, output_dir: &Path) -> Result<PathBuf> {
        let stem = input
            .file_stem()
            .and_then(|s| s.to_str())
            .context("Input file has no usable name")?;

        let converted = input.with_file_name(format!("{}{}.wav", CONVERTED_PREFIX, stem));
        let output = output_dir.join(format!("{}.txt", stem));

        let normalize_config = NormalizeConfig {
            sample_rate: self.config.audio.sample_rate,
            channels: self.config.audio.channels,
        };

        normalize(input, &converted, &normalize_config)?;

        let session = TranscriptionSession::new(
            SessionConfig {
                language: self.config.speech.language.clone(),
                event_timeout: Duration::from_secs(self.config.speech.event_timeout_secs),
                ..SessionConfig::default()
            },
            Arc::clone(&self.backend),
        );

        let result = session.transcribe(&converted).await;

        if let Err(e) = fs::remove_file(&converted) {
            warn!(
                "Failed to remove intermediate file {}: {}",
                converted.display(),
                e
            );
        }

        let (transcript, stats) = result?;

        info!(
            "Session {} finished in {:.1}s ({} lines)",
            stats.session_id, stats.duration_secs, stats.lines
        );

        fs::write(&output, transcript.to_text())
            .with_context(|| format!("Failed to write transcript: {}", output.display()))?;

        Ok(output)
    }
}

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::error;

use super::azure::AzureSpeechClient;
use super::config::SessionConfig;
use super::events::SessionEvent;

/// A transcription backend drives one remote session per file and reports its
/// lifecycle over the returned channel.
///
/// The channel closes after `Stopped` or `Canceled`.
#[async_trait::async_trait]
pub trait TranscriptionBackend: Send + Sync {
    /// Begin transcribing the given normalized WAV file
    async fn start(
        &self,
        wav_path: &Path,
        config: &SessionConfig,
    ) -> Result<mpsc::Receiver<SessionEvent>>;

    /// Backend name for logging
    fn name(&self) -> &str;
}

/// Production backend: submits audio to the cloud speech service and replays
/// its recognition results as session events.
pub struct AzureSpeechBackend {
    client: Arc<AzureSpeechClient>,
}

impl AzureSpeechBackend {
    pub fn new(client: AzureSpeechClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

#[async_trait::async_trait]
impl TranscriptionBackend for AzureSpeechBackend {
    async fn start(
        &self,
        wav_path: &Path,
        config: &SessionConfig,
    ) -> Result<mpsc::Receiver<SessionEvent>> {
        let audio = tokio::fs::read(wav_path)
            .await
            .with_context(|| format!("Failed to read normalized audio: {}", wav_path.display()))?;

        let (tx, rx) = mpsc::channel(64);
        let client = Arc::clone(&self.client);
        let language = config.language.clone();
        let session_id = config.session_id.clone();

        tokio::spawn(async move {
            if tx
                .send(SessionEvent::Started {
                    session_id: session_id.clone(),
                })
                .await
                .is_err()
            {
                return;
            }

            match client.transcribe(audio, &language).await {
                Ok(phrases) => {
                    let phrases: Vec<_> = phrases
                        .into_iter()
                        .filter(|p| !p.text.trim().is_empty())
                        .collect();

                    if phrases.is_empty() {
                        let _ = tx
                            .send(SessionEvent::NoMatch {
                                reason: "no recognizable speech in audio".to_string(),
                            })
                            .await;
                    }

                    for phrase in phrases {
                        let event = SessionEvent::Recognized {
                            speaker: phrase.speaker.map(|s| s.to_string()),
                            text: phrase.text,
                        };

                        if tx.send(event).await.is_err() {
                            error!("Session {} receiver dropped mid-stream", session_id);
                            return;
                        }
                    }

                    let _ = tx.send(SessionEvent::Stopped).await;
                }
                Err(e) => {
                    let _ = tx
                        .send(SessionEvent::Canceled {
                            reason: format!("{:#}", e),
                        })
                        .await;
                }
            }
        });

        Ok(rx)
    }

    fn name(&self) -> &str {
        "azure-speech"
    }
}

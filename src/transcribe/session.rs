use anyhow::{Context, Result};
use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::timeout;
use tracing::{info, warn};

use super::backend::TranscriptionBackend;
use super::config::SessionConfig;
use super::events::{SessionEvent, Transcript, TranscriptLine};
use super::stats::SessionStats;

/// Runs one transcription session against a backend and collects the result.
///
/// Events are drained from the backend's channel under a bounded per-event
/// timeout; a session that stops emitting events errors out instead of
/// blocking the batch. Each invocation accumulates into a fresh transcript
/// returned by value.
pub struct TranscriptionSession {
    config: SessionConfig,
    backend: Arc<dyn TranscriptionBackend>,
}

impl TranscriptionSession {
    pub fn new(config: SessionConfig, backend: Arc<dyn TranscriptionBackend>) -> Self {
        Self { config, backend }
    }

    /// Transcribe one normalized WAV file to completion.
    ///
    /// Returns an error on cancel or timeout; no partial transcript escapes
    /// in that case.
    pub async fn transcribe(&self, wav_path: &Path) -> Result<(Transcript, SessionStats)> {
        info!(
            "Starting transcription session {} on {} ({})",
            self.config.session_id,
            wav_path.display(),
            self.backend.name()
        );

        let started_at = Utc::now();
        let start = Instant::now();

        let mut events = self
            .backend
            .start(wav_path, &self.config)
            .await
            .context("Failed to start transcription session")?;

        let mut transcript = Transcript::default();

        loop {
            let event = match timeout(self.config.event_timeout, events.recv()).await {
                Ok(Some(event)) => event,
                Ok(None) => {
                    anyhow::bail!(
                        "Session {} ended without a stop signal",
                        self.config.session_id
                    );
                }
                Err(_) => {
                    anyhow::bail!(
                        "Session {} timed out after {:?} waiting for events",
                        self.config.session_id,
                        self.config.event_timeout
                    );
                }
            };

            match event {
                SessionEvent::Started { session_id } => {
                    info!("SessionStarted: {}", session_id);
                }
                SessionEvent::Recognized { speaker, text } => {
                    let line = TranscriptLine::new(speaker.as_deref(), text);
                    info!("{}", line.render());
                    transcript.push(line);
                }
                SessionEvent::NoMatch { reason } => {
                    warn!("NoMatch: speech could not be transcribed: {}", reason);
                }
                SessionEvent::Stopped => {
                    info!("SessionStopped: {}", self.config.session_id);
                    break;
                }
                SessionEvent::Canceled { reason } => {
                    anyhow::bail!("Session {} canceled: {}", self.config.session_id, reason);
                }
            }
        }

        let stats = SessionStats {
            session_id: self.config.session_id.clone(),
            started_at,
            duration_secs: start.elapsed().as_secs_f64(),
            lines: transcript.len(),
        };

        info!(
            "Transcribing time for {}: {:.1}s ({} lines)",
            wav_path.display(),
            stats.duration_secs,
            stats.lines
        );

        Ok((transcript, stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::mpsc;

    /// Emits a fixed script of events, one per receive
    struct ScriptedBackend {
        events: Vec<SessionEvent>,
    }

    #[async_trait::async_trait]
    impl TranscriptionBackend for ScriptedBackend {
        async fn start(
            &self,
            _wav_path: &Path,
            _config: &SessionConfig,
        ) -> Result<mpsc::Receiver<SessionEvent>> {
            let (tx, rx) = mpsc::channel(16);
            let events = self.events.clone();

            tokio::spawn(async move {
                for event in events {
                    if tx.send(event).await.is_err() {
                        break;
                    }
                }
            });

            Ok(rx)
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    /// Hands out a channel whose sender never sends and is never dropped
    struct SilentBackend {
        senders: std::sync::Mutex<Vec<mpsc::Sender<SessionEvent>>>,
    }

    #[async_trait::async_trait]
    impl TranscriptionBackend for SilentBackend {
        async fn start(
            &self,
            _wav_path: &Path,
            _config: &SessionConfig,
        ) -> Result<mpsc::Receiver<SessionEvent>> {
            let (tx, rx) = mpsc::channel(16);
            self.senders.lock().unwrap().push(tx);
            Ok(rx)
        }

        fn name(&self) -> &str {
            "silent"
        }
    }

    fn session_with(backend: Arc<dyn TranscriptionBackend>, timeout: Duration) -> TranscriptionSession {
        TranscriptionSession::new(
            SessionConfig {
                event_timeout: timeout,
                ..SessionConfig::default()
            },
            backend,
        )
    }

    #[tokio::test]
    async fn test_recognized_events_accumulate_in_order() {
        let backend = Arc::new(ScriptedBackend {
            events: vec![
                SessionEvent::Started {
                    session_id: "s".to_string(),
                },
                SessionEvent::Recognized {
                    speaker: Some("1".to_string()),
                    text: "hola".to_string(),
                },
                SessionEvent::Recognized {
                    speaker: None,
                    text: "adiós".to_string(),
                },
                SessionEvent::Stopped,
            ],
        });

        let session = session_with(backend, Duration::from_secs(5));
        let (transcript, stats) = session.transcribe(Path::new("unused.wav")).await.unwrap();

        assert_eq!(stats.lines, 2);
        assert_eq!(
            transcript.to_text(),
            "Speaker-1: hola\nUnknown Speaker: adiós"
        );
    }

    #[tokio::test]
    async fn test_no_match_produces_empty_transcript() {
        let backend = Arc::new(ScriptedBackend {
            events: vec![
                SessionEvent::Started {
                    session_id: "s".to_string(),
                },
                SessionEvent::NoMatch {
                    reason: "silence".to_string(),
                },
                SessionEvent::Stopped,
            ],
        });

        let session = session_with(backend, Duration::from_secs(5));
        let (transcript, _) = session.transcribe(Path::new("unused.wav")).await.unwrap();

        assert!(transcript.is_empty());
        assert_eq!(transcript.to_text(), "");
    }

    #[tokio::test]
    async fn test_canceled_session_is_an_error() {
        let backend = Arc::new(ScriptedBackend {
            events: vec![
                SessionEvent::Recognized {
                    speaker: Some("1".to_string()),
                    text: "partial".to_string(),
                },
                SessionEvent::Canceled {
                    reason: "connection reset".to_string(),
                },
            ],
        });

        let session = session_with(backend, Duration::from_secs(5));
        let result = session.transcribe(Path::new("unused.wav")).await;

        let err = result.unwrap_err().to_string();
        assert!(err.contains("canceled"), "unexpected error: {}", err);
        assert!(err.contains("connection reset"), "unexpected error: {}", err);
    }

    #[tokio::test]
    async fn test_hung_session_times_out() {
        let backend = Arc::new(SilentBackend {
            senders: std::sync::Mutex::new(Vec::new()),
        });

        let session = session_with(backend, Duration::from_millis(50));
        let result = session.transcribe(Path::new("unused.wav")).await;

        let err = result.unwrap_err().to_string();
        assert!(err.contains("timed out"), "unexpected error: {}", err);
    }

    #[tokio::test]
    async fn test_channel_closing_without_stop_is_an_error() {
        let backend = Arc::new(ScriptedBackend {
            events: vec![SessionEvent::Started {
                session_id: "s".to_string(),
            }],
        });

        let session = session_with(backend, Duration::from_secs(5));
        let result = session.transcribe(Path::new("unused.wav")).await;

        let err = result.unwrap_err().to_string();
        assert!(err.contains("without a stop signal"), "unexpected error: {}", err);
    }
}

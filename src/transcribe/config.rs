use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a transcription session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Unique session identifier (e.g., "transcribe-<uuid>"), used for log correlation
    pub session_id: String,

    /// Recognition language passed to the speech service
    pub language: String,

    /// How long to wait for the next session event before giving up
    pub event_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_id: format!("transcribe-{}", uuid::Uuid::new_v4()),
            language: "es-ES".to_string(),
            event_timeout: Duration::from_secs(300),
        }
    }
}

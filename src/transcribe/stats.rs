use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Statistics about a completed transcription session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    /// Session identifier this run was logged under
    pub session_id: String,

    /// When the session started
    pub started_at: DateTime<Utc>,

    /// Wall-clock transcription time in seconds
    pub duration_secs: f64,

    /// Number of transcript lines received
    pub lines: usize,
}

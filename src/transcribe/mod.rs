//! Cloud transcription session management
//!
//! This module provides the `TranscriptionSession` abstraction that manages:
//! - Session lifecycle events from the speech service (started, recognized,
//!   no-match, stopped, canceled)
//! - Per-invocation transcript accumulation with speaker attribution
//! - Bounded waiting on the remote session, so a hung session cannot stall
//!   the batch
//! - The speech service REST client behind a backend trait

mod azure;
mod backend;
mod config;
mod events;
mod session;
mod stats;

pub use azure::{AzureSpeechClient, RecognizedPhrase};
pub use backend::{AzureSpeechBackend, TranscriptionBackend};
pub use config::SessionConfig;
pub use events::{speaker_label, SessionEvent, Transcript, TranscriptLine};
pub use session::TranscriptionSession;
pub use stats::SessionStats;

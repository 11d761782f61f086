pub mod audio;
pub mod batch;
pub mod config;
pub mod transcribe;

pub use audio::{normalize, AudioFile, NormalizeConfig};
pub use batch::{BatchRunner, BatchSummary};
pub use config::Config;
pub use transcribe::{
    AzureSpeechBackend, AzureSpeechClient, SessionConfig, SessionEvent, SessionStats, Transcript,
    TranscriptLine, TranscriptionBackend, TranscriptionSession,
};

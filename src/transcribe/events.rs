use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle events emitted by a transcription backend for one session
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// The remote session accepted the audio and began processing
    Started { session_id: String },

    /// A speech segment was recognized, optionally attributed to a speaker
    Recognized {
        speaker: Option<String>,
        text: String,
    },

    /// The service processed a segment but could not transcribe it
    NoMatch { reason: String },

    /// The session completed normally
    Stopped,

    /// The session aborted before completing
    Canceled { reason: String },
}

/// A single speaker-attributed line of transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptLine {
    pub speaker: String,
    pub text: String,
    /// When this line was received
    pub timestamp: DateTime<Utc>,
}

impl TranscriptLine {
    pub fn new(speaker: Option<&str>, text: impl Into<String>) -> Self {
        Self {
            speaker: speaker_label(speaker),
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn render(&self) -> String {
        format!("{}: {}", self.speaker, self.text)
    }
}

/// Map the service's speaker identifier to a display label
pub fn speaker_label(speaker: Option<&str>) -> String {
    match speaker {
        Some(id) if !id.is_empty() && id != "Unknown" => format!("Speaker-{}", id),
        _ => "Unknown Speaker".to_string(),
    }
}

/// Transcript accumulated over one session invocation.
///
/// Each invocation owns its accumulator and returns it by value, so lines can
/// never leak between files.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    lines: Vec<TranscriptLine>,
}

impl Transcript {
    pub fn push(&mut self, line: TranscriptLine) {
        self.lines.push(line);
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn lines(&self) -> &[TranscriptLine] {
        &self.lines
    }

    /// Render as "speaker: text" lines joined with newlines
    pub fn to_text(&self) -> String {
        self.lines
            .iter()
            .map(|line| line.render())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speaker_label_from_id() {
        assert_eq!(speaker_label(Some("1")), "Speaker-1");
        assert_eq!(speaker_label(Some("12")), "Speaker-12");
    }

    #[test]
    fn test_speaker_label_unknown() {
        assert_eq!(speaker_label(None), "Unknown Speaker");
        assert_eq!(speaker_label(Some("")), "Unknown Speaker");
        assert_eq!(speaker_label(Some("Unknown")), "Unknown Speaker");
    }

    #[test]
    fn test_transcript_line_render() {
        let line = TranscriptLine::new(Some("2"), "buenos días");
        assert_eq!(line.render(), "Speaker-2: buenos días");
    }

    #[test]
    fn test_transcript_to_text_joins_lines() {
        let mut transcript = Transcript::default();
        transcript.push(TranscriptLine::new(Some("1"), "hola"));
        transcript.push(TranscriptLine::new(None, "adiós"));

        assert_eq!(transcript.len(), 2);
        assert_eq!(
            transcript.to_text(),
            "Speaker-1: hola\nUnknown Speaker: adiós"
        );
    }

    #[test]
    fn test_empty_transcript_renders_empty() {
        let transcript = Transcript::default();

        assert!(transcript.is_empty());
        assert_eq!(transcript.to_text(), "");
    }
}

use anyhow::{anyhow, Context, Result};
use reqwest::multipart;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

/// Client for the speech service's synchronous transcription REST endpoint.
///
/// Submits a whole normalized WAV per request with diarization enabled and
/// returns the recognized phrases in service order.
pub struct AzureSpeechClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

/// One recognized phrase with optional speaker attribution
#[derive(Debug, Clone, Deserialize)]
pub struct RecognizedPhrase {
    #[serde(default)]
    pub speaker: Option<u32>,
    pub text: String,
    #[serde(default, rename = "offsetMilliseconds")]
    pub offset_milliseconds: u64,
}

#[derive(Debug, Deserialize)]
struct TranscribeResponse {
    #[serde(default)]
    phrases: Vec<RecognizedPhrase>,
}

impl AzureSpeechClient {
    pub fn new(base_url: &str, api_key: &str, api_version: &str) -> Self {
        let endpoint = format!(
            "{}/speechtotext/transcriptions:transcribe?api-version={}",
            base_url.trim_end_matches('/'),
            api_version,
        );

        Self {
            client: reqwest::Client::new(),
            endpoint,
            api_key: api_key.to_string(),
        }
    }

    pub async fn transcribe(
        &self,
        audio: Vec<u8>,
        language: &str,
    ) -> Result<Vec<RecognizedPhrase>> {
        let definition = json!({
            "locales": [language],
            "diarization": { "enabled": true, "maxSpeakers": 8 },
        });

        let file_part = multipart::Part::bytes(audio)
            .file_name("audio.wav")
            .mime_str("audio/wav")
            .context("Invalid audio mime type")?;

        let form = multipart::Form::new()
            .part("audio", file_part)
            .text("definition", definition.to_string());

        debug!("Submitting audio to {}", self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .header("Ocp-Apim-Subscription-Key", &self.api_key)
            .multipart(form)
            .send()
            .await
            .context("Speech service request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(anyhow!("Speech service returned status {}: {}", status, body));
        }

        let result: TranscribeResponse = response
            .json()
            .await
            .context("Failed to parse speech service response")?;

        info!("Speech service returned {} phrases", result.phrases.len());

        Ok(result.phrases)
    }
}

use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub batch: BatchConfig,
    pub audio: AudioConfig,
    pub speech: SpeechConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchConfig {
    pub input_dir: String,
    pub output_dir: String,
    /// Accepted input extensions, without the dot
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AudioConfig {
    pub sample_rate: u32,
    pub channels: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpeechConfig {
    pub region: String,
    /// Subscription key; normally supplied via the SPEECH_KEY environment variable
    #[serde(default)]
    pub key: String,
    pub language: String,
    /// Full endpoint base URL; overrides the region-derived URL when set
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// How long to wait for the next session event before giving up
    #[serde(default = "default_event_timeout")]
    pub event_timeout_secs: u64,
}

fn default_extensions() -> Vec<String> {
    ["wav", "mp3", "m4a", "flac", "ogg"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_api_version() -> String {
    "2024-11-15".to_string()
}

fn default_event_timeout() -> u64 {
    300
}

impl SpeechConfig {
    pub fn endpoint_url(&self) -> String {
        match &self.endpoint {
            Some(url) => url.clone(),
            None => format!("https://{}.api.cognitive.microsoft.com", self.region),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        let mut cfg: Config = settings.try_deserialize()?;

        // SPEECH_KEY / SPEECH_REGION from the environment win over the file
        if let Ok(key) = std::env::var("SPEECH_KEY") {
            cfg.speech.key = key;
        }
        if let Ok(region) = std::env::var("SPEECH_REGION") {
            cfg.speech.region = region;
        }

        Ok(cfg)
    }
}

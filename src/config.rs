use crate::defaults;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub audio: AudioConfig,
    pub segmenter: SegmenterConfig,
    pub turn: TurnConfig,
    pub stt: SttConfig,
    pub speaker: SpeakerConfig,
    pub server: ServerConfig,
}

/// Audio capture configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    pub device: Option<String>,
    pub sample_rate: u32,
    pub frame_samples: usize,
    pub rms_threshold: f32,
}

/// Segmentation timing configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SegmenterConfig {
    pub split_silence_ms: u64,
    pub final_silence_ms: u64,
    pub max_segment_secs: u64,
    pub pre_roll_chunks: usize,
}

/// Turn assembly configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TurnConfig {
    pub wake_phrases: Vec<String>,
    pub wake_token: String,
    /// Directory for segment WAV files while they are in flight.
    /// Defaults to the system temp directory.
    pub spool_dir: Option<PathBuf>,
}

/// Transcription service configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SttConfig {
    pub endpoint: String,
    pub language: String,
}

/// Speaker identification configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SpeakerConfig {
    pub endpoint: String,
    pub profiles_path: PathBuf,
    pub confidence_threshold: f32,
}

/// Session socket configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: None,
            sample_rate: defaults::SAMPLE_RATE,
            frame_samples: defaults::FRAME_SAMPLES,
            rms_threshold: defaults::RMS_THRESHOLD,
        }
    }
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            split_silence_ms: defaults::SPLIT_SILENCE_MS,
            final_silence_ms: defaults::FINAL_SILENCE_MS,
            max_segment_secs: defaults::MAX_SEGMENT_SECS,
            pre_roll_chunks: defaults::PRE_ROLL_CHUNKS,
        }
    }
}

impl Default for TurnConfig {
    fn default() -> Self {
        Self {
            wake_phrases: defaults::WAKE_PHRASES
                .iter()
                .map(|p| p.to_string())
                .collect(),
            wake_token: defaults::WAKE_TOKEN.to_string(),
            spool_dir: None,
        }
    }
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            language: defaults::DEFAULT_LANGUAGE.to_string(),
        }
    }
}

impl Default for SpeakerConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            profiles_path: PathBuf::from("profiles.json"),
            confidence_threshold: defaults::IDENT_CONFIDENCE_THRESHOLD,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: defaults::BIND_ADDR.to_string(),
        }
    }
}

impl SegmenterConfig {
    /// Silence that ends a single segment.
    pub fn split_silence(&self) -> Duration {
        Duration::from_millis(self.split_silence_ms)
    }

    /// Silence that ends the whole turn.
    pub fn final_silence(&self) -> Duration {
        Duration::from_millis(self.final_silence_ms)
    }

    /// Hard cap on one segment's recording time.
    pub fn max_segment(&self) -> Duration {
        Duration::from_secs(self.max_segment_secs)
    }
}

impl TurnConfig {
    /// Directory segment WAV files are spooled to.
    pub fn spool_dir(&self) -> PathBuf {
        self.spool_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir)
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - EARSHOT_STT_ENDPOINT → stt.endpoint
    /// - EARSHOT_SPEAKER_ENDPOINT → speaker.endpoint
    /// - EARSHOT_LANGUAGE → stt.language
    /// - EARSHOT_AUDIO_DEVICE → audio.device
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(endpoint) = std::env::var("EARSHOT_STT_ENDPOINT")
            && !endpoint.is_empty()
        {
            self.stt.endpoint = endpoint;
        }

        if let Ok(endpoint) = std::env::var("EARSHOT_SPEAKER_ENDPOINT")
            && !endpoint.is_empty()
        {
            self.speaker.endpoint = endpoint;
        }

        if let Ok(language) = std::env::var("EARSHOT_LANGUAGE")
            && !language.is_empty()
        {
            self.stt.language = language;
        }

        if let Ok(device) = std::env::var("EARSHOT_AUDIO_DEVICE")
            && !device.is_empty()
        {
            self.audio.device = Some(device);
        }

        self
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/earshot/config.toml on Linux
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("earshot").join("config.toml"))
    }
}

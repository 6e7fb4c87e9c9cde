//! HTTP client for the external transcription service.
//!
//! Posts the segment's WAV bytes to the configured endpoint and reads the
//! transcript from the JSON response's `text` field. Single attempt per
//! segment; failures degrade upstream to "no piece produced".

use crate::error::{EarshotError, Result};
use crate::stt::transcriber::Transcriber;
use std::path::Path;

/// Transcription over a plain HTTP endpoint.
pub struct HttpTranscriber {
    client: reqwest::Client,
    endpoint: String,
    language: String,
}

impl HttpTranscriber {
    /// Creates a client for the given endpoint and service locale.
    pub fn new(endpoint: &str, language: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.to_string(),
            language: language.to_string(),
        }
    }

    /// The configured endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl Transcriber for HttpTranscriber {
    async fn transcribe(&self, audio: &Path) -> Result<String> {
        let bytes = tokio::fs::read(audio)
            .await
            .map_err(|e| EarshotError::Transcription {
                message: format!("Failed to read segment audio: {}", e),
            })?;

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("language", self.language.as_str())])
            .header("Content-Type", "audio/wav; codecs=audio/pcm")
            .body(bytes)
            .send()
            .await
            .map_err(|e| EarshotError::Transcription {
                message: format!("Failed to reach transcription service: {}", e),
            })?;

        if !response.status().is_success() {
            return Err(EarshotError::Transcription {
                message: format!("Transcription service returned status {}", response.status()),
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| EarshotError::Transcription {
                message: format!("Failed to read transcription response: {}", e),
            })?;

        let value: serde_json::Value =
            serde_json::from_str(&text).map_err(|e| EarshotError::Transcription {
                message: format!("Failed to parse transcription response: {}", e),
            })?;

        Ok(value
            .get("text")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string())
    }

    fn name(&self) -> &str {
        "http-stt"
    }
}

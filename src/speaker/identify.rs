//! External speaker-identification service interface.
//!
//! Identification is best-effort: a service failure, a malformed response,
//! or low confidence all degrade to the unknown-speaker sentinel with
//! confidence 0 and are never propagated as errors to the caller's turn.

use crate::defaults;
use crate::error::{EarshotError, Result};
use std::path::Path;

/// Outcome of one identification request.
#[derive(Debug, Clone, PartialEq)]
pub struct Identification {
    /// Best-matching profile id, or the unknown sentinel.
    pub profile_id: String,
    /// Match confidence in [0, 1].
    pub confidence: f32,
}

impl Identification {
    /// The degraded result: unknown speaker, confidence 0.
    pub fn unknown() -> Self {
        Self {
            profile_id: defaults::UNKNOWN_SPEAKER.to_string(),
            confidence: 0.0,
        }
    }

    /// Returns true when this is the unknown sentinel.
    pub fn is_unknown(&self) -> bool {
        self.profile_id == defaults::UNKNOWN_SPEAKER
    }
}

/// Trait for the external speaker-identification service.
#[async_trait::async_trait]
pub trait SpeakerIdentifier: Send + Sync {
    /// Identify the speaker of the audio container at `audio` among the
    /// candidate profile ids.
    async fn identify(&self, audio: &Path, profile_ids: &[String]) -> Result<Identification>;
}

/// Mock identifier for testing.
pub struct MockSpeakerIdentifier {
    result: Identification,
    should_fail: bool,
}

impl MockSpeakerIdentifier {
    /// Create a mock returning the given profile id and confidence.
    pub fn new(profile_id: &str, confidence: f32) -> Self {
        Self {
            result: Identification {
                profile_id: profile_id.to_string(),
                confidence,
            },
            should_fail: false,
        }
    }

    /// Create a mock that never identifies anyone.
    pub fn unknown() -> Self {
        Self {
            result: Identification::unknown(),
            should_fail: false,
        }
    }

    /// Configure the mock to fail on every call.
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

#[async_trait::async_trait]
impl SpeakerIdentifier for MockSpeakerIdentifier {
    async fn identify(&self, _audio: &Path, _profile_ids: &[String]) -> Result<Identification> {
        if self.should_fail {
            Err(EarshotError::Identification {
                message: "mock identification failure".to_string(),
            })
        } else {
            Ok(self.result.clone())
        }
    }
}

/// Identification over a plain HTTP endpoint.
///
/// Posts the WAV bytes with the candidate ids as a query parameter and
/// reads the top-ranked profile and its score from the JSON response.
pub struct HttpSpeakerIdentifier {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpSpeakerIdentifier {
    /// Creates a client for the given endpoint.
    pub fn new(endpoint: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.to_string(),
        }
    }

    /// The configured endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn parse_response(value: &serde_json::Value) -> Identification {
        let profile_id = value
            .get("profilesRanking")
            .and_then(|v| v.get(0))
            .and_then(|v| v.get("profileId"))
            .and_then(|v| v.as_str());
        let confidence = value
            .get("identifiedProfile")
            .and_then(|v| v.get("score"))
            .and_then(|v| v.as_f64());

        match (profile_id, confidence) {
            (Some(id), Some(score)) => Identification {
                profile_id: id.to_string(),
                confidence: score as f32,
            },
            // Any shape mismatch degrades to the unknown sentinel
            _ => Identification::unknown(),
        }
    }
}

#[async_trait::async_trait]
impl SpeakerIdentifier for HttpSpeakerIdentifier {
    async fn identify(&self, audio: &Path, profile_ids: &[String]) -> Result<Identification> {
        let bytes = tokio::fs::read(audio)
            .await
            .map_err(|e| EarshotError::Identification {
                message: format!("Failed to read segment audio: {}", e),
            })?;

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[
                ("profileIds", profile_ids.join(",")),
                ("ignoreMinLength", "true".to_string()),
            ])
            .header("Content-Type", "audio/wav; codecs=audio/pcm")
            .body(bytes)
            .send()
            .await
            .map_err(|e| EarshotError::Identification {
                message: format!("Failed to reach identification service: {}", e),
            })?;

        if !response.status().is_success() {
            return Err(EarshotError::Identification {
                message: format!(
                    "Identification service returned status {}",
                    response.status()
                ),
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| EarshotError::Identification {
                message: format!("Failed to read identification response: {}", e),
            })?;

        match serde_json::from_str::<serde_json::Value>(&text) {
            Ok(value) => Ok(Self::parse_response(&value)),
            Err(_) => Ok(Identification::unknown()),
        }
    }
}

//! Per-segment transcription workers.
//!
//! Each finalized segment gets its own task: persist the audio container,
//! call the external services, and merge the result into the turn. Workers
//! are dispatched fire-and-forget so the capture side never blocks on the
//! network; the segment's WAV file is removed on every exit path.

use crate::defaults;
use crate::error::Result;
use crate::listen::frame::Segment;
use crate::speaker::identify::{Identification, SpeakerIdentifier};
use crate::speaker::profiles::ProfileSnapshot;
use crate::stt::transcriber::Transcriber;
use crate::turn::aggregator::{TurnHandle, TurnPiece};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Configuration for transcription workers.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Directory segment WAV files are spooled to.
    pub spool_dir: PathBuf,
    /// Path of the speaker profile registry.
    pub profiles_path: PathBuf,
    /// Sample rate the containers are written at.
    pub sample_rate: u32,
    /// Minimum identification confidence to attribute a speaker.
    pub confidence_threshold: f32,
    /// Transcripts longer than this are truncated.
    pub max_transcript_chars: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            spool_dir: std::env::temp_dir(),
            profiles_path: PathBuf::from("profiles.json"),
            sample_rate: defaults::SAMPLE_RATE,
            confidence_threshold: defaults::IDENT_CONFIDENCE_THRESHOLD,
            max_transcript_chars: defaults::MAX_TRANSCRIPT_CHARS,
        }
    }
}

/// Factory for per-segment worker tasks.
pub struct TranscriptionWorker<T, S> {
    transcriber: Arc<T>,
    identifier: Arc<S>,
    config: WorkerConfig,
}

// Manual impl: clones share the service handles regardless of T/S.
impl<T, S> Clone for TranscriptionWorker<T, S> {
    fn clone(&self) -> Self {
        Self {
            transcriber: Arc::clone(&self.transcriber),
            identifier: Arc::clone(&self.identifier),
            config: self.config.clone(),
        }
    }
}

// Manual impl: avoids requiring T/S to be Debug for the service handles.
impl<T, S> std::fmt::Debug for TranscriptionWorker<T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranscriptionWorker")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<T, S> TranscriptionWorker<T, S>
where
    T: Transcriber + 'static,
    S: SpeakerIdentifier + 'static,
{
    /// Creates a worker factory over the given service handles.
    pub fn new(transcriber: Arc<T>, identifier: Arc<S>, config: WorkerConfig) -> Self {
        Self {
            transcriber,
            identifier,
            config,
        }
    }

    /// Spawns the worker task for one finalized segment.
    ///
    /// The task appends at most one piece to `turn` and is never awaited by
    /// the capture side. A task still in flight when the session swaps in a
    /// fresh turn completes its append against the detached old instance.
    pub fn dispatch(&self, segment: Segment, turn: TurnHandle) -> JoinHandle<()> {
        let worker = self.clone();
        tokio::spawn(async move {
            worker.process(segment, turn).await;
        })
    }

    /// Runs the full segment pipeline; all failures degrade.
    pub async fn process(&self, segment: Segment, turn: TurnHandle) {
        let path = self.config.spool_dir.join(format!(
            "earshot-{}-{:06}.wav",
            std::process::id(),
            segment.sequence
        ));

        let sequence = segment.sequence;
        let duration = segment.duration;

        if let Err(e) = self.persist(&path, segment).await {
            warn!(sequence, "failed to persist segment audio: {}", e);
            return;
        }

        let profiles = self.load_profiles().await;

        // At most one identification sub-task per segment, joined below by
        // this worker only.
        let ident_task: Option<JoinHandle<Result<Identification>>> = if profiles.is_empty() {
            None
        } else {
            let identifier = Arc::clone(&self.identifier);
            let audio = path.clone();
            let ids = profiles.ids();
            Some(tokio::spawn(async move {
                identifier.identify(&audio, &ids).await
            }))
        };

        let text = match self.transcriber.transcribe(&path).await {
            Ok(raw) => normalize_transcript(&raw, self.config.max_transcript_chars),
            Err(e) => {
                debug!(sequence, "transcription degraded to empty: {}", e);
                String::new()
            }
        };

        let identification = match ident_task {
            Some(handle) => match handle.await {
                Ok(Ok(result)) => result,
                Ok(Err(e)) => {
                    debug!(sequence, "identification degraded to unknown: {}", e);
                    Identification::unknown()
                }
                Err(e) => {
                    warn!(sequence, "identification task failed: {}", e);
                    Identification::unknown()
                }
            },
            None => Identification::unknown(),
        };

        if !text.is_empty() {
            let speaker_id = if identification.confidence > self.config.confidence_threshold {
                identification.profile_id
            } else {
                defaults::UNKNOWN_SPEAKER.to_string()
            };

            if let Some(name) = profiles.display_name(&speaker_id) {
                debug!(sequence, speaker = name, "speaker identified");
            }

            turn.append(TurnPiece {
                sequence,
                speaker_id,
                text,
                duration,
            });
        } else {
            debug!(sequence, "no speech recognized in segment");
        }

        // Cleanup runs on every exit path past persistence
        if let Err(e) = tokio::fs::remove_file(&path).await {
            warn!(sequence, "failed to remove segment audio: {}", e);
        }
    }

    async fn persist(&self, path: &std::path::Path, segment: Segment) -> Result<()> {
        let path = path.to_path_buf();
        let sample_rate = self.config.sample_rate;
        tokio::task::spawn_blocking(move || {
            crate::audio::wav::write_wav(&path, &segment.samples, sample_rate)
        })
        .await
        .map_err(|e| crate::error::EarshotError::SegmentAudio {
            message: format!("Segment persistence task failed: {}", e),
        })?
    }

    async fn load_profiles(&self) -> ProfileSnapshot {
        let path = self.config.profiles_path.clone();
        match tokio::task::spawn_blocking(move || ProfileSnapshot::load(&path)).await {
            Ok(Ok(snapshot)) => snapshot,
            Ok(Err(e)) => {
                warn!("profile registry unavailable: {}", e);
                ProfileSnapshot::default()
            }
            Err(e) => {
                warn!("profile registry load failed: {}", e);
                ProfileSnapshot::default()
            }
        }
    }
}

/// Normalizes a raw service transcript.
///
/// Strips ASCII punctuation, lowercases, trims, and truncates to
/// `max_chars` characters.
pub fn normalize_transcript(text: &str, max_chars: usize) -> String {
    let stripped: String = text
        .chars()
        .filter(|c| !c.is_ascii_punctuation())
        .collect();
    let normalized = stripped.to_lowercase().trim().to_string();

    if normalized.chars().count() > max_chars {
        normalized.chars().take(max_chars).collect()
    } else {
        normalized
    }
}

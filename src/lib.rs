//! earshot - Speech capture front-end for spoken-dialogue agents
//!
//! Continuously samples a microphone, segments speech on an RMS energy
//! gate, transcribes (and optionally speaker-identifies) each segment
//! through external services, assembles the pieces into ordered
//! conversational turns, and exchanges them with a client over a TCP
//! turn-taking protocol.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod app;
pub mod audio;
pub mod cli;
pub mod config;
pub mod defaults;
pub mod error;
pub mod listen;
pub mod server;
pub mod speaker;
pub mod stt;
pub mod turn;

// Core traits (source → segment → service → turn)
pub use audio::source::AudioSource;
pub use speaker::identify::SpeakerIdentifier;
pub use stt::transcriber::Transcriber;

// Capture pipeline
pub use audio::gate::{EnergyGate, FrameClass};
pub use listen::frame::{Frame, Segment};
pub use listen::listener::{ListenLoop, TurnBoundary, TurnPolicy};
pub use listen::pre_roll::PreRollBuffer;
pub use listen::recorder::{RecorderConfig, RecorderState, SegmentRecorder};
pub use listen::stream::{FrameStream, FrameStreamConfig, StreamHandle};

// Turn assembly
pub use turn::aggregator::{TurnHandle, TurnPiece};
pub use turn::worker::{TranscriptionWorker, WorkerConfig};

// Session protocol
pub use server::{SessionConfig, TurnServer};

// Error handling
pub use error::{EarshotError, Result};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}

//! Default configuration constants for earshot.
//!
//! These values are empirically tuned per deployment (microphone placement,
//! room noise, client pacing); every one of them is overridable through the
//! configuration file. The defaults here are the ones the reference
//! deployment ships with.

/// Default audio sample rate in Hz.
///
/// 16kHz is the standard for speech recognition services and keeps segment
/// uploads small.
pub const SAMPLE_RATE: u32 = 16_000;

/// Samples per capture frame.
///
/// Frames are the unit of voice-activity classification; 1024 samples is
/// 64ms at 16kHz, short enough for responsive onset detection.
pub const FRAME_SAMPLES: usize = 1024;

/// RMS threshold above which a frame counts as voiced.
///
/// RMS is computed over samples normalized to [-1, 1] and scaled by 1000,
/// so typical ambient noise sits well below 10 while close speech reaches
/// the hundreds.
pub const RMS_THRESHOLD: f32 = 40.0;

/// Silence duration that ends a single utterance segment, in milliseconds.
///
/// A pause this long inside a turn splits the audio into a new segment;
/// the speaker is assumed to still be mid-turn.
pub const SPLIT_SILENCE_MS: u64 = 1_000;

/// Silence duration that ends the whole turn, in milliseconds.
///
/// Must be longer than the split silence so a turn can contain several
/// segments separated by natural pauses.
pub const FINAL_SILENCE_MS: u64 = 2_000;

/// Hard cap on a single segment's recording time, in seconds.
///
/// Bounds worst-case memory and end-to-end latency; hitting the cap is a
/// normal finalization trigger, not an error.
pub const MAX_SEGMENT_SECS: u64 = 30;

/// Number of silent frames retained before speech onset.
///
/// Pre-roll audio is prepended to a segment so soft onsets are not clipped
/// when energy crosses the threshold mid-word. 20 frames is ~1.3s at the
/// default frame size and rate.
pub const PRE_ROLL_CHUNKS: usize = 20;

/// Maximum transcript length in characters; longer results are truncated.
pub const MAX_TRANSCRIPT_CHARS: usize = 512;

/// Minimum identification confidence to attribute a piece to a profile.
///
/// Below this the piece is tagged with [`UNKNOWN_SPEAKER`].
pub const IDENT_CONFIDENCE_THRESHOLD: f32 = 0.3;

/// Sentinel profile id for an unidentified speaker.
pub const UNKNOWN_SPEAKER: &str = "00000000-0000-0000-0000-000000000000";

/// Acknowledgment token that selects the wake-phrase policy for the next turn.
///
/// Any other non-empty token selects the fixed-silence policy.
pub const WAKE_TOKEN: &str = "w";

/// Default wake/exit phrases that force early turn termination.
pub const WAKE_PHRASES: &[&str] = &["over and out"];

/// Maximum size of a single control read (handshake and acknowledgment).
pub const CONTROL_READ_BYTES: usize = 256;

/// Default listening address for the session socket.
pub const BIND_ADDR: &str = "0.0.0.0:9090";

/// Default service locale when no language is configured.
pub const DEFAULT_LANGUAGE: &str = "en-GB";

//! Frame and segment types flowing through the capture pipeline.

use std::time::{Duration, Instant};

/// One fixed-size block of mono PCM audio from the capture stream.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Arrival index, monotonically increasing for the stream's lifetime.
    pub sequence: u64,
    /// Timestamp when the frame was assembled.
    pub timestamp: Instant,
    /// Audio samples as 16-bit PCM.
    pub samples: Vec<i16>,
}

impl Frame {
    /// Creates a new frame stamped with the current time.
    pub fn new(sequence: u64, samples: Vec<i16>) -> Self {
        Self {
            sequence,
            timestamp: Instant::now(),
            samples,
        }
    }
}

/// One finalized utterance: pre-roll plus everything captured between
/// speech onset and the silence debounce (or the hard cap).
#[derive(Debug, Clone)]
pub struct Segment {
    /// Finalization index, strictly increasing across the session.
    pub sequence: u64,
    /// Captured samples, pre-roll first.
    pub samples: Vec<i16>,
    /// Audio duration of the captured samples.
    pub duration: Duration,
}

impl Segment {
    /// Builds a segment, deriving duration from the sample count.
    pub fn new(sequence: u64, samples: Vec<i16>, sample_rate: u32) -> Self {
        let duration = Duration::from_secs_f64(samples.len() as f64 / sample_rate as f64);
        Self {
            sequence,
            samples,
            duration,
        }
    }
}

//! Per-utterance segment recorder.
//!
//! State machine driven frame-by-frame: a voiced frame opens a segment
//! (prepending the drained pre-roll), every frame is appended while
//! recording, and the segment finalizes when the silence debounce elapses
//! with no intervening voiced frame or when the hard cap is reached.

use crate::audio::gate::FrameClass;
use crate::defaults;
use crate::listen::frame::{Frame, Segment};
use crate::listen::pre_roll::PreRollBuffer;
use std::time::{Duration, Instant};

/// Trait for time operations, allowing mock time in tests.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> Instant;
}

/// Real system clock using `std::time::Instant::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Configuration for the segment recorder.
#[derive(Debug, Clone)]
pub struct RecorderConfig {
    /// Silence that ends the current segment.
    pub split_silence: Duration,
    /// Hard cap on a single segment's recording time.
    pub max_duration: Duration,
    /// Sample rate used to derive segment durations.
    pub sample_rate: u32,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            split_silence: Duration::from_millis(defaults::SPLIT_SILENCE_MS),
            max_duration: Duration::from_secs(defaults::MAX_SEGMENT_SECS),
            sample_rate: defaults::SAMPLE_RATE,
        }
    }
}

/// Current state of the segment recorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    /// Waiting for speech onset.
    Idle,
    /// Capturing an utterance.
    Recording,
}

/// Segment recorder state machine.
pub struct SegmentRecorder<C: Clock = SystemClock> {
    config: RecorderConfig,
    state: RecorderState,
    samples: Vec<i16>,
    started_at: Option<Instant>,
    silence_deadline: Option<Instant>,
    next_sequence: u64,
    clock: C,
}

impl SegmentRecorder<SystemClock> {
    /// Creates a recorder with the given configuration and the system clock.
    pub fn new(config: RecorderConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> SegmentRecorder<C> {
    /// Creates a recorder with the given configuration and clock.
    pub fn with_clock(config: RecorderConfig, clock: C) -> Self {
        Self {
            config,
            state: RecorderState::Idle,
            samples: Vec::new(),
            started_at: None,
            silence_deadline: None,
            next_sequence: 0,
            clock,
        }
    }

    /// Feeds one classified frame through the state machine.
    ///
    /// Returns a finalized segment when this frame ended an utterance.
    /// While idle, silent frames are ignored here — the caller routes them
    /// to the pre-roll buffer instead.
    pub fn process(
        &mut self,
        frame: &Frame,
        class: FrameClass,
        pre_roll: &mut PreRollBuffer,
    ) -> Option<Segment> {
        match self.state {
            RecorderState::Idle => {
                if !class.is_voiced() {
                    return None;
                }

                let now = self.clock.now();
                self.state = RecorderState::Recording;
                self.started_at = Some(now);
                self.silence_deadline = Some(now + self.config.split_silence);

                for buffered in pre_roll.drain() {
                    self.samples.extend_from_slice(&buffered.samples);
                }
                self.samples.extend_from_slice(&frame.samples);
                None
            }
            RecorderState::Recording => {
                let now = self.clock.now();
                self.samples.extend_from_slice(&frame.samples);

                if class.is_voiced() {
                    self.silence_deadline = Some(now + self.config.split_silence);
                }

                let silence_elapsed = self.silence_deadline.is_some_and(|d| now >= d);
                let capped = self
                    .started_at
                    .is_some_and(|start| now.duration_since(start) >= self.config.max_duration);

                if silence_elapsed || capped {
                    Some(self.finalize())
                } else {
                    None
                }
            }
        }
    }

    fn finalize(&mut self) -> Segment {
        let samples = std::mem::take(&mut self.samples);
        let sequence = self.next_sequence;
        self.next_sequence += 1;

        self.state = RecorderState::Idle;
        self.started_at = None;
        self.silence_deadline = None;

        Segment::new(sequence, samples, self.config.sample_rate)
    }

    /// Returns the current recorder state.
    pub fn state(&self) -> RecorderState {
        self.state
    }

    /// Discards any in-progress capture and returns to idle.
    ///
    /// The sequence counter is not rewound: segment numbers stay strictly
    /// increasing for the session's lifetime.
    pub fn reset(&mut self) {
        self.state = RecorderState::Idle;
        self.samples.clear();
        self.started_at = None;
        self.silence_deadline = None;
    }
}

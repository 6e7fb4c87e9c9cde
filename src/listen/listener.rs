//! The listen loop.
//!
//! Drives the energy gate and segment recorder over the live frame stream
//! under a per-turn termination policy. One parameterized loop covers both
//! policies; there are no separate code paths per termination mode.

use crate::audio::gate::EnergyGate;
use crate::config::Config;
use crate::listen::frame::{Frame, Segment};
use crate::listen::pre_roll::PreRollBuffer;
use crate::listen::recorder::{Clock, RecorderConfig, RecorderState, SegmentRecorder, SystemClock};
use crate::turn::aggregator::TurnHandle;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::debug;

/// Per-turn termination policy, selected by the session protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnPolicy {
    /// Terminate once this much silence passes with no voiced frame.
    FixedSilence(Duration),
    /// Terminate as soon as the turn text contains any of these phrases
    /// (case-insensitive substring match); no silence deadline.
    WakePhrase(Vec<String>),
}

/// Why the listen loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnBoundary {
    /// The overall silence deadline elapsed with the recorder idle.
    SilenceElapsed,
    /// The turn text matched a wake/exit phrase.
    WakePhrase,
    /// The frame stream ended (capture stopped or failed).
    StreamClosed,
}

/// Policy-parameterized loop over the live frame stream.
pub struct ListenLoop<C: Clock = SystemClock> {
    gate: EnergyGate,
    pre_roll: PreRollBuffer,
    recorder: SegmentRecorder<C>,
    clock: C,
}

impl ListenLoop<SystemClock> {
    /// Builds a listen loop from the session configuration.
    pub fn from_config(config: &Config) -> Self {
        let recorder_config = RecorderConfig {
            split_silence: config.segmenter.split_silence(),
            max_duration: config.segmenter.max_segment(),
            sample_rate: config.audio.sample_rate,
        };
        Self::with_clock(
            EnergyGate::new(config.audio.rms_threshold),
            config.segmenter.pre_roll_chunks,
            recorder_config,
            SystemClock,
        )
    }
}

impl<C: Clock + Clone> ListenLoop<C> {
    /// Builds a listen loop with an explicit clock (for tests).
    pub fn with_clock(
        gate: EnergyGate,
        pre_roll_chunks: usize,
        recorder_config: RecorderConfig,
        clock: C,
    ) -> Self {
        Self {
            gate,
            pre_roll: PreRollBuffer::new(pre_roll_chunks),
            recorder: SegmentRecorder::with_clock(recorder_config, clock.clone()),
            clock,
        }
    }
}

impl<C: Clock> ListenLoop<C> {
    /// Runs one turn's worth of listening.
    ///
    /// Every finalized segment is handed to `on_segment`, which must not
    /// block (the session dispatches a worker task from it). Returns when
    /// the policy terminates the turn or the frame stream ends.
    pub async fn run_turn<F>(
        &mut self,
        frames: &mut mpsc::Receiver<Frame>,
        policy: &TurnPolicy,
        turn: &TurnHandle,
        mut on_segment: F,
    ) -> TurnBoundary
    where
        F: FnMut(Segment),
    {
        let mut deadline: Option<Instant> = match policy {
            TurnPolicy::FixedSilence(window) => Some(self.clock.now() + *window),
            TurnPolicy::WakePhrase(_) => None,
        };

        loop {
            if let TurnPolicy::WakePhrase(phrases) = policy
                && turn.contains_any(phrases)
            {
                debug!("wake phrase matched, ending turn");
                return TurnBoundary::WakePhrase;
            }

            let Some(frame) = frames.recv().await else {
                return TurnBoundary::StreamClosed;
            };

            let class = self.gate.classify(&frame.samples);

            if class.is_voiced()
                && let TurnPolicy::FixedSilence(window) = policy
            {
                deadline = Some(self.clock.now() + *window);
            }

            if self.recorder.state() == RecorderState::Idle && !class.is_voiced() {
                self.pre_roll.push(frame);
            } else if let Some(segment) = self.recorder.process(&frame, class, &mut self.pre_roll)
            {
                debug!(
                    sequence = segment.sequence,
                    duration_ms = segment.duration.as_millis() as u64,
                    "segment finalized"
                );
                on_segment(segment);
            }

            if self.recorder.state() == RecorderState::Idle
                && let Some(d) = deadline
                && self.clock.now() >= d
            {
                return TurnBoundary::SilenceElapsed;
            }
        }
    }

    /// Clears the pre-roll buffer and any in-progress recording.
    ///
    /// Called by the session when a new turn begins. Segment sequence
    /// numbers keep increasing across resets.
    pub fn reset(&mut self) {
        self.pre_roll.clear();
        self.recorder.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::turn::aggregator::TurnPiece;
    use std::sync::{Arc, Mutex};

    fn listen_loop(split_ms: u64) -> ListenLoop<SystemClock> {
        ListenLoop::with_clock(
            EnergyGate::new(40.0),
            20,
            RecorderConfig {
                split_silence: Duration::from_millis(split_ms),
                max_duration: Duration::from_secs(30),
                sample_rate: 16000,
            },
            SystemClock,
        )
    }

    fn voiced_frame(seq: u64) -> Frame {
        Frame::new(seq, vec![3000i16; 160])
    }

    fn silent_frame(seq: u64) -> Frame {
        Frame::new(seq, vec![0i16; 160])
    }

    #[tokio::test]
    async fn test_all_silence_produces_no_segment() {
        let mut listener = listen_loop(50);
        let turn = TurnHandle::new();
        let segments = Arc::new(Mutex::new(Vec::new()));
        let sink = segments.clone();

        let (tx, mut rx) = mpsc::channel(100);
        let feeder = tokio::spawn(async move {
            for seq in 0..20 {
                if tx.send(silent_frame(seq)).await.is_err() {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        });

        let boundary = listener
            .run_turn(
                &mut rx,
                &TurnPolicy::FixedSilence(Duration::from_millis(100)),
                &turn,
                move |s| sink.lock().unwrap().push(s),
            )
            .await;

        feeder.abort();
        assert_eq!(boundary, TurnBoundary::SilenceElapsed);
        assert!(segments.lock().unwrap().is_empty());
        assert!(turn.is_blank());
    }

    #[tokio::test]
    async fn test_one_utterance_produces_one_segment() {
        let mut listener = listen_loop(40);
        let turn = TurnHandle::new();
        let segments = Arc::new(Mutex::new(Vec::new()));
        let sink = segments.clone();

        let (tx, mut rx) = mpsc::channel(100);
        let feeder = tokio::spawn(async move {
            let mut seq = 0;
            // Leading silence builds pre-roll
            for _ in 0..3 {
                let _ = tx.send(silent_frame(seq)).await;
                seq += 1;
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
            // A burst of speech
            for _ in 0..5 {
                let _ = tx.send(voiced_frame(seq)).await;
                seq += 1;
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
            // Trailing silence finalizes the segment, then the turn
            loop {
                if tx.send(silent_frame(seq)).await.is_err() {
                    return;
                }
                seq += 1;
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        });

        let boundary = listener
            .run_turn(
                &mut rx,
                &TurnPolicy::FixedSilence(Duration::from_millis(150)),
                &turn,
                move |s| sink.lock().unwrap().push(s),
            )
            .await;

        feeder.abort();
        assert_eq!(boundary, TurnBoundary::SilenceElapsed);

        let segments = segments.lock().unwrap();
        assert_eq!(segments.len(), 1, "expected exactly one segment");
        assert_eq!(segments[0].sequence, 0);
        // Pre-roll + voiced burst are all in the segment
        assert!(segments[0].samples.len() >= 8 * 160);
    }

    #[tokio::test]
    async fn test_wake_phrase_terminates_during_silence() {
        let mut listener = listen_loop(40);
        let turn = TurnHandle::new();

        let (tx, mut rx) = mpsc::channel(100);
        let feeder = tokio::spawn(async move {
            let mut seq = 0;
            loop {
                if tx.send(silent_frame(seq)).await.is_err() {
                    return;
                }
                seq += 1;
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        });

        // A worker appends the matching piece while the gate only sees silence
        let appender = {
            let turn = turn.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                turn.append(TurnPiece {
                    sequence: 0,
                    speaker_id: crate::defaults::UNKNOWN_SPEAKER.to_string(),
                    text: "fine over and out".to_string(),
                    duration: Duration::from_secs(1),
                });
            })
        };

        let policy = TurnPolicy::WakePhrase(vec!["over and out".to_string()]);
        let boundary = tokio::time::timeout(
            Duration::from_secs(2),
            listener.run_turn(&mut rx, &policy, &turn, |_| {}),
        )
        .await
        .expect("listen loop should terminate on the wake phrase");

        feeder.abort();
        appender.await.unwrap();
        assert_eq!(boundary, TurnBoundary::WakePhrase);
    }

    #[tokio::test]
    async fn test_stream_close_ends_loop() {
        let mut listener = listen_loop(40);
        let turn = TurnHandle::new();

        let (tx, mut rx) = mpsc::channel::<Frame>(10);
        drop(tx);

        let boundary = listener
            .run_turn(
                &mut rx,
                &TurnPolicy::FixedSilence(Duration::from_secs(10)),
                &turn,
                |_| {},
            )
            .await;

        assert_eq!(boundary, TurnBoundary::StreamClosed);
    }

    #[tokio::test]
    async fn test_voiced_frames_extend_the_turn() {
        let mut listener = listen_loop(30);
        let turn = TurnHandle::new();
        let segments = Arc::new(Mutex::new(Vec::new()));
        let sink = segments.clone();

        let (tx, mut rx) = mpsc::channel(100);
        let feeder = tokio::spawn(async move {
            let mut seq = 0;
            // Two bursts separated by more than the split silence but less
            // than the final silence: one turn, two segments.
            for burst in 0..2 {
                for _ in 0..4 {
                    let _ = tx.send(voiced_frame(seq)).await;
                    seq += 1;
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
                let pause_frames = if burst == 0 { 8 } else { 40 };
                for _ in 0..pause_frames {
                    if tx.send(silent_frame(seq)).await.is_err() {
                        return;
                    }
                    seq += 1;
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
            }
        });

        let boundary = listener
            .run_turn(
                &mut rx,
                &TurnPolicy::FixedSilence(Duration::from_millis(200)),
                &turn,
                move |s| sink.lock().unwrap().push(s),
            )
            .await;

        feeder.abort();
        assert_eq!(boundary, TurnBoundary::SilenceElapsed);

        let segments = segments.lock().unwrap();
        assert_eq!(segments.len(), 2, "expected two segments in one turn");
        assert_eq!(segments[0].sequence, 0);
        assert_eq!(segments[1].sequence, 1);
    }
}

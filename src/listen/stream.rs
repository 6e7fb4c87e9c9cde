//! Frame stream over a live audio source.
//!
//! A dedicated thread performs the blocking device reads, rechunks the
//! samples into fixed-size frames with monotonically increasing sequence
//! numbers, and forwards them over a bounded channel. The capture thread
//! never touches the network or external services.
//!
//! The handle supports pause/resume so the session protocol can stop
//! capture while a turn is being sent (avoiding self-capture of playback)
//! without reopening the device.

use crate::audio::source::AudioSource;
use crate::error::Result;
use crate::listen::frame::Frame;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use tokio::sync::mpsc;

/// Configuration for the frame stream.
#[derive(Debug, Clone)]
pub struct FrameStreamConfig {
    /// Samples per emitted frame.
    pub frame_samples: usize,
    /// Channel buffer size (number of frames to buffer).
    pub channel_buffer_size: usize,
    /// Polling interval when no samples are available (ms).
    pub poll_interval_ms: u64,
    /// Whether capture starts running or paused.
    pub start_paused: bool,
}

impl Default for FrameStreamConfig {
    fn default() -> Self {
        Self {
            frame_samples: crate::defaults::FRAME_SAMPLES,
            channel_buffer_size: 1000,
            poll_interval_ms: 10,
            // The session protocol resumes capture when a client is ready.
            start_paused: true,
        }
    }
}

/// Continuously captures audio and emits fixed-size frames.
pub struct FrameStream<A: AudioSource> {
    source: A,
    config: FrameStreamConfig,
}

impl<A: AudioSource + 'static> FrameStream<A> {
    /// Creates a frame stream over the given audio source.
    pub fn new(source: A) -> Self {
        Self::with_config(source, FrameStreamConfig::default())
    }

    /// Creates a frame stream with custom configuration.
    pub fn with_config(source: A, config: FrameStreamConfig) -> Self {
        Self { source, config }
    }

    /// Starts the capture thread.
    ///
    /// Returns a receiver for frames and a handle for pause/resume/stop.
    /// The thread runs until `stop()` is called, the receiver is dropped,
    /// or the source fails.
    pub fn start(mut self) -> Result<(mpsc::Receiver<Frame>, StreamHandle)> {
        let (tx, rx) = mpsc::channel(self.config.channel_buffer_size);

        let running = Arc::new(AtomicBool::new(true));
        let capturing = Arc::new(AtomicBool::new(!self.config.start_paused));

        if !self.config.start_paused {
            self.source.start()?;
        }

        let handle = StreamHandle {
            running: running.clone(),
            capturing: capturing.clone(),
        };

        let frame_samples = self.config.frame_samples;
        let poll_interval = Duration::from_millis(self.config.poll_interval_ms);
        let mut source_started = !self.config.start_paused;

        thread::spawn(move || {
            let mut pending: Vec<i16> = Vec::new();
            let mut sequence = 0u64;

            while running.load(Ordering::SeqCst) {
                if !capturing.load(Ordering::SeqCst) {
                    if source_started {
                        if let Err(e) = self.source.stop() {
                            tracing::warn!("failed to stop audio source: {}", e);
                        }
                        source_started = false;
                        pending.clear();
                    }
                    thread::sleep(poll_interval);
                    continue;
                }

                if !source_started {
                    if let Err(e) = self.source.start() {
                        tracing::error!("failed to start audio source: {}", e);
                        break;
                    }
                    source_started = true;
                }

                match self.source.read_samples() {
                    Ok(samples) if !samples.is_empty() => {
                        pending.extend_from_slice(&samples);

                        while pending.len() >= frame_samples {
                            let chunk: Vec<i16> = pending.drain(..frame_samples).collect();
                            let frame = Frame::new(sequence, chunk);
                            sequence += 1;

                            // Stop if the receiver is gone
                            if tx.blocking_send(frame).is_err() {
                                running.store(false, Ordering::SeqCst);
                                break;
                            }
                        }
                    }
                    Ok(_) => {
                        thread::sleep(poll_interval);
                    }
                    Err(e) => {
                        tracing::error!("audio capture error: {}", e);
                        break;
                    }
                }
            }

            if source_started {
                let _ = self.source.stop();
            }
            running.store(false, Ordering::SeqCst);
        });

        Ok((rx, handle))
    }
}

/// Handle to control a running frame stream.
#[derive(Clone)]
pub struct StreamHandle {
    running: Arc<AtomicBool>,
    capturing: Arc<AtomicBool>,
}

impl StreamHandle {
    /// Resumes frame capture.
    pub fn resume(&self) {
        self.capturing.store(true, Ordering::SeqCst);
    }

    /// Pauses frame capture; the device is stopped until resumed.
    pub fn pause(&self) {
        self.capturing.store(false, Ordering::SeqCst);
    }

    /// Stops the capture thread for good.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Returns true while the capture thread is alive.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Returns true while frames are being captured.
    pub fn is_capturing(&self) -> bool {
        self.capturing.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::source::MockAudioSource;

    fn running_config() -> FrameStreamConfig {
        FrameStreamConfig {
            frame_samples: 160,
            start_paused: false,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_emits_fixed_size_frames() {
        let source = MockAudioSource::new()
            .with_fallback(vec![100i16; 400])
            .with_read_delay(Duration::from_millis(2));
        let stream = FrameStream::with_config(source, running_config());

        let (mut rx, handle) = stream.start().unwrap();

        for _ in 0..3 {
            let frame = tokio::time::timeout(Duration::from_millis(500), rx.recv())
                .await
                .ok()
                .flatten()
                .expect("frame");
            assert_eq!(frame.samples.len(), 160);
        }

        handle.stop();
    }

    #[tokio::test]
    async fn test_sequence_numbers_increase() {
        let source = MockAudioSource::new()
            .with_fallback(vec![100i16; 160])
            .with_read_delay(Duration::from_millis(2));
        let stream = FrameStream::with_config(source, running_config());

        let (mut rx, handle) = stream.start().unwrap();

        let mut sequences = Vec::new();
        for _ in 0..4 {
            if let Ok(Some(frame)) =
                tokio::time::timeout(Duration::from_millis(500), rx.recv()).await
            {
                sequences.push(frame.sequence);
            }
        }
        handle.stop();

        for pair in sequences.windows(2) {
            assert!(pair[1] == pair[0] + 1, "sequences: {:?}", sequences);
        }
    }

    #[tokio::test]
    async fn test_start_paused_emits_nothing() {
        let source = MockAudioSource::new().with_fallback(vec![100i16; 160]);
        let config = FrameStreamConfig {
            frame_samples: 160,
            start_paused: true,
            ..Default::default()
        };
        let stream = FrameStream::with_config(source, config);

        let (mut rx, handle) = stream.start().unwrap();
        assert!(!handle.is_capturing());

        let frame = tokio::time::timeout(Duration::from_millis(100), rx.recv()).await;
        assert!(frame.is_err(), "paused stream should not emit frames");

        handle.stop();
    }

    #[tokio::test]
    async fn test_resume_after_pause() {
        let source = MockAudioSource::new()
            .with_fallback(vec![100i16; 160])
            .with_read_delay(Duration::from_millis(2));
        let config = FrameStreamConfig {
            frame_samples: 160,
            start_paused: true,
            ..Default::default()
        };
        let stream = FrameStream::with_config(source, config);

        let (mut rx, handle) = stream.start().unwrap();

        handle.resume();
        assert!(handle.is_capturing());

        let frame = tokio::time::timeout(Duration::from_millis(500), rx.recv())
            .await
            .ok()
            .flatten();
        assert!(frame.is_some(), "resumed stream should emit frames");

        handle.pause();
        assert!(!handle.is_capturing());

        handle.stop();
    }

    #[tokio::test]
    async fn test_start_failure_propagates() {
        let source = MockAudioSource::new().with_start_failure();
        let config = FrameStreamConfig {
            start_paused: false,
            ..Default::default()
        };
        let stream = FrameStream::with_config(source, config);

        assert!(stream.start().is_err());
    }
}

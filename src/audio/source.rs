use crate::error::{EarshotError, Result};
use std::collections::VecDeque;
use std::time::Duration;

/// Trait for audio source devices.
///
/// This trait allows swapping implementations (real audio device vs mock).
pub trait AudioSource: Send {
    /// Start capturing audio from the source.
    fn start(&mut self) -> Result<()>;

    /// Stop capturing audio from the source.
    fn stop(&mut self) -> Result<()>;

    /// Read whatever audio has accumulated since the last call.
    ///
    /// Returns 16-bit PCM mono samples; an empty vector means no new audio
    /// is available yet.
    fn read_samples(&mut self) -> Result<Vec<i16>>;
}

/// Mock audio source for testing.
///
/// Plays back an optional scripted sequence of reads, then keeps returning
/// the fallback samples (silence by default). An optional per-read delay
/// paces playback like a real device delivering audio in real time.
pub struct MockAudioSource {
    is_started: bool,
    script: VecDeque<Vec<i16>>,
    fallback: Vec<i16>,
    read_delay: Option<Duration>,
    should_fail_start: bool,
    should_fail_read: bool,
    error_message: String,
}

impl MockAudioSource {
    /// Create a new mock that returns silence forever.
    pub fn new() -> Self {
        Self {
            is_started: false,
            script: VecDeque::new(),
            fallback: vec![0i16; 1024],
            read_delay: None,
            should_fail_start: false,
            should_fail_read: false,
            error_message: "mock audio error".to_string(),
        }
    }

    /// Configure the samples returned once the script is exhausted.
    pub fn with_fallback(mut self, samples: Vec<i16>) -> Self {
        self.fallback = samples;
        self
    }

    /// Queue a sequence of reads returned in order before the fallback.
    pub fn with_script(mut self, reads: Vec<Vec<i16>>) -> Self {
        self.script = reads.into();
        self
    }

    /// Sleep this long on every read, pacing playback like a live device.
    pub fn with_read_delay(mut self, delay: Duration) -> Self {
        self.read_delay = Some(delay);
        self
    }

    /// Configure the mock to fail on start.
    pub fn with_start_failure(mut self) -> Self {
        self.should_fail_start = true;
        self
    }

    /// Configure the mock to fail on read.
    pub fn with_read_failure(mut self) -> Self {
        self.should_fail_read = true;
        self
    }

    /// Configure the error message for failures.
    pub fn with_error_message(mut self, message: &str) -> Self {
        self.error_message = message.to_string();
        self
    }

    /// Check if the audio source is started.
    pub fn is_started(&self) -> bool {
        self.is_started
    }
}

impl Default for MockAudioSource {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioSource for MockAudioSource {
    fn start(&mut self) -> Result<()> {
        if self.should_fail_start {
            Err(EarshotError::AudioCapture {
                message: self.error_message.clone(),
            })
        } else {
            self.is_started = true;
            Ok(())
        }
    }

    fn stop(&mut self) -> Result<()> {
        self.is_started = false;
        Ok(())
    }

    fn read_samples(&mut self) -> Result<Vec<i16>> {
        if self.should_fail_read {
            return Err(EarshotError::AudioCapture {
                message: self.error_message.clone(),
            });
        }
        if let Some(delay) = self.read_delay {
            std::thread::sleep(delay);
        }
        Ok(self
            .script
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone()))
    }
}

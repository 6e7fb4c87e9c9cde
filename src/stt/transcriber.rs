use crate::error::{EarshotError, Result};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;

/// Trait for the external speech-to-text service.
///
/// Implementations take the path of a persisted audio container and return
/// a best-effort transcript, or an empty string when nothing was
/// recognized. One attempt per segment; no retries.
#[async_trait::async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe the audio container at `audio`.
    async fn transcribe(&self, audio: &Path) -> Result<String>;

    /// Name of the backing service, for logs.
    fn name(&self) -> &str;
}

/// Mock transcriber for testing.
///
/// Returns scripted responses in order, then repeats the last one.
pub struct MockTranscriber {
    name: String,
    responses: Mutex<VecDeque<String>>,
    last: Mutex<String>,
    should_fail: bool,
}

impl MockTranscriber {
    /// Create a mock that always recognizes `response`.
    pub fn new(response: &str) -> Self {
        Self {
            name: "mock-stt".to_string(),
            responses: Mutex::new(VecDeque::new()),
            last: Mutex::new(response.to_string()),
            should_fail: false,
        }
    }

    /// Queue responses returned one per call, in order.
    pub fn with_responses(responses: &[&str]) -> Self {
        let mock = Self::new(responses.last().copied().unwrap_or(""));
        if let Ok(mut queue) = mock.responses.lock() {
            queue.extend(responses.iter().map(|r| r.to_string()));
        }
        mock
    }

    /// Configure the mock to fail on every call.
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

#[async_trait::async_trait]
impl Transcriber for MockTranscriber {
    async fn transcribe(&self, _audio: &Path) -> Result<String> {
        if self.should_fail {
            return Err(EarshotError::Transcription {
                message: "mock transcription failure".to_string(),
            });
        }

        if let Ok(mut queue) = self.responses.lock()
            && let Some(next) = queue.pop_front()
        {
            if let Ok(mut last) = self.last.lock() {
                *last = next.clone();
            }
            return Ok(next);
        }

        Ok(self.last.lock().map(|l| l.clone()).unwrap_or_default())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

//! The turn-taking session state machine.
//!
//! One TCP peer at a time:
//! accept → wait-ready → listen → send turn → wait-ack → listen again.
//! An empty read at any receive point means the peer disconnected; the
//! server goes back to accepting. The acknowledgment token doubles as the
//! policy selector for the next turn.

use crate::config::Config;
use crate::defaults;
use crate::error::{EarshotError, Result};
use crate::listen::frame::Frame;
use crate::listen::listener::{ListenLoop, TurnBoundary, TurnPolicy};
use crate::listen::stream::StreamHandle;
use crate::speaker::identify::SpeakerIdentifier;
use crate::stt::transcriber::Transcriber;
use crate::turn::aggregator::TurnHandle;
use crate::turn::worker::TranscriptionWorker;
use crate::turn::xml::render_turn;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Per-session protocol configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Silence window that completes a fixed-silence turn.
    pub final_silence: Duration,
    /// Phrases that complete a wake-phrase turn.
    pub wake_phrases: Vec<String>,
    /// Acknowledgment token selecting the wake-phrase policy.
    pub wake_token: String,
}

impl SessionConfig {
    /// Builds the protocol configuration from the application config.
    pub fn from_config(config: &Config) -> Self {
        Self {
            final_silence: config.segmenter.final_silence(),
            wake_phrases: config.turn.wake_phrases.clone(),
            wake_token: config.turn.wake_token.clone(),
        }
    }
}

/// The session server: owns the audio stream, the listen loop, and the
/// listening socket for one capture endpoint.
pub struct TurnServer<T, S> {
    listener: TcpListener,
    frames: mpsc::Receiver<Frame>,
    stream: StreamHandle,
    listen_loop: ListenLoop,
    worker: TranscriptionWorker<T, S>,
    config: SessionConfig,
}

impl<T, S> TurnServer<T, S>
where
    T: Transcriber + 'static,
    S: SpeakerIdentifier + 'static,
{
    /// Assembles a server from its parts.
    pub fn new(
        listener: TcpListener,
        frames: mpsc::Receiver<Frame>,
        stream: StreamHandle,
        listen_loop: ListenLoop,
        worker: TranscriptionWorker<T, S>,
        config: SessionConfig,
    ) -> Self {
        Self {
            listener,
            frames,
            stream,
            listen_loop,
            worker,
            config,
        }
    }

    /// Accepts and serves clients, one at a time, until the capture stream
    /// dies or the listener fails.
    pub async fn serve(mut self) -> Result<()> {
        loop {
            info!("waiting for client to connect");
            let (socket, peer) =
                self.listener
                    .accept()
                    .await
                    .map_err(|e| EarshotError::Socket {
                        message: format!("Failed to accept connection: {}", e),
                    })?;
            info!(peer = %peer, "client connected");

            let outcome = self.run_session(socket).await;
            // Capture stays off between sessions
            self.stream.pause();

            match outcome {
                Ok(()) => info!("session ended"),
                Err(EarshotError::AudioCapture { message }) => {
                    return Err(EarshotError::AudioCapture { message });
                }
                Err(e) => warn!("session error: {}", e),
            }
        }
    }

    async fn run_session(&mut self, mut socket: TcpStream) -> Result<()> {
        let mut control = [0u8; defaults::CONTROL_READ_BYTES];

        debug!("waiting for client to be ready");
        let n = read_control(&mut socket, &mut control).await?;
        if n == 0 {
            info!("client disconnected");
            return Ok(());
        }

        let mut policy = TurnPolicy::FixedSilence(self.config.final_silence);

        loop {
            // Listening: fresh turn, cleared pre-roll, live frames
            let turn = loop {
                let turn = TurnHandle::new();
                self.listen_loop.reset();
                self.drain_stale_frames();
                self.stream.resume();
                info!("listening");

                let worker = self.worker.clone();
                let worker_turn = turn.clone();
                let boundary = self
                    .listen_loop
                    .run_turn(&mut self.frames, &policy, &turn, move |segment| {
                        worker.dispatch(segment, worker_turn.clone());
                    })
                    .await;

                if boundary == TurnBoundary::StreamClosed {
                    return Err(EarshotError::AudioCapture {
                        message: "frame stream ended".to_string(),
                    });
                }

                // TurnComplete additionally requires a non-blank text
                if !turn.is_blank() {
                    break turn;
                }
                debug!("turn blank, listening again");
            };

            // Send: stop capture first so outgoing playback is not recorded
            self.stream.pause();
            info!(text = %turn.text(), "turn complete");

            let document = render_turn(&turn.pieces());
            socket
                .write_all(document.as_bytes())
                .await
                .map_err(|e| EarshotError::Socket {
                    message: format!("Failed to send turn: {}", e),
                })?;

            debug!("waiting for client acknowledgment");
            let n = read_control(&mut socket, &mut control).await?;
            if n == 0 {
                info!("client disconnected");
                return Ok(());
            }

            let token = std::str::from_utf8(&control[..n]).unwrap_or("").trim();
            policy = self.next_policy(token);
        }
    }

    /// Maps an acknowledgment token to the next turn's policy.
    fn next_policy(&self, token: &str) -> TurnPolicy {
        if token == self.config.wake_token {
            TurnPolicy::WakePhrase(self.config.wake_phrases.clone())
        } else {
            TurnPolicy::FixedSilence(self.config.final_silence)
        }
    }

    /// Discards frames buffered while capture was paused.
    fn drain_stale_frames(&mut self) {
        while self.frames.try_recv().is_ok() {}
    }
}

async fn read_control(socket: &mut TcpStream, buf: &mut [u8]) -> Result<usize> {
    socket.read(buf).await.map_err(|e| EarshotError::Socket {
        message: format!("Failed to read from client: {}", e),
    })
}

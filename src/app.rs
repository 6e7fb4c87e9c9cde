//! Composition root: wires configuration into the capture pipeline, the
//! external-service clients, and the session server.

use crate::config::Config;
use crate::defaults;
use crate::speaker::identify::HttpSpeakerIdentifier;
use crate::stt::http::HttpTranscriber;
use crate::turn::worker::{TranscriptionWorker, WorkerConfig};
use std::sync::Arc;

#[cfg(feature = "cpal-audio")]
use anyhow::Context;
#[cfg(feature = "cpal-audio")]
use crate::audio::capture::CpalAudioSource;
#[cfg(feature = "cpal-audio")]
use crate::listen::listener::{ListenLoop, TurnBoundary, TurnPolicy};
#[cfg(feature = "cpal-audio")]
use crate::listen::stream::{FrameStream, FrameStreamConfig};
#[cfg(feature = "cpal-audio")]
use crate::server::{SessionConfig, TurnServer};
#[cfg(feature = "cpal-audio")]
use crate::turn::aggregator::TurnHandle;

fn build_worker(
    config: &Config,
) -> anyhow::Result<TranscriptionWorker<HttpTranscriber, HttpSpeakerIdentifier>> {
    if config.stt.endpoint.is_empty() {
        anyhow::bail!(
            "no transcription endpoint configured; set stt.endpoint or EARSHOT_STT_ENDPOINT"
        );
    }

    Ok(TranscriptionWorker::new(
        Arc::new(HttpTranscriber::new(
            &config.stt.endpoint,
            &config.stt.language,
        )),
        Arc::new(HttpSpeakerIdentifier::new(&config.speaker.endpoint)),
        WorkerConfig {
            spool_dir: config.turn.spool_dir(),
            profiles_path: config.speaker.profiles_path.clone(),
            sample_rate: config.audio.sample_rate,
            confidence_threshold: config.speaker.confidence_threshold,
            max_transcript_chars: defaults::MAX_TRANSCRIPT_CHARS,
        },
    ))
}

/// Run the session server until the listener or the capture stream fails.
#[cfg(feature = "cpal-audio")]
pub async fn run_serve(config: Config) -> anyhow::Result<()> {
    let worker = build_worker(&config)?;

    let source = CpalAudioSource::new(config.audio.device.as_deref(), config.audio.sample_rate)
        .context("failed to open audio device")?;
    let stream_config = FrameStreamConfig {
        frame_samples: config.audio.frame_samples,
        start_paused: true,
        ..Default::default()
    };
    let (frames, handle) = FrameStream::with_config(source, stream_config)
        .start()
        .context("failed to start audio capture")?;

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind_addr))?;
    tracing::info!(addr = %config.server.bind_addr, "session socket ready");

    let server = TurnServer::new(
        listener,
        frames,
        handle,
        ListenLoop::from_config(&config),
        worker,
        SessionConfig::from_config(&config),
    );
    server.serve().await?;
    Ok(())
}

/// Capture a single turn without a client and print its text.
#[cfg(feature = "cpal-audio")]
pub async fn run_once(config: Config) -> anyhow::Result<()> {
    let worker = build_worker(&config)?;

    let source = CpalAudioSource::new(config.audio.device.as_deref(), config.audio.sample_rate)
        .context("failed to open audio device")?;
    let stream_config = FrameStreamConfig {
        frame_samples: config.audio.frame_samples,
        start_paused: false,
        ..Default::default()
    };
    let (mut frames, handle) = FrameStream::with_config(source, stream_config)
        .start()
        .context("failed to start audio capture")?;

    let mut listen_loop = ListenLoop::from_config(&config);
    let policy = TurnPolicy::FixedSilence(config.segmenter.final_silence());

    tracing::info!("listening");
    loop {
        let turn = TurnHandle::new();
        listen_loop.reset();

        let turn_worker = worker.clone();
        let worker_turn = turn.clone();
        let boundary = listen_loop
            .run_turn(&mut frames, &policy, &turn, move |segment| {
                turn_worker.dispatch(segment, worker_turn.clone());
            })
            .await;

        if boundary == TurnBoundary::StreamClosed {
            anyhow::bail!("audio capture ended unexpectedly");
        }

        if !turn.is_blank() {
            handle.stop();
            println!("{}", turn.text());
            return Ok(());
        }
    }
}

/// List audio input devices.
#[cfg(feature = "cpal-audio")]
pub fn run_devices() -> anyhow::Result<()> {
    let devices = crate::audio::capture::list_devices()?;
    if devices.is_empty() {
        println!("No audio input devices found");
    } else {
        for device in devices {
            println!("{}", device);
        }
    }
    Ok(())
}

#[cfg(not(feature = "cpal-audio"))]
pub async fn run_serve(_config: Config) -> anyhow::Result<()> {
    anyhow::bail!("this build has no audio capture; rebuild with the cpal-audio feature")
}

#[cfg(not(feature = "cpal-audio"))]
pub async fn run_once(_config: Config) -> anyhow::Result<()> {
    anyhow::bail!("this build has no audio capture; rebuild with the cpal-audio feature")
}

#[cfg(not(feature = "cpal-audio"))]
pub fn run_devices() -> anyhow::Result<()> {
    anyhow::bail!("this build has no audio capture; rebuild with the cpal-audio feature")
}

//! Real audio capture using CPAL (Cross-Platform Audio Library).

use crate::audio::source::AudioSource;
use crate::error::{EarshotError, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::{Arc, Mutex};

/// Wrapper for cpal::Stream to make it Send.
///
/// SAFETY: the stream is only touched through the owning `CpalAudioSource`,
/// which serializes access; it never crosses threads while in use.
struct SendableStream(cpal::Stream);

unsafe impl Send for SendableStream {}

/// Microphone input via CPAL.
///
/// Captures 16-bit PCM mono at the configured sample rate. Tries an i16
/// stream first and falls back to f32 with conversion for devices that only
/// expose float formats.
pub struct CpalAudioSource {
    device: cpal::Device,
    stream: Option<SendableStream>,
    buffer: Arc<Mutex<Vec<i16>>>,
    sample_rate: u32,
}

impl CpalAudioSource {
    /// Open an input device.
    ///
    /// With `device_name` set, the device is matched by exact name;
    /// otherwise the system default input device is used.
    pub fn new(device_name: Option<&str>, sample_rate: u32) -> Result<Self> {
        let host = cpal::default_host();

        let device = match device_name {
            Some(name) => {
                let devices = host
                    .input_devices()
                    .map_err(|e| EarshotError::AudioCapture {
                        message: format!("Failed to enumerate devices: {}", e),
                    })?;

                let mut found = None;
                for dev in devices {
                    if let Ok(dev_name) = dev.name()
                        && dev_name == name
                    {
                        found = Some(dev);
                        break;
                    }
                }

                found.ok_or_else(|| EarshotError::AudioDeviceNotFound {
                    device: name.to_string(),
                })?
            }
            None => host
                .default_input_device()
                .ok_or_else(|| EarshotError::AudioDeviceNotFound {
                    device: "default".to_string(),
                })?,
        };

        Ok(Self {
            device,
            stream: None,
            buffer: Arc::new(Mutex::new(Vec::new())),
            sample_rate,
        })
    }

    fn build_stream(&self) -> Result<cpal::Stream> {
        let config = cpal::StreamConfig {
            channels: 1,
            sample_rate: cpal::SampleRate(self.sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let err_callback = |err| {
            tracing::error!("audio stream error: {}", err);
        };

        // Preferred: i16 mono at the session rate
        let buffer = Arc::clone(&self.buffer);
        if let Ok(stream) = self.device.build_input_stream(
            &config,
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                if let Ok(mut buf) = buffer.lock() {
                    buf.extend_from_slice(data);
                }
            },
            err_callback,
            None,
        ) {
            return Ok(stream);
        }

        // Fallback: f32 with conversion
        let buffer = Arc::clone(&self.buffer);
        self.device
            .build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if let Ok(mut buf) = buffer.lock() {
                        buf.extend(
                            data.iter()
                                .map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16),
                        );
                    }
                },
                err_callback,
                None,
            )
            .map_err(|e| EarshotError::AudioCapture {
                message: format!("Failed to build input stream: {}", e),
            })
    }
}

impl AudioSource for CpalAudioSource {
    fn start(&mut self) -> Result<()> {
        if self.stream.is_some() {
            return Ok(()); // Already started
        }

        let stream = self.build_stream()?;
        stream.play().map_err(|e| EarshotError::AudioCapture {
            message: format!("Failed to start audio stream: {}", e),
        })?;

        self.stream = Some(SendableStream(stream));
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if let Some(stream) = self.stream.take() {
            stream.0.pause().map_err(|e| EarshotError::AudioCapture {
                message: format!("Failed to stop audio stream: {}", e),
            })?;
        }
        if let Ok(mut buf) = self.buffer.lock() {
            buf.clear();
        }
        Ok(())
    }

    fn read_samples(&mut self) -> Result<Vec<i16>> {
        let mut buffer = self.buffer.lock().map_err(|e| EarshotError::AudioCapture {
            message: format!("Failed to lock audio buffer: {}", e),
        })?;
        Ok(std::mem::take(&mut *buffer))
    }
}

/// List available audio input device names.
pub fn list_devices() -> Result<Vec<String>> {
    let host = cpal::default_host();
    let devices = host
        .input_devices()
        .map_err(|e| EarshotError::AudioCapture {
            message: format!("Failed to enumerate input devices: {}", e),
        })?;

    Ok(devices.filter_map(|d| d.name().ok()).collect())
}

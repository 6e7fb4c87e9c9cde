//! WAV container persistence for finalized segments.
//!
//! Segments are written as mono 16-bit PCM at the session's configured
//! sample rate, atomically: the file is written to a temporary sibling path
//! and renamed into place, so external services never observe a partial
//! container.

use crate::error::{EarshotError, Result};
use std::fs;
use std::path::Path;

/// Write samples to `path` as a mono 16-bit WAV container.
///
/// The write is atomic with respect to `path`: readers see either nothing
/// or the complete file.
pub fn write_wav(path: &Path, samples: &[i16], sample_rate: u32) -> Result<()> {
    let tmp = path.with_extension("wav.part");

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(&tmp, spec).map_err(|e| {
        EarshotError::SegmentAudio {
            message: format!("Failed to create WAV file: {}", e),
        }
    })?;

    for &sample in samples {
        writer
            .write_sample(sample)
            .map_err(|e| EarshotError::SegmentAudio {
                message: format!("Failed to write WAV samples: {}", e),
            })?;
    }

    writer.finalize().map_err(|e| EarshotError::SegmentAudio {
        message: format!("Failed to finalize WAV file: {}", e),
    })?;

    fs::rename(&tmp, path).map_err(|e| EarshotError::SegmentAudio {
        message: format!("Failed to move WAV file into place: {}", e),
    })?;

    Ok(())
}

/// Read a mono 16-bit WAV container back into samples.
///
/// Returns the samples and the container's sample rate.
pub fn read_wav(path: &Path) -> Result<(Vec<i16>, u32)> {
    let mut reader = hound::WavReader::open(path).map_err(|e| EarshotError::SegmentAudio {
        message: format!("Failed to open WAV file: {}", e),
    })?;

    let spec = reader.spec();
    let samples: Vec<i16> = reader
        .samples::<i16>()
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| EarshotError::SegmentAudio {
            message: format!("Failed to read WAV samples: {}", e),
        })?;

    Ok((samples, spec.sample_rate))
}

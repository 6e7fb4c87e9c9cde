//! Energy-based voice activity gate.
//!
//! Classifies fixed-size audio frames as voiced or silent from a single
//! scalar RMS measure. Deliberately not a DSP library: this is the only
//! signal analysis in the system.

/// Classification of a single audio frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameClass {
    /// Frame energy at or above the threshold.
    Voiced,
    /// Frame energy below the threshold.
    Silent,
}

impl FrameClass {
    /// Returns true for [`FrameClass::Voiced`].
    pub fn is_voiced(self) -> bool {
        matches!(self, FrameClass::Voiced)
    }
}

/// Stateless voiced/silent classifier.
///
/// Pure function of the frame and the configured threshold; holds no state
/// and performs no I/O.
#[derive(Debug, Clone, Copy)]
pub struct EnergyGate {
    threshold: f32,
}

impl EnergyGate {
    /// Creates a gate with the given RMS threshold.
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    /// Classifies a frame of 16-bit PCM samples.
    pub fn classify(&self, samples: &[i16]) -> FrameClass {
        if rms(samples) >= self.threshold {
            FrameClass::Voiced
        } else {
            FrameClass::Silent
        }
    }

    /// The configured RMS threshold.
    pub fn threshold(&self) -> f32 {
        self.threshold
    }
}

/// Root-mean-square amplitude of a frame, scaled by 1000.
///
/// Samples are normalized to [-1, 1] before squaring, so a full-scale
/// square wave measures ~1000 and silence measures 0.
pub fn rms(samples: &[i16]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_squares: f64 = samples
        .iter()
        .map(|&sample| {
            let normalized = sample as f64 / 32768.0;
            normalized * normalized
        })
        .sum();

    let mean_square = sum_squares / samples.len() as f64;
    (mean_square.sqrt() * 1000.0) as f32
}

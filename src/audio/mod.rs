//! Audio input and persistence.

#[cfg(feature = "cpal-audio")]
pub mod capture;
pub mod gate;
pub mod source;
pub mod wav;

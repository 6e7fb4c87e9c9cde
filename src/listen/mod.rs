//! Live-frame capture, voice-activity segmentation, and the listen loop.

pub mod frame;
pub mod listener;
pub mod pre_roll;
pub mod recorder;
pub mod stream;

//! Turn assembly: ordered aggregation of recognized pieces and the
//! per-segment transcription workers that produce them.

pub mod aggregator;
pub mod worker;
pub mod xml;

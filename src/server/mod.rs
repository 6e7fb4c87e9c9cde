//! Turn-taking session protocol over TCP.

pub mod session;

pub use session::{SessionConfig, TurnServer};

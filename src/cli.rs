//! Command-line interface for earshot
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Speech capture front-end for spoken-dialogue agents
#[derive(Parser, Debug)]
#[command(
    name = "earshot",
    version,
    about = "Speech capture front-end for spoken-dialogue agents"
)]
pub struct Cli {
    /// Subcommand to execute (default: serve)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Verbose output (-v: debug, -vv: trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Recorder language, en or it
    #[arg(long, short = 'l', value_name = "LANG")]
    pub language: Option<String>,

    /// Session socket address (default: 0.0.0.0:9090)
    #[arg(long, value_name = "ADDR")]
    pub bind: Option<String>,

    /// Audio input device name
    #[arg(long, value_name = "DEVICE")]
    pub device: Option<String>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Accept session clients and exchange turns (default)
    Serve,

    /// Capture a single turn and print its text
    Once,

    /// List available audio input devices
    Devices,
}

/// Maps the `en`/`it` shorthand to a service locale code.
///
/// Anything other than `it` falls back to British English, matching the
/// recorder's historical default.
pub fn resolve_language(shorthand: &str) -> String {
    match shorthand {
        "it" => "it-IT".to_string(),
        _ => "en-GB".to_string(),
    }
}

//! vnotes - A personal voice-memo recorder CLI
//!
//! Record voice notes from the microphone, play them back, and carry the
//! whole library around as a single JSON backup file.

pub mod audio;
pub mod backup;
pub mod cli;
pub mod config;
pub mod peaks;
pub mod storage;

use thiserror::Error;

/// Main error type for vnotes
#[derive(Error, Debug)]
pub enum VnotesError {
    #[error("Microphone permission denied: {0}")]
    PermissionDenied(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Backup format error: {0}")]
    Format(String),

    #[error("Playback error: {0}")]
    Playback(String),

    #[error("Audio engine error: {0}")]
    Engine(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, VnotesError>;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "vnotes";

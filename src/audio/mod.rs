//! Audio module for vnotes
//!
//! Capture (microphone → WAV via cpal) and playback (rodio) engines behind
//! traits, with a session state machine owning each exclusive resource.

mod capture;
mod playback;
mod player;
mod recorder;

pub use capture::CpalCapture;
pub use playback::RodioPlayback;
pub use player::{PlaybackSession, PlaybackStatus, PlayerState};
pub use recorder::{RecorderState, RecordingSession, StoppedRecording};

use std::path::Path;
use std::time::Duration;

use crate::storage::QualityProfile;
use crate::Result;

/// Microphone capture engine.
///
/// Abstracts the underlying audio stack so the recording session state
/// machine can be exercised without hardware.
///
/// Engines hold live device streams, which are not `Send`; sessions stay on
/// the thread that created them.
pub trait CaptureBackend {
    /// Start capturing to a WAV file at `output_path` with the given profile.
    fn start(&mut self, output_path: &Path, profile: QualityProfile) -> Result<()>;

    /// Stop capturing and finalize the file.
    fn stop(&mut self) -> Result<()>;

    /// Whether a capture is currently active.
    fn is_recording(&self) -> bool;

    /// Backend name for logging.
    fn backend_name(&self) -> &'static str;
}

/// Output playback engine owning at most one loaded blob.
pub trait PlaybackBackend {
    /// Load the blob at `path` and begin playback immediately at `speed`.
    fn load(&mut self, path: &Path, speed: f32) -> Result<()>;

    /// Pause without unloading.
    fn pause(&mut self);

    /// Resume a paused blob.
    fn resume(&mut self);

    /// Seek to the given position.
    fn seek(&mut self, position: Duration) -> Result<()>;

    /// Current playback position.
    fn position(&self) -> Duration;

    /// Total duration of the loaded blob, once probed.
    fn duration(&self) -> Option<Duration>;

    /// Whether playback is paused.
    fn is_paused(&self) -> bool;

    /// Whether the loaded blob has played to its natural end.
    fn finished(&self) -> bool;

    /// Release the loaded blob. Safe to call when nothing is loaded.
    fn unload(&mut self);

    /// Backend name for logging.
    fn backend_name(&self) -> &'static str;
}

/// Create the default capture backend. `device` selects a capture device by
/// name; empty means the system default.
pub fn create_capture(device: &str) -> Box<dyn CaptureBackend> {
    Box::new(CpalCapture::new(device))
}

/// Create the default playback backend.
pub fn create_playback() -> Result<Box<dyn PlaybackBackend>> {
    Ok(Box::new(RodioPlayback::new()?))
}

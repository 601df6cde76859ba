//! Recording session state machine
//!
//! Owns the microphone resource: at most one active capture at a time, with
//! defensive cleanup so a failed or abandoned recording never leaves the
//! engine holding the device.

use chrono::Utc;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::storage::RecordingQuality;
use crate::Result;

use super::CaptureBackend;

/// Session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    Idle,
    Recording,
}

/// Result of a finished recording.
#[derive(Debug, Clone)]
pub struct StoppedRecording {
    /// Locator of the captured blob
    pub audio_path: PathBuf,

    /// Wall-clock time spent recording
    pub elapsed: Duration,
}

struct ActiveRecording {
    path: PathBuf,
    started_at: Instant,
}

/// Recording session owning a capture backend.
pub struct RecordingSession {
    backend: Box<dyn CaptureBackend>,
    active: Option<ActiveRecording>,
}

impl RecordingSession {
    pub fn new(backend: Box<dyn CaptureBackend>) -> Self {
        Self {
            backend,
            active: None,
        }
    }

    pub fn state(&self) -> RecorderState {
        if self.active.is_some() {
            RecorderState::Recording
        } else {
            RecorderState::Idle
        }
    }

    pub fn is_recording(&self) -> bool {
        self.state() == RecorderState::Recording
    }

    /// Wall-clock time since the current recording started.
    pub fn elapsed(&self) -> Option<Duration> {
        self.active.as_ref().map(|a| a.started_at.elapsed())
    }

    /// Start a new capture into `audio_dir` with the given quality tier.
    ///
    /// Any recording still held is forcibly stopped and released first, so
    /// two captures are never open at once. On failure the session stays
    /// Idle; microphone refusal surfaces as `PermissionDenied`.
    pub fn start(&mut self, audio_dir: &Path, quality: RecordingQuality) -> Result<()> {
        if self.active.is_some() {
            tracing::warn!("start: cleaning up a recording still in progress");
            self.cleanup();
        }

        let path = audio_dir.join(format!("rec-{}.wav", Utc::now().timestamp_millis()));

        self.backend.start(&path, quality.profile())?;

        tracing::info!(
            "recording started via {} into {}",
            self.backend.backend_name(),
            path.display()
        );

        self.active = Some(ActiveRecording {
            path,
            started_at: Instant::now(),
        });

        Ok(())
    }

    /// Finalize the current capture and release the microphone.
    ///
    /// No-op returning `None` when Idle. Returns `None` too when the engine
    /// could not finalize a usable blob; the resource is released either way.
    pub fn stop(&mut self) -> Result<Option<StoppedRecording>> {
        let Some(active) = self.active.take() else {
            return Ok(None);
        };

        let elapsed = active.started_at.elapsed();

        if let Err(e) = self.backend.stop() {
            tracing::warn!("stop: finalization failed: {}", e);
            return Ok(None);
        }

        // An engine that stopped cleanly but produced nothing is a failed
        // recording, not an error.
        let usable = std::fs::metadata(&active.path)
            .map(|m| m.len() > 0)
            .unwrap_or(false);
        if !usable {
            tracing::warn!("stop: no usable output at {}", active.path.display());
            return Ok(None);
        }

        tracing::info!("recording stopped after {:?}", elapsed);

        Ok(Some(StoppedRecording {
            audio_path: active.path,
            elapsed,
        }))
    }

    /// Forced stop-and-release. Never errors, safe to call when already
    /// Idle, safe to call twice.
    pub fn cleanup(&mut self) {
        if self.active.take().is_some() {
            if let Err(e) = self.backend.stop() {
                tracing::warn!("cleanup: {}", e);
            }
        }
    }
}

impl Drop for RecordingSession {
    fn drop(&mut self) {
        self.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::QualityProfile;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::tempdir;

    /// Capture backend that writes a stub blob and counts start/stop calls.
    struct MockCapture {
        recording: bool,
        starts: Arc<AtomicUsize>,
        stops: Arc<AtomicUsize>,
        produce_output: bool,
    }

    impl MockCapture {
        fn new(starts: Arc<AtomicUsize>, stops: Arc<AtomicUsize>) -> Self {
            Self {
                recording: false,
                starts,
                stops,
                produce_output: true,
            }
        }
    }

    impl CaptureBackend for MockCapture {
        fn start(&mut self, output_path: &Path, _profile: QualityProfile) -> Result<()> {
            self.starts.fetch_add(1, Ordering::SeqCst);
            if self.produce_output {
                std::fs::write(output_path, b"stub-pcm").unwrap();
            }
            self.recording = true;
            Ok(())
        }

        fn stop(&mut self) -> Result<()> {
            self.stops.fetch_add(1, Ordering::SeqCst);
            self.recording = false;
            Ok(())
        }

        fn is_recording(&self) -> bool {
            self.recording
        }

        fn backend_name(&self) -> &'static str {
            "mock"
        }
    }

    fn session() -> (RecordingSession, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let starts = Arc::new(AtomicUsize::new(0));
        let stops = Arc::new(AtomicUsize::new(0));
        let backend = MockCapture::new(starts.clone(), stops.clone());
        (RecordingSession::new(Box::new(backend)), starts, stops)
    }

    #[test]
    fn start_stop_produces_locator_and_elapsed() {
        let tmp = tempdir().unwrap();
        let (mut session, _, _) = session();

        session.start(tmp.path(), RecordingQuality::High).unwrap();
        assert_eq!(session.state(), RecorderState::Recording);
        assert!(session.elapsed().is_some());

        let stopped = session.stop().unwrap().expect("usable recording");
        assert!(stopped.audio_path.exists());
        assert_eq!(session.state(), RecorderState::Idle);
    }

    #[test]
    fn stop_when_idle_is_a_noop() {
        let (mut session, _, stops) = session();

        assert!(session.stop().unwrap().is_none());
        assert!(session.stop().unwrap().is_none());
        assert_eq!(stops.load(Ordering::SeqCst), 0);
        assert_eq!(session.state(), RecorderState::Idle);
    }

    #[test]
    fn cleanup_is_idempotent() {
        let tmp = tempdir().unwrap();
        let (mut session, _, stops) = session();

        session.start(tmp.path(), RecordingQuality::Low).unwrap();
        session.cleanup();
        session.cleanup();

        assert_eq!(session.state(), RecorderState::Idle);
        assert_eq!(stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn restart_releases_prior_recording_first() {
        let tmp = tempdir().unwrap();
        let (mut session, starts, stops) = session();

        session.start(tmp.path(), RecordingQuality::High).unwrap();
        session.start(tmp.path(), RecordingQuality::High).unwrap();

        assert_eq!(starts.load(Ordering::SeqCst), 2);
        assert_eq!(stops.load(Ordering::SeqCst), 1);
        assert_eq!(session.state(), RecorderState::Recording);
    }

    #[test]
    fn stop_without_usable_output_returns_none() {
        let tmp = tempdir().unwrap();
        let starts = Arc::new(AtomicUsize::new(0));
        let stops = Arc::new(AtomicUsize::new(0));
        let mut backend = MockCapture::new(starts, stops);
        backend.produce_output = false;
        let mut session = RecordingSession::new(Box::new(backend));

        session.start(tmp.path(), RecordingQuality::High).unwrap();
        assert!(session.stop().unwrap().is_none());
        assert_eq!(session.state(), RecorderState::Idle);
    }
}

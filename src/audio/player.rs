//! Playback session state machine
//!
//! Owns the audio output: at most one loaded blob at a time. Status is a
//! polling snapshot; polling also detects natural finish and auto-unloads.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{Result, VnotesError};

use super::PlaybackBackend;

/// Session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Empty,
    Playing,
    Paused,
}

/// Snapshot of the current playback position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlaybackStatus {
    pub position_millis: u64,
    pub duration_millis: u64,
    pub is_playing: bool,
}

struct LoadedClip {
    #[allow(dead_code)]
    path: PathBuf,
    duration_millis: u64,
}

/// Playback session owning a playback backend.
pub struct PlaybackSession {
    backend: Box<dyn PlaybackBackend>,
    current: Option<LoadedClip>,
}

impl PlaybackSession {
    pub fn new(backend: Box<dyn PlaybackBackend>) -> Self {
        Self {
            backend,
            current: None,
        }
    }

    pub fn state(&self) -> PlayerState {
        match &self.current {
            None => PlayerState::Empty,
            Some(_) if self.backend.is_paused() => PlayerState::Paused,
            Some(_) => PlayerState::Playing,
        }
    }

    /// Load the blob at `path` and begin playback immediately.
    ///
    /// Any previously loaded blob is unloaded first, so the session
    /// converges to a single owned resource no matter how quickly calls
    /// arrive. On failure the session is Empty and no handle is retained.
    pub fn load_and_play(&mut self, path: &Path, speed: f32) -> Result<()> {
        self.stop();

        if !path.exists() {
            return Err(VnotesError::Playback(format!(
                "audio file missing: {}",
                path.display()
            )));
        }

        if let Err(e) = self.backend.load(path, speed) {
            self.backend.unload();
            return Err(e);
        }

        let duration_millis = self
            .backend
            .duration()
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        tracing::info!(
            "playing {} ({} ms) via {}",
            path.display(),
            duration_millis,
            self.backend.backend_name()
        );

        self.current = Some(LoadedClip {
            path: path.to_path_buf(),
            duration_millis,
        });

        Ok(())
    }

    /// Pause playback. No-op when Empty.
    pub fn pause(&mut self) {
        if self.current.is_some() {
            self.backend.pause();
        }
    }

    /// Resume a paused blob. No-op when Empty.
    pub fn resume(&mut self) {
        if self.current.is_some() {
            self.backend.resume();
        }
    }

    /// Seek to `position_millis`, clamped to the known duration. No-op when
    /// Empty; an engine seek failure is logged and leaves state unchanged.
    pub fn seek_to(&mut self, position_millis: u64) {
        let Some(clip) = &self.current else {
            return;
        };

        let target = if clip.duration_millis > 0 {
            position_millis.min(clip.duration_millis)
        } else {
            position_millis
        };

        if let Err(e) = self.backend.seek(Duration::from_millis(target)) {
            tracing::warn!("seek to {} ms failed: {}", target, e);
        }
    }

    /// Unload unconditionally and reset position/duration. Idempotent.
    pub fn stop(&mut self) {
        self.backend.unload();
        self.current = None;
    }

    /// Latest playback snapshot. Detects natural finish: once the engine
    /// reports the blob played out, the session auto-unloads and the
    /// returned snapshot is the Empty zero state.
    pub fn status(&mut self) -> PlaybackStatus {
        let Some(clip) = &self.current else {
            return PlaybackStatus::default();
        };

        if self.backend.finished() {
            tracing::debug!("playback finished, unloading");
            self.stop();
            return PlaybackStatus::default();
        }

        let duration_millis = clip.duration_millis;
        let mut position_millis = self.backend.position().as_millis() as u64;
        if duration_millis > 0 {
            position_millis = position_millis.min(duration_millis);
        }

        PlaybackStatus {
            position_millis,
            duration_millis,
            is_playing: !self.backend.is_paused(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }
}

impl Drop for PlaybackSession {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::tempdir;

    /// Playback backend simulating a loaded clip with a manual position.
    /// The shared `finished` flag lets tests emulate the engine reaching the
    /// natural end of the clip.
    struct MockPlayback {
        loaded: Option<PathBuf>,
        paused: bool,
        position: Duration,
        duration: Duration,
        finished: Arc<AtomicBool>,
        unloads: Arc<AtomicUsize>,
        fail_load: bool,
    }

    impl MockPlayback {
        fn new(unloads: Arc<AtomicUsize>, finished: Arc<AtomicBool>) -> Self {
            Self {
                loaded: None,
                paused: false,
                position: Duration::ZERO,
                duration: Duration::from_secs(10),
                finished,
                unloads,
                fail_load: false,
            }
        }
    }

    impl PlaybackBackend for MockPlayback {
        fn load(&mut self, path: &Path, _speed: f32) -> Result<()> {
            if self.fail_load {
                return Err(VnotesError::Playback("corrupt blob".to_string()));
            }
            self.loaded = Some(path.to_path_buf());
            self.paused = false;
            self.position = Duration::ZERO;
            self.finished.store(false, Ordering::SeqCst);
            Ok(())
        }

        fn pause(&mut self) {
            self.paused = true;
        }

        fn resume(&mut self) {
            self.paused = false;
        }

        fn seek(&mut self, position: Duration) -> Result<()> {
            self.position = position;
            Ok(())
        }

        fn position(&self) -> Duration {
            self.position
        }

        fn duration(&self) -> Option<Duration> {
            self.loaded.as_ref().map(|_| self.duration)
        }

        fn is_paused(&self) -> bool {
            self.paused
        }

        fn finished(&self) -> bool {
            self.finished.load(Ordering::SeqCst)
        }

        fn unload(&mut self) {
            if self.loaded.take().is_some() {
                self.unloads.fetch_add(1, Ordering::SeqCst);
            }
        }

        fn backend_name(&self) -> &'static str {
            "mock"
        }
    }

    fn clip(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, b"pcm").unwrap();
        path
    }

    fn session() -> (PlaybackSession, Arc<AtomicUsize>, Arc<AtomicBool>) {
        let unloads = Arc::new(AtomicUsize::new(0));
        let finished = Arc::new(AtomicBool::new(false));
        let backend = MockPlayback::new(unloads.clone(), finished.clone());
        (PlaybackSession::new(Box::new(backend)), unloads, finished)
    }

    #[test]
    fn load_and_play_transitions_to_playing() {
        let tmp = tempdir().unwrap();
        let (mut session, _, _) = session();

        session
            .load_and_play(&clip(tmp.path(), "a.wav"), 1.0)
            .unwrap();
        assert_eq!(session.state(), PlayerState::Playing);

        let status = session.status();
        assert!(status.is_playing);
        assert_eq!(status.duration_millis, 10_000);
    }

    #[test]
    fn loading_second_clip_releases_first() {
        let tmp = tempdir().unwrap();
        let (mut session, unloads, _) = session();

        session
            .load_and_play(&clip(tmp.path(), "a.wav"), 1.0)
            .unwrap();
        session
            .load_and_play(&clip(tmp.path(), "b.wav"), 1.0)
            .unwrap();

        assert_eq!(unloads.load(Ordering::SeqCst), 1);
        assert_eq!(session.state(), PlayerState::Playing);
    }

    #[test]
    fn missing_file_fails_and_stays_empty() {
        let tmp = tempdir().unwrap();
        let (mut session, _, _) = session();

        let err = session
            .load_and_play(&tmp.path().join("missing.wav"), 1.0)
            .unwrap_err();
        assert!(matches!(err, VnotesError::Playback(_)));
        assert_eq!(session.state(), PlayerState::Empty);
    }

    #[test]
    fn load_failure_retains_no_handle() {
        let tmp = tempdir().unwrap();
        let unloads = Arc::new(AtomicUsize::new(0));
        let finished = Arc::new(AtomicBool::new(false));
        let mut backend = MockPlayback::new(unloads, finished);
        backend.fail_load = true;
        let mut session = PlaybackSession::new(Box::new(backend));

        assert!(session
            .load_and_play(&clip(tmp.path(), "a.wav"), 1.0)
            .is_err());
        assert_eq!(session.state(), PlayerState::Empty);
        assert!(!session.is_active());
    }

    #[test]
    fn pause_resume_toggle_without_unloading() {
        let tmp = tempdir().unwrap();
        let (mut session, unloads, _) = session();

        session
            .load_and_play(&clip(tmp.path(), "a.wav"), 1.0)
            .unwrap();
        session.pause();
        assert_eq!(session.state(), PlayerState::Paused);
        assert!(!session.status().is_playing);

        session.resume();
        assert_eq!(session.state(), PlayerState::Playing);
        assert_eq!(unloads.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn pause_resume_seek_are_noops_when_empty() {
        let (mut session, _, _) = session();

        session.pause();
        session.resume();
        session.seek_to(5_000);
        assert_eq!(session.state(), PlayerState::Empty);
        assert_eq!(session.status(), PlaybackStatus::default());
    }

    #[test]
    fn stop_is_idempotent() {
        let tmp = tempdir().unwrap();
        let (mut session, unloads, _) = session();

        session
            .load_and_play(&clip(tmp.path(), "a.wav"), 1.0)
            .unwrap();
        session.stop();
        session.stop();

        assert_eq!(session.state(), PlayerState::Empty);
        assert_eq!(unloads.load(Ordering::SeqCst), 1);
        assert_eq!(session.status(), PlaybackStatus::default());
    }

    #[test]
    fn seek_clamps_to_duration() {
        let tmp = tempdir().unwrap();
        let (mut session, _, _) = session();

        session
            .load_and_play(&clip(tmp.path(), "a.wav"), 1.0)
            .unwrap();
        session.seek_to(60_000);

        let status = session.status();
        assert!(status.position_millis <= status.duration_millis);
        assert_eq!(status.position_millis, 10_000);
    }

    #[test]
    fn position_never_exceeds_known_duration() {
        let tmp = tempdir().unwrap();
        let unloads = Arc::new(AtomicUsize::new(0));
        let finished = Arc::new(AtomicBool::new(false));
        let mut backend = MockPlayback::new(unloads, finished);
        backend.duration = Duration::from_secs(3);
        let mut session = PlaybackSession::new(Box::new(backend));

        session
            .load_and_play(&clip(tmp.path(), "a.wav"), 1.0)
            .unwrap();
        // Engine reports a tick past the end before finish is observed.
        session.backend.seek(Duration::from_secs(5)).unwrap();

        let status = session.status();
        assert!(status.duration_millis > 0);
        assert!(status.position_millis <= status.duration_millis);
    }

    #[test]
    fn natural_finish_auto_unloads() {
        let tmp = tempdir().unwrap();
        let (mut session, unloads, finished) = session();

        session
            .load_and_play(&clip(tmp.path(), "a.wav"), 1.0)
            .unwrap();
        assert_eq!(session.status().duration_millis, 10_000);

        // Engine reaches the end of the clip; the next poll must unload.
        finished.store(true, Ordering::SeqCst);
        let status = session.status();

        assert_eq!(status, PlaybackStatus::default());
        assert_eq!(session.state(), PlayerState::Empty);
        assert_eq!(unloads.load(Ordering::SeqCst), 1);
    }
}

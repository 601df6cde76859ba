//! Audio playback using rodio

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use crate::{Result, VnotesError};

use super::PlaybackBackend;

/// Playback via the default rodio output device.
///
/// One `Sink` per loaded blob; unloading drops the sink, releasing the
/// queued samples while the output stream itself stays alive.
pub struct RodioPlayback {
    _stream: OutputStream,
    handle: OutputStreamHandle,
    sink: Option<Sink>,
    duration: Option<Duration>,
}

impl RodioPlayback {
    /// Open the default output device.
    pub fn new() -> Result<Self> {
        let (stream, handle) = OutputStream::try_default()
            .map_err(|e| VnotesError::Engine(format!("no audio output device: {}", e)))?;

        Ok(Self {
            _stream: stream,
            handle,
            sink: None,
            duration: None,
        })
    }
}

impl PlaybackBackend for RodioPlayback {
    fn load(&mut self, path: &Path, speed: f32) -> Result<()> {
        self.unload();

        let file = File::open(path).map_err(|e| {
            VnotesError::Playback(format!("cannot open {}: {}", path.display(), e))
        })?;

        let source = Decoder::new(BufReader::new(file)).map_err(|e| {
            VnotesError::Playback(format!("cannot decode {}: {}", path.display(), e))
        })?;

        // Decoder probing can come up empty; fall back to the WAV header.
        self.duration = rodio::Source::total_duration(&source).or_else(|| probe_wav(path));

        let sink = Sink::try_new(&self.handle)
            .map_err(|e| VnotesError::Engine(format!("failed to create playback sink: {}", e)))?;
        sink.set_speed(speed);
        sink.append(source);

        self.sink = Some(sink);
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(sink) = &self.sink {
            sink.pause();
        }
    }

    fn resume(&mut self) {
        if let Some(sink) = &self.sink {
            sink.play();
        }
    }

    fn seek(&mut self, position: Duration) -> Result<()> {
        let Some(sink) = &self.sink else {
            return Ok(());
        };
        sink.try_seek(position)
            .map_err(|e| VnotesError::Engine(format!("seek failed: {}", e)))
    }

    fn position(&self) -> Duration {
        self.sink
            .as_ref()
            .map(|s| s.get_pos())
            .unwrap_or(Duration::ZERO)
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }

    fn is_paused(&self) -> bool {
        self.sink.as_ref().map(|s| s.is_paused()).unwrap_or(false)
    }

    fn finished(&self) -> bool {
        self.sink.as_ref().map(|s| s.empty()).unwrap_or(false)
    }

    fn unload(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.duration = None;
    }

    fn backend_name(&self) -> &'static str {
        "rodio"
    }
}

/// Duration of a WAV file from its header, when the decoder cannot tell.
fn probe_wav(path: &Path) -> Option<Duration> {
    let reader = hound::WavReader::open(path).ok()?;
    let spec = reader.spec();
    if spec.sample_rate == 0 {
        return None;
    }
    let secs = reader.duration() as f64 / spec.sample_rate as f64;
    Some(Duration::from_secs_f64(secs))
}

//! Microphone capture using cpal, writing 16-bit PCM WAV via hound

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, Stream, StreamConfig};
use hound::{WavSpec, WavWriter};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::storage::QualityProfile;
use crate::{Result, VnotesError};

use super::CaptureBackend;

type SharedWriter = Arc<Mutex<Option<WavWriter<std::io::BufWriter<std::fs::File>>>>>;

/// Microphone capture via a cpal input device.
pub struct CpalCapture {
    /// WAV writer shared with the stream callback
    writer: SharedWriter,

    /// Live input stream; dropping it stops capture
    stream: Option<Stream>,

    /// Whether capture is active
    recording: Arc<AtomicBool>,

    /// Preferred device name (empty = system default)
    device: String,
}

impl CpalCapture {
    pub fn new(device: &str) -> Self {
        Self {
            writer: Arc::new(Mutex::new(None)),
            stream: None,
            recording: Arc::new(AtomicBool::new(false)),
            device: device.to_string(),
        }
    }

    fn input_device(&self, host: &cpal::Host) -> Result<cpal::Device> {
        if !self.device.is_empty() {
            let mut devices = host.input_devices().map_err(|e| {
                VnotesError::Engine(format!("failed to enumerate input devices: {}", e))
            })?;
            if let Some(device) =
                devices.find(|d| d.name().map(|n| n == self.device).unwrap_or(false))
            {
                return Ok(device);
            }
            tracing::warn!("input device '{}' not found, using default", self.device);
        }

        // A refused or absent microphone surfaces here as "no input device".
        host.default_input_device().ok_or_else(|| {
            VnotesError::PermissionDenied("no microphone input device available".to_string())
        })
    }
}

impl CaptureBackend for CpalCapture {
    fn start(&mut self, output_path: &Path, profile: QualityProfile) -> Result<()> {
        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let host = cpal::default_host();
        let device = self.input_device(&host)?;

        tracing::info!(
            "cpal: using audio device: {}",
            device.name().unwrap_or_default()
        );

        let supported_configs = device.supported_input_configs().map_err(|e| {
            VnotesError::PermissionDenied(format!("microphone not accessible: {}", e))
        })?;

        let config = find_suitable_config(supported_configs, profile)?;

        tracing::info!(
            "cpal: audio config: {} Hz, {} channels, {:?}",
            config.sample_rate().0,
            config.channels(),
            config.sample_format()
        );

        let spec = WavSpec {
            channels: config.channels(),
            sample_rate: config.sample_rate().0,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let writer = WavWriter::create(output_path, spec).map_err(|e| {
            VnotesError::Engine(format!(
                "failed to create WAV file {}: {}",
                output_path.display(),
                e
            ))
        })?;

        if let Ok(mut guard) = self.writer.lock() {
            *guard = Some(writer);
        }

        let stream_config = StreamConfig {
            channels: config.channels(),
            sample_rate: config.sample_rate(),
            buffer_size: cpal::BufferSize::Default,
        };

        self.recording.store(true, Ordering::SeqCst);

        let writer = self.writer.clone();
        let recording = self.recording.clone();

        let stream = match config.sample_format() {
            SampleFormat::I8 => build_stream::<i8>(&device, &stream_config, writer, recording)?,
            SampleFormat::I16 => build_stream::<i16>(&device, &stream_config, writer, recording)?,
            SampleFormat::I32 => build_stream::<i32>(&device, &stream_config, writer, recording)?,
            SampleFormat::I64 => build_stream::<i64>(&device, &stream_config, writer, recording)?,
            SampleFormat::U8 => build_stream::<u8>(&device, &stream_config, writer, recording)?,
            SampleFormat::U16 => build_stream::<u16>(&device, &stream_config, writer, recording)?,
            SampleFormat::U32 => build_stream::<u32>(&device, &stream_config, writer, recording)?,
            SampleFormat::U64 => build_stream::<u64>(&device, &stream_config, writer, recording)?,
            SampleFormat::F32 => build_stream::<f32>(&device, &stream_config, writer, recording)?,
            SampleFormat::F64 => build_stream::<f64>(&device, &stream_config, writer, recording)?,
            format => {
                return Err(VnotesError::Engine(format!(
                    "unsupported sample format: {:?}",
                    format
                )))
            }
        };

        stream
            .play()
            .map_err(|e| VnotesError::Engine(format!("failed to start audio stream: {}", e)))?;
        self.stream = Some(stream);

        tracing::info!("cpal: audio recording started");
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.recording.store(false, Ordering::SeqCst);

        // Drop the stream to stop capture
        self.stream.take();

        if let Ok(mut guard) = self.writer.lock() {
            if let Some(writer) = guard.take() {
                writer.finalize().map_err(|e| {
                    VnotesError::Engine(format!("failed to finalize WAV file: {}", e))
                })?;
            }
        }

        tracing::info!("cpal: audio recording stopped");
        Ok(())
    }

    fn is_recording(&self) -> bool {
        self.recording.load(Ordering::SeqCst)
    }

    fn backend_name(&self) -> &'static str {
        "cpal"
    }
}

impl Drop for CpalCapture {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

/// Find a device configuration close to the requested quality profile.
fn find_suitable_config(
    configs: cpal::SupportedInputConfigs,
    profile: QualityProfile,
) -> Result<cpal::SupportedStreamConfig> {
    let configs: Vec<_> = configs.collect();

    // Exact channel count at the target rate first
    for config in &configs {
        if config.channels() == profile.channels
            && config.min_sample_rate().0 <= profile.sample_rate
            && config.max_sample_rate().0 >= profile.sample_rate
        {
            return Ok(config
                .clone()
                .with_sample_rate(cpal::SampleRate(profile.sample_rate)));
        }
    }

    // Any channel count that supports the target rate
    for config in &configs {
        if config.min_sample_rate().0 <= profile.sample_rate
            && config.max_sample_rate().0 >= profile.sample_rate
        {
            return Ok(config
                .clone()
                .with_sample_rate(cpal::SampleRate(profile.sample_rate)));
        }
    }

    // Whatever the device offers
    configs
        .into_iter()
        .next()
        .map(|c| c.with_max_sample_rate())
        .ok_or_else(|| VnotesError::Engine("no supported audio configuration found".to_string()))
}

/// Build an input stream for a specific sample format.
fn build_stream<T>(
    device: &cpal::Device,
    config: &StreamConfig,
    writer: SharedWriter,
    recording: Arc<AtomicBool>,
) -> Result<Stream>
where
    T: cpal::Sample + cpal::SizedSample + 'static,
    i16: cpal::FromSample<T>,
{
    let err_fn = |err| tracing::error!("audio stream error: {}", err);

    let stream = device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                if !recording.load(Ordering::SeqCst) {
                    return;
                }

                if let Ok(mut guard) = writer.lock() {
                    if let Some(ref mut writer) = *guard {
                        for &sample in data {
                            let sample_i16: i16 = cpal::Sample::from_sample(sample);
                            if writer.write_sample(sample_i16).is_err() {
                                break;
                            }
                        }
                    }
                }
            },
            err_fn,
            None,
        )
        .map_err(|e| VnotesError::Engine(format!("failed to build input stream: {}", e)))?;

    Ok(stream)
}

//! Data models for storage

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// A single voice note.
///
/// Serialized camelCase so the persisted collection and the backup document
/// share the same field names on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceNote {
    /// Unique identifier (opaque, time-derived)
    pub id: String,

    /// Display name
    pub name: String,

    /// Creation timestamp (ISO-8601)
    pub date: String,

    /// Duration in whole seconds
    pub duration: u64,

    /// Locator of the audio blob on disk
    pub audio_uri: String,
}

impl VoiceNote {
    /// Create a new note for a just-recorded blob.
    pub fn new(name: String, duration: u64, audio_uri: String) -> Self {
        let now = Utc::now();
        Self {
            id: now.timestamp_millis().to_string(),
            name,
            date: now.to_rfc3339(),
            duration,
            audio_uri,
        }
    }
}

/// Recording quality tier selected by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingQuality {
    Low,
    Medium,
    #[default]
    High,
}

impl RecordingQuality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    /// Capture parameters for this tier. A configuration table, not a hard
    /// contract; the capture backend may fall back to what the device offers.
    pub fn profile(&self) -> QualityProfile {
        match self {
            Self::Low => QualityProfile {
                sample_rate: 16_000,
                channels: 1,
            },
            Self::Medium => QualityProfile {
                sample_rate: 32_000,
                channels: 1,
            },
            Self::High => QualityProfile {
                sample_rate: 44_100,
                channels: 2,
            },
        }
    }
}

/// Target capture parameters derived from a quality tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualityProfile {
    pub sample_rate: u32,
    pub channels: u16,
}

/// User preferences, persisted in the key-value store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    #[serde(default)]
    pub recording_quality: RecordingQuality,

    #[serde(default = "default_playback_speed")]
    pub playback_speed: f32,

    #[serde(default)]
    pub backup_enabled: bool,
}

fn default_playback_speed() -> f32 {
    1.0
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            recording_quality: RecordingQuality::High,
            playback_speed: 1.0,
            backup_enabled: false,
        }
    }
}

//! Storage layer for vnotes
//!
//! A JSON key-value store plus the note collection persisted through it.

mod kv;
mod models;
mod notes;

pub use kv::{KvStore, NOTES_KEY, SETTINGS_KEY};
pub use models::{AppSettings, QualityProfile, RecordingQuality, VoiceNote};
pub use notes::NoteStore;

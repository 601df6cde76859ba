//! Authoritative in-memory note collection, mirrored to the key-value store
//!
//! Every mutation rewrites the whole collection under the fixed notes key.

use crate::storage::kv::{KvStore, NOTES_KEY};
use crate::storage::models::VoiceNote;

/// Store for the full note collection.
pub struct NoteStore {
    kv: KvStore,
    notes: Vec<VoiceNote>,
}

impl NoteStore {
    /// Load the persisted collection from the key-value store.
    pub async fn load(kv: KvStore) -> Self {
        let notes: Vec<VoiceNote> = kv.get_json(NOTES_KEY, Vec::new()).await;
        Self { kv, notes }
    }

    /// All notes, newest first.
    pub fn notes(&self) -> &[VoiceNote] {
        &self.notes
    }

    /// Look up a note by exact id.
    pub fn get(&self, id: &str) -> Option<&VoiceNote> {
        self.notes.iter().find(|n| n.id == id)
    }

    /// Look up a note by id prefix, for CLI ergonomics. Returns the first
    /// match in collection order.
    pub fn find_by_prefix(&self, prefix: &str) -> Option<&VoiceNote> {
        self.notes.iter().find(|n| n.id.starts_with(prefix))
    }

    /// Insert a note at the front of the collection and persist.
    pub async fn add(&mut self, note: VoiceNote) {
        self.notes.insert(0, note);
        self.persist().await;
    }

    /// Remove a note by id, deleting its audio blob best-effort, and persist.
    /// Returns whether a note was removed.
    pub async fn remove(&mut self, id: &str) -> bool {
        let Some(pos) = self.notes.iter().position(|n| n.id == id) else {
            return false;
        };

        let note = self.notes.remove(pos);
        if !note.audio_uri.is_empty() {
            if let Err(e) = tokio::fs::remove_file(&note.audio_uri).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("failed to delete audio file {}: {}", note.audio_uri, e);
                }
            }
        }

        self.persist().await;
        true
    }

    /// Rename a note by id and persist. Returns whether a note was renamed.
    pub async fn rename(&mut self, id: &str, name: &str) -> bool {
        let Some(note) = self.notes.iter_mut().find(|n| n.id == id) else {
            return false;
        };

        note.name = name.to_string();
        self.persist().await;
        true
    }

    async fn persist(&self) {
        self.kv.set_json(NOTES_KEY, &self.notes).await;
    }
}

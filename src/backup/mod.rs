//! Backup codec: the note collection as a single portable JSON document
//!
//! Export packs every readable audio blob into the document as base64;
//! import materializes blobs and notes back out of it. Both directions skip
//! individual bad items instead of failing the whole batch, so one corrupt
//! recording never blocks the rest of the library.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::storage::VoiceNote;
use crate::{Result, VnotesError};

/// Extension used when a note's locator carries no recognizable suffix.
const DEFAULT_AUDIO_EXT: &str = ".m4a";

/// The portable backup document.
#[derive(Debug, Serialize, Deserialize)]
pub struct BackupDocument {
    pub meta: BackupMeta,
    pub notes: Vec<BackupNoteEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupMeta {
    pub exported_at: String,
}

/// One note packed into a backup document.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupNoteEntry {
    pub id: String,
    pub name: String,
    pub date: String,
    pub duration: u64,
    pub audio_filename: String,
    pub audio_base64: String,
}

/// Pack `notes` into a backup document and write it into `document_dir`.
///
/// Notes whose blobs cannot be read are skipped with a warning; input order
/// is preserved for the rest. Returns the path of the written backup file,
/// named `voice-notes-backup-<epochMillis>.json`. Two exports within the
/// same millisecond collide on that name; the codec takes no precaution.
pub async fn export_backup(notes: &[VoiceNote], document_dir: &Path) -> Result<PathBuf> {
    let mut packed = BackupDocument {
        meta: BackupMeta {
            exported_at: Utc::now().to_rfc3339(),
        },
        notes: Vec::with_capacity(notes.len()),
    };

    for note in notes {
        let bytes = match tokio::fs::read(&note.audio_uri).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("export: skipping note {}: {}", note.id, e);
                continue;
            }
        };

        let ext = audio_extension(&note.audio_uri);
        packed.notes.push(BackupNoteEntry {
            id: note.id.clone(),
            name: note.name.clone(),
            date: note.date.clone(),
            duration: note.duration,
            audio_filename: format!("{}{}", note.id, ext),
            audio_base64: BASE64.encode(&bytes),
        });
    }

    let out = serde_json::to_string(&packed)
        .map_err(|e| VnotesError::Format(format!("failed to serialize backup: {}", e)))?;

    tokio::fs::create_dir_all(document_dir).await?;
    let out_path = document_dir.join(format!(
        "voice-notes-backup-{}.json",
        Utc::now().timestamp_millis()
    ));
    tokio::fs::write(&out_path, out).await?;

    tracing::info!(
        "exported {} of {} notes to {}",
        packed.notes.len(),
        notes.len(),
        out_path.display()
    );

    Ok(out_path)
}

/// Read a backup document from `path` and materialize its notes, writing
/// each audio blob into `document_dir`.
///
/// Fails up front if the file cannot be read or does not parse as a backup
/// document. Entries whose blobs cannot be written are skipped with a
/// warning; the returned notes keep the document's order. No deduplication
/// against existing ids is performed here.
pub async fn import_backup(path: &Path, document_dir: &Path) -> Result<Vec<VoiceNote>> {
    let txt = tokio::fs::read_to_string(path).await?;

    let parsed: BackupDocument = serde_json::from_str(&txt)
        .map_err(|e| VnotesError::Format(format!("not a valid backup document: {}", e)))?;

    tokio::fs::create_dir_all(document_dir).await?;

    let mut imported = Vec::with_capacity(parsed.notes.len());
    for entry in parsed.notes {
        let bytes = match BASE64.decode(entry.audio_base64.as_bytes()) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("import: skipping entry {}: bad base64: {}", entry.id, e);
                continue;
            }
        };

        let target = document_dir.join(&entry.audio_filename);
        if let Err(e) = tokio::fs::write(&target, &bytes).await {
            tracing::warn!("import: failed to restore {}: {}", entry.id, e);
            continue;
        }

        imported.push(VoiceNote {
            id: entry.id,
            name: entry.name,
            date: entry.date,
            duration: entry.duration,
            audio_uri: target.to_string_lossy().into_owned(),
        });
    }

    tracing::info!("imported {} notes from {}", imported.len(), path.display());

    Ok(imported)
}

/// Derive the audio file extension from a locator: a trailing `.<alnum>`
/// suffix, optionally followed by a `?query`, else [`DEFAULT_AUDIO_EXT`].
fn audio_extension(uri: &str) -> String {
    let base = uri.split('?').next().unwrap_or(uri);
    if let Some(dot) = base.rfind('.') {
        let ext = &base[dot + 1..];
        if !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()) {
            return format!(".{}", ext.to_ascii_lowercase());
        }
    }
    DEFAULT_AUDIO_EXT.to_string()
}

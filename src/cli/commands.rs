//! CLI command implementations

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use crate::audio::{self, PlaybackSession, RecordingSession};
use crate::backup;
use crate::cli::args::{ConfigCommand, SettingsCommand};
use crate::config::Settings;
use crate::peaks;
use crate::storage::{AppSettings, KvStore, NoteStore, RecordingQuality, VoiceNote, SETTINGS_KEY};
use crate::VnotesError;

/// Record a new voice note until Ctrl-C, then save it.
pub async fn record(settings: &Settings, name: Option<String>) -> Result<()> {
    settings.ensure_dirs()?;
    let kv = KvStore::new(settings.kv_dir());
    let prefs: AppSettings = kv.get_json(SETTINGS_KEY, AppSettings::default()).await;
    let mut store = NoteStore::load(kv).await;

    let mut session = RecordingSession::new(audio::create_capture(&settings.audio.device));
    session.start(&settings.audio_dir(), prefs.recording_quality)?;

    println!(
        "Recording ({} quality)... press Ctrl-C to stop",
        prefs.recording_quality.as_str()
    );

    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    ticker.tick().await;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = ticker.tick() => {
                if let Some(elapsed) = session.elapsed() {
                    let secs = elapsed.as_secs();
                    print!("\r  {:02}:{:02}", secs / 60, secs % 60);
                    let _ = std::io::stdout().flush();
                }
            }
        }
    }
    println!();

    let Some(stopped) = session.stop()? else {
        anyhow::bail!("Recording produced no usable audio");
    };

    let duration = stopped.elapsed.as_secs();
    let name =
        name.unwrap_or_else(|| format!("Recording {}", Local::now().format("%Y-%m-%d %H:%M")));
    let note = VoiceNote::new(
        name,
        duration,
        stopped.audio_path.to_string_lossy().into_owned(),
    );

    println!(
        "Saved: {} ({}, {})",
        note.name,
        &note.id,
        format_duration(duration)
    );

    store.add(note).await;
    Ok(())
}

/// List voice notes, optionally filtered by name.
pub async fn list(settings: &Settings, limit: usize, search: Option<String>) -> Result<()> {
    let kv = KvStore::new(settings.kv_dir());
    let store = NoteStore::load(kv).await;

    let filter = search.map(|s| s.to_lowercase());
    let notes: Vec<&VoiceNote> = store
        .notes()
        .iter()
        .filter(|n| {
            filter
                .as_deref()
                .map(|f| n.name.to_lowercase().contains(f))
                .unwrap_or(true)
        })
        .take(limit)
        .collect();

    if notes.is_empty() {
        println!("No notes found");
        return Ok(());
    }

    println!(
        "{:<15} {:<30} {:<12} {:<10}",
        "ID", "Name", "Date", "Duration"
    );
    println!("{}", "-".repeat(70));

    for note in notes {
        println!(
            "{:<15} {:<30} {:<12} {:<10}",
            note.id,
            truncate(&note.name, 28),
            format_date(&note.date),
            format_duration(note.duration)
        );
    }

    Ok(())
}

/// Play a voice note, printing the position until it finishes or Ctrl-C.
pub async fn play(
    settings: &Settings,
    id: &str,
    from: Option<u64>,
    speed: Option<f32>,
) -> Result<()> {
    let kv = KvStore::new(settings.kv_dir());
    let prefs: AppSettings = kv.get_json(SETTINGS_KEY, AppSettings::default()).await;
    let store = NoteStore::load(kv).await;

    let note = store
        .find_by_prefix(id)
        .ok_or_else(|| VnotesError::NotFound(format!("note '{}'", id)))?;

    println!("{}  {}", note.name, format_duration(note.duration));
    println!("{}", peaks::render_bars(&peaks::generate_peaks(&note.id, 40)));

    let mut session = PlaybackSession::new(audio::create_playback()?);
    let speed = speed.unwrap_or(prefs.playback_speed);
    session.load_and_play(Path::new(&note.audio_uri), speed)?;

    if let Some(from) = from {
        session.seek_to(from * 1000);
    }

    let mut ticker = tokio::time::interval(Duration::from_millis(200));
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                session.stop();
                break;
            }
            _ = ticker.tick() => {
                let status = session.status();
                if !session.is_active() {
                    break;
                }
                print!(
                    "\r  {} / {}",
                    format_duration(status.position_millis / 1000),
                    format_duration(status.duration_millis / 1000)
                );
                let _ = std::io::stdout().flush();
            }
        }
    }
    println!();

    Ok(())
}

/// Rename a voice note.
pub async fn rename(settings: &Settings, id: &str, name: &str) -> Result<()> {
    let kv = KvStore::new(settings.kv_dir());
    let mut store = NoteStore::load(kv).await;

    let note_id = store
        .find_by_prefix(id)
        .ok_or_else(|| VnotesError::NotFound(format!("note '{}'", id)))?
        .id
        .clone();

    store.rename(&note_id, name).await;
    println!("Renamed {} to: {}", note_id, name);
    Ok(())
}

/// Delete a voice note and its audio blob.
pub async fn delete(settings: &Settings, id: &str) -> Result<()> {
    let kv = KvStore::new(settings.kv_dir());
    let mut store = NoteStore::load(kv).await;

    let note_id = store
        .find_by_prefix(id)
        .ok_or_else(|| VnotesError::NotFound(format!("note '{}'", id)))?
        .id
        .clone();

    store.remove(&note_id).await;
    println!("Deleted {}", note_id);
    Ok(())
}

/// Export all notes as a single backup file.
pub async fn export(settings: &Settings, open_after: bool) -> Result<()> {
    settings.ensure_dirs()?;
    let kv = KvStore::new(settings.kv_dir());
    let store = NoteStore::load(kv).await;

    let total = store.notes().len();
    let path = backup::export_backup(store.notes(), &settings.documents_dir()).await?;

    println!("Backup written: {}", path.display());
    if total > 0 {
        println!("({} notes in library)", total);
    }

    // Hand the file to the system handler, the CLI's stand-in for a share
    // sheet. Failure here never affects the written backup.
    if open_after {
        if let Err(e) = open::that(&path) {
            tracing::warn!("could not open backup file: {}", e);
        }
    }

    Ok(())
}

/// Import notes from a backup file into the library.
pub async fn import(settings: &Settings, path: &Path) -> Result<()> {
    settings.ensure_dirs()?;
    let kv = KvStore::new(settings.kv_dir());
    let mut store = NoteStore::load(kv).await;

    let imported = backup::import_backup(path, &settings.documents_dir()).await?;
    let count = imported.len();

    for note in imported {
        store.add(note).await;
    }

    println!("Imported {} notes", count);
    Ok(())
}

/// Handle preference subcommands.
pub async fn settings_command(settings: &Settings, cmd: SettingsCommand) -> Result<()> {
    let kv = KvStore::new(settings.kv_dir());
    let mut prefs: AppSettings = kv.get_json(SETTINGS_KEY, AppSettings::default()).await;

    match cmd {
        SettingsCommand::Show => {
            println!("recording quality: {}", prefs.recording_quality.as_str());
            println!("playback speed:    {}x", prefs.playback_speed);
            println!(
                "auto backup:       {}",
                if prefs.backup_enabled { "on" } else { "off" }
            );
            return Ok(());
        }
        SettingsCommand::Quality { level } => {
            let quality = RecordingQuality::parse(&level)
                .with_context(|| format!("Unknown quality '{}'. Use low, medium, or high", level))?;
            prefs.recording_quality = quality;
            println!("recording quality set to {}", quality.as_str());
        }
        SettingsCommand::Speed { value } => {
            anyhow::ensure!(value > 0.0, "Playback speed must be positive");
            prefs.playback_speed = value;
            println!("playback speed set to {}x", value);
        }
        SettingsCommand::Backup { enabled } => {
            prefs.backup_enabled = enabled;
            println!("auto backup {}", if enabled { "enabled" } else { "disabled" });
        }
    }

    kv.set_json(SETTINGS_KEY, &prefs).await;
    Ok(())
}

/// Handle config subcommands.
pub fn config_command(settings: &Settings, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show => {
            let toml = toml::to_string_pretty(settings)?;
            println!("{}", toml);
        }
        ConfigCommand::Path => {
            let path = Settings::config_path()?;
            println!("{}", path.display());
        }
        ConfigCommand::Init { force } => {
            let path = Settings::config_path()?;
            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at {}. Use --force to overwrite.",
                    path.display()
                );
            }
            Settings::write_default(&path)?;
            println!("Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}

// Helper functions

fn format_duration(secs: u64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

fn format_date(iso: &str) -> String {
    DateTime::parse_from_rfc3339(iso)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|_| iso.chars().take(10).collect())
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len - 3).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_formats_minutes_and_hours() {
        assert_eq!(format_duration(5), "0:05");
        assert_eq!(format_duration(65), "1:05");
        assert_eq!(format_duration(3661), "1:01:01");
    }

    #[test]
    fn date_falls_back_to_prefix_on_bad_input() {
        assert_eq!(format_date("2026-08-30T10:00:00+00:00"), "2026-08-30");
        assert_eq!(format_date("not-a-date"), "not-a-date");
    }

    #[test]
    fn truncate_appends_ellipsis() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a very long note name", 10), "a very ...");
    }
}

//! NoteStore persistence scenarios

use tempfile::tempdir;

use vnotes::storage::{AppSettings, KvStore, NoteStore, RecordingQuality, VoiceNote, SETTINGS_KEY};

fn note(id: &str, name: &str, audio_uri: &str) -> VoiceNote {
    VoiceNote {
        id: id.to_string(),
        name: name.to_string(),
        date: "2026-08-30T10:00:00+00:00".to_string(),
        duration: 5,
        audio_uri: audio_uri.to_string(),
    }
}

#[tokio::test]
async fn rename_survives_store_reload() {
    let tmp = tempdir().unwrap();
    let kv = KvStore::new(tmp.path());

    let mut store = NoteStore::load(kv.clone()).await;
    store.add(note("n1", "A", "/audio/n1.wav")).await;
    assert!(store.rename("n1", "B").await);

    let reloaded = NoteStore::load(kv).await;
    let renamed = reloaded.get("n1").unwrap();
    assert_eq!(renamed.name, "B");
    assert_eq!(renamed.id, "n1");
    assert_eq!(renamed.audio_uri, "/audio/n1.wav");
}

#[tokio::test]
async fn remove_cascades_blob_and_persists() {
    let tmp = tempdir().unwrap();
    let blob = tmp.path().join("n1.wav");
    std::fs::write(&blob, b"pcm").unwrap();

    let kv = KvStore::new(tmp.path().join("kv"));
    let mut store = NoteStore::load(kv.clone()).await;
    store.add(note("n1", "A", blob.to_str().unwrap())).await;

    assert!(store.remove("n1").await);
    assert!(!blob.exists());

    let reloaded = NoteStore::load(kv).await;
    assert!(reloaded.notes().is_empty());
}

#[tokio::test]
async fn imported_notes_are_not_deduplicated() {
    // The codec leaves dedup to callers; the store likewise inserts as-is.
    let tmp = tempdir().unwrap();
    let kv = KvStore::new(tmp.path());

    let mut store = NoteStore::load(kv).await;
    store.add(note("same", "first copy", "")).await;
    store.add(note("same", "second copy", "")).await;

    assert_eq!(store.notes().len(), 2);
}

#[tokio::test]
async fn app_settings_round_trip_through_kv() {
    let tmp = tempdir().unwrap();
    let kv = KvStore::new(tmp.path());

    let prefs: AppSettings = kv.get_json(SETTINGS_KEY, AppSettings::default()).await;
    assert_eq!(prefs.recording_quality, RecordingQuality::High);

    let updated = AppSettings {
        recording_quality: RecordingQuality::Medium,
        playback_speed: 1.5,
        backup_enabled: true,
    };
    kv.set_json(SETTINGS_KEY, &updated).await;

    let reloaded: AppSettings = kv.get_json(SETTINGS_KEY, AppSettings::default()).await;
    assert_eq!(reloaded, updated);
}

/*!
 * Tests for the snapshot history and restore
 */

use subweave::history::{check_restore, restore_snapshot, RestoreCheck, SnapshotStore, WorkingSet, BACKUP_LABEL};
use subweave::subtitle::{CommentMap, SpeakerProfile};

use crate::common;

fn working_set(file_id: &str) -> WorkingSet {
    let mut comments = CommentMap::new();
    comments.insert("s1".to_string(), "check the comma".to_string());
    WorkingSet {
        subtitles: common::sample_subtitles(),
        comments,
        speaker_profiles: vec![SpeakerProfile {
            id: "spk1".to_string(),
            name: "Narrator".to_string(),
            color: Some("#ff0000".to_string()),
        }],
        file_id: Some(file_id.to_string()),
        file_name: Some(format!("{}.mkv", file_id)),
    }
}

fn capture(store: &mut SnapshotStore, description: &str, working: &WorkingSet) -> String {
    store.create_snapshot(
        description,
        &working.subtitles,
        &working.comments,
        working.file_id.as_deref(),
        working.file_name.as_deref(),
        &working.speaker_profiles,
    )
}

#[test]
fn test_history_25Snapshots_shouldKeepNewest20() {
    let mut store = SnapshotStore::new();
    let working = working_set("episode1");
    let ids: Vec<String> = (0..25).map(|n| capture(&mut store, &format!("v{}", n), &working)).collect();

    assert_eq!(store.len(), 20);
    assert_eq!(store.latest().map(|s| s.id.clone()), Some(ids[24].clone()));
    for evicted in &ids[..5] {
        assert!(store.get(evicted).is_none());
    }
    let order: Vec<String> = store.iter().map(|s| s.id.clone()).collect();
    let expected: Vec<String> = ids[5..].iter().rev().cloned().collect();
    assert_eq!(order, expected);
}

#[test]
fn test_history_customCapacity_shouldBound() {
    let mut store = SnapshotStore::with_capacity(3);
    let working = working_set("episode1");
    for n in 0..5 {
        capture(&mut store, &format!("v{}", n), &working);
    }
    assert_eq!(store.len(), 3);
    assert_eq!(store.capacity(), 3);
}

#[test]
fn test_restore_nonEmptyWorkingSet_shouldBackupExactlyOnce() {
    let mut store = SnapshotStore::new();
    let saved = working_set("episode1");
    let target = capture(&mut store, "before edits", &saved);

    let mut working = working_set("episode1");
    working.subtitles[0].translated = "你好，世界".to_string();
    working.comments.clear();

    let before = store.len();
    let outcome = restore_snapshot(&mut store, &mut working, &target).unwrap();

    assert_eq!(store.len(), before + 1);
    let backup = store.get(outcome.backup_id.as_deref().unwrap()).unwrap();
    assert_eq!(backup.description, BACKUP_LABEL);
    assert_eq!(backup.subtitles[0].translated, "你好，世界");
    assert_eq!(backup.file_id.as_deref(), Some("episode1"));

    assert_eq!(working.subtitles, saved.subtitles);
    assert_eq!(working.comments, saved.comments);
    assert_eq!(working.speaker_profiles, saved.speaker_profiles);
}

#[test]
fn test_restore_emptyWorkingSet_shouldNotBackup() {
    let mut store = SnapshotStore::new();
    let target = capture(&mut store, "saved", &working_set("episode1"));
    let mut working = WorkingSet::default();

    let outcome = restore_snapshot(&mut store, &mut working, &target).unwrap();

    assert!(outcome.backup_id.is_none());
    assert_eq!(store.len(), 1);
    assert_eq!(working.subtitles.len(), 4);
}

#[test]
fn test_restore_crossFile_shouldBeFlaggedNotBlocked() {
    let mut store = SnapshotStore::new();
    let target = capture(&mut store, "other episode", &working_set("episode2"));
    let mut working = working_set("episode1");

    assert!(matches!(
        check_restore(&store, &working, &target),
        RestoreCheck::CrossFile { snapshot_file_name: Some(ref name) } if name == "episode2.mkv"
    ));

    let outcome = restore_snapshot(&mut store, &mut working, &target).unwrap();
    assert!(outcome.cross_file);
    assert!(outcome.backup_id.is_some());
}

#[test]
fn test_snapshot_laterEdits_shouldNotLeakIntoHistory() {
    let mut store = SnapshotStore::new();
    let mut working = working_set("episode1");
    let id = capture(&mut store, "checkpoint", &working);

    working.subtitles.clear();
    working.speaker_profiles[0].name = "Changed".to_string();

    let snapshot = store.get(&id).unwrap();
    assert_eq!(snapshot.subtitles.len(), 4);
    assert_eq!(snapshot.speaker_profiles[0].name, "Narrator");
    assert_eq!(check_restore(&store, &working, &id), RestoreCheck::Ready);
}

/*!
 * Restoring a snapshot into the live working set.
 *
 * A non-empty working set is backed up first. Restores from a snapshot
 * of another file go ahead but are flagged so callers can confirm.
 */

use log::{debug, info};

use crate::errors::SnapshotError;
use crate::subtitle::{profiles_from_subtitles, CommentMap, SpeakerProfile, SubtitleItem};

use super::SnapshotStore;

/// Description given to the automatic pre-restore backup
pub const BACKUP_LABEL: &str = "Backup before restore";

/// The live state being edited
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkingSet {
    pub subtitles: Vec<SubtitleItem>,
    pub comments: CommentMap,
    pub speaker_profiles: Vec<SpeakerProfile>,
    pub file_id: Option<String>,
    pub file_name: Option<String>,
}

impl WorkingSet {
    /// Nothing worth backing up
    pub fn is_empty(&self) -> bool {
        self.subtitles.is_empty()
    }
}

/// What a completed restore did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreOutcome {
    /// Backup snapshot taken first, if the working set had content
    pub backup_id: Option<String>,

    /// The snapshot came from a different file than the working set
    pub cross_file: bool,
}

/// Pre-flight answer for a restore request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreCheck {
    /// Same file, or no file context to compare
    Ready,
    /// The snapshot belongs to another file; confirm before restoring
    CrossFile {
        snapshot_file_name: Option<String>,
    },
    /// No snapshot with that id
    NotFound,
}

fn is_cross_file(working: &WorkingSet, snapshot_file_id: Option<&str>) -> bool {
    match (working.file_id.as_deref(), snapshot_file_id) {
        (Some(current), Some(origin)) => current != origin,
        _ => false,
    }
}

/// Classify a restore before performing it
pub fn check_restore(store: &SnapshotStore, working: &WorkingSet, snapshot_id: &str) -> RestoreCheck {
    match store.get(snapshot_id) {
        None => RestoreCheck::NotFound,
        Some(snapshot) if is_cross_file(working, snapshot.file_id.as_deref()) => RestoreCheck::CrossFile {
            snapshot_file_name: snapshot.file_name.clone(),
        },
        Some(_) => RestoreCheck::Ready,
    }
}

/// Replace the working set with a stored snapshot.
///
/// A non-empty working set is first captured as a [`BACKUP_LABEL`]
/// snapshot with its current file context. Speaker profiles come from the
/// snapshot, or are rebuilt from the restored speaker tags when the
/// snapshot saved none. A working set without file context adopts the
/// snapshot's.
pub fn restore_snapshot(
    store: &mut SnapshotStore,
    working: &mut WorkingSet,
    snapshot_id: &str,
) -> Result<RestoreOutcome, SnapshotError> {
    let target = store
        .get(snapshot_id)
        .cloned()
        .ok_or_else(|| SnapshotError::NotFound(snapshot_id.to_string()))?;

    let cross_file = is_cross_file(working, target.file_id.as_deref());

    let backup_id = if working.is_empty() {
        None
    } else {
        let id = store.create_snapshot(
            BACKUP_LABEL,
            &working.subtitles,
            &working.comments,
            working.file_id.as_deref(),
            working.file_name.as_deref(),
            &working.speaker_profiles,
        );
        debug!("Created backup snapshot {} before restore", id);
        Some(id)
    };

    working.speaker_profiles = if target.speaker_profiles.is_empty() {
        profiles_from_subtitles(&target.subtitles)
    } else {
        target.speaker_profiles
    };
    working.subtitles = target.subtitles;
    working.comments = target.comments;
    if working.file_id.is_none() {
        working.file_id = target.file_id;
        working.file_name = target.file_name;
    }

    info!(
        "Restored snapshot '{}' ({} subtitles{})",
        target.description,
        working.subtitles.len(),
        if cross_file { ", from another file" } else { "" }
    );

    Ok(RestoreOutcome { backup_id, cross_file })
}

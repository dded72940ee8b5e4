/*!
 * Version history for the working subtitle set.
 *
 * - `SnapshotStore`: bounded, most-recent-first list of snapshots
 * - `restore`: restore-with-backup into a `WorkingSet`
 *
 * Snapshots own full copies of everything they capture; editing the
 * working set never reaches back into the history.
 */

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::subtitle::{short_id, CommentMap, SpeakerProfile, SubtitleItem};

pub mod restore;

pub use restore::{check_restore, restore_snapshot, RestoreCheck, RestoreOutcome, WorkingSet, BACKUP_LABEL};

/// Snapshots kept before the oldest is evicted
pub const DEFAULT_SNAPSHOT_CAPACITY: usize = 20;

/// A captured subtitle set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubtitleSnapshot {
    /// Unique identifier
    pub id: String,

    /// Capture time
    pub created_at: DateTime<Utc>,

    /// Human-readable label
    pub description: String,

    pub subtitles: Vec<SubtitleItem>,

    pub comments: CommentMap,

    pub speaker_profiles: Vec<SpeakerProfile>,

    /// Identifier of the file the set came from
    pub file_id: Option<String>,

    /// Display name of that file
    pub file_name: Option<String>,
}

/// Bounded snapshot history, most recent first
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    history: VecDeque<SubtitleSnapshot>,
    capacity: usize,
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotStore {
    /// Store holding up to [`DEFAULT_SNAPSHOT_CAPACITY`] snapshots
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_SNAPSHOT_CAPACITY)
    }

    /// Store holding up to `capacity` snapshots (at least one)
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            history: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Capture a copy of the given state and return the new snapshot's id.
    ///
    /// The oldest snapshot is evicted once the store is over capacity.
    pub fn create_snapshot(
        &mut self,
        description: &str,
        subtitles: &[SubtitleItem],
        comments: &CommentMap,
        file_id: Option<&str>,
        file_name: Option<&str>,
        speaker_profiles: &[SpeakerProfile],
    ) -> String {
        let snapshot = SubtitleSnapshot {
            id: format!("snapshot-{}", short_id()),
            created_at: Utc::now(),
            description: description.to_string(),
            subtitles: subtitles.to_vec(),
            comments: comments.clone(),
            speaker_profiles: speaker_profiles.to_vec(),
            file_id: file_id.map(str::to_string),
            file_name: file_name.map(str::to_string),
        };
        let id = snapshot.id.clone();

        self.history.push_front(snapshot);
        while self.history.len() > self.capacity {
            if let Some(evicted) = self.history.pop_back() {
                debug!("Evicted snapshot {} ({})", evicted.id, evicted.description);
            }
        }

        id
    }

    /// Drop every snapshot
    pub fn clear(&mut self) {
        self.history.clear();
    }

    /// Snapshot with the given id
    pub fn get(&self, id: &str) -> Option<&SubtitleSnapshot> {
        self.history.iter().find(|s| s.id == id)
    }

    /// Most recently created snapshot
    pub fn latest(&self) -> Option<&SubtitleSnapshot> {
        self.history.front()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Snapshots, most recent first
    pub fn iter(&self) -> impl Iterator<Item = &SubtitleSnapshot> {
        self.history.iter()
    }
}

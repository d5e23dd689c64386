//! Durable per-destination ledger of posting attempts.
//!
//! The on-disk shape is a JSON object mapping destination id to an ordered
//! list of `{content_id, timestamp, success}` records. Keys starting with `_`
//! hold free-form metadata and are carried through untouched.
//!
//! Reads never fail: a corrupt primary file falls back to the `.bak` copy,
//! and if that is unusable too the store starts empty. Writes go through a
//! same-directory tempfile and an atomic rename, refreshing the backup from
//! the primary first when the primary is still valid.

use crate::error::Result;
use crate::io;
use crate::types::{FailurePolicy, Outcome};
use chrono::NaiveDateTime;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

/// Returned by [`HistoryStore::days_since_last_action`] when a destination has
/// never been posted to.
pub const NEVER_POSTED_DAYS: i64 = 999;

// ---------------------------------------------------------------------------
// HistoryEntry / History
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(alias = "post_id")]
    pub content_id: String,
    pub timestamp: NaiveDateTime,
    pub success: bool,
}

impl HistoryEntry {
    pub fn outcome(&self) -> Outcome {
        Outcome::from_success(self.success)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "BTreeMap<String, serde_json::Value>")]
pub struct History {
    destinations: BTreeMap<String, Vec<HistoryEntry>>,
    metadata: BTreeMap<String, serde_json::Value>,
}

impl TryFrom<BTreeMap<String, serde_json::Value>> for History {
    type Error = serde_json::Error;

    fn try_from(raw: BTreeMap<String, serde_json::Value>) -> std::result::Result<Self, Self::Error> {
        let mut history = History::default();
        for (key, value) in raw {
            if key.starts_with('_') {
                history.metadata.insert(key, value);
            } else {
                let entries: Vec<HistoryEntry> = serde_json::from_value(value)?;
                history.destinations.insert(key, entries);
            }
        }
        Ok(history)
    }
}

impl Serialize for History {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map =
            serializer.serialize_map(Some(self.metadata.len() + self.destinations.len()))?;
        for (key, value) in &self.metadata {
            map.serialize_entry(key, value)?;
        }
        for (key, entries) in &self.destinations {
            map.serialize_entry(key, entries)?;
        }
        map.end()
    }
}

impl History {
    pub fn entries(&self, destination_id: &str) -> &[HistoryEntry] {
        self.destinations
            .get(destination_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn push(&mut self, destination_id: &str, entry: HistoryEntry) {
        self.destinations
            .entry(destination_id.to_string())
            .or_default()
            .push(entry);
    }

    /// Destination ids with at least one entry, with their entries.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[HistoryEntry])> {
        self.destinations
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn metadata(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.metadata
    }

    pub fn is_empty(&self) -> bool {
        self.destinations.values().all(|v| v.is_empty())
    }
}

// ---------------------------------------------------------------------------
// HistoryStore
// ---------------------------------------------------------------------------

/// Which file the in-memory history came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Primary,
    Backup,
    Empty,
}

#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
    history: History,
    policy: FailurePolicy,
    source: LoadSource,
}

fn read_history(path: &Path) -> Result<History> {
    let data = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

impl HistoryStore {
    /// An empty store that will persist to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            history: History::default(),
            policy: FailurePolicy::default(),
            source: LoadSource::Empty,
        }
    }

    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let backup = io::backup_path(&path);

        if path.exists() {
            match read_history(&path) {
                Ok(history) => {
                    return Self {
                        history,
                        source: LoadSource::Primary,
                        ..Self::new(path)
                    }
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "history unreadable, trying backup");
                }
            }
        }

        if backup.exists() {
            match read_history(&backup) {
                Ok(history) => {
                    tracing::warn!(path = %backup.display(), "history restored from backup");
                    return Self {
                        history,
                        source: LoadSource::Backup,
                        ..Self::new(path)
                    };
                }
                Err(e) => {
                    tracing::warn!(path = %backup.display(), error = %e, "history backup unreadable");
                }
            }
        }

        if path.exists() || backup.exists() {
            tracing::warn!(path = %path.display(), "starting with empty history");
        }
        Self::new(path)
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    pub fn source(&self) -> LoadSource {
        self.source
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn entries(&self, destination_id: &str) -> &[HistoryEntry] {
        self.history.entries(destination_id)
    }

    /// Record an attempt and persist immediately.
    pub fn append(
        &mut self,
        destination_id: &str,
        content_id: &str,
        outcome: Outcome,
        timestamp: NaiveDateTime,
    ) -> Result<()> {
        self.history.push(
            destination_id,
            HistoryEntry {
                content_id: content_id.to_string(),
                timestamp,
                success: outcome.is_success(),
            },
        );
        self.save()
    }

    pub fn save(&self) -> Result<()> {
        let data = serde_json::to_string_pretty(&self.history)?;
        io::atomic_write_with_backup(&self.path, data.as_bytes(), |current| {
            serde_json::from_slice::<History>(current).is_ok()
        })
    }

    /// Content ids that may no longer be offered to this destination.
    pub fn used_content(&self, destination_id: &str) -> HashSet<&str> {
        let policy = self.policy;
        self.history
            .entries(destination_id)
            .iter()
            .filter(|e| policy.counts(e.success))
            .map(|e| e.content_id.as_str())
            .collect()
    }

    /// Most recent attempt of either outcome.
    pub fn last_action(&self, destination_id: &str) -> Option<&HistoryEntry> {
        self.history
            .entries(destination_id)
            .iter()
            .max_by_key(|e| e.timestamp)
    }

    /// Whole days between the most recent recorded action and `now`, or
    /// [`NEVER_POSTED_DAYS`]. Failed attempts count whatever the policy.
    pub fn days_since_last_action(&self, destination_id: &str, now: NaiveDateTime) -> i64 {
        match self.last_action(destination_id) {
            Some(last) => (now - last.timestamp).num_days(),
            None => NEVER_POSTED_DAYS,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

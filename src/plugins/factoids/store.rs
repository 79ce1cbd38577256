//! Factoid snapshot with atomic JSON persistence.
//!
//! The canonical file is never written in place: a full snapshot goes to
//! `<file>.tmp`, is synced, then renamed over `<file>`. A crash at any point
//! leaves either the old or the new snapshot on disk, never a mix.

use crate::error::StoreError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// A stored factoid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FactoidValue {
    Counter(i64),
    List(Vec<String>),
}

impl FactoidValue {
    fn kind(&self) -> &'static str {
        match self {
            Self::Counter(_) => "counter",
            Self::List(_) => "list",
        }
    }
}

/// Key to value mapping, ordered for stable output.
pub type Snapshot = BTreeMap<String, FactoidValue>;

/// Whether `key` is a single non-empty token.
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty() && !key.chars().any(char::is_whitespace)
}

/// In-memory factoids backed by a JSON file.
#[derive(Debug)]
pub struct FactoidStore {
    path: PathBuf,
    entries: Snapshot,
}

impl FactoidStore {
    /// Open the store at `path`, starting empty if the file is missing or
    /// unreadable.
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = load_or_empty(&path).await;
        info!(path = %path.display(), factoids = entries.len(), "Factoid store opened");
        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&FactoidValue> {
        self.entries.get(key)
    }

    /// Keys containing `term`, or whose list entries contain it.
    pub fn search(&self, term: &str) -> Vec<&str> {
        let term = term.to_lowercase();
        self.entries
            .iter()
            .filter(|(key, value)| {
                key.to_lowercase().contains(&term)
                    || matches!(value, FactoidValue::List(items)
                        if items.iter().any(|item| item.to_lowercase().contains(&term)))
            })
            .map(|(key, _)| key.as_str())
            .collect()
    }

    /// Replace `key` with a single-entry list.
    pub async fn set(&mut self, key: &str, text: &str) -> Result<(), StoreError> {
        let previous = self
            .entries
            .insert(key.to_string(), FactoidValue::List(vec![text.to_string()]));
        self.commit(key, previous).await
    }

    /// Append to the list at `key`, creating it if needed. Returns the new
    /// list length.
    pub async fn append(&mut self, key: &str, text: &str) -> Result<usize, StoreError> {
        let previous = self.entries.get(key).cloned();
        let len = match self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| FactoidValue::List(Vec::new()))
        {
            FactoidValue::List(items) => {
                items.push(text.to_string());
                items.len()
            }
            other => return Err(wrong_type(key, other, "list")),
        };
        self.commit(key, previous).await?;
        Ok(len)
    }

    /// Add `delta` to the counter at `key`, starting from zero. Returns the
    /// new value.
    pub async fn increment(&mut self, key: &str, delta: i64) -> Result<i64, StoreError> {
        let previous = self.entries.get(key).cloned();
        let value = match self
            .entries
            .entry(key.to_string())
            .or_insert(FactoidValue::Counter(0))
        {
            FactoidValue::Counter(n) => {
                *n = n.saturating_add(delta);
                *n
            }
            other => return Err(wrong_type(key, other, "counter")),
        };
        self.commit(key, previous).await?;
        Ok(value)
    }

    pub async fn decrement(&mut self, key: &str) -> Result<i64, StoreError> {
        self.increment(key, -1).await
    }

    /// Remove `key`, returning what it held.
    pub async fn forget(&mut self, key: &str) -> Result<FactoidValue, StoreError> {
        let removed = self
            .entries
            .remove(key)
            .ok_or_else(|| StoreError::NotFound(key.to_string()))?;
        self.commit(key, Some(removed.clone())).await?;
        Ok(removed)
    }

    /// Discard in-memory state and re-read the canonical file.
    pub async fn reload(&mut self) -> usize {
        self.entries = load_or_empty(&self.path).await;
        self.entries.len()
    }

    /// Save after changing `key`. If the write fails, `key` goes back to
    /// `previous` so memory never runs ahead of the file.
    async fn commit(&mut self, key: &str, previous: Option<FactoidValue>) -> Result<(), StoreError> {
        let Err(e) = self.save().await else {
            return Ok(());
        };
        warn!(path = %self.path.display(), %key, error = %e, "Save failed, change rolled back");
        match previous {
            Some(value) => self.entries.insert(key.to_string(), value),
            None => self.entries.remove(key),
        };
        Err(e)
    }

    /// Persist the snapshot atomically.
    pub async fn save(&self) -> Result<(), StoreError> {
        write_atomic(&self.path, &self.entries).await?;
        debug!(path = %self.path.display(), factoids = self.entries.len(), "Factoids saved");
        Ok(())
    }
}

fn wrong_type(key: &str, found: &FactoidValue, expected: &'static str) -> StoreError {
    debug!(%key, found = found.kind(), expected, "Factoid type mismatch");
    StoreError::WrongType {
        key: key.to_string(),
        expected,
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Read a snapshot file.
pub async fn load(path: &Path) -> Result<Snapshot, StoreError> {
    let bytes = tokio::fs::read(path).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

async fn load_or_empty(path: &Path) -> Snapshot {
    match load(path).await {
        Ok(entries) => entries,
        Err(StoreError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Snapshot::new(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Unreadable factoid file, starting empty");
            Snapshot::new()
        }
    }
}

/// Write `entries` to `<path>.tmp`, sync it, then rename over `path`.
pub async fn write_atomic(path: &Path, entries: &Snapshot) -> Result<(), StoreError> {
    let json = serde_json::to_vec_pretty(entries)?;
    let temp = temp_path(path);

    let mut file = tokio::fs::File::create(&temp).await?;
    file.write_all(&json).await?;
    file.sync_all().await?;
    drop(file);

    tokio::fs::rename(&temp, path).await?;
    Ok(())
}

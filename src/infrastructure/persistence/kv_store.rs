//! Lock-guarded in-process link map with JSON snapshot files.
//!
//! The store is durable only through explicit snapshots: [`KvStore::load_from_file`]
//! at startup and [`KvStore::save_to_file`] once at shutdown. The snapshot is a
//! flat JSON object mapping short ID to original URL of the active links.
//! Owners live in memory only, and tombstoned links are not persisted, so a
//! deleted link stays unreachable after a restart.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use parking_lot::RwLock;

use crate::domain::entities::{LinkRecord, LinkStats, NewLink};
use crate::domain::error::StoreError;

#[derive(Debug, Clone)]
struct Entry {
    url: String,
    owner: String,
    deleted: bool,
}

impl Entry {
    fn anonymous(url: String) -> Self {
        Self {
            url,
            owner: String::new(),
            deleted: false,
        }
    }

    fn to_record(&self, short_id: &str) -> LinkRecord {
        LinkRecord {
            short_id: short_id.to_string(),
            original_url: self.url.clone(),
            owner_id: self.owner.clone(),
            deleted: self.deleted,
        }
    }
}

/// Thread-safe short ID to URL map.
///
/// All access goes through the accessor methods; the map itself is never
/// handed out. Locks are held only for the duration of a call and never
/// across an `.await`.
#[derive(Debug, Default)]
pub struct KvStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl KvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites `id` with an anonymous, active entry.
    pub fn set(&self, id: impl Into<String>, url: impl Into<String>) {
        self.entries
            .write()
            .insert(id.into(), Entry::anonymous(url.into()));
    }

    /// Returns the URL stored under `id`, tombstoned or not.
    pub fn get(&self, id: &str) -> Option<String> {
        self.entries.read().get(id).map(|e| e.url.clone())
    }

    /// Returns a point-in-time copy of the id → url mapping.
    pub fn snapshot(&self) -> HashMap<String, String> {
        self.entries
            .read()
            .iter()
            .map(|(id, e)| (id.clone(), e.url.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Merges a JSON snapshot into the store.
    ///
    /// A missing file leaves the store as it is. Entries from the file
    /// overwrite entries with the same ID.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Snapshot`] if the file cannot be read or is not a
    /// JSON object of strings.
    pub fn load_from_file(&self, path: impl AsRef<Path>) -> Result<usize, StoreError> {
        let path = path.as_ref();

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!("Snapshot {} not found, starting empty", path.display());
                return Ok(0);
            }
            Err(e) => {
                return Err(StoreError::Snapshot(format!(
                    "failed to read {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let loaded: HashMap<String, String> = serde_json::from_str(&content).map_err(|e| {
            StoreError::Snapshot(format!("failed to parse {}: {}", path.display(), e))
        })?;

        let count = loaded.len();
        let mut entries = self.entries.write();
        for (id, url) in loaded {
            entries.insert(id, Entry::anonymous(url));
        }

        tracing::info!("Loaded {} links from {}", count, path.display());
        Ok(count)
    }

    /// Writes the id → url mapping of active entries to `path` as pretty JSON,
    /// creating parent directories as needed. Returns the number of entries
    /// written.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Snapshot`] on I/O or encoding failure.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<usize, StoreError> {
        let path = path.as_ref();
        let snapshot: HashMap<String, String> = self
            .entries
            .read()
            .iter()
            .filter(|(_, e)| !e.deleted)
            .map(|(id, e)| (id.clone(), e.url.clone()))
            .collect();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                StoreError::Snapshot(format!("failed to create {}: {}", parent.display(), e))
            })?;
        }

        let json = serde_json::to_string_pretty(&snapshot)
            .map_err(|e| StoreError::Snapshot(format!("failed to encode snapshot: {}", e)))?;

        fs::write(path, json).map_err(|e| {
            StoreError::Snapshot(format!("failed to write {}: {}", path.display(), e))
        })?;

        Ok(snapshot.len())
    }

    /// Inserts a new owned record unless an active record already holds the
    /// same URL.
    ///
    /// A short ID collision overwrites the previous entry; at the generated ID
    /// length the probability is negligible.
    pub fn insert_unique(&self, new_link: NewLink) -> Result<(), StoreError> {
        let mut entries = self.entries.write();

        if entries
            .values()
            .any(|e| !e.deleted && e.url == new_link.original_url)
        {
            return Err(StoreError::DuplicateUrl);
        }

        entries.insert(
            new_link.short_id,
            Entry {
                url: new_link.original_url,
                owner: new_link.owner_id,
                deleted: false,
            },
        );
        Ok(())
    }

    pub fn record(&self, id: &str) -> Option<LinkRecord> {
        self.entries.read().get(id).map(|e| e.to_record(id))
    }

    /// Finds the ID of the active record holding `url`.
    pub fn find_id_by_url(&self, url: &str) -> Option<String> {
        self.entries
            .read()
            .iter()
            .find(|(_, e)| !e.deleted && e.url == url)
            .map(|(id, _)| id.clone())
    }

    /// Active records owned by `owner`, ordered by short ID.
    pub fn list_by_owner(&self, owner: &str) -> Vec<LinkRecord> {
        let mut records: Vec<LinkRecord> = self
            .entries
            .read()
            .iter()
            .filter(|(_, e)| !e.deleted && e.owner == owner)
            .map(|(id, e)| e.to_record(id))
            .collect();

        records.sort_by(|a, b| a.short_id.cmp(&b.short_id));
        records
    }

    /// Tombstones the listed IDs that belong to `owner`. Returns how many
    /// records changed.
    pub fn mark_deleted(&self, ids: &[String], owner: &str) -> u64 {
        let mut entries = self.entries.write();
        let mut marked = 0;

        for id in ids {
            if let Some(entry) = entries.get_mut(id)
                && entry.owner == owner
                && !entry.deleted
            {
                entry.deleted = true;
                marked += 1;
            }
        }

        marked
    }

    /// Counts active records and the distinct owners among them. Entries
    /// restored from a snapshot have no owner and add no user.
    pub fn count_active(&self) -> LinkStats {
        let entries = self.entries.read();
        let mut owners = HashSet::new();
        let mut urls = 0i64;

        for entry in entries.values().filter(|e| !e.deleted) {
            urls += 1;
            if !entry.owner.is_empty() {
                owners.insert(entry.owner.as_str());
            }
        }

        LinkStats {
            urls,
            users: owners.len() as i64,
        }
    }
}

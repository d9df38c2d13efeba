//! KvStore implementation
//!
//! The durable ordered map the catalog is built on. Every mutation is
//! appended to the WAL before the in-memory table changes, so anything
//! acknowledged before a crash is readable after restart.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::Result;
use crate::wal::{Operation, WalRecovery, WalWriter};

use super::snapshot;

/// Durable ordered key→value store
///
/// ## Open sequence
/// 1. Load the snapshot, if one exists
/// 2. Replay the WAL over it (recovery truncates any corrupt tail)
/// 3. If anything was replayed, write a fresh snapshot and truncate the WAL
/// 4. Ready to serve
///
/// ## Write path
/// WAL append → in-memory table → compact once the WAL grows past the
/// configured threshold (snapshot + truncate).
///
/// All methods take `&self`/`&mut self` directly; callers serialize access
/// (one completed operation happens-before the next).
pub struct KvStore {
    /// In-memory table; ascending key order is the iteration contract
    data: BTreeMap<String, Vec<u8>>,

    /// Write-ahead log for durability
    wal: WalWriter,

    /// Snapshot file path ({data_dir}/catalog.snap)
    snapshot_path: PathBuf,

    /// WAL entries accumulated since the last snapshot
    wal_entries: u64,

    /// Compact once `wal_entries` reaches this
    compact_threshold: u64,
}

impl KvStore {
    const WAL_FILENAME: &'static str = "wal.log";
    const SNAPSHOT_FILENAME: &'static str = "catalog.snap";

    /// Open or create a store with the given config
    pub fn open(config: &Config) -> Result<Self> {
        fs::create_dir_all(&config.data_dir)?;

        let snapshot_path = config.data_dir.join(Self::SNAPSHOT_FILENAME);
        let wal_path = config.data_dir.join(Self::WAL_FILENAME);

        // Step 1: Load snapshot if present
        let mut data = if snapshot_path.exists() {
            snapshot::read_snapshot(&snapshot_path)?
        } else {
            BTreeMap::new()
        };

        // Step 2: Replay WAL over the snapshot
        let mut replayed = 0u64;
        if wal_path.exists() {
            let (entries, recovery) = WalRecovery::recover(&wal_path)?;

            if recovery.entries_recovered > 0 || recovery.entries_corrupted > 0 {
                tracing::info!(
                    "WAL recovery: {} entries recovered, {} corrupted, last_lsn={}",
                    recovery.entries_recovered,
                    recovery.entries_corrupted,
                    recovery.last_lsn
                );
            }

            for entry in entries {
                match entry.operation {
                    Operation::Insert { key, value } => {
                        data.insert(key, value);
                    }
                    Operation::Remove { key } => {
                        data.remove(&key);
                    }
                }
                replayed += 1;
            }
        }

        let mut wal = WalWriter::open(&wal_path, config.wal_sync_strategy)?;

        // Step 3: Make replayed data durable in the snapshot, then the WAL
        // can start empty. If we crash between the two steps the WAL merely
        // replays over an already-complete snapshot, which is idempotent.
        if replayed > 0 {
            tracing::info!("Flushing {} recovered entries to snapshot", replayed);
            snapshot::write_snapshot(&snapshot_path, &data)?;
            wal.truncate()?;
        }

        Ok(Self {
            data,
            wal,
            snapshot_path,
            wal_entries: 0,
            compact_threshold: config.wal_compact_threshold,
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory.
    pub fn open_path(path: &Path) -> Result<Self> {
        let config = Config::builder().data_dir(path).build();
        Self::open(&config)
    }

    /// Get a value by key (no side effects)
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.data.get(key).cloned()
    }

    /// Insert or overwrite a key; returns the previous value if any
    pub fn insert(&mut self, key: String, value: Vec<u8>) -> Result<Option<Vec<u8>>> {
        self.wal.append(Operation::Insert {
            key: key.clone(),
            value: value.clone(),
        })?;

        let previous = self.data.insert(key, value);
        self.wal_entries += 1;
        self.maybe_compact()?;

        Ok(previous)
    }

    /// Remove a key; returns the removed value, or `None` if absent
    ///
    /// Removing an absent key is not logged.
    pub fn remove(&mut self, key: &str) -> Result<Option<Vec<u8>>> {
        if !self.data.contains_key(key) {
            return Ok(None);
        }

        self.wal.append(Operation::Remove {
            key: key.to_string(),
        })?;

        let removed = self.data.remove(key);
        self.wal_entries += 1;
        self.maybe_compact()?;

        Ok(removed)
    }

    /// All stored values, in ascending key order
    pub fn values(&self) -> Vec<Vec<u8>> {
        self.data.values().cloned().collect()
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the store holds no records
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Write a snapshot and truncate the WAL
    ///
    /// Forces a compaction regardless of the WAL entry count.
    pub fn compact(&mut self) -> Result<()> {
        snapshot::write_snapshot(&self.snapshot_path, &self.data)?;
        self.wal.truncate()?;
        self.wal_entries = 0;
        Ok(())
    }

    /// Close the store gracefully, syncing the WAL to disk
    pub fn close(mut self) -> Result<()> {
        self.wal.sync()
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// WAL entries accumulated since the last snapshot
    pub fn wal_entry_count(&self) -> u64 {
        self.wal_entries
    }

    /// Whether a snapshot file exists on disk
    pub fn has_snapshot(&self) -> bool {
        self.snapshot_path.exists()
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn maybe_compact(&mut self) -> Result<()> {
        if self.wal_entries >= self.compact_threshold {
            tracing::debug!("WAL reached {} entries, compacting", self.wal_entries);
            self.compact()?;
        }
        Ok(())
    }
}

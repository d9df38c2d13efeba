//! WAL Writer
//!
//! Handles appending entries to the WAL file.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use crate::config::WalSyncStrategy;
use crate::error::{Result, VaultError};

use super::entry::{Operation, WalEntry};
use super::reader::WalReader;

/// Appends entries to the WAL file
pub struct WalWriter {
    file: File,

    /// LSN to assign to the next appended entry (starts at 1)
    next_lsn: u64,

    sync_strategy: WalSyncStrategy,

    /// Entries appended since the last fsync
    uncommitted: usize,
}

impl WalWriter {
    /// Open or create a WAL file for appending
    ///
    /// If the file already holds entries, the next LSN continues after the
    /// last valid one. A corrupt tail is left in place here; recovery is
    /// responsible for truncating it before the writer is reopened.
    pub fn open(path: &Path, sync_strategy: WalSyncStrategy) -> Result<Self> {
        let next_lsn = if path.exists() {
            Self::scan_last_lsn(path)? + 1
        } else {
            1
        };

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            file,
            next_lsn,
            sync_strategy,
            uncommitted: 0,
        })
    }

    /// Append an operation; returns the LSN it was assigned
    pub fn append(&mut self, operation: Operation) -> Result<u64> {
        let lsn = self.next_lsn;
        let entry = WalEntry::new(lsn, operation);
        let frame = entry.encode()?;

        self.file
            .write_all(&frame)
            .map_err(|e| VaultError::WalWrite(format!("append failed at LSN {}: {}", lsn, e)))?;

        self.next_lsn += 1;
        self.uncommitted += 1;

        match self.sync_strategy {
            WalSyncStrategy::EveryWrite => self.sync()?,
            WalSyncStrategy::EveryNEntries { count } => {
                if self.uncommitted >= count {
                    self.sync()?;
                }
            }
        }

        Ok(lsn)
    }

    /// Force an fsync of everything appended so far
    pub fn sync(&mut self) -> Result<()> {
        self.file.sync_all()?;
        self.uncommitted = 0;
        Ok(())
    }

    /// Discard all entries (called after a snapshot makes them redundant)
    pub fn truncate(&mut self) -> Result<()> {
        self.file.set_len(0)?;
        self.file.sync_all()?;
        self.next_lsn = 1;
        self.uncommitted = 0;
        Ok(())
    }

    /// LSN the next appended entry will receive
    pub fn current_lsn(&self) -> u64 {
        self.next_lsn
    }

    /// Entries appended since the last fsync
    pub fn uncommitted_count(&self) -> usize {
        self.uncommitted
    }

    /// Scan an existing file for the highest valid LSN (0 if empty)
    fn scan_last_lsn(path: &Path) -> Result<u64> {
        let mut reader = WalReader::open(path)?;
        let mut last = 0;
        loop {
            match reader.next_entry() {
                Ok(Some(entry)) => last = entry.lsn,
                // Stop at the corrupt tail; recovery deals with it
                Ok(None) | Err(VaultError::WalCorruption(_)) => break,
                Err(e) => return Err(e),
            }
        }
        Ok(last)
    }
}

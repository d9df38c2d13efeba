//! WAL Recovery
//!
//! Replays the WAL after a crash, discarding any corrupt or partial tail.

use std::fs::OpenOptions;
use std::path::Path;

use crate::error::{Result, VaultError};

use super::entry::WalEntry;
use super::reader::WalReader;

/// Handles WAL recovery after a crash
pub struct WalRecovery;

/// Result of a recovery or verification pass
#[derive(Debug, Clone)]
pub struct RecoveryResult {
    /// Number of entries successfully recovered
    pub entries_recovered: u64,

    /// Number of corrupt/partial frames hit (at most 1: frames are
    /// variable-length, so nothing past the first bad one is readable)
    pub entries_corrupted: u64,

    /// Last valid LSN (0 if the log was empty)
    pub last_lsn: u64,

    /// Whether the file was truncated back to the last valid frame
    pub was_truncated: bool,
}

impl WalRecovery {
    /// Recover all valid entries from a WAL file
    ///
    /// Reads entries front to back, stops at the first corrupt or partial
    /// frame, truncates the file back to the last valid frame boundary, and
    /// returns the valid entries in log order.
    pub fn recover(path: &Path) -> Result<(Vec<WalEntry>, RecoveryResult)> {
        let (entries, mut result, valid_end) = Self::scan(path)?;

        if result.entries_corrupted > 0 {
            let file = OpenOptions::new().write(true).open(path)?;
            file.set_len(valid_end)?;
            file.sync_all()?;
            result.was_truncated = true;
        }

        Ok((entries, result))
    }

    /// Verify integrity of a WAL file without modifying it
    pub fn verify(path: &Path) -> Result<RecoveryResult> {
        let (_, result, _) = Self::scan(path)?;
        Ok(result)
    }

    /// Shared scan: entries, stats, and the offset of the last valid frame
    fn scan(path: &Path) -> Result<(Vec<WalEntry>, RecoveryResult, u64)> {
        let mut reader = WalReader::open(path)?;
        let mut entries = Vec::new();
        let mut result = RecoveryResult {
            entries_recovered: 0,
            entries_corrupted: 0,
            last_lsn: 0,
            was_truncated: false,
        };

        loop {
            match reader.next_entry() {
                Ok(Some(entry)) => {
                    result.entries_recovered += 1;
                    result.last_lsn = entry.lsn;
                    entries.push(entry);
                }
                Ok(None) => break,
                Err(VaultError::WalCorruption(reason)) => {
                    tracing::warn!("WAL corruption at offset {}: {}", reader.valid_end(), reason);
                    result.entries_corrupted = 1;
                    break;
                }
                Err(e) => return Err(e),
            }
        }

        let valid_end = reader.valid_end();
        Ok((entries, result, valid_end))
    }
}

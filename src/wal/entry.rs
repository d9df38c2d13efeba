//! WAL Entry definitions
//!
//! Defines the structure and binary encoding of individual WAL log entries.

use serde::{Deserialize, Serialize};

use crate::error::{Result, VaultError};

/// Frame header size: LSN (8) + CRC (4) + Len (4)
pub const HEADER_SIZE: usize = 16;

/// Maximum payload size for a single entry (16 MB)
///
/// A length above this in a frame header is treated as corruption rather
/// than an allocation request.
pub const MAX_ENTRY_SIZE: u32 = 16 * 1024 * 1024;

/// A single entry in the WAL
#[derive(Debug, Clone, PartialEq)]
pub struct WalEntry {
    /// Log Sequence Number - monotonically increasing, starting at 1
    pub lsn: u64,

    /// The operation to replay
    pub operation: Operation,
}

/// Store mutations that can be logged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operation {
    /// Insert or overwrite a key
    Insert { key: String, value: Vec<u8> },

    /// Remove a key
    Remove { key: String },
}

impl WalEntry {
    /// Create an entry for the given LSN
    pub fn new(lsn: u64, operation: Operation) -> Self {
        Self { lsn, operation }
    }

    /// Encode to a complete frame: `[LSN (8)][CRC (4)][Len (4)][Data]`
    pub fn encode(&self) -> Result<Vec<u8>> {
        let payload = bincode::serialize(&self.operation)?;
        if payload.len() as u32 > MAX_ENTRY_SIZE {
            return Err(VaultError::WalWrite(format!(
                "Entry payload too large: {} bytes (max {})",
                payload.len(),
                MAX_ENTRY_SIZE
            )));
        }

        let lsn_bytes = self.lsn.to_le_bytes();
        let crc = Self::compute_crc(&lsn_bytes, &payload);

        let mut frame = Vec::with_capacity(HEADER_SIZE + payload.len());
        frame.extend_from_slice(&lsn_bytes);
        frame.extend_from_slice(&crc.to_le_bytes());
        frame.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        frame.extend_from_slice(&payload);

        Ok(frame)
    }

    /// Decode a payload read from disk, validating its CRC
    pub fn decode(lsn: u64, crc: u32, payload: &[u8]) -> Result<Self> {
        let expected = Self::compute_crc(&lsn.to_le_bytes(), payload);
        if crc != expected {
            return Err(VaultError::WalCorruption(format!(
                "CRC mismatch for LSN {}: expected {:#010x}, got {:#010x}",
                lsn, expected, crc
            )));
        }

        let operation = bincode::deserialize(payload).map_err(|e| {
            VaultError::WalCorruption(format!("Undecodable entry at LSN {}: {}", lsn, e))
        })?;

        Ok(Self { lsn, operation })
    }

    /// CRC32 over the LSN bytes followed by the payload bytes
    fn compute_crc(lsn_bytes: &[u8; 8], payload: &[u8]) -> u32 {
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(lsn_bytes);
        hasher.update(payload);
        hasher.finalize()
    }
}

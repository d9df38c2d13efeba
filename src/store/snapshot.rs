//! Snapshot files
//!
//! A snapshot is a full image of the store's table, written at compaction
//! time so the WAL can be truncated. Unlike an LSM level there is only ever
//! one live snapshot; a new one atomically replaces it via rename.
//!
//! ## File Format
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ Header (14 bytes)                                       │
//! │   Magic: "BVLT" (4) | Version: u16 (2) | Count: u64 (8) │
//! ├─────────────────────────────────────────────────────────┤
//! │ Data Block (variable)                                   │
//! │   [KeyLen: u32][ValLen: u32][Key][Value]                │
//! │   ... repeated for each entry, ascending key order ...  │
//! ├─────────────────────────────────────────────────────────┤
//! │ Footer (8 bytes)                                        │
//! │   DataCRC: u32 (4) | Padding (4)                        │
//! └─────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::error::{Result, VaultError};

/// Magic bytes identifying a BeatVault snapshot file
const MAGIC: &[u8; 4] = b"BVLT";

/// Current snapshot format version
const VERSION: u16 = 1;

/// Write a full snapshot of the table
///
/// Writes to `<path>.tmp` first and renames over the target, so a crash
/// mid-write leaves the previous snapshot intact.
pub fn write_snapshot(path: &Path, data: &BTreeMap<String, Vec<u8>>) -> Result<()> {
    let tmp_path = path.with_extension("snap.tmp");

    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&tmp_path)?;
    let mut writer = BufWriter::new(file);

    // Header
    writer.write_all(MAGIC)?;
    writer.write_all(&VERSION.to_le_bytes())?;
    writer.write_all(&(data.len() as u64).to_le_bytes())?;

    // Data block (BTreeMap iterates in ascending key order)
    let mut hasher = crc32fast::Hasher::new();
    for (key, value) in data {
        let key_bytes = key.as_bytes();
        let key_len = (key_bytes.len() as u32).to_le_bytes();
        let val_len = (value.len() as u32).to_le_bytes();

        writer.write_all(&key_len)?;
        writer.write_all(&val_len)?;
        writer.write_all(key_bytes)?;
        writer.write_all(value)?;

        hasher.update(&key_len);
        hasher.update(&val_len);
        hasher.update(key_bytes);
        hasher.update(value);
    }

    // Footer
    writer.write_all(&hasher.finalize().to_le_bytes())?;
    writer.write_all(&[0u8; 4])?;

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| VaultError::Storage(format!("Failed to flush snapshot: {}", e)))?;
    file.sync_all()?;
    drop(file);

    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Read a snapshot back into an ordered table
///
/// Validates magic, version, entry count, and the data CRC.
pub fn read_snapshot(path: &Path) -> Result<BTreeMap<String, Vec<u8>>> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    // Header
    let mut header = [0u8; 14];
    reader.read_exact(&mut header)?;

    if &header[0..4] != MAGIC {
        return Err(VaultError::Storage(format!(
            "Invalid snapshot magic: expected BVLT, got {:?}",
            &header[0..4]
        )));
    }

    let version = u16::from_le_bytes(header[4..6].try_into().unwrap());
    if version != VERSION {
        return Err(VaultError::Storage(format!(
            "Unsupported snapshot version: {}",
            version
        )));
    }

    let entry_count = u64::from_le_bytes(header[6..14].try_into().unwrap());

    // Data block
    let mut data = BTreeMap::new();
    let mut hasher = crc32fast::Hasher::new();

    for i in 0..entry_count {
        let mut entry_header = [0u8; 8];
        reader.read_exact(&mut entry_header).map_err(|e| {
            VaultError::Storage(format!("Truncated snapshot at entry {}: {}", i, e))
        })?;

        let key_len = u32::from_le_bytes(entry_header[0..4].try_into().unwrap()) as usize;
        let val_len = u32::from_le_bytes(entry_header[4..8].try_into().unwrap()) as usize;

        let mut key_bytes = vec![0u8; key_len];
        reader.read_exact(&mut key_bytes).map_err(|e| {
            VaultError::Storage(format!("Truncated snapshot key at entry {}: {}", i, e))
        })?;

        let mut value = vec![0u8; val_len];
        reader.read_exact(&mut value).map_err(|e| {
            VaultError::Storage(format!("Truncated snapshot value at entry {}: {}", i, e))
        })?;

        hasher.update(&entry_header);
        hasher.update(&key_bytes);
        hasher.update(&value);

        let key = String::from_utf8(key_bytes)
            .map_err(|e| VaultError::Storage(format!("Non-UTF8 snapshot key: {}", e)))?;
        data.insert(key, value);
    }

    // Footer
    let mut footer = [0u8; 8];
    reader.read_exact(&mut footer)?;
    let stored_crc = u32::from_le_bytes(footer[0..4].try_into().unwrap());
    let computed_crc = hasher.finalize();

    if stored_crc != computed_crc {
        return Err(VaultError::Storage(format!(
            "Snapshot CRC mismatch: expected {:#010x}, got {:#010x}",
            computed_crc, stored_crc
        )));
    }

    Ok(data)
}

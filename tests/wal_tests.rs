//! Tests for the WAL
//!
//! These tests verify:
//! - Appending entries and LSN sequencing
//! - Sync strategies (EveryWrite, EveryNEntries)
//! - Truncation
//! - Reading entries back
//! - Crash recovery: corruption detection and partial write truncation

use std::path::PathBuf;

use tempfile::TempDir;

use beatvault::config::WalSyncStrategy;
use beatvault::wal::{Operation, WalReader, WalRecovery, WalWriter};

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_wal() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let wal_path = temp_dir.path().join("test.wal");
    (temp_dir, wal_path)
}

fn insert(key: &str, value: &[u8]) -> Operation {
    Operation::Insert {
        key: key.to_string(),
        value: value.to_vec(),
    }
}

fn remove(key: &str) -> Operation {
    Operation::Remove {
        key: key.to_string(),
    }
}

// =============================================================================
// Basic Writing Tests
// =============================================================================

#[test]
fn test_write_single_entry() {
    let (_temp, wal_path) = setup_temp_wal();

    let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();
    let lsn = writer.append(insert("key1", b"value1")).unwrap();

    assert_eq!(lsn, 1);
    assert_eq!(writer.current_lsn(), 2);
}

#[test]
fn test_write_multiple_entries() {
    let (_temp, wal_path) = setup_temp_wal();

    let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();

    let lsn1 = writer.append(insert("a", b"1")).unwrap();
    let lsn2 = writer.append(insert("b", b"2")).unwrap();
    let lsn3 = writer.append(remove("a")).unwrap();

    assert_eq!(lsn1, 1);
    assert_eq!(lsn2, 2);
    assert_eq!(lsn3, 3);
    assert_eq!(writer.current_lsn(), 4);
}

#[test]
fn test_lsn_continues_after_reopen() {
    let (_temp, wal_path) = setup_temp_wal();

    {
        let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();
        writer.append(insert("a", b"1")).unwrap();
        writer.append(insert("b", b"2")).unwrap();
    }

    let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();
    let lsn = writer.append(insert("c", b"3")).unwrap();
    assert_eq!(lsn, 3);
}

// =============================================================================
// Sync Strategy Tests
// =============================================================================

#[test]
fn test_sync_every_write() {
    let (_temp, wal_path) = setup_temp_wal();

    let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();

    writer.append(insert("k1", b"v1")).unwrap();
    assert_eq!(writer.uncommitted_count(), 0);

    writer.append(insert("k2", b"v2")).unwrap();
    assert_eq!(writer.uncommitted_count(), 0);
}

#[test]
fn test_sync_every_n_entries() {
    let (_temp, wal_path) = setup_temp_wal();

    let mut writer =
        WalWriter::open(&wal_path, WalSyncStrategy::EveryNEntries { count: 5 }).unwrap();

    for i in 0..4 {
        writer.append(insert(&format!("k{}", i), b"v")).unwrap();
    }
    assert_eq!(writer.uncommitted_count(), 4);

    // 5th entry triggers sync
    writer.append(insert("k5", b"v")).unwrap();
    assert_eq!(writer.uncommitted_count(), 0);

    writer.append(insert("k6", b"v")).unwrap();
    assert_eq!(writer.uncommitted_count(), 1);
}

#[test]
fn test_explicit_sync_resets_count() {
    let (_temp, wal_path) = setup_temp_wal();

    let mut writer =
        WalWriter::open(&wal_path, WalSyncStrategy::EveryNEntries { count: 100 }).unwrap();

    writer.append(insert("k", b"v")).unwrap();
    assert_eq!(writer.uncommitted_count(), 1);

    writer.sync().unwrap();
    assert_eq!(writer.uncommitted_count(), 0);
}

// =============================================================================
// Truncation Tests
// =============================================================================

#[test]
fn test_truncate_resets_log() {
    let (_temp, wal_path) = setup_temp_wal();

    let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();
    writer.append(insert("a", b"1")).unwrap();
    writer.append(insert("b", b"2")).unwrap();

    writer.truncate().unwrap();

    assert_eq!(writer.current_lsn(), 1);
    assert_eq!(std::fs::metadata(&wal_path).unwrap().len(), 0);

    // Log is usable again after truncation
    let lsn = writer.append(insert("c", b"3")).unwrap();
    assert_eq!(lsn, 1);
}

// =============================================================================
// Reading Tests
// =============================================================================

#[test]
fn test_read_entries_back() {
    let (_temp, wal_path) = setup_temp_wal();

    let ops = vec![insert("a", b"1"), remove("a"), insert("b", b"2")];

    {
        let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();
        for op in &ops {
            writer.append(op.clone()).unwrap();
        }
    }

    let reader = WalReader::open(&wal_path).unwrap();
    let entries: Vec<_> = reader.entries().map(|e| e.unwrap()).collect();

    assert_eq!(entries.len(), 3);
    for (i, entry) in entries.iter().enumerate() {
        assert_eq!(entry.lsn, (i + 1) as u64);
        assert_eq!(entry.operation, ops[i]);
    }
}

#[test]
fn test_read_empty_log() {
    let (_temp, wal_path) = setup_temp_wal();

    let _writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();

    let mut reader = WalReader::open(&wal_path).unwrap();
    assert!(reader.next_entry().unwrap().is_none());
}

// =============================================================================
// Recovery Tests
// =============================================================================

#[test]
fn test_recover_clean_log() {
    let (_temp, wal_path) = setup_temp_wal();

    {
        let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();
        writer.append(insert("a", b"1")).unwrap();
        writer.append(insert("b", b"2")).unwrap();
    }

    let (entries, result) = WalRecovery::recover(&wal_path).unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(result.entries_recovered, 2);
    assert_eq!(result.entries_corrupted, 0);
    assert_eq!(result.last_lsn, 2);
    assert!(!result.was_truncated);
}

#[test]
fn test_recover_detects_corrupt_tail() {
    let (_temp, wal_path) = setup_temp_wal();

    {
        let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();
        writer.append(insert("a", b"1")).unwrap();
        writer.append(insert("b", b"2")).unwrap();
        writer.append(insert("c", b"3")).unwrap();
    }

    // Flip the last byte: the third frame's CRC no longer matches
    let mut bytes = std::fs::read(&wal_path).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xFF;
    std::fs::write(&wal_path, &bytes).unwrap();

    let (entries, result) = WalRecovery::recover(&wal_path).unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(result.entries_recovered, 2);
    assert_eq!(result.entries_corrupted, 1);
    assert_eq!(result.last_lsn, 2);
    assert!(result.was_truncated);
}

#[test]
fn test_recover_truncates_partial_write() {
    let (_temp, wal_path) = setup_temp_wal();

    {
        let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();
        writer.append(insert("a", b"1")).unwrap();
        writer.append(insert("b", b"2")).unwrap();
    }

    // Simulate a crash mid-append: cut into the last frame
    let full_len = std::fs::metadata(&wal_path).unwrap().len();
    let file = std::fs::OpenOptions::new()
        .write(true)
        .open(&wal_path)
        .unwrap();
    file.set_len(full_len - 3).unwrap();
    drop(file);

    let (entries, result) = WalRecovery::recover(&wal_path).unwrap();

    assert_eq!(entries.len(), 1);
    assert_eq!(result.entries_corrupted, 1);
    assert!(result.was_truncated);

    // The file now ends at the last valid frame boundary and is appendable
    let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();
    let lsn = writer.append(insert("c", b"3")).unwrap();
    assert_eq!(lsn, 2);

    let reader = WalReader::open(&wal_path).unwrap();
    let entries: Vec<_> = reader.entries().map(|e| e.unwrap()).collect();
    assert_eq!(entries.len(), 2);
}

#[test]
fn test_verify_does_not_modify() {
    let (_temp, wal_path) = setup_temp_wal();

    {
        let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();
        writer.append(insert("a", b"1")).unwrap();
    }

    let len_before = std::fs::metadata(&wal_path).unwrap().len();

    // Corrupt the tail, then verify: the file must be left alone
    let mut bytes = std::fs::read(&wal_path).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xFF;
    std::fs::write(&wal_path, &bytes).unwrap();

    let result = WalRecovery::verify(&wal_path).unwrap();
    assert_eq!(result.entries_recovered, 0);
    assert_eq!(result.entries_corrupted, 1);
    assert!(!result.was_truncated);
    assert_eq!(std::fs::metadata(&wal_path).unwrap().len(), len_before);
}

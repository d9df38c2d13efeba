//! Integration tests for BeatVault
//!
//! End-to-end flows across the catalog and the persistence stack,
//! including process-restart simulation by reopening the same data
//! directory.

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use tempfile::TempDir;

use beatvault::{
    BeatPatch, CatalogService, Config, FixedClock, KvStore, NewBeat, VaultError,
};

// =============================================================================
// Helper Functions
// =============================================================================

fn fixed_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::new(
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
    ))
}

fn open_catalog(dir: &std::path::Path, clock: &Arc<FixedClock>) -> CatalogService {
    let store = KvStore::open_path(dir).unwrap();
    CatalogService::new(store, Box::new(Arc::clone(clock)))
}

fn draft(title: &str, artist: &str) -> NewBeat {
    NewBeat {
        title: title.to_string(),
        artist: artist.to_string(),
        price: 9.99,
        url: "u".to_string(),
    }
}

// =============================================================================
// Restart Tests
// =============================================================================

#[test]
fn test_catalog_survives_restart() {
    let temp_dir = TempDir::new().unwrap();
    let clock = fixed_clock();

    let id = {
        let mut service = open_catalog(temp_dir.path(), &clock);
        let beat = service.create(draft("Night", "Wave")).unwrap();
        clock.advance(Duration::seconds(1));
        service.buy(&beat.id).unwrap();
        service.close().unwrap();
        beat.id
    };

    // "Restart": reopen the same data directory
    let service = open_catalog(temp_dir.path(), &clock);
    let beat = service.get_by_id(&id).unwrap();

    assert_eq!(beat.title, "Night");
    assert!(beat.sold);
    assert!(beat.updated_at.is_some());
}

#[test]
fn test_sold_invariant_holds_across_restart() {
    let temp_dir = TempDir::new().unwrap();
    let clock = fixed_clock();

    let id = {
        let mut service = open_catalog(temp_dir.path(), &clock);
        let beat = service.create(draft("t", "a")).unwrap();
        service.buy(&beat.id).unwrap();
        service.close().unwrap();
        beat.id
    };

    let mut service = open_catalog(temp_dir.path(), &clock);
    assert!(matches!(service.buy(&id), Err(VaultError::AlreadySold)));
}

#[test]
fn test_delete_survives_restart() {
    let temp_dir = TempDir::new().unwrap();
    let clock = fixed_clock();

    let (kept, deleted) = {
        let mut service = open_catalog(temp_dir.path(), &clock);
        let kept = service.create(draft("keep", "a")).unwrap();
        let gone = service.create(draft("drop", "a")).unwrap();
        service.delete(&gone.id).unwrap();
        service.close().unwrap();
        (kept.id, gone.id)
    };

    let service = open_catalog(temp_dir.path(), &clock);
    assert!(service.get_by_id(&kept).is_ok());
    assert!(matches!(
        service.get_by_id(&deleted),
        Err(VaultError::NotFound)
    ));
    assert_eq!(service.len(), 1);
}

#[test]
fn test_updates_survive_restart_with_compaction() {
    let temp_dir = TempDir::new().unwrap();
    let clock = fixed_clock();

    let id = {
        // Tiny threshold so every write compacts through the snapshot path
        let config = Config::builder()
            .data_dir(temp_dir.path())
            .wal_compact_threshold(1)
            .build();
        let store = KvStore::open(&config).unwrap();
        let mut service = CatalogService::new(store, Box::new(Arc::clone(&clock)));

        let beat = service.create(draft("v1", "a")).unwrap();
        clock.advance(Duration::seconds(1));
        let patch = BeatPatch {
            title: Some("v2".to_string()),
            ..Default::default()
        };
        service.update(&beat.id, patch).unwrap();
        service.close().unwrap();
        beat.id
    };

    let service = open_catalog(temp_dir.path(), &clock);
    let beat = service.get_by_id(&id).unwrap();
    assert_eq!(beat.title, "v2");
}

// =============================================================================
// Mixed Workload Tests
// =============================================================================

#[test]
fn test_search_after_mutations() {
    let temp_dir = TempDir::new().unwrap();
    let clock = fixed_clock();
    let mut service = open_catalog(temp_dir.path(), &clock);

    let a = service.create(draft("Alpha", "ProdByX")).unwrap();
    let b = service.create(draft("Beta", "ProdByX")).unwrap();
    service.create(draft("Gamma", "Someone")).unwrap();

    service.delete(&a.id).unwrap();
    let patch = BeatPatch {
        artist: Some("Renamed".to_string()),
        ..Default::default()
    };
    service.update(&b.id, patch).unwrap();

    // Search reflects the mutations, not the original values
    assert!(service.search_by_artist("prodbyx").unwrap().is_empty());
    let renamed = service.search_by_artist("renamed").unwrap();
    assert_eq!(renamed.len(), 1);
    assert_eq!(renamed[0].id, b.id);
}

#[test]
fn test_interleaved_operations_many_records() {
    let temp_dir = TempDir::new().unwrap();
    let clock = fixed_clock();
    let mut service = open_catalog(temp_dir.path(), &clock);

    let mut ids = Vec::new();
    for i in 0..20 {
        let beat = service
            .create(draft(&format!("beat {}", i), "artist"))
            .unwrap();
        ids.push(beat.id);
    }

    for id in ids.iter().step_by(2) {
        service.buy(id).unwrap();
    }
    for id in ids.iter().step_by(5) {
        service.feature(id).unwrap();
    }

    let all = service.get_all().unwrap();
    assert_eq!(all.len(), 20);
    assert_eq!(all.iter().filter(|b| b.sold).count(), 10);
    assert_eq!(all.iter().filter(|b| b.featured).count(), 4);
}

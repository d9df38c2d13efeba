//! Benchmarks for BeatVault catalog operations

use criterion::{criterion_group, criterion_main, Criterion};
use tempfile::TempDir;

use beatvault::{CatalogService, Config, KvStore, NewBeat, SystemClock};

fn setup_service(temp: &TempDir) -> CatalogService {
    let config = Config::builder()
        .data_dir(temp.path())
        .wal_compact_threshold(u64::MAX)
        .build();
    let store = KvStore::open(&config).unwrap();
    CatalogService::new(store, Box::new(SystemClock))
}

fn draft(i: usize) -> NewBeat {
    NewBeat {
        title: format!("beat {}", i),
        artist: "bench artist".to_string(),
        price: 9.99,
        url: "bench://url".to_string(),
    }
}

fn catalog_benchmarks(c: &mut Criterion) {
    let temp = TempDir::new().unwrap();
    let mut service = setup_service(&temp);

    let mut counter = 0usize;
    c.bench_function("create", |b| {
        b.iter(|| {
            counter += 1;
            service.create(draft(counter)).unwrap()
        })
    });

    let beat = service.create(draft(0)).unwrap();
    c.bench_function("get_by_id", |b| {
        b.iter(|| service.get_by_id(&beat.id).unwrap())
    });

    c.bench_function("search_by_artist", |b| {
        b.iter(|| service.search_by_artist("bench").unwrap())
    });
}

criterion_group!(benches, catalog_benchmarks);
criterion_main!(benches);

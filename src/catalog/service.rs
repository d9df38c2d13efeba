//! Catalog Service
//!
//! All domain operations over the persistent store. Methods are synchronous
//! and serialized by the caller (`&mut self` for mutations), so each
//! operation is atomic with respect to the others: the second of two rapid
//! `buy` calls on the same id always observes `sold = true`.

use uuid::Uuid;

use crate::catalog::{Beat, BeatPatch, NewBeat};
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::error::{Result, VaultError};
use crate::store::KvStore;

/// The catalog service
///
/// Owns the store exclusively; no other component writes it.
pub struct CatalogService {
    store: KvStore,
    clock: Box<dyn Clock>,
}

impl CatalogService {
    /// Build a service over an already-opened store, with an injected clock
    pub fn new(store: KvStore, clock: Box<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Open a service with the given config and the system clock
    pub fn open(config: &Config) -> Result<Self> {
        let store = KvStore::open(config)?;
        Ok(Self::new(store, Box::new(SystemClock)))
    }

    // =========================================================================
    // Lifecycle Operations
    // =========================================================================

    /// Create a beat: mint an id, stamp `created_at`, store, return
    ///
    /// Never fails under normal conditions (id collision probability is
    /// treated as zero).
    pub fn create(&mut self, new: NewBeat) -> Result<Beat> {
        let beat = Beat {
            id: Uuid::new_v4().to_string(),
            title: new.title,
            artist: new.artist,
            price: new.price,
            url: new.url,
            created_at: self.clock.now(),
            updated_at: None,
            sold: false,
            featured: false,
        };

        self.put(&beat)?;
        tracing::debug!("Created beat {}", beat.id);
        Ok(beat)
    }

    /// Every stored beat, in ascending-id store order
    pub fn get_all(&self) -> Result<Vec<Beat>> {
        self.store
            .values()
            .iter()
            .map(|bytes| Beat::decode(bytes))
            .collect()
    }

    /// Look up a beat by id
    pub fn get_by_id(&self, id: &str) -> Result<Beat> {
        match self.store.get(id) {
            Some(bytes) => Beat::decode(&bytes),
            None => Err(VaultError::NotFound),
        }
    }

    /// Merge the supplied fields over the stored record and re-stamp
    /// `updated_at`
    ///
    /// Only title/artist/price/url are reachable; the open field set of the
    /// original system is deliberately not carried over.
    pub fn update(&mut self, id: &str, patch: BeatPatch) -> Result<Beat> {
        let mut beat = self.get_by_id(id)?;
        patch.apply(&mut beat);
        beat.updated_at = Some(self.clock.now());
        self.put(&beat)?;
        Ok(beat)
    }

    /// Remove a beat permanently; returns the last-known record
    pub fn delete(&mut self, id: &str) -> Result<Beat> {
        match self.store.remove(id)? {
            Some(bytes) => {
                tracing::debug!("Deleted beat {}", id);
                Beat::decode(&bytes)
            }
            None => Err(VaultError::NotFound),
        }
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// One-way transition to `sold = true`
    ///
    /// Returns:
    /// - `Ok(beat)` — the beat was unsold and is now sold
    /// - `Err(AlreadySold)` — `sold` was already set; the record is unchanged
    /// - `Err(NotFound)` — no such id
    pub fn buy(&mut self, id: &str) -> Result<Beat> {
        let mut beat = self.get_by_id(id)?;
        if beat.sold {
            return Err(VaultError::AlreadySold);
        }

        beat.sold = true;
        beat.updated_at = Some(self.clock.now());
        self.put(&beat)?;
        tracing::debug!("Beat {} sold", id);
        Ok(beat)
    }

    /// Transition to `featured = true`
    ///
    /// Idempotent: re-featuring an already-featured beat succeeds and simply
    /// re-stamps `updated_at`.
    pub fn feature(&mut self, id: &str) -> Result<Beat> {
        let mut beat = self.get_by_id(id)?;
        beat.featured = true;
        beat.updated_at = Some(self.clock.now());
        self.put(&beat)?;
        Ok(beat)
    }

    // =========================================================================
    // Search
    // =========================================================================

    /// Case-insensitive substring match against `artist`, store order
    pub fn search_by_artist(&self, query: &str) -> Result<Vec<Beat>> {
        self.scan(|beat| contains_ignore_case(&beat.artist, query))
    }

    /// Case-insensitive substring match against `title`, store order
    pub fn search_by_title(&self, query: &str) -> Result<Vec<Beat>> {
        self.scan(|beat| contains_ignore_case(&beat.title, query))
    }

    // =========================================================================
    // Maintenance
    // =========================================================================

    /// Force a store compaction (snapshot + WAL truncate)
    pub fn compact(&mut self) -> Result<()> {
        self.store.compact()
    }

    /// Close the service, syncing the store to disk
    pub fn close(self) -> Result<()> {
        self.store.close()
    }

    /// Number of stored beats
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Full-value replace of the record under its own id
    fn put(&mut self, beat: &Beat) -> Result<()> {
        let bytes = beat.encode()?;
        self.store.insert(beat.id.clone(), bytes)?;
        Ok(())
    }

    /// Full scan in store order, keeping beats matching the predicate
    ///
    /// An empty result is an ordinary empty vector, not an error.
    fn scan<F: Fn(&Beat) -> bool>(&self, predicate: F) -> Result<Vec<Beat>> {
        let mut matches = Vec::new();
        for bytes in self.store.values() {
            let beat = Beat::decode(&bytes)?;
            if predicate(&beat) {
                matches.push(beat);
            }
        }
        Ok(matches)
    }
}

/// Case-insensitive substring test
fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

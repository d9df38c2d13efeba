//! Persistent Store Module
//!
//! Durable ordered key→value storage, keyed by record id.
//!
//! ## Responsibilities
//! - Ordered in-memory table (BTreeMap) as the read path
//! - WAL append before every mutation for durability
//! - Full-table snapshots for bounded recovery time
//! - Rebuild state on open (snapshot + WAL replay)
//!
//! Iteration order is an explicit contract: `values()` yields records in
//! ascending key order, not insertion order.

mod kv;
pub mod snapshot;

pub use kv::KvStore;

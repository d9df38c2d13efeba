//! # BeatVault
//!
//! A persistent catalog for sellable digital beats with:
//! - Write-Ahead Logging (WAL) for durability
//! - Crash recovery with partial write handling
//! - Full-table snapshots for bounded recovery time
//! - One-way domain transitions (buy, feature)
//! - TCP-based client protocol
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │                  (Multiple Clients)                          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                  CatalogService                              │
//! │        (Beat lifecycle, transitions, search)                 │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                     KvStore                                  │
//! │            (ordered table, id → record)                      │
//! └──────────┬──────────────────────────────┬───────────────────┘
//!            │                              │
//!            ▼                              ▼
//!     ┌─────────────┐               ┌─────────────┐
//!     │     WAL     │               │  Snapshot   │
//!     │  (Append)   │               │ (Compacted) │
//!     └─────────────┘               └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;

pub mod catalog;
pub mod clock;
pub mod network;
pub mod protocol;
pub mod store;
pub mod wal;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use catalog::{Beat, BeatPatch, CatalogService, NewBeat};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use error::{Result, VaultError};
pub use store::KvStore;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of BeatVault
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

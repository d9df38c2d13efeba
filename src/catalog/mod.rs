//! Catalog Module
//!
//! The domain layer: owns the `Beat` entity and every operation on it.
//!
//! ## Responsibilities
//! - Beat lifecycle: create, update, delete
//! - One-way transitions: buy (`sold`), feature (`featured`)
//! - Substring search by artist/title
//! - Timestamp stamping via an injected clock
//!
//! Built entirely on [`crate::store::KvStore`]; one record per id, each
//! mutation a full-value replace under the same key.

mod beat;
mod service;

pub use beat::{Beat, BeatPatch, NewBeat};
pub use service::CatalogService;

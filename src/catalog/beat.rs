//! Beat entity definitions
//!
//! The sellable catalog record and the value types used to create and
//! update it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A sellable catalog record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Beat {
    /// Globally unique id, minted once at creation and never reused
    pub id: String,

    /// Free text
    pub title: String,

    /// Free text
    pub artist: String,

    /// No currency unit enforced, no non-negativity check (source behavior)
    pub price: f64,

    /// Opaque reference to media; not validated
    pub url: String,

    /// Set once at creation, immutable thereafter
    pub created_at: DateTime<Utc>,

    /// `None` until the first mutation, re-stamped on every one after
    pub updated_at: Option<DateTime<Utc>>,

    /// One-way false→true via `buy`
    pub sold: bool,

    /// Monotonic false→true via `feature` (no unfeature operation)
    pub featured: bool,
}

impl Beat {
    /// Encode to the stored blob format
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode from the stored blob format
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }
}

/// Fields supplied when creating a beat
///
/// Everything else (id, timestamps, flags) is assigned by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBeat {
    pub title: String,
    pub artist: String,
    pub price: f64,
    pub url: String,
}

/// A partial update: each mutable field is present or absent
///
/// Only the four documented mutable fields are expressible here, so the
/// protected fields (id, timestamps, `sold`, `featured`) cannot be forged
/// through `update`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BeatPatch {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub price: Option<f64>,
    pub url: Option<String>,
}

impl BeatPatch {
    /// Whether the patch supplies no fields at all
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.artist.is_none() && self.price.is_none() && self.url.is_none()
    }

    /// Merge the supplied fields over a stored record, field by field
    ///
    /// Absent fields leave the stored value unchanged.
    pub fn apply(&self, beat: &mut Beat) {
        if let Some(title) = &self.title {
            beat.title = title.clone();
        }
        if let Some(artist) = &self.artist {
            beat.artist = artist.clone();
        }
        if let Some(price) = self.price {
            beat.price = price;
        }
        if let Some(url) = &self.url {
            beat.url = url.clone();
        }
    }
}

//! Response definitions
//!
//! Represents responses to clients.

use crate::catalog::Beat;
use crate::error::Result;

/// Response status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Status {
    Ok = 0x00,
    NotFound = 0x01,
    AlreadySold = 0x02,
    Error = 0x03,
}

/// A response to send to a client
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// Status code
    pub status: Status,

    /// Optional payload: a bincode `Beat`, a bincode `Vec<Beat>`, or a
    /// UTF-8 error message
    pub payload: Option<Vec<u8>>,
}

impl Response {
    /// Create an OK response with optional payload
    pub fn ok(payload: Option<Vec<u8>>) -> Self {
        Self {
            status: Status::Ok,
            payload,
        }
    }

    /// Create an OK response carrying a single beat
    pub fn beat(beat: &Beat) -> Result<Self> {
        Ok(Self::ok(Some(bincode::serialize(beat)?)))
    }

    /// Create an OK response carrying a list of beats
    pub fn beats(beats: &[Beat]) -> Result<Self> {
        Ok(Self::ok(Some(bincode::serialize(beats)?)))
    }

    /// Create a NOT_FOUND response
    pub fn not_found() -> Self {
        Self {
            status: Status::NotFound,
            payload: None,
        }
    }

    /// Create an ALREADY_SOLD response
    pub fn already_sold() -> Self {
        Self {
            status: Status::AlreadySold,
            payload: None,
        }
    }

    /// Create an ERROR response
    pub fn error(message: &str) -> Self {
        Self {
            status: Status::Error,
            payload: Some(message.as_bytes().to_vec()),
        }
    }
}

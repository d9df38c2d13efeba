//! Command definitions
//!
//! Typed operation requests decoded from clients. One variant per catalog
//! operation, plus a health check.

use crate::catalog::{BeatPatch, NewBeat};

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandType {
    Create = 0x01,
    GetAll = 0x02,
    GetById = 0x03,
    Update = 0x04,
    Delete = 0x05,
    Buy = 0x06,
    Feature = 0x07,
    SearchArtist = 0x08,
    SearchTitle = 0x09,
    Ping = 0x0A,
}

/// A parsed command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Create a beat from the caller-supplied fields
    Create { new: NewBeat },

    /// List every beat in store order
    GetAll,

    /// Look up a beat by id
    GetById { id: String },

    /// Partially update a beat's mutable fields
    Update { id: String, patch: BeatPatch },

    /// Delete a beat
    Delete { id: String },

    /// Mark a beat sold (one-way)
    Buy { id: String },

    /// Mark a beat featured
    Feature { id: String },

    /// Case-insensitive substring search on artist
    SearchArtist { query: String },

    /// Case-insensitive substring search on title
    SearchTitle { query: String },

    /// Ping (health check)
    Ping,
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Create { .. } => CommandType::Create,
            Command::GetAll => CommandType::GetAll,
            Command::GetById { .. } => CommandType::GetById,
            Command::Update { .. } => CommandType::Update,
            Command::Delete { .. } => CommandType::Delete,
            Command::Buy { .. } => CommandType::Buy,
            Command::Feature { .. } => CommandType::Feature,
            Command::SearchArtist { .. } => CommandType::SearchArtist,
            Command::SearchTitle { .. } => CommandType::SearchTitle,
            Command::Ping => CommandType::Ping,
        }
    }
}

//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//!
//! ### Request (Command) Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Cmd (1)  │ Len (4)  │      bincode payload        │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Payload by Command Type
//! - CREATE:                          bincode `NewBeat`
//! - GET_BY_ID/DELETE/BUY/FEATURE:    bincode `String` (the id)
//! - UPDATE:                          bincode `(String, BeatPatch)`
//! - SEARCH_ARTIST/SEARCH_TITLE:      bincode `String` (the query)
//! - GET_ALL/PING:                    empty
//!
//! ### Response Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │Status(1) │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! Lengths are big-endian.

use std::io::{Read, Write};

use crate::catalog::{BeatPatch, NewBeat};
use crate::error::{Result, VaultError};

use super::{Command, Response, Status};

/// Header size: 1 byte command/status + 4 bytes length
pub const HEADER_SIZE: usize = 5;

/// Maximum payload size (16 MB)
pub const MAX_PAYLOAD_SIZE: u32 = 16 * 1024 * 1024;

// =============================================================================
// Command Encoding/Decoding
// =============================================================================

/// Encode a command to bytes
///
/// Format: cmd_type (1) + payload_len (4) + payload
pub fn encode_command(command: &Command) -> Result<Vec<u8>> {
    let cmd_type = command.command_type() as u8;

    let payload = match command {
        Command::Create { new } => bincode::serialize(new)?,
        Command::GetById { id }
        | Command::Delete { id }
        | Command::Buy { id }
        | Command::Feature { id } => bincode::serialize(id)?,
        Command::Update { id, patch } => bincode::serialize(&(id, patch))?,
        Command::SearchArtist { query } | Command::SearchTitle { query } => {
            bincode::serialize(query)?
        }
        Command::GetAll | Command::Ping => Vec::new(),
    };

    let mut message = Vec::with_capacity(HEADER_SIZE + payload.len());
    message.push(cmd_type);
    message.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    message.extend_from_slice(&payload);

    Ok(message)
}

/// Decode a command from bytes
pub fn decode_command(bytes: &[u8]) -> Result<Command> {
    let (kind, payload) = split_frame(bytes)?;

    match kind {
        0x01 => {
            let new: NewBeat = decode_payload(payload, "CREATE")?;
            Ok(Command::Create { new })
        }
        0x02 => {
            expect_empty(payload, "GET_ALL")?;
            Ok(Command::GetAll)
        }
        0x03 => Ok(Command::GetById {
            id: decode_payload(payload, "GET_BY_ID")?,
        }),
        0x04 => {
            let (id, patch): (String, BeatPatch) = decode_payload(payload, "UPDATE")?;
            Ok(Command::Update { id, patch })
        }
        0x05 => Ok(Command::Delete {
            id: decode_payload(payload, "DELETE")?,
        }),
        0x06 => Ok(Command::Buy {
            id: decode_payload(payload, "BUY")?,
        }),
        0x07 => Ok(Command::Feature {
            id: decode_payload(payload, "FEATURE")?,
        }),
        0x08 => Ok(Command::SearchArtist {
            query: decode_payload(payload, "SEARCH_ARTIST")?,
        }),
        0x09 => Ok(Command::SearchTitle {
            query: decode_payload(payload, "SEARCH_TITLE")?,
        }),
        0x0A => {
            expect_empty(payload, "PING")?;
            Ok(Command::Ping)
        }
        _ => Err(VaultError::Protocol(format!(
            "Unknown command type: 0x{:02x}",
            kind
        ))),
    }
}

/// Decode a bincode payload, labelling errors with the command name
fn decode_payload<'a, T: serde::Deserialize<'a>>(payload: &'a [u8], name: &str) -> Result<T> {
    bincode::deserialize(payload)
        .map_err(|e| VaultError::Protocol(format!("{} command: bad payload: {}", name, e)))
}

fn expect_empty(payload: &[u8], name: &str) -> Result<()> {
    if !payload.is_empty() {
        return Err(VaultError::Protocol(format!(
            "{} command: unexpected payload of {} bytes",
            name,
            payload.len()
        )));
    }
    Ok(())
}

/// Validate a frame and split it into (discriminant, payload)
fn split_frame(bytes: &[u8]) -> Result<(u8, &[u8])> {
    if bytes.len() < HEADER_SIZE {
        return Err(VaultError::Protocol(format!(
            "Incomplete header: expected {} bytes, got {}",
            HEADER_SIZE,
            bytes.len()
        )));
    }

    let kind = bytes[0];
    let payload_len = u32::from_be_bytes([bytes[1], bytes[2], bytes[3], bytes[4]]) as usize;

    if payload_len > MAX_PAYLOAD_SIZE as usize {
        return Err(VaultError::Protocol(format!(
            "Payload too large: {} bytes (max {})",
            payload_len, MAX_PAYLOAD_SIZE
        )));
    }

    let total_len = HEADER_SIZE + payload_len;
    if bytes.len() < total_len {
        return Err(VaultError::Protocol(format!(
            "Incomplete payload: expected {} bytes, got {}",
            total_len,
            bytes.len()
        )));
    }

    Ok((kind, &bytes[HEADER_SIZE..total_len]))
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response to bytes
///
/// Format: status (1) + payload_len (4) + payload
pub fn encode_response(response: &Response) -> Vec<u8> {
    let payload = response.payload.as_deref().unwrap_or(&[]);

    let mut message = Vec::with_capacity(HEADER_SIZE + payload.len());
    message.push(response.status as u8);
    message.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    message.extend_from_slice(payload);

    message
}

/// Decode a response from bytes
pub fn decode_response(bytes: &[u8]) -> Result<Response> {
    let (status_byte, payload) = split_frame(bytes)?;

    let status = match status_byte {
        0x00 => Status::Ok,
        0x01 => Status::NotFound,
        0x02 => Status::AlreadySold,
        0x03 => Status::Error,
        _ => {
            return Err(VaultError::Protocol(format!(
                "Unknown response status: 0x{:02x}",
                status_byte
            )))
        }
    };

    let payload = if payload.is_empty() {
        None
    } else {
        Some(payload.to_vec())
    };

    Ok(Response { status, payload })
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read a complete frame (header + payload) from a stream
fn read_frame<R: Read>(reader: &mut R) -> Result<Vec<u8>> {
    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header)?;

    let payload_len = u32::from_be_bytes([header[1], header[2], header[3], header[4]]) as usize;

    if payload_len > MAX_PAYLOAD_SIZE as usize {
        return Err(VaultError::Protocol(format!(
            "Payload too large: {} bytes (max {})",
            payload_len, MAX_PAYLOAD_SIZE
        )));
    }

    let mut message = Vec::with_capacity(HEADER_SIZE + payload_len);
    message.extend_from_slice(&header);
    if payload_len > 0 {
        let mut payload = vec![0u8; payload_len];
        reader.read_exact(&mut payload)?;
        message.extend_from_slice(&payload);
    }

    Ok(message)
}

/// Read a complete command from a stream
///
/// Blocks until a complete command is received or an error occurs
pub fn read_command<R: Read>(reader: &mut R) -> Result<Command> {
    let frame = read_frame(reader)?;
    decode_command(&frame)
}

/// Write a command to a stream
pub fn write_command<W: Write>(writer: &mut W, command: &Command) -> Result<()> {
    let bytes = encode_command(command)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Read a complete response from a stream
pub fn read_response<R: Read>(reader: &mut R) -> Result<Response> {
    let frame = read_frame(reader)?;
    decode_response(&frame)
}

/// Write a response to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    let bytes = encode_response(response);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

//! Protocol Module
//!
//! Wire protocol between clients and the server: a one-byte discriminant,
//! a length, and a bincode payload. The transport maps domain outcomes to
//! statuses (`NotFound`, `AlreadySold`); the catalog itself has no wire
//! knowledge.

mod codec;
mod command;
mod response;

pub use codec::{
    decode_command, decode_response, encode_command, encode_response, read_command,
    read_response, write_command, write_response, HEADER_SIZE, MAX_PAYLOAD_SIZE,
};
pub use command::{Command, CommandType};
pub use response::{Response, Status};

//! Network Module
//!
//! TCP transport for the catalog.
//!
//! ## Responsibilities
//! - Accept client connections (bounded by `max_connections`)
//! - Decode commands, dispatch to the catalog, encode responses
//! - Serialize catalog access behind a single mutex, so one operation
//!   completes before the next begins

mod connection;
mod server;

pub use connection::Connection;
pub use server::Server;

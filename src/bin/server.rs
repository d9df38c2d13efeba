//! BeatVault Server Binary
//!
//! Opens the catalog and serves it over TCP.

use std::sync::Arc;

use clap::Parser;
use parking_lot::Mutex;
use tracing_subscriber::{fmt, EnvFilter};

use beatvault::network::Server;
use beatvault::{CatalogService, Config};

/// BeatVault Server
#[derive(Parser, Debug)]
#[command(name = "beatvault-server")]
#[command(about = "Persistent beat catalog server")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./beatvault_data")]
    data_dir: String,

    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:7878")]
    listen: String,

    /// Maximum concurrent connections
    #[arg(short, long, default_value = "256")]
    max_connections: usize,

    /// WAL entries before compaction (snapshot + truncate)
    #[arg(short = 'c', long, default_value = "1024")]
    compact_threshold: u64,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,beatvault=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("BeatVault Server v{}", beatvault::VERSION);
    tracing::info!("Data directory: {}", args.data_dir);
    tracing::info!("Listen address: {}", args.listen);

    let config = Config::builder()
        .data_dir(&args.data_dir)
        .listen_addr(&args.listen)
        .max_connections(args.max_connections)
        .wal_compact_threshold(args.compact_threshold)
        .build();

    let service = match CatalogService::open(&config) {
        Ok(s) => Arc::new(Mutex::new(s)),
        Err(e) => {
            tracing::error!("Failed to open catalog: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Catalog opened with {} beats", service.lock().len());

    let mut server = Server::new(config, service);
    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}

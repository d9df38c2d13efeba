//! BeatVault CLI Client
//!
//! Command-line interface for interacting with a running BeatVault server.

use std::net::TcpStream;

use clap::{Parser, Subcommand};

use beatvault::protocol::{read_response, write_command, Command, Response, Status};
use beatvault::{Beat, BeatPatch, NewBeat, Result, VaultError};

/// BeatVault CLI
#[derive(Parser, Debug)]
#[command(name = "beatvault-cli")]
#[command(about = "CLI for the BeatVault catalog server")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:7878")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a beat
    Create {
        title: String,
        artist: String,
        price: f64,
        url: String,
    },

    /// List all beats
    List,

    /// Get a beat by id
    Get { id: String },

    /// Update a beat's mutable fields
    Update {
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        artist: Option<String>,

        #[arg(long)]
        price: Option<f64>,

        #[arg(long)]
        url: Option<String>,
    },

    /// Delete a beat
    Delete { id: String },

    /// Mark a beat sold
    Buy { id: String },

    /// Mark a beat featured
    Feature { id: String },

    /// Search beats by artist (case-insensitive substring)
    SearchArtist { query: String },

    /// Search beats by title (case-insensitive substring)
    SearchTitle { query: String },

    /// Ping the server
    Ping,
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let command = build_command(args.command);

    let mut stream = TcpStream::connect(&args.server)?;
    write_command(&mut stream, &command)?;
    let response = read_response(&mut stream)?;

    print_response(&command, response)
}

fn build_command(command: Commands) -> Command {
    match command {
        Commands::Create {
            title,
            artist,
            price,
            url,
        } => Command::Create {
            new: NewBeat {
                title,
                artist,
                price,
                url,
            },
        },
        Commands::List => Command::GetAll,
        Commands::Get { id } => Command::GetById { id },
        Commands::Update {
            id,
            title,
            artist,
            price,
            url,
        } => Command::Update {
            id,
            patch: BeatPatch {
                title,
                artist,
                price,
                url,
            },
        },
        Commands::Delete { id } => Command::Delete { id },
        Commands::Buy { id } => Command::Buy { id },
        Commands::Feature { id } => Command::Feature { id },
        Commands::SearchArtist { query } => Command::SearchArtist { query },
        Commands::SearchTitle { query } => Command::SearchTitle { query },
        Commands::Ping => Command::Ping,
    }
}

fn print_response(command: &Command, response: Response) -> Result<()> {
    match response.status {
        Status::Ok => print_ok(command, response.payload),
        Status::NotFound => Err(VaultError::NotFound),
        Status::AlreadySold => Err(VaultError::AlreadySold),
        Status::Error => {
            let message = response
                .payload
                .map(|p| String::from_utf8_lossy(&p).into_owned())
                .unwrap_or_else(|| "unknown server error".to_string());
            Err(VaultError::Network(message))
        }
    }
}

fn print_ok(command: &Command, payload: Option<Vec<u8>>) -> Result<()> {
    match command {
        Command::Ping => {
            let pong = payload.unwrap_or_default();
            println!("{}", String::from_utf8_lossy(&pong));
        }
        Command::GetAll | Command::SearchArtist { .. } | Command::SearchTitle { .. } => {
            let bytes = payload.ok_or_else(|| {
                VaultError::Protocol("Missing response payload".to_string())
            })?;
            let beats: Vec<Beat> = bincode::deserialize(&bytes)
                .map_err(|e| VaultError::Protocol(format!("Bad response payload: {}", e)))?;
            if beats.is_empty() {
                println!("(no beats)");
            }
            for beat in beats {
                print_beat(&beat);
            }
        }
        _ => {
            let bytes = payload.ok_or_else(|| {
                VaultError::Protocol("Missing response payload".to_string())
            })?;
            let beat: Beat = bincode::deserialize(&bytes)
                .map_err(|e| VaultError::Protocol(format!("Bad response payload: {}", e)))?;
            print_beat(&beat);
        }
    }
    Ok(())
}

fn print_beat(beat: &Beat) {
    let flags = match (beat.sold, beat.featured) {
        (true, true) => " [sold, featured]",
        (true, false) => " [sold]",
        (false, true) => " [featured]",
        (false, false) => "",
    };
    println!(
        "{}  \"{}\" by {} @ {:.2}{}  ({})",
        beat.id, beat.title, beat.artist, beat.price, flags, beat.url
    );
}

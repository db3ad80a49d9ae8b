//! Flache CLI
//!
//! Command-line access to a directory-backed Flache cache.
//!
//! # Commands
//!
//! - `get` - Print the value stored under a key
//! - `set` - Store a value under a key
//! - `delete` - Remove a key
//! - `path` - Show where a key lives on disk
//! - `cat` - Stream a byte range of an entry to stdout

mod commands;

use clap::{Parser, Subcommand};
use flache_core::DEFAULT_CACHE_DIR;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Flache command-line cache tools.
#[derive(Parser)]
#[command(name = "flache")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Root directory of the cache
    #[arg(global = true, short, long, default_value = DEFAULT_CACHE_DIR)]
    path: PathBuf,

    /// Store and print values as plain text instead of JSON
    #[arg(global = true, short, long)]
    raw: bool,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the value stored under a key
    Get {
        /// Cache key
        key: String,
    },

    /// Store a value under a key
    Set {
        /// Cache key
        key: String,
        /// Value (JSON unless --raw)
        value: String,
    },

    /// Remove a key (succeeds if it is absent)
    Delete {
        /// Cache key
        key: String,
    },

    /// Show the entry path of a key
    Path {
        /// Cache key
        key: String,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Stream a byte range of an entry to stdout
    Cat {
        /// Cache key
        key: String,

        /// First byte to output
        #[arg(short, long)]
        start: Option<u64>,

        /// Byte after the last one to output
        #[arg(short, long)]
        end: Option<u64>,
    },

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mode = if cli.raw {
        commands::Mode::Raw
    } else {
        commands::Mode::Json
    };

    match cli.command {
        Commands::Get { key } => {
            let output = commands::get::run(&cli.path, mode, &key).await?;
            match output {
                Some(value) => println!("{value}"),
                None => return Err(format!("no entry for key {key:?}").into()),
            }
        }
        Commands::Set { key, value } => {
            commands::set::run(&cli.path, mode, &key, &value).await?;
        }
        Commands::Delete { key } => {
            commands::delete::run(&cli.path, &key).await?;
        }
        Commands::Path { key, format } => {
            let info = commands::path::run(&cli.path, &key);
            commands::path::print(&info, &format)?;
        }
        Commands::Cat { key, start, end } => {
            let mut stdout = std::io::stdout().lock();
            commands::cat::run(&cli.path, &key, start, end, &mut stdout).await?;
        }
        Commands::Version => {
            println!("Flache CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("Flache Core v{}", flache_core::VERSION);
        }
    }

    Ok(())
}

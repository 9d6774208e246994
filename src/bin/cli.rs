//! SkipKV CLI
//!
//! Runs a single command against a snapshot file: the snapshot is loaded,
//! the command applied, and the snapshot rewritten if anything changed.

use clap::{Parser, Subcommand, ValueEnum};
use skipkv::{Config, SnapshotFormat, Store};
use tracing_subscriber::{fmt, EnvFilter};

/// SkipKV CLI
#[derive(Parser, Debug)]
#[command(name = "skipkv-cli")]
#[command(about = "CLI for the SkipKV snapshot store")]
#[command(version)]
struct Args {
    /// Snapshot file
    #[arg(short, long, default_value = "./store/dumpFile")]
    file: String,

    /// Encoding used when writing the snapshot
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Text,
    Framed,
}

impl From<Format> for SnapshotFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Text => SnapshotFormat::Text,
            Format::Framed => SnapshotFormat::Framed,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: i64,
    },

    /// Set a key-value pair
    Put {
        /// The key to set
        key: i64,

        /// The value to set
        value: String,
    },

    /// Delete a key
    Del {
        /// The key to delete
        key: i64,
    },

    /// List every entry in key order
    List,

    /// Remove every entry
    Clear,
}

impl Commands {
    fn mutates(&self) -> bool {
        matches!(self, Commands::Put { .. } | Commands::Del { .. } | Commands::Clear)
    }
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,skipkv=info"));

    fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();

    let config = Config::builder()
        .snapshot_path(&args.file)
        .snapshot_format(args.format.into())
        .dump_on_drop(false)
        .build();

    let store: Store<i64, String> = match Store::open(config) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("Failed to open store: {}", e);
            std::process::exit(1);
        }
    };

    let mutates = args.command.mutates();
    match args.command {
        Commands::Get { key } => match store.get(&key) {
            Some(value) => println!("{}", value),
            None => {
                eprintln!("Key {} not found", key);
                std::process::exit(2);
            }
        },
        Commands::Put { key, value } => store.put(key, value),
        Commands::Del { key } => {
            if !store.delete(&key) {
                eprintln!("Key {} not found", key);
            }
        }
        Commands::List => {
            for (key, value) in store.iter() {
                println!("{}:{}", key, value);
            }
        }
        Commands::Clear => store.clear(),
    }

    if mutates {
        if let Err(e) = store.close() {
            tracing::error!("Failed to write snapshot {}: {}", args.file, e);
            std::process::exit(1);
        }
    }
}

//! CLI definitions for durq.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// durq CLI.
#[derive(Parser)]
#[command(name = "durq")]
#[command(about = "Durable on-disk priority queue")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path (defaults to ./durq.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Queue database file, overriding the configuration
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Add a message to the queue
    Enqueue {
        /// Priority level, 0 (most urgent) to 255
        #[arg(short, long, default_value_t = 0)]
        priority: i64,

        /// Message payload
        payload: String,
    },

    /// Remove messages in priority order
    Dequeue {
        /// Maximum number of messages to remove
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,
    },

    /// Show how many messages are waiting
    Size {
        /// Only this priority level
        #[arg(short, long)]
        priority: Option<i64>,

        /// Output format (table, json)
        #[arg(long, default_value = "table")]
        format: String,
    },
}

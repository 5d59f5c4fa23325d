//! durq - durable on-disk priority queue
//!
//! Command line entry point.

use std::path::Path;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use durq_config::{Config, ConfigLoader, LoggingSection};
use durq_queue::{Options, PQueue};

mod cli;
mod cmd_queue;

use cli::Cli;
use cmd_queue::run_and_close;

/// Initialize tracing on stderr, leaving stdout to command output.
///
/// `RUST_LOG` wins over the configured level.
fn init_tracing(logging: &LoggingSection) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            logging
                .json
                .then(|| fmt::layer().json().with_writer(std::io::stderr)),
        )
        .with(
            (!logging.json).then(|| {
                fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr)
            }),
        )
        .init();
}

fn load_config(cli: &Cli) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => ConfigLoader::load(path)?,
        None => ConfigLoader::load_or_default(Path::new("durq.toml"))?,
    };
    if let Some(db) = &cli.db {
        config.queue.path = db.clone();
    }
    Ok(config)
}

fn open_options(config: &Config) -> Options {
    Options {
        timeout: config.queue.timeout(),
        read_only: config.queue.read_only,
        initial_mmap_size: config.queue.initial_mmap_size,
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_tracing(&config.logging);

    debug!("Using queue file {}", config.queue.path.display());
    let queue = PQueue::open(&config.queue.path, &open_options(&config))?;

    run_and_close(queue, cli.command)
}

//! Queue subcommand handlers for durq.

use durq_queue::PQueue;
use tracing::warn;

use crate::cli::Commands;

/// Run one command, then close the queue. A command error takes precedence
/// over a close error, which is then only logged.
pub(crate) fn run_and_close(
    queue: PQueue,
    command: Commands,
) -> Result<(), Box<dyn std::error::Error>> {
    let result = handle_queue_command(&queue, command);
    match (result, queue.close()) {
        (Err(err), Err(close_err)) => {
            warn!("Failed to close queue after command error: {}", close_err);
            Err(err)
        }
        (Err(err), Ok(())) => Err(err),
        (Ok(()), closed) => closed.map_err(Into::into),
    }
}

/// Run one queue command against an open queue.
fn handle_queue_command(
    queue: &PQueue,
    command: Commands,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Enqueue { priority, payload } => enqueue(queue, priority, payload),
        Commands::Dequeue { count } => dequeue(queue, count),
        Commands::Size { priority, format } => size(queue, priority, &format),
    }
}

fn enqueue(
    queue: &PQueue,
    priority: i64,
    payload: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let message = queue.enqueue(priority, payload)?;
    if let Some(key) = message.key() {
        println!("{}", key.get());
    }
    Ok(())
}

fn dequeue(queue: &PQueue, count: usize) -> Result<(), Box<dyn std::error::Error>> {
    let mut taken = 0;
    while taken < count {
        let Some(message) = queue.dequeue()? else {
            break;
        };
        let priority = message.priority().map(|p| p.get().to_string()).unwrap_or_default();
        let key = message.key().map(|k| k.get().to_string()).unwrap_or_default();
        println!("{:<10} {:<22} {}", priority, key, message.to_string_lossy());
        taken += 1;
    }

    if taken == 0 {
        println!("empty");
    }
    Ok(())
}

fn size(
    queue: &PQueue,
    priority: Option<i64>,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let sizes: Vec<(String, u64)> = match priority {
        Some(p) => vec![(p.to_string(), queue.size(p)?)],
        None => queue
            .sizes()?
            .into_iter()
            .map(|(p, count)| (p.to_string(), count))
            .collect(),
    };

    match format {
        "json" => {
            let map: serde_json::Map<String, serde_json::Value> = sizes
                .into_iter()
                .map(|(p, count)| (p, serde_json::Value::from(count)))
                .collect();
            println!("{}", serde_json::to_string_pretty(&map)?);
        }
        _ => {
            println!("{:<10} {}", "PRIORITY", "COUNT");
            println!("{}", "-".repeat(20));
            for (p, count) in sizes {
                println!("{:<10} {}", p, count);
            }
        }
    }
    Ok(())
}

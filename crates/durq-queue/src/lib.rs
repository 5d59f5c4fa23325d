//! # durq
//!
//! Durable priority queue for opaque byte payloads.
//!
//! ## Features
//!
//! - 256 priority levels, 0 being the most urgent
//! - Strict FIFO order within a level
//! - Persistence across restarts (SQLite, one file)
//! - Requeue that keeps a message's original precedence
//! - Async handle for tokio applications
//!
//! ```no_run
//! use durq_queue::{Options, PQueue};
//!
//! # fn main() -> Result<(), durq_queue::QueueError> {
//! let queue = PQueue::open("jobs.db", &Options::default())?;
//! queue.enqueue(1, "resize image 42")?;
//! if let Some(message) = queue.dequeue()? {
//!     println!("{} at priority {:?}", message.to_string_lossy(), message.priority());
//! }
//! queue.close()?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod handle;
pub mod index;
pub mod key;
pub mod message;
pub mod priority;
pub mod queue;

pub use durq_store::{StoreError, StoreOptions as Options};
pub use error::QueueError;
pub use handle::AsyncPQueue;
pub use key::{Clock, KeyGenerator, SortKey, SystemClock};
pub use message::Message;
pub use priority::Priority;
pub use queue::PQueue;

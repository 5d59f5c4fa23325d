//! Queue behaviour across close and reopen.

use std::sync::Arc;
use std::time::Duration;

use durq_queue::{Clock, KeyGenerator, Options, PQueue, QueueError, SortKey, StoreError};
use tempfile::TempDir;

/// A clock stuck far in the past.
struct EpochClock;

impl Clock for EpochClock {
    fn now_nanos(&self) -> i64 {
        1
    }
}

#[test]
fn test_messages_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("queue.db");

    let queue = PQueue::open(&path, &Options::default()).unwrap();
    queue.enqueue(1, "a").unwrap();
    queue.enqueue(1, "b").unwrap();
    queue.enqueue(0, "c").unwrap();
    assert_eq!(queue.dequeue().unwrap().unwrap().value(), b"c");
    queue.close().unwrap();

    let queue = PQueue::open(&path, &Options::default()).unwrap();
    assert_eq!(queue.size(1).unwrap(), 2);
    assert_eq!(queue.size(0).unwrap(), 0);
    assert_eq!(queue.dequeue().unwrap().unwrap().value(), b"a");
    assert_eq!(queue.dequeue().unwrap().unwrap().value(), b"b");
    assert!(queue.dequeue().unwrap().is_none());
}

#[test]
fn test_keys_after_reopen_order_after_survivors() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("queue.db");

    let queue = PQueue::open(&path, &Options::default()).unwrap();
    let survivor = queue.enqueue(3, "before restart").unwrap();
    queue.close().unwrap();

    // After the restart the clock reads almost zero; keys must still move forward.
    let keys = Arc::new(KeyGenerator::with_clock(EpochClock));
    let queue = PQueue::open_with_generator(&path, &Options::default(), keys).unwrap();
    let fresh = queue.enqueue(3, "after restart").unwrap();
    assert!(fresh.key().unwrap() > survivor.key().unwrap());

    assert_eq!(queue.dequeue().unwrap().unwrap().value(), b"before restart");
    assert_eq!(queue.dequeue().unwrap().unwrap().value(), b"after restart");
}

#[test]
fn test_requeue_after_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("queue.db");

    let queue = PQueue::open(&path, &Options::default()).unwrap();
    queue.enqueue(2, "first").unwrap();
    let taken = queue.dequeue().unwrap().unwrap();
    queue.close().unwrap();

    let queue = PQueue::open(&path, &Options::default()).unwrap();
    queue.enqueue(2, "second").unwrap();
    queue.requeue(2, &taken).unwrap();

    assert_eq!(queue.dequeue().unwrap().unwrap().key(), taken.key());
    assert_eq!(queue.dequeue().unwrap().unwrap().value(), b"second");
}

#[test]
fn test_read_only_queue() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("queue.db");

    let queue = PQueue::open(&path, &Options::default()).unwrap();
    queue.enqueue(7, "x").unwrap();
    queue.close().unwrap();

    let options = Options::default()
        .with_read_only(true)
        .with_timeout(Duration::from_secs(1));
    let queue = PQueue::open(&path, &options).unwrap();
    assert_eq!(queue.size(7).unwrap(), 1);

    assert!(matches!(
        queue.enqueue(7, "y"),
        Err(QueueError::Storage(StoreError::ReadOnly))
    ));
    assert!(matches!(
        queue.dequeue(),
        Err(QueueError::Storage(StoreError::ReadOnly))
    ));
    assert_eq!(queue.size(7).unwrap(), 1);
}

#[test]
fn test_seeded_generator_reports_last_key() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("queue.db");

    let queue = PQueue::open(&path, &Options::default()).unwrap();
    let stored = queue.enqueue(0, "x").unwrap().key().unwrap();
    queue.close().unwrap();

    let keys = Arc::new(KeyGenerator::with_clock(EpochClock));
    let _queue = PQueue::open_with_generator(&path, &Options::default(), Arc::clone(&keys)).unwrap();
    assert_eq!(keys.last(), Some(stored));
    assert_eq!(keys.next(), SortKey::new(stored.get() + 1));
}

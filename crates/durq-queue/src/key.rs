//! Monotonic sort keys.

use chrono::Utc;
use parking_lot::Mutex;
use tracing::trace;

/// A 64-bit sort key. Doubles as the message identifier.
///
/// Stored as 8 big-endian bytes so byte order matches numeric order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SortKey(u64);

impl SortKey {
    /// Wrap a raw key value.
    pub fn new(value: u64) -> Self {
        SortKey(value)
    }

    /// The raw key value.
    pub fn get(self) -> u64 {
        self.0
    }

    /// Big-endian encoding used on disk.
    pub fn to_bytes(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }

    /// Decode an on-disk key. Returns `None` unless `bytes` is exactly 8 long.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let raw: [u8; 8] = bytes.try_into().ok()?;
        Some(SortKey(u64::from_be_bytes(raw)))
    }
}

/// Source of wall-clock time in nanoseconds since the Unix epoch.
pub trait Clock: Send + Sync {
    /// Current time. May go backward.
    fn now_nanos(&self) -> i64;
}

/// The system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_nanos(&self) -> i64 {
        Utc::now().timestamp_nanos_opt().unwrap_or(i64::MAX)
    }
}

/// Mints strictly increasing sort keys.
///
/// Keys follow the clock, except when the clock reads at or below the last
/// key issued (same tick, or time went backward); then the next key is
/// `last + 1`. Minting is serialized by a mutex, so concurrent callers never
/// receive the same key.
pub struct KeyGenerator {
    clock: Box<dyn Clock>,
    last: Mutex<u64>,
}

impl KeyGenerator {
    /// Generator driven by the system clock.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    /// Generator driven by a custom clock.
    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            clock: Box::new(clock),
            last: Mutex::new(0),
        }
    }

    /// Mint the next key.
    pub fn next(&self) -> SortKey {
        let mut last = self.last.lock();
        // Pre-epoch readings count as 0 and fall through to `last + 1`.
        let now = u64::try_from(self.clock.now_nanos()).unwrap_or(0);

        let key = if now > *last {
            now
        } else {
            if now < *last {
                trace!("Clock reads {} behind last key {}", now, *last);
            }
            match last.checked_add(1) {
                Some(key) => key,
                None => panic!("sort key space exhausted"),
            }
        };

        *last = key;
        SortKey(key)
    }

    /// Ensure every later key is strictly greater than `key`.
    pub fn observe(&self, key: SortKey) {
        let mut last = self.last.lock();
        if key.0 > *last {
            *last = key.0;
        }
    }

    /// The most recent key issued or observed, if any.
    pub fn last(&self) -> Option<SortKey> {
        let last = *self.last.lock();
        (last > 0).then_some(SortKey(last))
    }
}

impl Default for KeyGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "key_tests.rs"]
mod tests;

//! Shared counters mutated by workers and read by the renderer.
//!
//! A [`Counter`] is a pair of atomics: the current value and an optional maximum.
//! Cloning is an `Arc` bump, every clone sees the same value. All mutations are single
//! atomic read-modify-write operations, so concurrent `inc` calls never lose updates and
//! the refresh thread never takes a lock to read them.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

/// Stored in `max` when the maximum is unknown.
const NO_MAX: u64 = u64::MAX;

/// A thread-safe, cloneable progress counter with an optional maximum.
#[derive(Clone, Debug)]
pub struct Counter {
    value: Arc<AtomicU64>,
    max: Arc<AtomicU64>,
}

impl Counter {
    /// Creates a counter starting at 0 with no known maximum.
    #[must_use]
    pub fn new() -> Self {
        Self::from_atomic(Arc::new(AtomicU64::new(0)), None)
    }

    /// Creates a counter starting at 0 which is expected to reach `max`.
    #[must_use]
    pub fn with_max(max: u64) -> Self {
        Self::from_atomic(Arc::new(AtomicU64::new(0)), Some(max))
    }

    /// Wraps an existing atomic, e.g. one already shared with other parts of the program.
    #[must_use]
    pub fn from_atomic(value: Arc<AtomicU64>, max: Option<u64>) -> Self {
        Counter {
            value,
            max: Arc::new(AtomicU64::new(encode_max(max))),
        }
    }

    /// Increments the counter by one.
    pub fn inc(&self) {
        self.add(1);
    }

    /// Adds `amount` to the counter.
    pub fn add(&self, amount: u64) {
        self.value.fetch_add(amount, Ordering::Relaxed);
    }

    /// Subtracts `amount`, saturating at zero.
    ///
    /// The renderer treats a decreasing counter as a stall.
    pub fn sub(&self, amount: u64) {
        self.value
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| {
                Some(v.saturating_sub(amount))
            })
            .ok();
    }

    /// Sets the absolute value.
    pub fn set(&self, value: u64) {
        self.value.store(value, Ordering::Relaxed);
    }

    /// Returns the current value.
    #[must_use]
    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }

    /// Returns the maximum the counter is expected to reach, if known.
    #[must_use]
    pub fn max(&self) -> Option<u64> {
        decode_max(self.max.load(Ordering::Relaxed))
    }

    /// Sets or clears the maximum. May be called while the bar is displayed.
    pub fn set_max(&self, max: Option<u64>) {
        self.max.store(encode_max(max), Ordering::Relaxed);
    }

    /// Sets the value back to zero.
    pub fn reset(&self) {
        self.set(0);
    }

    /// Returns the shared atomic holding the value.
    #[must_use]
    pub fn atomic(&self) -> Arc<AtomicU64> {
        self.value.clone()
    }
}

impl Default for Counter {
    fn default() -> Self {
        Self::new()
    }
}

fn encode_max(max: Option<u64>) -> u64 {
    // u64::MAX itself is indistinguishable from "unknown"; one less is close enough.
    max.map_or(NO_MAX, |m| m.min(NO_MAX - 1))
}

fn decode_max(raw: u64) -> Option<u64> {
    (raw != NO_MAX).then_some(raw)
}

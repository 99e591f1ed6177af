//! The counter state machine.
//!
//! ```text
//!            increment(delta)
//!   ┌──────┐ ───────────────▶ ┌────────────┐
//!   │ Idle │                  │ Committing │
//!   └──────┘ ◀─────────────── └────────────┘
//!        ▲      CAS succeeds        │
//!        │   (point of no return)   │ CAS lost, retry
//!        └──────────────────────────┘
//! ```
//!
//! The value lives in a single `AtomicI64`. An increment computes the new
//! value from a snapshot and publishes it with one compare-and-swap; if
//! another writer committed in between, it recomputes from the fresh value.
//! Readers perform one atomic load and so see either the value before a
//! commit or the value after it, never anything in between.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use tracing::debug;

use crate::error::{CounterError, Result};

/// A shared, monotonically nondecreasing signed counter.
///
/// Share it behind an `Arc`; every method takes `&self`.
#[derive(Debug, Default)]
pub struct Counter {
    value: AtomicI64,
    commits: AtomicU64,
}

impl Counter {
    /// Creates a counter at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a counter starting at `value`.
    pub fn with_value(value: i64) -> Self {
        Self {
            value: AtomicI64::new(value),
            commits: AtomicU64::new(0),
        }
    }

    /// Returns the current committed value.
    pub fn read(&self) -> i64 {
        self.value.load(Ordering::Acquire)
    }

    /// Atomically adds `delta` and returns the new value.
    ///
    /// A zero delta is a real commit: it is ordered with the other writers
    /// and returns the unchanged value.
    ///
    /// # Errors
    ///
    /// - [`CounterError::InvalidDelta`] if `delta` is negative.
    /// - [`CounterError::Overflow`] if the result would exceed `i64::MAX`.
    ///
    /// The counter is unchanged on either error.
    pub fn increment(&self, delta: i64) -> Result<i64> {
        if delta < 0 {
            return Err(CounterError::InvalidDelta {
                reason: format!("delta must be non-negative, got {delta}"),
            });
        }

        let mut current = self.value.load(Ordering::Acquire);
        loop {
            let next = current
                .checked_add(delta)
                .ok_or(CounterError::Overflow { current, delta })?;

            match self.value.compare_exchange_weak(
                current,
                next,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    self.commits.fetch_add(1, Ordering::Relaxed);
                    debug!(delta, value = next, "counter committed");
                    return Ok(next);
                }
                Err(observed) => current = observed,
            }
        }
    }

    /// Returns how many increments have committed, zero deltas included.
    ///
    /// Updated just after each commit, so it may briefly trail [`read`](Self::read).
    pub fn commits(&self) -> u64 {
        self.commits.load(Ordering::Relaxed)
    }
}

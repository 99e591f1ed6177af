//! # tally-counter: the shared counter
//!
//! A single signed 64-bit value that many request handlers read and
//! increment concurrently. All mutation goes through one compare-and-swap,
//! so increments are totally ordered, none is lost, and readers never see a
//! half-applied update.
//!
//! ```
//! use tally_counter::{Counter, CounterError, Delta};
//!
//! let counter = Counter::new();
//! let delta = Delta::parse(Some(&serde_json::json!(5)))?;
//! assert_eq!(counter.increment(delta.get())?, 5);
//! assert_eq!(counter.read(), 5);
//! # Ok::<(), CounterError>(())
//! ```

mod counter;
mod delta;
mod error;

pub use counter::Counter;
pub use delta::Delta;
pub use error::{CounterError, Result};

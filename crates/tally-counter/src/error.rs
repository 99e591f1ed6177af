//! Counter error types.

use thiserror::Error;

/// Result type for counter operations.
pub type Result<T> = std::result::Result<T, CounterError>;

/// Errors that can occur while changing the counter.
///
/// Both variants are recoverable and leave the counter untouched. Messages
/// describe what was wrong with the request, never the counter's internals.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CounterError {
    /// The increment payload was not a non-negative integer in range.
    #[error("invalid increment value: {reason}")]
    InvalidDelta { reason: String },

    /// Applying the delta would exceed the counter's range.
    #[error("increment of {delta} would overflow the counter")]
    Overflow { current: i64, delta: i64 },
}

impl CounterError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidDelta {
            reason: reason.into(),
        }
    }

    /// Returns true if this is an `InvalidDelta` error.
    pub fn is_invalid_delta(&self) -> bool {
        matches!(self, Self::InvalidDelta { .. })
    }

    /// Returns true if this is an `Overflow` error.
    pub fn is_overflow(&self) -> bool {
        matches!(self, Self::Overflow { .. })
    }
}

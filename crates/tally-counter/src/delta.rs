//! Validated increment amounts.
//!
//! Request payloads arrive untyped. [`Delta::parse`] is the only way from a
//! JSON value to a counter delta: it accepts JSON integers in `0..=i64::MAX`
//! and rejects everything else with [`CounterError::InvalidDelta`] instead of
//! coercing.

use serde_json::Value;

use crate::error::{CounterError, Result};

/// A validated, non-negative increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Delta(i64);

impl Delta {
    /// The delta applied when a request does not name one.
    pub const DEFAULT: Delta = Delta(1);

    /// Creates a delta from a plain integer.
    pub fn new(value: i64) -> Result<Self> {
        if value < 0 {
            return Err(CounterError::invalid(format!(
                "must be non-negative, got {value}"
            )));
        }
        Ok(Self(value))
    }

    /// Parses an optional JSON payload value.
    ///
    /// `None` (the field was absent) yields [`Delta::DEFAULT`]. A present
    /// `null` is rejected like any other non-integer.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde_json::json;
    /// use tally_counter::Delta;
    ///
    /// assert_eq!(Delta::parse(Some(&json!(5))).unwrap().get(), 5);
    /// assert_eq!(Delta::parse(None).unwrap(), Delta::DEFAULT);
    /// assert!(Delta::parse(Some(&json!("abc"))).is_err());
    /// ```
    pub fn parse(payload: Option<&Value>) -> Result<Self> {
        let Some(value) = payload else {
            return Ok(Self::DEFAULT);
        };

        match value {
            Value::Number(n) => {
                if let Some(v) = n.as_i64() {
                    Self::new(v)
                } else if n.is_u64() {
                    Err(CounterError::invalid(format!("{n} is out of range")))
                } else {
                    Err(CounterError::invalid(format!("{n} is not an integer")))
                }
            }
            Value::Null => Err(CounterError::invalid("must be an integer, got null")),
            Value::Bool(_) => Err(CounterError::invalid("must be an integer, got a boolean")),
            Value::String(_) => Err(CounterError::invalid("must be an integer, got a string")),
            Value::Array(_) => Err(CounterError::invalid("must be an integer, got an array")),
            Value::Object(_) => Err(CounterError::invalid("must be an integer, got an object")),
        }
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl Default for Delta {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<Delta> for i64 {
    fn from(delta: Delta) -> Self {
        delta.0
    }
}

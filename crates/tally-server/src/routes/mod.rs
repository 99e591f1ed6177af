//! HTTP route handlers.

pub mod counter;
pub mod health;

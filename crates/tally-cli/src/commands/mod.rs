//! CLI command implementations.

pub mod config;
pub mod roles;
pub mod start;
pub mod version;

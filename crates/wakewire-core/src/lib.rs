//! `WakeWire` Core Library
//!
//! Shared plumbing for WakeWire components:
//! - SQLite pool helpers used by the relay storage layer
//! - Unix timestamp helpers (the wire protocol uses milliseconds)
//! - Common tracing/logging initialization

pub mod db;
pub mod time;
pub mod tracing_init;

pub use db::DatabaseError;
pub use time::{unix_timestamp, unix_timestamp_millis};

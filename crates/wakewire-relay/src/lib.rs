//! `WakeWire` Relay Server Library
//!
//! Core functionality for the relay:
//! - SQLite storage for users, devices, and the message queue
//! - HTTP API (push/pull, device registration, stats)
//! - Retention sweep for stale queued messages

pub mod server;
pub mod storage;
pub mod sweep;
pub mod token;

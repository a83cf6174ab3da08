//! SQLite storage for the WakeWire relay server.
//!
//! Provides persistence for users, devices, and the store-and-forward
//! message queue.

mod db;
mod models;
mod queries;
mod queries_queue;

#[cfg(test)]
mod tests;

pub use db::RelayDatabase;
pub use models::*;
pub use wakewire_core::DatabaseError;

//! WakeWire controller library.
//!
//! Everything the `wakewire` binary does lives here: persistent
//! configuration and the device book under `~/.wakewire/`, the two
//! transports (direct TCP and cloud relay) and the relay management
//! API client.

pub mod api;
pub mod config;
pub mod devices;
pub mod mac;
pub mod transport;

pub use config::ClientConfig;
pub use devices::{DeviceBook, DeviceEntry};
pub use transport::{Transport, TransportError};

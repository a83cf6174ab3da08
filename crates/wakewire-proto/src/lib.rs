//! `WakeWire` Protocol Library
//!
//! Everything both ends of the protocol must agree on:
//!
//! - [`Command`]/[`Response`]: the JSON payloads exchanged with a device
//! - [`PacketCodec`]: the encrypted, length-prefixed envelope shared by
//!   the direct TCP transport and the cloud relay
//! - [`relay`]: request/response bodies of the relay HTTP API, used by
//!   both the client and the server so the surface cannot drift

pub mod command;
pub mod error;
pub mod packet;
pub mod relay;

pub use command::{Command, Response, ResponseStatus};
pub use error::PacketError;
pub use packet::{MAX_PLAINTEXT_LEN, MIN_PACKET_LEN, PacketCodec};

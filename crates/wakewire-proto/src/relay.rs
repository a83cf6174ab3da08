//! Relay HTTP API wire types.
//!
//! Shared by the cloud transport handler and the relay server so the
//! JSON surface is defined exactly once. Encrypted payloads are opaque
//! hex strings here; the relay never holds a device key.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `msg_type` used for controller-to-device commands.
pub const MSG_TYPE_COMMAND: &str = "command";

/// Queue direction for messages awaiting a device poll.
pub const DIRECTION_TO_DEVICE: &str = "to_device";

/// Queue direction for device responses awaiting a controller.
pub const DIRECTION_TO_CLIENT: &str = "to_client";

/// `POST /api/push` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushRequest {
    pub device_token: String,
    pub msg_type: String,
    pub encrypted_payload: String,
    #[serde(default)]
    pub is_response: bool,
}

/// `POST /api/push` success body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushAck {
    pub status: String,
    pub message: String,
}

/// `POST /api/pull` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
    pub device_token: String,
    pub device_id: String,
}

/// One dequeued mailbox entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueuedMessage {
    #[serde(rename = "type")]
    pub msg_type: String,
    /// Opaque encrypted envelope (hex).
    pub data: String,
    pub direction: String,
}

/// `POST /api/pull` success body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullResponse {
    pub messages: Vec<QueuedMessage>,
    pub count: usize,
}

/// `POST /api/register_device` request body (credential in headers).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterDeviceRequest {
    pub device_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_data: Option<Map<String, Value>>,
}

/// `POST /api/register_device` success body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterDeviceResponse {
    pub status: String,
    pub device_id: String,
    pub device_token: String,
    pub mode: String,
}

/// `POST /api/delete_device` request body (credential in headers).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteDeviceRequest {
    pub device_token: String,
}

/// One device in the `GET /api/devices` listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceView {
    pub device_id: String,
    pub device_token: String,
    pub cloud: bool,
    /// Derived: `last_seen` within the online window.
    pub online: bool,
    /// Seconds since epoch; `None` until the first poll.
    pub last_seen: Option<i64>,
    pub poll_count: i64,
    pub added: i64,
}

/// `GET /api/devices` success body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDevicesResponse {
    pub user: String,
    pub plan: String,
    pub devices_limit: i64,
    pub devices_count: usize,
    pub devices: Vec<DeviceView>,
}

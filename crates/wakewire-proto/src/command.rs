//! Command and response payloads.
//!
//! A [`Command`] is built fresh per call, serialized to compact JSON and
//! encrypted into an envelope. The device answers with an arbitrary JSON
//! object carrying at least a `status` field; [`Response`] wraps that
//! object without constraining the rest of its shape.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use wakewire_core::unix_timestamp_millis;

/// A command addressed to a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub command: String,
    /// Always present on the wire, even when empty; the firmware parser
    /// expects the key.
    pub data: Map<String, Value>,
    pub device_id: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl Command {
    /// Build a command stamped with the current time.
    pub fn new(
        command: impl Into<String>,
        data: Map<String, Value>,
        device_id: impl Into<String>,
    ) -> Self {
        Self {
            command: command.into(),
            data,
            device_id: device_id.into(),
            timestamp: unix_timestamp_millis(),
        }
    }

    /// Build a command with no arguments.
    pub fn bare(command: impl Into<String>, device_id: impl Into<String>) -> Self {
        Self::new(command, Map::new(), device_id)
    }

    pub fn ping(device_id: impl Into<String>) -> Self {
        Self::bare("ping", device_id)
    }

    pub fn wake(device_id: impl Into<String>, mac: &str) -> Self {
        let mut data = Map::new();
        data.insert("mac".into(), Value::String(mac.to_owned()));
        Self::new("wake", data, device_id)
    }

    pub fn info(device_id: impl Into<String>) -> Self {
        Self::bare("info", device_id)
    }

    pub fn restart(device_id: impl Into<String>) -> Self {
        Self::bare("restart", device_id)
    }

    pub fn ota_start(device_id: impl Into<String>) -> Self {
        Self::bare("ota_start", device_id)
    }

    pub fn open_setup(device_id: impl Into<String>) -> Self {
        Self::bare("open_setup", device_id)
    }

    /// Toggle or query the device's built-in web interface
    /// (`action` is one of `enable`, `disable`, `status`).
    pub fn web_control(device_id: impl Into<String>, action: &str) -> Self {
        let mut data = Map::new();
        data.insert("action".into(), Value::String(action.to_owned()));
        Self::new("web_control", data, device_id)
    }

    pub fn crypto_info(device_id: impl Into<String>) -> Self {
        Self::bare("crypto_info", device_id)
    }
}

/// Status field of a device response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStatus {
    Success,
    Error,
    Timeout,
    Unknown,
}

/// A decrypted device response: a JSON object with at least `status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Response {
    fields: Map<String, Value>,
}

impl Response {
    pub const fn from_map(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Structured error result, e.g. `{"status":"error","error":"TIMEOUT"}`.
    pub fn error(code: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert("status".into(), Value::String("error".into()));
        fields.insert("error".into(), Value::String(code.into()));
        Self { fields }
    }

    /// Timeout result used when the relay mailbox came back empty.
    pub fn timeout(message: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert("status".into(), Value::String("timeout".into()));
        fields.insert("message".into(), Value::String(message.into()));
        Self { fields }
    }

    pub fn status(&self) -> ResponseStatus {
        match self.fields.get("status").and_then(Value::as_str) {
            Some("success") => ResponseStatus::Success,
            Some("error") => ResponseStatus::Error,
            Some("timeout") => ResponseStatus::Timeout,
            _ => ResponseStatus::Unknown,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub const fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

impl From<Map<String, Value>> for Response {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn command_serializes_with_empty_data_object() {
        let cmd = Command::ping("esp1");
        let json = serde_json::to_string(&cmd).unwrap();
        assert!(json.contains("\"data\":{}"), "data key must survive: {json}");
        assert!(json.contains("\"command\":\"ping\""));
        assert!(json.contains("\"device_id\":\"esp1\""));
    }

    #[test]
    fn wake_command_carries_mac() {
        let cmd = Command::wake("esp1", "aa:bb:cc:dd:ee:ff");
        assert_eq!(
            cmd.data.get("mac").and_then(Value::as_str),
            Some("aa:bb:cc:dd:ee:ff")
        );
    }

    #[test]
    fn response_status_parsing() {
        let ok: Response =
            serde_json::from_str(r#"{"status":"success","uptime":42}"#).unwrap();
        assert_eq!(ok.status(), ResponseStatus::Success);

        assert_eq!(Response::error("TIMEOUT").status(), ResponseStatus::Error);
        assert_eq!(
            Response::timeout("No response from device").status(),
            ResponseStatus::Timeout
        );

        let odd: Response = serde_json::from_str(r#"{"ok":true}"#).unwrap();
        assert_eq!(odd.status(), ResponseStatus::Unknown);
    }
}

//! Data models for relay storage.

use serde::{Deserialize, Serialize};

/// Account that owns devices; authorized by its `api_token`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub username: String,
    pub api_token: String,
    pub plan: String,
    pub devices_limit: i64,
    pub created_at: i64,
}

/// Registered device identity. The `device_token` is both the mailbox
/// routing key and (outside the relay) the key-derivation secret.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Device {
    pub id: i64,
    pub device_id: String,
    pub device_token: String,
    pub user_id: String,
    pub cloud: i64,
    /// Seconds since epoch; `None` until the first pull.
    pub last_seen: Option<i64>,
    pub poll_count: i64,
    pub added: i64,
    /// Registration metadata as a JSON blob.
    pub device_data: String,
}

impl Device {
    /// Online iff seen within `window_secs` of `now`. A device that has
    /// never pulled is always offline.
    pub fn is_online(&self, now: i64, window_secs: i64) -> bool {
        self.last_seen
            .is_some_and(|seen| now - seen < window_secs)
    }
}

/// One queued mailbox entry holding an opaque encrypted envelope.
/// Never updated in place: consumed by a pull or reclaimed by the sweep.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Message {
    pub id: i64,
    pub device_token: String,
    pub device_id: String,
    pub message_type: String,
    pub message_data: String,
    pub direction: String,
    pub timestamp: i64,
}

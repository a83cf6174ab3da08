//! Device book.
//!
//! Named device entries persisted to `~/.wakewire/devices.json`. A direct
//! entry carries an address and the device token; a cloud entry carries
//! the device token plus the user's API token for management calls. The
//! token doubles as the encryption key source in both modes.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use wakewire_core::unix_timestamp;

use crate::config::ClientConfig;

/// Default TCP port devices listen on in direct mode.
pub const DEFAULT_DIRECT_PORT: u16 = 99;

/// One saved device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceEntry {
    /// Device token; the shared secret both ends derive the key from.
    pub token: String,
    pub device_id: String,
    #[serde(default)]
    pub cloud: bool,
    /// Direct mode only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Cloud mode only: user API token for the relay management API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    /// Seconds since epoch when the entry was saved.
    #[serde(default)]
    pub added: i64,
}

const fn default_port() -> u16 {
    DEFAULT_DIRECT_PORT
}

impl DeviceEntry {
    /// New direct-mode entry.
    pub fn direct(
        device_id: impl Into<String>,
        token: impl Into<String>,
        ip: impl Into<String>,
        port: u16,
    ) -> Self {
        Self {
            token: token.into(),
            device_id: device_id.into(),
            cloud: false,
            ip: Some(ip.into()),
            port,
            api_token: None,
            added: unix_timestamp(),
        }
    }

    /// New cloud-mode entry.
    pub fn cloud(
        device_id: impl Into<String>,
        token: impl Into<String>,
        api_token: impl Into<String>,
    ) -> Self {
        Self {
            token: token.into(),
            device_id: device_id.into(),
            cloud: true,
            ip: None,
            port: DEFAULT_DIRECT_PORT,
            api_token: Some(api_token.into()),
            added: unix_timestamp(),
        }
    }
}

/// The device book: named entries, persisted as one JSON object.
#[derive(Debug, Default)]
pub struct DeviceBook {
    path: PathBuf,
    devices: BTreeMap<String, DeviceEntry>,
}

impl DeviceBook {
    /// Default path: `~/.wakewire/devices.json`.
    pub fn default_path() -> Option<PathBuf> {
        ClientConfig::config_dir().map(|d| d.join("devices.json"))
    }

    /// Open the book at the default path. A missing or unreadable file
    /// yields an empty book; it is created on the first save.
    pub fn open() -> anyhow::Result<Self> {
        let path = Self::default_path()
            .ok_or_else(|| anyhow::anyhow!("Cannot determine home directory"))?;
        Ok(Self::open_at(path))
    }

    /// Open the book at an explicit path.
    pub fn open_at(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let devices = std::fs::read_to_string(&path)
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default();
        Self { path, devices }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, name: &str) -> Option<&DeviceEntry> {
        self.devices.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &DeviceEntry)> {
        self.devices.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Insert or replace an entry and persist the book.
    pub fn add(&mut self, name: impl Into<String>, entry: DeviceEntry) -> anyhow::Result<()> {
        self.devices.insert(name.into(), entry);
        self.save()
    }

    /// Remove an entry and persist the book. Returns whether it existed.
    pub fn remove(&mut self, name: &str) -> anyhow::Result<bool> {
        let existed = self.devices.remove(name).is_some();
        if existed {
            self.save()?;
        }
        Ok(existed)
    }

    fn save(&self) -> anyhow::Result<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(&self.devices)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

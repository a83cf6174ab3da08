//! Relay management API client.
//!
//! Registration, listing and deletion of cloud devices. These calls act
//! on the user's account, so they authenticate with the API token
//! (`Authorization: Bearer`), not a device token.

use std::time::Duration;

use anyhow::Context;
use wakewire_proto::relay::{
    DeleteDeviceRequest, RegisterDeviceRequest, RegisterDeviceResponse, UserDevicesResponse,
};

pub struct RelayApi {
    http: reqwest::Client,
    base_url: String,
    api_token: String,
}

impl RelayApi {
    pub fn new(base_url: &str, api_token: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_token: api_token.to_owned(),
        })
    }

    pub async fn register_device(
        &self,
        device_id: &str,
    ) -> anyhow::Result<RegisterDeviceResponse> {
        let resp = self
            .http
            .post(format!("{}/api/register_device", self.base_url))
            .bearer_auth(&self.api_token)
            .json(&RegisterDeviceRequest {
                device_id: device_id.to_owned(),
                device_data: None,
            })
            .send()
            .await?;
        Ok(checked(resp).await?.json().await?)
    }

    pub async fn list_devices(&self) -> anyhow::Result<UserDevicesResponse> {
        let resp = self
            .http
            .get(format!("{}/api/devices", self.base_url))
            .bearer_auth(&self.api_token)
            .send()
            .await?;
        Ok(checked(resp).await?.json().await?)
    }

    pub async fn delete_device(&self, device_token: &str) -> anyhow::Result<()> {
        let resp = self
            .http
            .post(format!("{}/api/delete_device", self.base_url))
            .bearer_auth(&self.api_token)
            .json(&DeleteDeviceRequest {
                device_token: device_token.to_owned(),
            })
            .send()
            .await?;
        checked(resp).await?;
        Ok(())
    }
}

/// Turn a non-2xx reply into an error carrying the relay's message.
async fn checked(resp: reqwest::Response) -> anyhow::Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let message = resp
        .json::<serde_json::Value>()
        .await
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_owned))
        .unwrap_or_else(|| "relay error".to_owned());
    anyhow::bail!("Relay returned {status}: {message}")
}

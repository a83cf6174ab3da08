//! WakeWire CLI
//!
//! Sends encrypted commands to devices from the local device book,
//! either directly over TCP or through the cloud relay, and manages
//! device registrations on both sides.

use std::io;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wakewire_client::api::RelayApi;
use wakewire_client::devices::DEFAULT_DIRECT_PORT;
use wakewire_client::mac::normalize_mac;
use wakewire_client::transport::{CloudTransport, DirectTransport};
use wakewire_client::{ClientConfig, DeviceBook, DeviceEntry, Transport};
use wakewire_proto::Command;

#[derive(Parser, Debug)]
#[command(name = "wakewire")]
#[command(version, about = "WakeWire controller - encrypted commands for remote devices")]
struct Cli {
    /// Relay server base URL (overrides the saved config)
    #[arg(long, env = "WAKEWIRE_SERVER")]
    server: Option<String>,

    /// Transport timeout in seconds (overrides the saved config)
    #[arg(long)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Ping a device
    Ping { device: String },
    /// Wake a machine behind the device by MAC address
    Wake { device: String, mac: String },
    /// Query device information
    Info { device: String },
    /// Restart the device
    Restart { device: String },
    /// Put the device into OTA update mode
    OtaStart { device: String },
    /// Open the device's setup access point
    OpenSetup { device: String },
    /// Control the device's built-in web interface
    Web {
        device: String,
        #[arg(value_parser = ["enable", "disable", "status"])]
        action: String,
    },
    /// Show the device's crypto details
    CryptoInfo { device: String },
    /// Manage the local device book
    #[command(subcommand)]
    Device(DeviceCmd),
    /// Manage cloud registrations on the relay
    #[command(subcommand)]
    Cloud(CloudCmd),
}

#[derive(Subcommand, Debug)]
enum DeviceCmd {
    /// Save a device under a name
    Add {
        name: String,
        /// Device token (shared encryption secret)
        #[arg(long)]
        token: String,
        /// Device IP address (direct mode)
        #[arg(long)]
        ip: Option<String>,
        #[arg(long, default_value_t = DEFAULT_DIRECT_PORT)]
        port: u16,
        /// Reach this device through the cloud relay
        #[arg(long)]
        cloud: bool,
        /// User API token (cloud mode)
        #[arg(long)]
        api_token: Option<String>,
        /// Device ID if it differs from the name
        #[arg(long)]
        device_id: Option<String>,
    },
    /// List saved devices
    List,
    /// Remove a saved device
    Remove { name: String },
}

#[derive(Subcommand, Debug)]
enum CloudCmd {
    /// Register a device on the relay and mint its token
    Register {
        #[arg(long, env = "WAKEWIRE_API_TOKEN")]
        api_token: String,
        #[arg(long)]
        device_id: String,
    },
    /// List devices registered under your account
    Devices {
        #[arg(long, env = "WAKEWIRE_API_TOKEN")]
        api_token: String,
    },
    /// Deregister a device from the relay
    Delete {
        #[arg(long, env = "WAKEWIRE_API_TOKEN")]
        api_token: String,
        #[arg(long)]
        device_token: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout is reserved for command output.
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "wakewire=warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = ClientConfig::load();
    let server_url = cli.server.clone().unwrap_or_else(|| config.server_url.clone());
    let timeout = Duration::from_secs(cli.timeout.unwrap_or(config.default_timeout_secs));

    match &cli.command {
        Cmd::Ping { device } => run_command(device, &server_url, timeout, Command::ping).await,
        Cmd::Info { device } => run_command(device, &server_url, timeout, Command::info).await,
        Cmd::Restart { device } => {
            run_command(device, &server_url, timeout, Command::restart).await
        }
        Cmd::OtaStart { device } => {
            run_command(device, &server_url, timeout, Command::ota_start).await
        }
        Cmd::OpenSetup { device } => {
            run_command(device, &server_url, timeout, Command::open_setup).await
        }
        Cmd::CryptoInfo { device } => {
            run_command(device, &server_url, timeout, Command::crypto_info).await
        }
        Cmd::Wake { device, mac } => {
            let mac = normalize_mac(mac)
                .with_context(|| format!("Invalid MAC address: {mac}"))?;
            run_command(device, &server_url, timeout, move |id| {
                Command::wake(id, &mac)
            })
            .await
        }
        Cmd::Web { device, action } => {
            run_command(device, &server_url, timeout, move |id| {
                Command::web_control(id, action)
            })
            .await
        }
        Cmd::Device(cmd) => run_device_cmd(cmd),
        Cmd::Cloud(cmd) => run_cloud_cmd(cmd, &server_url, timeout).await,
    }
}

/// Resolve a device book entry, build its transport, send one command
/// and print the response.
async fn run_command(
    name: &str,
    server_url: &str,
    timeout: Duration,
    make: impl FnOnce(String) -> Command,
) -> anyhow::Result<()> {
    let book = DeviceBook::open()?;
    let entry = book.get(name).with_context(|| {
        format!("Device '{name}' not found; add it with 'wakewire device add'")
    })?;

    let transport = if entry.cloud {
        Transport::Cloud(CloudTransport::new(
            server_url,
            &entry.token,
            &entry.device_id,
            timeout,
        )?)
    } else {
        let ip = entry
            .ip
            .as_deref()
            .with_context(|| format!("Device '{name}' has no IP address"))?;
        Transport::Direct(DirectTransport::new(ip, entry.port, &entry.token, timeout))
    };

    let command = make(entry.device_id.clone());
    let response = transport.send_command(&command).await;
    print_json(response.fields())
}

fn run_device_cmd(cmd: &DeviceCmd) -> anyhow::Result<()> {
    let mut book = DeviceBook::open()?;
    match cmd {
        DeviceCmd::Add {
            name,
            token,
            ip,
            port,
            cloud,
            api_token,
            device_id,
        } => {
            let device_id = device_id.clone().unwrap_or_else(|| name.clone());
            let entry = if *cloud {
                let api_token = api_token
                    .as_deref()
                    .context("--api-token is required for cloud devices")?;
                DeviceEntry::cloud(device_id, token.as_str(), api_token)
            } else {
                let ip = ip.as_deref().context("--ip is required for direct devices")?;
                DeviceEntry::direct(device_id, token.as_str(), ip, *port)
            };
            book.add(name.clone(), entry)?;
            print_json(&serde_json::json!({"status": "success", "added": name}))
        }
        DeviceCmd::List => {
            let mut listing = serde_json::Map::new();
            for (name, entry) in book.iter() {
                listing.insert(name.clone(), serde_json::to_value(entry)?);
            }
            print_json(&Value::Object(listing))
        }
        DeviceCmd::Remove { name } => {
            if !book.remove(name)? {
                bail!("Device '{name}' not found");
            }
            print_json(&serde_json::json!({"status": "success", "removed": name}))
        }
    }
}

async fn run_cloud_cmd(cmd: &CloudCmd, server_url: &str, timeout: Duration) -> anyhow::Result<()> {
    match cmd {
        CloudCmd::Register {
            api_token,
            device_id,
        } => {
            let api = RelayApi::new(server_url, api_token, timeout)?;
            let resp = api.register_device(device_id).await?;
            print_json(&resp)
        }
        CloudCmd::Devices { api_token } => {
            let api = RelayApi::new(server_url, api_token, timeout)?;
            let resp = api.list_devices().await?;
            print_json(&resp)
        }
        CloudCmd::Delete {
            api_token,
            device_token,
        } => {
            let api = RelayApi::new(server_url, api_token, timeout)?;
            api.delete_device(device_token).await?;
            print_json(&serde_json::json!({"status": "success", "deleted": device_token}))
        }
    }
}

#[allow(clippy::print_stdout)]
fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

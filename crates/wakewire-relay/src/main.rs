//! WakeWire Relay Server
//!
//! Store-and-forward relay between controllers and devices that are
//! never connected simultaneously. Payloads stay encrypted end to end;
//! the relay only routes opaque envelopes by device token.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::info;

use wakewire_relay::server::{AppState, RelayConfig, bootstrap_user, build_router};
use wakewire_relay::storage::RelayDatabase;
use wakewire_relay::sweep::spawn_sweeper;

#[derive(Parser, Debug)]
#[command(name = "wakewire-relay")]
#[command(version, about = "WakeWire relay server - encrypted command mailbox")]
struct Args {
    /// Address to listen on.
    #[arg(long, default_value = "0.0.0.0:9009", env = "WAKEWIRE_ADDR")]
    addr: SocketAddr,

    /// Path to SQLite database file.
    #[arg(long, env = "WAKEWIRE_DB_PATH")]
    db_path: Option<PathBuf>,

    /// Queued message retention window in minutes.
    #[arg(long, default_value_t = 5, env = "WAKEWIRE_RETENTION_MINUTES")]
    retention_minutes: u64,

    /// Retention sweep period in seconds.
    #[arg(long, default_value_t = 60)]
    sweep_interval_secs: u64,

    /// Online window in minutes: a device counts as online if it pulled
    /// within this window.
    #[arg(long, default_value_t = 5)]
    online_window_minutes: i64,

    /// Plan assigned to users created with --create-user.
    #[arg(long, default_value = "basic")]
    default_plan: String,

    /// Device limit assigned to users created with --create-user.
    #[arg(long, default_value_t = 5)]
    default_devices_limit: i64,

    /// Create a user with a fresh API token, print it, and exit.
    #[arg(long, value_name = "USERNAME")]
    create_user: Option<String>,

    /// Output logs as JSON (for structured log aggregation).
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    wakewire_core::tracing_init::init_tracing("wakewire_relay=info", args.log_json);

    let db = match &args.db_path {
        Some(path) => {
            info!(path = %path.display(), "Opening relay database");
            RelayDatabase::open(path).await?
        }
        None => {
            let default_path = default_db_path()?;
            info!(path = %default_path.display(), "Opening relay database (default path)");
            RelayDatabase::open(&default_path).await?
        }
    };

    let state = AppState {
        db: db.clone(),
        config: RelayConfig {
            online_window_secs: args.online_window_minutes * 60,
            default_plan: args.default_plan.clone(),
            default_devices_limit: args.default_devices_limit,
        },
    };

    if let Some(username) = &args.create_user {
        let user = bootstrap_user(&state, username).await?;
        #[allow(clippy::print_stdout)]
        {
            println!("user: {}", user.username);
            println!("api_token: {}", user.api_token);
        }
        return Ok(());
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        addr = %args.addr,
        retention_minutes = args.retention_minutes,
        "Starting wakewire-relay"
    );

    let shutdown = CancellationToken::new();
    let sweeper = spawn_sweeper(
        db,
        Duration::from_secs(args.retention_minutes * 60),
        Duration::from_secs(args.sweep_interval_secs),
        shutdown.clone(),
    );

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(args.addr).await?;

    tokio::select! {
        result = axum::serve(listener, app) => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
    }

    shutdown.cancel();
    sweeper.await?;

    info!("Relay stopped");
    Ok(())
}

fn default_db_path() -> anyhow::Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Cannot determine home directory"))?;
    Ok(home.join(".wakewire").join("relay.db"))
}

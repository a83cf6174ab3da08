//! HTTP API for the relay.

mod api;

pub use api::bootstrap_user;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;

use crate::storage::RelayDatabase;

/// Tunables the handlers need beyond the database.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// A device is online iff it pulled within this window.
    pub online_window_secs: i64,
    /// Plan assigned to bootstrap-created users.
    pub default_plan: String,
    /// Device limit assigned to bootstrap-created users.
    pub default_devices_limit: i64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            online_window_secs: 300,
            default_plan: "basic".into(),
            default_devices_limit: 5,
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: RelayDatabase,
    pub config: RelayConfig,
}

/// Build the API router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/push", post(api::push))
        .route("/api/pull", post(api::pull))
        .route("/api/register_device", post(api::register_device))
        .route("/api/delete_device", post(api::delete_device))
        .route("/api/devices", get(api::devices))
        .route("/api/stats", get(api::stats))
        .route("/api/health", get(api::health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

//! API handlers.
//!
//! Push/pull carry the device token in the body (devices only hold their
//! own credential); management endpoints take the user's API token from
//! `Authorization: Bearer` or the dedicated `X-Api-Token` header.
//! Identity failures map to 401, ownership/lookup failures to 404, and
//! domain violations (limit, duplicate id) to 400.

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;
use wakewire_core::{DatabaseError, unix_timestamp};
use wakewire_proto::relay::{
    DIRECTION_TO_CLIENT, DIRECTION_TO_DEVICE, DeleteDeviceRequest, DeviceView, PullRequest,
    PullResponse, PushAck, PushRequest, QueuedMessage, RegisterDeviceRequest,
    RegisterDeviceResponse, UserDevicesResponse,
};

use super::AppState;
use crate::storage::User;
use crate::token::generate_token;

/// Extract the user credential from request headers.
fn api_token_from_headers(headers: &HeaderMap) -> Option<String> {
    if let Some(auth) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
        if let Some(token) = auth.strip_prefix("Bearer ") {
            return Some(token.to_owned());
        }
    }
    headers
        .get("x-api-token")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}

fn error_body(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "status": "error", "message": message }))).into_response()
}

fn internal_error(e: &DatabaseError) -> Response {
    error!(error = %e, "Relay storage failure");
    error_body(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
}

/// Resolve the API token into a user or produce the matching error response.
async fn require_user(state: &AppState, headers: &HeaderMap) -> Result<User, Response> {
    let Some(token) = api_token_from_headers(headers) else {
        return Err(error_body(StatusCode::UNAUTHORIZED, "API token required"));
    };
    match state.db.get_user_by_api_token(&token).await {
        Ok(Some(user)) => Ok(user),
        Ok(None) => Err(error_body(StatusCode::UNAUTHORIZED, "Invalid API token")),
        Err(e) => Err(internal_error(&e)),
    }
}

/// `POST /api/push`: enqueue one encrypted payload.
pub async fn push(State(state): State<AppState>, Json(req): Json<PushRequest>) -> Response {
    let device = match state.db.get_device_by_token(&req.device_token).await {
        Ok(Some(device)) => device,
        Ok(None) => return error_body(StatusCode::UNAUTHORIZED, "Invalid device token"),
        Err(e) => return internal_error(&e),
    };

    let direction = if req.is_response {
        DIRECTION_TO_CLIENT
    } else {
        DIRECTION_TO_DEVICE
    };

    if let Err(e) = state
        .db
        .push_message(
            &req.device_token,
            &device.device_id,
            &req.msg_type,
            &req.encrypted_payload,
            direction,
        )
        .await
    {
        return internal_error(&e);
    }

    Json(PushAck {
        status: "pushed".into(),
        message: req.msg_type,
    })
    .into_response()
}

/// `POST /api/pull`: destructive FIFO read of a device's mailbox.
pub async fn pull(State(state): State<AppState>, Json(req): Json<PullRequest>) -> Response {
    let device = match state.db.get_device_by_token(&req.device_token).await {
        Ok(Some(device)) if device.device_id == req.device_id => device,
        Ok(_) => {
            return error_body(
                StatusCode::NOT_FOUND,
                "Device not found or invalid token",
            );
        }
        Err(e) => return internal_error(&e),
    };

    let messages = match state.db.pull_messages(&device.device_token).await {
        Ok(messages) => messages,
        Err(e) => return internal_error(&e),
    };

    let messages: Vec<QueuedMessage> = messages
        .into_iter()
        .map(|m| QueuedMessage {
            msg_type: m.message_type,
            data: m.message_data,
            direction: m.direction,
        })
        .collect();

    let count = messages.len();
    Json(PullResponse { messages, count }).into_response()
}

/// `POST /api/register_device`: mint a device credential for a user.
pub async fn register_device(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<RegisterDeviceRequest>,
) -> Response {
    let user = match require_user(&state, &headers).await {
        Ok(user) => user,
        Err(resp) => return resp,
    };

    let count = match state.db.count_devices(&user.id).await {
        Ok(count) => count,
        Err(e) => return internal_error(&e),
    };
    if count >= user.devices_limit {
        return error_body(
            StatusCode::BAD_REQUEST,
            &format!("Device limit reached ({})", user.devices_limit),
        );
    }

    match state.db.get_device_by_owner_and_id(&user.id, &req.device_id).await {
        Ok(Some(_)) => {
            return error_body(
                StatusCode::BAD_REQUEST,
                &format!("Device '{}' already registered", req.device_id),
            );
        }
        Ok(None) => {}
        Err(e) => return internal_error(&e),
    }

    let device_data = req
        .device_data
        .map_or_else(|| "{}".to_owned(), |m| serde_json::Value::Object(m).to_string());

    let device_token = generate_token();
    let device = match state
        .db
        .create_device(&user.id, &req.device_id, &device_token, &device_data)
        .await
    {
        Ok(device) => device,
        Err(e) => return internal_error(&e),
    };

    info!(user = %user.username, device_id = %device.device_id, "Device registered");

    Json(RegisterDeviceResponse {
        status: "device_registered".into(),
        device_id: device.device_id,
        device_token: device.device_token,
        mode: "cloud".into(),
    })
    .into_response()
}

/// `POST /api/delete_device`: deregister a device the user owns.
pub async fn delete_device(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<DeleteDeviceRequest>,
) -> Response {
    let user = match require_user(&state, &headers).await {
        Ok(user) => user,
        Err(resp) => return resp,
    };

    match state.db.delete_device_owned(&user.id, &req.device_token).await {
        Ok(true) => Json(json!({
            "status": "device_deleted",
            "message": "Device deleted",
        }))
        .into_response(),
        Ok(false) => error_body(StatusCode::NOT_FOUND, "Device not found"),
        Err(e) => internal_error(&e),
    }
}

/// `GET /api/devices`: the user's devices with derived online status.
pub async fn devices(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let user = match require_user(&state, &headers).await {
        Ok(user) => user,
        Err(resp) => return resp,
    };

    let devices = match state.db.list_devices(&user.id).await {
        Ok(devices) => devices,
        Err(e) => return internal_error(&e),
    };

    let now = unix_timestamp();
    let devices: Vec<DeviceView> = devices
        .into_iter()
        .map(|d| DeviceView {
            online: d.is_online(now, state.config.online_window_secs),
            device_id: d.device_id,
            device_token: d.device_token,
            cloud: d.cloud != 0,
            last_seen: d.last_seen,
            poll_count: d.poll_count,
            added: d.added,
        })
        .collect();

    let devices_count = devices.len();
    Json(UserDevicesResponse {
        user: user.username,
        plan: user.plan,
        devices_limit: user.devices_limit,
        devices_count,
        devices,
    })
    .into_response()
}

/// `GET /api/stats`: unauthenticated service counters.
pub async fn stats(State(state): State<AppState>) -> Response {
    let now = unix_timestamp();
    let cutoff = now - state.config.online_window_secs;

    let result: Result<_, DatabaseError> = async {
        let online = state.db.count_devices_seen_since(cutoff).await?;
        let total = state.db.count_devices_total().await?;
        let users = state.db.count_users().await?;
        let to_device = state.db.count_messages_by_direction(DIRECTION_TO_DEVICE).await?;
        let to_client = state.db.count_messages_by_direction(DIRECTION_TO_CLIENT).await?;
        Ok((online, total, users, to_device, to_client))
    }
    .await;

    match result {
        Ok((online, total, users, to_device, to_client)) => Json(json!({
            "online_devices": online,
            "total_devices": total,
            "total_users": users,
            "queues_to_device": to_device,
            "queues_to_client": to_client,
            "total_queues": to_device + to_client,
            "server_time": now,
            "status": "running",
        }))
        .into_response(),
        Err(e) => internal_error(&e),
    }
}

/// `GET /api/health`: liveness marker.
pub async fn health() -> Response {
    Json(json!({
        "status": "healthy",
        "service": "WakeWire Cloud Relay",
        "timestamp": unix_timestamp(),
    }))
    .into_response()
}

/// Create a user with a freshly minted API token (operator bootstrap).
pub async fn bootstrap_user(state: &AppState, username: &str) -> Result<User, DatabaseError> {
    let api_token = generate_token();
    state
        .db
        .create_user(
            &Uuid::new_v4().to_string(),
            username,
            &api_token,
            &state.config.default_plan,
            state.config.default_devices_limit,
        )
        .await
}

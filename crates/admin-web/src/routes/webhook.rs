//! Authenticated broadcast webhook.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::error::{AdminError, Result};
use crate::state::AppState;

pub const SECRET_HEADER: &str = "x-webhook-secret";

#[derive(Debug, Deserialize)]
pub struct BroadcastRequest {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Serialize)]
pub struct BroadcastResponse {
    pub text: String,
    pub delivered: bool,
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<()> {
    let Some(expected) = state.webhook_secret.as_deref() else {
        warn!("Webhook called but no secret is configured");
        return Err(AdminError::Unauthorized);
    };

    let provided = headers
        .get(SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if provided == expected {
        Ok(())
    } else {
        warn!("Webhook called with a missing or wrong secret");
        Err(AdminError::Unauthorized)
    }
}

/// Turn an external event into an announcement and post it to the
/// broadcast destination.
pub async fn broadcast(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<BroadcastRequest>,
) -> Result<Json<BroadcastResponse>> {
    authorize(&state, &headers)?;

    let event = request.event.trim();
    if event.is_empty() {
        return Err(AdminError::BadRequest("event cannot be empty".to_string()));
    }

    let text = state.engine.announce(event, &request.data).await;

    let delivered = match state.broadcast_destination.as_deref() {
        None => {
            warn!(event = %event, "No broadcast destination configured, not delivering");
            false
        }
        Some(_) if !state.sender.is_ready() => {
            warn!(event = %event, "Chat channel not ready, not delivering");
            false
        }
        Some(destination) => match state.sender.send_message(destination, &text).await {
            Ok(()) => true,
            Err(e) => {
                warn!(event = %event, "Broadcast delivery failed: {}", e);
                false
            }
        },
    };

    info!(event = %event, delivered, "Webhook broadcast handled");
    Ok(Json(BroadcastResponse { text, delivered }))
}

//! Scheduled prompt CRUD. Every mutation asks the scheduler to reload.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use database::{schedule, NewScheduledPrompt, ScheduledPrompt};
use serde_json::{json, Value};
use tracing::info;

use crate::error::Result;
use crate::state::AppState;

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<ScheduledPrompt>>> {
    Ok(Json(schedule::list(state.db.pool()).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Json(prompt): Json<NewScheduledPrompt>,
) -> Result<(StatusCode, Json<ScheduledPrompt>)> {
    let created = schedule::create(state.db.pool(), &prompt).await?;
    info!(id = created.id, name = %created.name, schedule = %created.schedule, "Scheduled prompt created");
    state.reload.reload();
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ScheduledPrompt>> {
    Ok(Json(schedule::get(state.db.pool(), id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(prompt): Json<NewScheduledPrompt>,
) -> Result<Json<ScheduledPrompt>> {
    let updated = schedule::update(state.db.pool(), id, &prompt).await?;
    info!(id, "Scheduled prompt updated");
    state.reload.reload();
    Ok(Json(updated))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode> {
    schedule::delete(state.db.pool(), id).await?;
    info!(id, "Scheduled prompt deleted");
    state.reload.reload();
    Ok(StatusCode::NO_CONTENT)
}

/// Explicit reload signal.
pub async fn reload(State(state): State<AppState>) -> Json<Value> {
    state.reload.reload();
    Json(json!({ "reloaded": true }))
}

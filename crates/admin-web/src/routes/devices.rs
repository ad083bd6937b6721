//! Device mapping CRUD.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use database::{device_mapping, DeviceMapping, NewDeviceMapping};
use tracing::info;

use crate::error::Result;
use crate::state::AppState;

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<DeviceMapping>>> {
    Ok(Json(device_mapping::list(state.db.pool()).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Json(mapping): Json<NewDeviceMapping>,
) -> Result<(StatusCode, Json<DeviceMapping>)> {
    let created = device_mapping::create(state.db.pool(), &mapping).await?;
    info!(
        entity_id = %created.entity_id,
        nickname = %created.nickname,
        "Device mapping created"
    );
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DeviceMapping>> {
    Ok(Json(device_mapping::get(state.db.pool(), id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(mapping): Json<NewDeviceMapping>,
) -> Result<Json<DeviceMapping>> {
    Ok(Json(
        device_mapping::update(state.db.pool(), id, &mapping).await?,
    ))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode> {
    device_mapping::delete(state.db.pool(), id).await?;
    info!(id, "Device mapping deleted");
    Ok(StatusCode::NO_CONTENT)
}

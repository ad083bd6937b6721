//! Keyword rule CRUD.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use database::{keyword, KeywordRule, NewKeywordRule};
use tracing::info;

use crate::error::Result;
use crate::state::AppState;

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<KeywordRule>>> {
    Ok(Json(keyword::list(state.db.pool()).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Json(rule): Json<NewKeywordRule>,
) -> Result<(StatusCode, Json<KeywordRule>)> {
    let created = keyword::create(state.db.pool(), &rule).await?;
    info!(id = created.id, pattern = %created.pattern, "Keyword rule created");
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<KeywordRule>> {
    Ok(Json(keyword::get(state.db.pool(), id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(rule): Json<NewKeywordRule>,
) -> Result<Json<KeywordRule>> {
    let updated = keyword::update(state.db.pool(), id, &rule).await?;
    info!(id, "Keyword rule updated");
    Ok(Json(updated))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode> {
    keyword::delete(state.db.pool(), id).await?;
    info!(id, "Keyword rule deleted");
    Ok(StatusCode::NO_CONTENT)
}

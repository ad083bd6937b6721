//! Tool audit listing.

use axum::extract::{Query, State};
use axum::Json;
use database::{tool_audit, ToolAuditEntry};
use serde::Deserialize;

use crate::error::Result;
use crate::state::AppState;

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 500;

#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    pub sender: Option<String>,
    pub limit: Option<i64>,
}

/// Newest entries first, optionally for one sender.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<AuditQuery>,
) -> Result<Json<Vec<ToolAuditEntry>>> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let sender = query.sender.as_deref().filter(|s| !s.is_empty());
    Ok(Json(
        tool_audit::list_audit(state.db.pool(), sender, limit).await?,
    ))
}

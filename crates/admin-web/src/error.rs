//! Error types for the admin API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use database::DatabaseError;
use thiserror::Error;

/// Errors that can occur in the admin API.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Database error.
    #[error(transparent)]
    Database(#[from] DatabaseError),

    /// Malformed request.
    #[error("{0}")]
    BadRequest(String),

    /// Missing or wrong webhook secret.
    #[error("unauthorized")]
    Unauthorized,
}

impl AdminError {
    pub fn status(&self) -> StatusCode {
        match self {
            AdminError::Database(DatabaseError::Validation(_)) => StatusCode::BAD_REQUEST,
            AdminError::Database(DatabaseError::NotFound { .. }) => StatusCode::NOT_FOUND,
            AdminError::Database(DatabaseError::AlreadyExists { .. }) => StatusCode::CONFLICT,
            AdminError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AdminError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AdminError::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Admin request failed: {}", self);
        } else {
            tracing::debug!("Admin request rejected ({}): {}", status, self);
        }

        let body = serde_json::json!({
            "error": self.to_string()
        });

        (status, Json(body)).into_response()
    }
}

/// Result type for admin operations.
pub type Result<T> = std::result::Result<T, AdminError>;

#[cfg(test)]
mod tests {
    use super::*;
    use database::ValidationError;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                AdminError::from(DatabaseError::Validation(ValidationError::Empty(
                    "name".to_string(),
                ))),
                StatusCode::BAD_REQUEST,
            ),
            (
                AdminError::from(DatabaseError::NotFound {
                    entity: "keyword rule",
                    id: "7".to_string(),
                }),
                StatusCode::NOT_FOUND,
            ),
            (
                AdminError::from(DatabaseError::AlreadyExists {
                    entity: "device mapping",
                    id: "lamp".to_string(),
                }),
                StatusCode::CONFLICT,
            ),
            (AdminError::Unauthorized, StatusCode::UNAUTHORIZED),
            (
                AdminError::BadRequest("bad".to_string()),
                StatusCode::BAD_REQUEST,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(err.status(), status, "{err}");
        }
    }

    #[test]
    fn test_validation_message_is_user_facing() {
        let err = AdminError::from(DatabaseError::Validation(ValidationError::Empty(
            "prompt".to_string(),
        )));
        assert_eq!(err.to_string(), "prompt cannot be empty");
    }
}

//! Route handlers for the admin API.

pub mod audit;
pub mod devices;
pub mod health;
pub mod keywords;
pub mod schedules;
pub mod webhook;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(health::health))
        // Administration
        .route("/api/keywords", get(keywords::list).post(keywords::create))
        .route(
            "/api/keywords/:id",
            get(keywords::get)
                .put(keywords::update)
                .delete(keywords::delete),
        )
        .route("/api/schedules", get(schedules::list).post(schedules::create))
        .route(
            "/api/schedules/:id",
            get(schedules::get)
                .put(schedules::update)
                .delete(schedules::delete),
        )
        .route("/api/devices", get(devices::list).post(devices::create))
        .route(
            "/api/devices/:id",
            get(devices::get).put(devices::update).delete(devices::delete),
        )
        .route("/api/audit", get(audit::list))
        .route("/api/reload", post(schedules::reload))
        // Inbound events
        .route("/webhook/broadcast", post(webhook::broadcast))
}

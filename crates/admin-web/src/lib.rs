//! Admin HTTP API for the household bot.
//!
//! JSON endpoints for managing keyword rules, scheduled prompts and device
//! mappings, reading the tool audit log, and an authenticated webhook that
//! turns external events into chat announcements.

mod error;
mod routes;
mod state;

use axum::Router;
use tower_http::trace::TraceLayer;

pub use error::{AdminError, Result};
pub use routes::webhook::{BroadcastRequest, BroadcastResponse, SECRET_HEADER};
pub use state::AppState;

/// Build the complete application with tracing middleware.
pub fn app(state: AppState) -> Router {
    routes::router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

//! HTTP API module
//! 
//! The mutator surface offered to renderers, plus state, status and event
//! endpoints.

pub mod events;
pub mod handlers;
pub mod requests;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use events::events_handler;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/state", get(state_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .route("/events", get(events_handler))
        .route("/groups", post(create_group_handler))
        .route("/groups/active", delete(delete_group_handler))
        .route("/groups/active/name", put(rename_group_handler))
        .route("/groups/active/timers", post(add_timer_handler))
        .route("/groups/:id/activate", post(activate_group_handler))
        .route("/timers/:id", delete(delete_timer_handler).patch(update_timer_handler))
        .route("/timers/:id/toggle", post(toggle_timer_handler))
        .route("/timers/:id/reset", post(reset_timer_handler))
        .route("/timers/:id/edit", post(begin_edit_handler))
        .route("/timers/:id/duration", put(commit_edit_handler))
        .route("/settings/theme", put(set_theme_handler))
        .route("/settings/layout", put(set_layout_handler))
        .route("/reset", post(reset_all_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

//! HTTP endpoint handlers
//!
//! One handler per mutator. Each applies its change through
//! [`AppState::update_board`] and answers with the board as it stands after.

use std::sync::Arc;
use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use tracing::info;

use crate::{
    error::{AppResult, BoardError},
    state::{AppState, Change},
};
use super::{
    requests::{
        ConfirmQuery, CreateGroupRequest, DurationRequest, LayoutRequest, RenameRequest, ThemeRequest,
        TimerPatch,
    },
    responses::{ApiResponse, BoardView, HealthResponse, StatusResponse},
};

type Shared = State<Arc<AppState>>;

/// Handle GET /state - Full board as the renderer draws it
pub async fn state_handler(State(state): Shared) -> AppResult<Json<BoardView>> {
    let board = state.snapshot()?;
    Ok(Json(BoardView::from(&board)))
}

/// Handle POST /groups - Create a group and make it active
pub async fn create_group_handler(
    State(state): Shared,
    body: Option<Json<CreateGroupRequest>>,
) -> AppResult<Json<ApiResponse>> {
    let name = body.and_then(|Json(request)| request.name);
    let board = state.update_board("create-group", |board| Ok(board.create_group(name)))?;
    info!("Group {} created", board.active_group_id);
    Ok(Json(ApiResponse::ok("Group created", &board)))
}

/// Handle POST /groups/:id/activate - Switch the active group
pub async fn activate_group_handler(State(state): Shared, Path(id): Path<u64>) -> AppResult<Json<ApiResponse>> {
    let board = state.update_board("switch-group", |board| board.switch_group(id))?;
    Ok(Json(ApiResponse::ok("Group activated", &board)))
}

/// Handle DELETE /groups/active - Delete the active group
pub async fn delete_group_handler(
    State(state): Shared,
    Query(query): Query<ConfirmQuery>,
) -> AppResult<Json<ApiResponse>> {
    let board = state.update_board("delete-group", |board| board.delete_active_group(query.confirm))?;
    Ok(Json(ApiResponse::ok("Group deleted", &board)))
}

/// Handle PUT /groups/active/name - Rename the active group
pub async fn rename_group_handler(
    State(state): Shared,
    Json(request): Json<RenameRequest>,
) -> AppResult<Json<ApiResponse>> {
    let board = state.update_board("rename-group", |board| Ok(board.rename_active_group(request.name)))?;
    Ok(Json(ApiResponse::ok("Group renamed", &board)))
}

/// Handle POST /groups/active/timers - Add a default timer to the active group
pub async fn add_timer_handler(State(state): Shared) -> AppResult<Json<ApiResponse>> {
    let board = state.update_board("add-timer", |board| Ok(board.add_timer().1))?;
    Ok(Json(ApiResponse::ok("Timer added", &board)))
}

/// Handle DELETE /timers/:id - Delete a timer, ignoring unknown ids
pub async fn delete_timer_handler(State(state): Shared, Path(id): Path<u64>) -> AppResult<Json<ApiResponse>> {
    let board = state.update_board("delete-timer", |board| Ok(board.delete_timer(id)))?;
    Ok(Json(ApiResponse::ok("Timer deleted", &board)))
}

/// Handle POST /timers/:id/toggle - Start or pause
pub async fn toggle_timer_handler(State(state): Shared, Path(id): Path<u64>) -> AppResult<Json<ApiResponse>> {
    let board = state.update_board("toggle-timer", |board| board.toggle_timer(id))?;
    Ok(Json(ApiResponse::ok("Timer toggled", &board)))
}

/// Handle POST /timers/:id/reset - Stop and refill
pub async fn reset_timer_handler(State(state): Shared, Path(id): Path<u64>) -> AppResult<Json<ApiResponse>> {
    let board = state.update_board("reset-timer", |board| board.reset_timer(id))?;
    Ok(Json(ApiResponse::ok("Timer reset", &board)))
}

/// Handle POST /timers/:id/edit - Enter edit mode
pub async fn begin_edit_handler(State(state): Shared, Path(id): Path<u64>) -> AppResult<Json<ApiResponse>> {
    let pause = state.pause_on_edit;
    let board = state.update_board("begin-edit", |board| board.begin_edit_timer(id, pause))?;
    Ok(Json(ApiResponse::ok("Editing timer", &board)))
}

/// Handle PUT /timers/:id/duration - Commit an edit
pub async fn commit_edit_handler(
    State(state): Shared,
    Path(id): Path<u64>,
    Json(request): Json<DurationRequest>,
) -> AppResult<Json<ApiResponse>> {
    let (hours, minutes, seconds) = request.parts();
    let board = state.update_board("commit-edit", |board| {
        board.commit_edit_timer(id, hours, minutes, seconds)
    })?;
    Ok(Json(ApiResponse::ok("Timer duration updated", &board)))
}

/// Handle PATCH /timers/:id - Set name and/or sound
pub async fn update_timer_handler(
    State(state): Shared,
    Path(id): Path<u64>,
    Json(patch): Json<TimerPatch>,
) -> AppResult<Json<ApiResponse>> {
    let fields = patch.into_fields();
    let board = state.update_board("set-timer-field", |board| {
        if board.active_group().timer(id).is_none() {
            return Err(BoardError::TimerNotFound(id));
        }
        let mut change = Change::none();
        for field in fields {
            change = board.set_timer_field(id, field)?;
        }
        Ok(change)
    })?;
    Ok(Json(ApiResponse::ok("Timer updated", &board)))
}

/// Handle PUT /settings/theme
pub async fn set_theme_handler(
    State(state): Shared,
    Json(request): Json<ThemeRequest>,
) -> AppResult<Json<ApiResponse>> {
    let board = state.update_board("set-theme", |board| Ok(board.set_theme(request.theme)))?;
    Ok(Json(ApiResponse::ok("Theme updated", &board)))
}

/// Handle PUT /settings/layout
pub async fn set_layout_handler(
    State(state): Shared,
    Json(request): Json<LayoutRequest>,
) -> AppResult<Json<ApiResponse>> {
    let board = state.update_board("set-layout", |board| Ok(board.set_layout(request.layout)))?;
    Ok(Json(ApiResponse::ok("Layout updated", &board)))
}

/// Handle POST /reset - Discard everything and start over
pub async fn reset_all_handler(
    State(state): Shared,
    Query(query): Query<ConfirmQuery>,
) -> AppResult<Json<ApiResponse>> {
    let board = state.clear_all(query.confirm)?;
    Ok(Json(ApiResponse::ok("All data cleared", &board)))
}

/// Handle GET /status - Daemon status
pub async fn status_handler(State(state): Shared) -> AppResult<Json<StatusResponse>> {
    let board = state.snapshot()?;
    let view = BoardView::from(&board);
    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        groups: board.groups.len(),
        timers: board.timers().count(),
        running_timers: board.timers().filter(|t| t.is_running).count(),
        title: view.title,
        storage: state.storage_backend().to_string(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

//! API response structures

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::{
    error::{AppError, BoardError},
    state::{Layout, SoundKind, Timer, TimerBoard},
    utils::{format_hms, progress_percent, window_title},
};

/// A timer as the renderer draws it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerView {
    pub id: u64,
    pub name: String,
    pub total_duration: u64,
    pub remaining: u64,
    pub is_running: bool,
    pub is_editing: bool,
    pub sound: SoundKind,
    /// `HH:MM:SS` of the remaining time
    pub display: String,
    pub percent: f64,
    pub low: bool,
    /// Current duration split for the edit inputs
    pub edit_hours: u64,
    pub edit_minutes: u64,
    pub edit_seconds: u64,
}

impl From<&Timer> for TimerView {
    fn from(timer: &Timer) -> Self {
        let percent = progress_percent(timer.remaining, timer.total_duration);
        Self {
            id: timer.id,
            name: timer.name.clone(),
            total_duration: timer.total_duration,
            remaining: timer.remaining,
            is_running: timer.is_running,
            is_editing: timer.is_editing,
            sound: timer.sound,
            display: format_hms(timer.remaining),
            percent,
            low: percent < crate::utils::format::LOW_PERCENT,
            edit_hours: timer.total_duration / 3600,
            edit_minutes: (timer.total_duration % 3600) / 60,
            edit_seconds: timer.total_duration % 60,
        }
    }
}

/// A tab button
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabView {
    pub id: u64,
    pub name: String,
    pub active: bool,
    pub timer_count: usize,
    pub running_count: usize,
}

/// Everything a renderer needs to draw the page
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardView {
    pub theme: String,
    pub layout: Layout,
    pub active_tab_id: u64,
    pub active_tab_name: String,
    pub tabs: Vec<TabView>,
    /// Timers of the active tab only
    pub timers: Vec<TimerView>,
    pub title: String,
}

impl From<&TimerBoard> for BoardView {
    fn from(board: &TimerBoard) -> Self {
        let active = board.active_group();
        let tabs = board
            .groups
            .iter()
            .map(|group| TabView {
                id: group.id,
                name: group.name.clone(),
                active: group.id == active.id,
                timer_count: group.timers.len(),
                running_count: group.timers.iter().filter(|t| t.is_running).count(),
            })
            .collect();
        let soonest = board
            .timers()
            .filter(|t| t.is_running)
            .map(|t| t.remaining)
            .min();

        Self {
            theme: board.theme.clone(),
            layout: board.layout,
            active_tab_id: active.id,
            active_tab_name: active.name.clone(),
            tabs,
            timers: active.timers.iter().map(TimerView::from).collect(),
            title: window_title(soonest),
        }
    }
}

/// API response structure for mutating endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub board: BoardView,
}

impl ApiResponse {
    /// Create an ok response carrying the board after the change
    pub fn ok(message: impl Into<String>, board: &TimerBoard) -> Self {
        Self {
            status: "ok".to_string(),
            message: message.into(),
            timestamp: Utc::now(),
            board: BoardView::from(board),
        }
    }
}

/// Error body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = match &self {
            AppError::Board(BoardError::LastGroup | BoardError::TimerEditing(_)) => StatusCode::CONFLICT,
            AppError::Board(BoardError::ConfirmationRequired(_)) => StatusCode::PRECONDITION_REQUIRED,
            AppError::Board(BoardError::GroupNotFound(_) | BoardError::TimerNotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Storage(_) | AppError::Poisoned(_) | AppError::Task(_) => {
                error!("Request failed: {}", self);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = ErrorResponse {
            status: "error".to_string(),
            message: self.to_string(),
            timestamp: Utc::now(),
        };
        (code, Json(body)).into_response()
    }
}

/// Daemon status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub groups: usize,
    pub timers: usize,
    pub running_timers: usize,
    pub title: String,
    pub storage: String,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

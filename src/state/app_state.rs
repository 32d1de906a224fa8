//! Shared runtime context owning the timer board

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use super::{
    change::{Change, RenderEvent, RenderScope, TimerTick},
    TimerBoard,
};
use crate::{
    error::{AppError, AppResult, BoardError},
    services::AlertDispatcher,
    storage::Persistence,
    tasks::{tick_board_steps, TickRender, TickReport},
    utils::window_title,
};

/// Capacity of the render event channel
const RENDER_CHANNEL_CAPACITY: usize = 256;

/// Owns the board and carries out the side effects mutators ask for.
///
/// Every mutation and every tick runs while holding the board lock, so a tick
/// never interleaves with a user edit.
pub struct AppState {
    board: Mutex<TimerBoard>,
    persistence: Persistence,
    alerts: Arc<dyn AlertDispatcher>,
    /// Entering edit mode also pauses the timer
    pub pause_on_edit: bool,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    last_action: Mutex<Option<(String, DateTime<Utc>)>>,
    /// Render notifications for connected renderers
    render_tx: broadcast::Sender<RenderEvent>,
}

impl AppState {
    pub fn new(board: TimerBoard, persistence: Persistence, alerts: Arc<dyn AlertDispatcher>) -> Self {
        let (render_tx, _) = broadcast::channel(RENDER_CHANNEL_CAPACITY);

        Self {
            board: Mutex::new(board),
            persistence,
            alerts,
            pause_on_edit: false,
            start_time: Instant::now(),
            port: 0,
            host: String::new(),
            last_action: Mutex::new(None),
            render_tx,
        }
    }

    /// Record where the HTTP API is served
    pub fn with_server(mut self, host: impl Into<String>, port: u16) -> Self {
        self.host = host.into();
        self.port = port;
        self
    }

    pub fn with_pause_on_edit(mut self, pause_on_edit: bool) -> Self {
        self.pause_on_edit = pause_on_edit;
        self
    }

    fn lock_board(&self) -> AppResult<MutexGuard<'_, TimerBoard>> {
        self.board
            .lock()
            .map_err(|e| AppError::Poisoned(e.to_string()))
    }

    /// Subscribe to render events
    pub fn subscribe(&self) -> broadcast::Receiver<RenderEvent> {
        self.render_tx.subscribe()
    }

    fn publish(&self, event: RenderEvent) {
        // Nobody listening is fine; the renderer re-reads state on connect
        if self.render_tx.send(event).is_err() {
            debug!("No renderer subscribed");
        }
    }

    /// Apply a mutator, then persist and notify as its [`Change`] asks.
    ///
    /// A rejected mutation leaves the board untouched and is returned as is.
    pub fn update_board<F>(&self, action: &str, mutator: F) -> AppResult<TimerBoard>
    where
        F: FnOnce(&mut TimerBoard) -> Result<Change, BoardError>,
    {
        let mut board = self.lock_board()?;

        let change = match mutator(&mut *board) {
            Ok(change) => change,
            Err(e) => {
                warn!("{} rejected: {}", action, e);
                return Err(e.into());
            }
        };

        if change.save {
            if let Err(e) = self.persistence.save(&board) {
                error!("Failed to save after {}: {}", action, e);
                return Err(e.into());
            }
        }
        let snapshot = board.clone();
        drop(board); // Release the lock early

        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some((action.to_string(), Utc::now()));
        }

        if change.render != RenderScope::None {
            self.publish(RenderEvent::Structure {
                action: action.to_string(),
                scope: change.render,
            });
        }

        debug!("{} applied: {:?}", action, change);
        Ok(snapshot)
    }

    /// Run the tick pass `steps` times, persist if anything ran and publish
    /// the resulting render events.
    pub fn tick(&self, steps: u32) -> AppResult<TickReport> {
        let mut board = self.lock_board()?;
        let report = tick_board_steps(&mut *board, self.alerts.as_ref(), steps);

        if !report.mutated {
            return Ok(report);
        }

        if let Err(e) = self.persistence.save(&board) {
            error!("Failed to save after tick: {}", e);
            return Err(e.into());
        }

        let event = match &report.render {
            TickRender::Full => Some(RenderEvent::TimerList),
            TickRender::Targeted(ids) => {
                let group = board.active_group();
                let timers = ids
                    .iter()
                    .filter_map(|id| group.timer(*id))
                    .map(TimerTick::from_timer)
                    .collect();
                Some(RenderEvent::TimerValues { timers })
            }
            TickRender::None => None,
        };
        drop(board);

        if let Some(event) = event {
            self.publish(event);
        }
        self.publish(RenderEvent::Title {
            title: window_title(report.soonest_remaining),
        });

        Ok(report)
    }

    /// Discard all stored data and start over with a fresh board
    pub fn clear_all(&self, confirmed: bool) -> AppResult<TimerBoard> {
        if !confirmed {
            return Err(BoardError::ConfirmationRequired("Resetting all tabs and settings").into());
        }

        let mut board = self.lock_board()?;
        self.persistence.clear()?;
        *board = TimerBoard::new();
        self.persistence.save(&board)?;
        let snapshot = board.clone();
        drop(board);

        info!("All data cleared");
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(("clear-all".to_string(), Utc::now()));
        }
        self.publish(RenderEvent::Structure {
            action: "clear-all".to_string(),
            scope: RenderScope::All,
        });
        Ok(snapshot)
    }

    /// Persist the current board regardless of changes
    pub fn save_now(&self) -> AppResult<()> {
        let board = self.lock_board()?;
        self.persistence.save(&board)?;
        Ok(())
    }

    /// Current board
    pub fn snapshot(&self) -> AppResult<TimerBoard> {
        Ok(self.lock_board()?.clone())
    }

    pub fn storage_backend(&self) -> &str {
        self.persistence.backend_name()
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        match self.last_action.lock().ok().and_then(|a| a.clone()) {
            Some((action, at)) => (Some(action), Some(at)),
            None => (None, None),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("persistence", &self.persistence)
            .field("pause_on_edit", &self.pause_on_edit)
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::RecordingAlert;
    use crate::state::{AlertKind, SoundKind, TimerField};
    use crate::storage::{MemoryStore, Persistence};

    fn app_state() -> (AppState, RecordingAlert) {
        let alerts = RecordingAlert::new();
        let persistence = Persistence::new(Box::new(MemoryStore::new()));
        let state = AppState::new(TimerBoard::new(), persistence, Arc::new(alerts.clone()));
        (state, alerts)
    }

    fn first_timer(state: &AppState) -> u64 {
        state.snapshot().unwrap().active_group().timers[0].id
    }

    #[test]
    fn mutations_publish_structure_events() {
        let (state, _) = app_state();
        let mut events = state.subscribe();
        state
            .update_board("create-group", |board| Ok(board.create_group(None)))
            .unwrap();

        assert_eq!(
            events.try_recv().unwrap(),
            RenderEvent::Structure {
                action: "create-group".to_string(),
                scope: RenderScope::All
            }
        );
        assert_eq!(state.get_last_action().0.as_deref(), Some("create-group"));
    }

    #[test]
    fn save_only_mutations_stay_quiet() {
        let (state, _) = app_state();
        let id = first_timer(&state);
        let mut events = state.subscribe();
        state
            .update_board("set-timer-field", |board| {
                board.set_timer_field(id, TimerField::Name("Tea".to_string()))
            })
            .unwrap();
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn rejected_mutation_changes_nothing() {
        let (state, _) = app_state();
        let before = serde_json::to_value(state.snapshot().unwrap()).unwrap();
        let result = state.update_board("delete-group", |board| board.delete_active_group(true));
        assert!(matches!(result, Err(AppError::Board(BoardError::LastGroup))));
        assert_eq!(serde_json::to_value(state.snapshot().unwrap()).unwrap(), before);
    }

    #[test]
    fn tick_publishes_values_then_list_on_completion() {
        let (state, alerts) = app_state();
        let id = first_timer(&state);
        state
            .update_board("edit", |board| board.commit_edit_timer(id, 0, 0, 2))
            .unwrap();
        state
            .update_board("sound", |board| board.set_timer_field(id, TimerField::Sound(SoundKind::Beep)))
            .unwrap();
        state.update_board("toggle", |board| board.toggle_timer(id)).unwrap();

        let mut events = state.subscribe();
        state.tick(1).unwrap();
        match events.try_recv().unwrap() {
            RenderEvent::TimerValues { timers } => {
                assert_eq!(timers.len(), 1);
                assert_eq!(timers[0].display, "00:00:01");
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert!(matches!(events.try_recv().unwrap(), RenderEvent::Title { .. }));

        state.tick(1).unwrap();
        assert_eq!(events.try_recv().unwrap(), RenderEvent::TimerList);
        assert_eq!(
            events.try_recv().unwrap(),
            RenderEvent::Title {
                title: "Tab Timers".to_string()
            }
        );
        assert_eq!(alerts.played(), [AlertKind::Beep]);
    }

    #[test]
    fn clear_all_requires_confirmation() {
        let (state, _) = app_state();
        state
            .update_board("create-group", |board| Ok(board.create_group(None)))
            .unwrap();
        assert!(state.clear_all(false).is_err());
        assert_eq!(state.snapshot().unwrap().groups.len(), 2);

        let board = state.clear_all(true).unwrap();
        assert_eq!(board.groups.len(), 1);
    }
}

//! State management module
//! 
//! The timer core (timers, groups, the board and its mutators) and the
//! shared runtime context that persists and publishes changes.

pub mod app_state;
pub mod board;
pub mod change;
pub mod group;
pub mod timer;

// Re-export main types
pub use app_state::AppState;
pub use board::{Layout, TimerBoard, DEFAULT_THEME};
pub use change::{Change, RenderEvent, RenderScope, TimerTick};
pub use group::Group;
pub use timer::{AlertKind, SoundKind, TickOutcome, Timer, TimerField, DEFAULT_DURATION_SECS};

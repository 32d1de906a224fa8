//! Tab Timers - a local multi-timer daemon
//! 
//! Timers are organised in tabs (groups), tick once per second whether or not
//! their tab is shown, persist across restarts and play an alert when they
//! finish. Renderers drive the core over a small HTTP API and follow changes
//! through server-sent events.

pub mod config;
pub mod error;
pub mod state;
pub mod storage;
pub mod api;
pub mod services;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, BoardError};
pub use state::{AppState, TimerBoard};
pub use api::create_router;
pub use utils::signals::shutdown_signal;

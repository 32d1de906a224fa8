//! Background tasks module
//! 
//! This module contains background tasks that run alongside the HTTP server.

pub mod tick_scheduler;

// Re-export main functions
pub use tick_scheduler::{run_tick, tick_board, tick_board_steps, tick_scheduler_task, TickRender, TickReport, TICK_INTERVAL};

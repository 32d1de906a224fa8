//! External collaborator module
//! 
//! Alert playback for finished timers.

pub mod alert;

// Re-export main types
pub use alert::{AlertDispatcher, CommandAlert, LogAlert, RecordingAlert, TerminalBell, ToneSpec};
